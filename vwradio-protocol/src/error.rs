//! Error types for the rig protocol.

use thiserror::Error;

/// Protocol-level errors raised while encoding commands, validating reply
/// frames, or decoding state dumps.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Command body does not fit behind a one-byte length prefix.
    #[error("Command too long: {0} bytes (max: {1})")]
    FrameTooLarge(usize, usize),

    /// Reply body ended before the length announced in its header.
    #[error("Incomplete reply: expected {expected} bytes, got only {actual} bytes: {data:02X?}")]
    IncompleteFrame {
        expected: usize,
        actual: usize,
        data: Vec<u8>,
    },

    /// More bytes arrived than the header announced.
    #[error("Invalid: Too long: expected {expected} bytes, got {actual} bytes: {data:02X?}")]
    TooLong {
        expected: usize,
        actual: usize,
        data: Vec<u8>,
    },

    /// Reply had a header byte but no status byte.
    #[error("Invalid: Reply had header byte but not ack/nak")]
    EmptyBody,

    /// First reply byte is neither ACK nor NAK.
    #[error("Invalid: First byte not ACK/NAK: {0:02X?}")]
    BadStatus(Vec<u8>),

    /// Device rejected the command. Carries the full reply body.
    #[error("Received NAK response: {0:02X?}")]
    Nak(Vec<u8>),

    /// State dump length does not match its fixed layout.
    #[error("Failed to decode {layout}: expected {expected} bytes, got {actual}")]
    DecodeError {
        layout: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl ProtocolError {
    /// Returns true for violations of the reply frame structure.
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            ProtocolError::TooLong { .. } | ProtocolError::EmptyBody | ProtocolError::BadStatus(_)
        )
    }

    /// Returns true if the device answered with NAK.
    pub fn is_nak(&self) -> bool {
        matches!(self, ProtocolError::Nak(_))
    }
}
