//! Client-side errors.

use std::io;

use thiserror::Error;
use vwradio_protocol::ProtocolError;

/// Errors raised by a [`Connection`](crate::Connection).
#[derive(Error, Debug)]
pub enum ClientError {
    /// Nothing arrived within the inactivity timeout while waiting for the
    /// reply length byte.
    #[error("Timeout: No reply header byte received")]
    NoReplyHeader,

    /// The reply body stalled for longer than the inactivity timeout.
    #[error("Timeout: Expected reply of {expected} bytes, got only {actual} bytes: {received:02X?}")]
    IncompleteReply {
        expected: usize,
        actual: usize,
        received: Vec<u8>,
    },

    /// Encoding, framing, NAK or decode failure.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Transport I/O failed for a reason other than a timeout.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serial port could not be opened or configured.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Returns true if the transaction ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ClientError::NoReplyHeader
                | ClientError::IncompleteReply { .. }
                | ClientError::Protocol(ProtocolError::IncompleteFrame { .. })
        )
    }

    /// Returns true if the device answered with NAK.
    pub fn is_nak(&self) -> bool {
        matches!(self, ClientError::Protocol(e) if e.is_nak())
    }
}
