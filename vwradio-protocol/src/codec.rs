//! Codec for encoding commands and validating replies.
//!
//! Frame format (both directions):
//! ```text
//! +--------+--------------------------------+
//! | Length |              Body              |
//! |   u8   | opcode+payload / status+data   |
//! +--------+--------------------------------+
//! | 1 byte |         Length bytes           |
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use crate::dump::{decode_radio_state, decode_upd_state, RadioState, UpdState};
use crate::error::ProtocolError;
use crate::types::*;

/// Frame header size: a single length byte.
pub const HEADER_SIZE: usize = 1;

/// Build a command body: opcode followed by the payload verbatim.
pub fn encode_body(opcode: u8, payload: &[u8]) -> Result<Bytes, ProtocolError> {
    let len = 1 + payload.len();
    if len > MAX_BODY_SIZE {
        return Err(ProtocolError::FrameTooLarge(len, MAX_BODY_SIZE));
    }

    let mut body = BytesMut::with_capacity(len);
    body.put_u8(opcode);
    body.put_slice(payload);
    Ok(body.freeze())
}

/// Encode a command into its body.
pub fn encode_command(cmd: &Command) -> Result<Bytes, ProtocolError> {
    let opcode: u8 = cmd.opcode().into();

    match cmd {
        Command::SetLed { led, on } => encode_body(opcode, &[led.code(), u8::from(*on)]),
        Command::SetRunMode(mode) => encode_body(opcode, &[mode.code()]),
        Command::Echo(data)
        | Command::EmuUpdSendCommand(data)
        | Command::RadioLoadKeyData(data)
        | Command::RadioStateProcess(data)
        | Command::FaceplateUpdSendCommand(data) => encode_body(opcode, data),
        Command::EmuUpdDumpState
        | Command::EmuUpdReset
        | Command::RadioStateDump
        | Command::RadioStateReset
        | Command::FaceplateUpdDumpState
        | Command::FaceplateClearDisplay => encode_body(opcode, &[]),
    }
}

/// Prefix a body with its length byte.
pub fn encode_frame(body: &[u8]) -> Result<Bytes, ProtocolError> {
    if body.len() > MAX_BODY_SIZE {
        return Err(ProtocolError::FrameTooLarge(body.len(), MAX_BODY_SIZE));
    }

    let mut frame = BytesMut::with_capacity(HEADER_SIZE + body.len());
    frame.put_u8(body.len() as u8);
    frame.put_slice(body);
    Ok(frame.freeze())
}

/// Validate a received reply body against the length from its header.
///
/// Checks run in a fixed order: short, long, empty, status byte, NAK. A NAK
/// is returned as an error unless `ignore_nak` is set, in which case the
/// body comes back for the caller to inspect.
pub fn check_reply(expected: usize, body: Bytes, ignore_nak: bool) -> Result<Bytes, ProtocolError> {
    if body.len() < expected {
        return Err(ProtocolError::IncompleteFrame {
            expected,
            actual: body.len(),
            data: body.to_vec(),
        });
    }
    if body.len() > expected {
        return Err(ProtocolError::TooLong {
            expected,
            actual: body.len(),
            data: body.to_vec(),
        });
    }
    if body.is_empty() {
        return Err(ProtocolError::EmptyBody);
    }

    match Status::try_from(body[0]) {
        Err(_) => Err(ProtocolError::BadStatus(body.to_vec())),
        Ok(Status::Nak) if !ignore_nak => Err(ProtocolError::Nak(body.to_vec())),
        Ok(_) => Ok(body),
    }
}

/// A decoded reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Acknowledgement without data.
    Status(Status),
    /// Echo data with the status byte stripped.
    Echo(Bytes),
    UpdState(UpdState),
    RadioState(RadioState),
}

/// Decode a validated reply body for `opcode`.
///
/// Succeeds iff the body length matches the opcode's documented reply
/// length; echo accepts any body that carries a status byte.
pub fn decode_reply(opcode: Opcode, body: Bytes) -> Result<Reply, ProtocolError> {
    let Some(expected) = opcode.reply_len() else {
        if body.is_empty() {
            return Err(ProtocolError::DecodeError {
                layout: opcode.name(),
                expected: STATUS_REPLY_SIZE,
                actual: 0,
            });
        }
        return Ok(Reply::Echo(body.slice(1..)));
    };

    match opcode {
        Opcode::EmuUpdDumpState | Opcode::FaceplateUpdDumpState => {
            Ok(Reply::UpdState(decode_upd_state(&body)?))
        }
        Opcode::RadioStateDump => Ok(Reply::RadioState(decode_radio_state(&body)?)),
        _ => {
            if body.len() != expected {
                return Err(ProtocolError::DecodeError {
                    layout: opcode.name(),
                    expected,
                    actual: body.len(),
                });
            }
            let status = Status::try_from(body[0]).map_err(|_| ProtocolError::BadStatus(body.to_vec()))?;
            Ok(Reply::Status(status))
        }
    }
}
