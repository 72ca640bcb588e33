//! Wire protocol definitions for the vwradio AVR test rig.
//!
//! The rig fronts two emulated devices: the RAM of a uPD16432B VFD
//! controller and the head unit's operating state decoder. The host talks
//! to it with length-prefixed command/reply frames over a serial line.
//!
//! # Frame Format
//!
//! ```text
//! host -> rig:  [length:1][opcode:1][payload:0..254]
//! rig -> host:  [length:1][status:1][data:0..254]     status = ACK 0x06 | NAK 0x15
//! ```
//!
//! # Example
//!
//! ```rust
//! use bytes::Bytes;
//! use vwradio_protocol::{check_reply, decode_reply, encode_command, encode_frame, Command, Reply};
//!
//! // Encode a command
//! let body = encode_command(&Command::Echo(Bytes::from_static(b"hi"))).unwrap();
//! let frame = encode_frame(&body).unwrap();
//! assert_eq!(&frame[..], &[3, 0x02, b'h', b'i']);
//!
//! // Validate and decode the reply body
//! let reply = check_reply(3, Bytes::from_static(&[0x06, b'h', b'i']), false).unwrap();
//! let decoded = decode_reply(Command::Echo(Bytes::new()).opcode(), reply).unwrap();
//! assert_eq!(decoded, Reply::Echo(Bytes::from_static(b"hi")));
//! ```
//!
//! # Code Tables
//!
//! Symbolic codes used by the head unit decoder live in [`codes`]; each
//! table maps both ways at compile time.
//!
//! ```rust
//! use vwradio_protocol::codes::{OperationMode, TunerBand};
//!
//! assert_eq!(OperationMode::lookup_name(20), Some("TUNER_PLAYING"));
//! assert_eq!(TunerBand::from_code(3), Some(TunerBand::Am));
//! ```

pub mod codec;
pub mod codes;
pub mod dump;
pub mod error;
pub mod types;
pub mod upd;

pub use codec::{
    check_reply, decode_reply, encode_body, encode_command, encode_frame, Reply, HEADER_SIZE,
};
pub use codes::{DisplayMode, Key, OperationMode, Pictograph, TunerBand};
pub use dump::{decode_radio_state, decode_upd_state, RadioState, UpdState, DISPLAY_TEXT_SIZE};
pub use error::ProtocolError;
pub use types::{
    Command, Led, Opcode, RamArea, RunMode, Status, ACK, CHARGEN_CHAR_SIZE, CHARGEN_RAM_SIZE,
    DISPLAY_DATA_RAM_SIZE, MAX_BODY_SIZE, MAX_SPI_SIZE, NAK, PICTOGRAPH_RAM_SIZE,
    RADIO_STATE_SIZE, STATUS_REPLY_SIZE, UPD_STATE_SIZE,
};
