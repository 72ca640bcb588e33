//! Command, status and register definitions for the rig protocol.

use std::fmt;

use bytes::Bytes;

use crate::codes::code_table;

/// Positive acknowledgement status byte.
pub const ACK: u8 = 0x06;

/// Negative acknowledgement status byte.
pub const NAK: u8 = 0x15;

/// Largest frame body a single length byte can describe.
pub const MAX_BODY_SIZE: usize = u8::MAX as usize;

/// Largest SPI transfer the emulators accept. Enforced by the device only;
/// the host forwards longer payloads untouched so the NAK stays observable.
pub const MAX_SPI_SIZE: usize = 32;

/// Reply length of an acknowledgement without data.
pub const STATUS_REPLY_SIZE: usize = 1;

/// Reply length of a uPD16432B state dump, status byte included.
pub const UPD_STATE_SIZE: usize = 153;

/// Reply length of a head unit state dump, status byte included.
pub const RADIO_STATE_SIZE: usize = 31;

/// Reply status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Status {
    Ack = ACK,
    Nak = NAK,
}

impl TryFrom<u8> for Status {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            ACK => Ok(Status::Ack),
            NAK => Ok(Status::Nak),
            other => Err(other),
        }
    }
}

impl From<Status> for u8 {
    fn from(value: Status) -> Self {
        value as u8
    }
}

/// Command opcodes understood by the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    // Rig housekeeping (0x0x)
    SetLed = 0x01,
    Echo = 0x02,
    SetRunMode = 0x03,

    // Emulated uPD16432B (0x1x)
    EmuUpdDumpState = 0x10,
    EmuUpdSendCommand = 0x11,
    EmuUpdReset = 0x12,

    // Head unit state decoder (0x2x)
    RadioLoadKeyData = 0x20,
    RadioStateProcess = 0x21,
    RadioStateDump = 0x22,
    RadioStateReset = 0x23,

    // Real faceplate uPD16432B (0x3x)
    FaceplateUpdDumpState = 0x30,
    FaceplateUpdSendCommand = 0x31,
    FaceplateClearDisplay = 0x32,
}

impl Opcode {
    /// Every opcode, in wire order.
    pub const ALL: [Opcode; 13] = [
        Opcode::SetLed,
        Opcode::Echo,
        Opcode::SetRunMode,
        Opcode::EmuUpdDumpState,
        Opcode::EmuUpdSendCommand,
        Opcode::EmuUpdReset,
        Opcode::RadioLoadKeyData,
        Opcode::RadioStateProcess,
        Opcode::RadioStateDump,
        Opcode::RadioStateReset,
        Opcode::FaceplateUpdDumpState,
        Opcode::FaceplateUpdSendCommand,
        Opcode::FaceplateClearDisplay,
    ];

    /// Documented reply length for a successful command, status byte
    /// included. `None` for echo, whose reply mirrors the request.
    pub fn reply_len(self) -> Option<usize> {
        match self {
            Opcode::Echo => None,
            Opcode::EmuUpdDumpState | Opcode::FaceplateUpdDumpState => Some(UPD_STATE_SIZE),
            Opcode::RadioStateDump => Some(RADIO_STATE_SIZE),
            _ => Some(STATUS_REPLY_SIZE),
        }
    }

    /// Firmware name of the opcode.
    pub fn name(self) -> &'static str {
        match self {
            Opcode::SetLed => "SET_LED",
            Opcode::Echo => "ECHO",
            Opcode::SetRunMode => "SET_RUN_MODE",
            Opcode::EmuUpdDumpState => "EMULATED_UPD_DUMP_STATE",
            Opcode::EmuUpdSendCommand => "EMULATED_UPD_SEND_COMMAND",
            Opcode::EmuUpdReset => "EMULATED_UPD_RESET",
            Opcode::RadioLoadKeyData => "RADIO_LOAD_KEY_DATA",
            Opcode::RadioStateProcess => "RADIO_STATE_PROCESS",
            Opcode::RadioStateDump => "RADIO_STATE_DUMP",
            Opcode::RadioStateReset => "RADIO_STATE_RESET",
            Opcode::FaceplateUpdDumpState => "FACEPLATE_UPD_DUMP_STATE",
            Opcode::FaceplateUpdSendCommand => "FACEPLATE_UPD_SEND_COMMAND",
            Opcode::FaceplateClearDisplay => "FACEPLATE_CLEAR_DISPLAY",
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Opcode::SetLed),
            0x02 => Ok(Opcode::Echo),
            0x03 => Ok(Opcode::SetRunMode),
            0x10 => Ok(Opcode::EmuUpdDumpState),
            0x11 => Ok(Opcode::EmuUpdSendCommand),
            0x12 => Ok(Opcode::EmuUpdReset),
            0x20 => Ok(Opcode::RadioLoadKeyData),
            0x21 => Ok(Opcode::RadioStateProcess),
            0x22 => Ok(Opcode::RadioStateDump),
            0x23 => Ok(Opcode::RadioStateReset),
            0x30 => Ok(Opcode::FaceplateUpdDumpState),
            0x31 => Ok(Opcode::FaceplateUpdSendCommand),
            0x32 => Ok(Opcode::FaceplateClearDisplay),
            other => Err(other),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(value: Opcode) -> Self {
        value as u8
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), *self as u8)
    }
}

code_table! {
    /// Status LEDs on the rig.
    pub enum Led {
        Green = 0 => "GREEN",
        Red = 1 => "RED",
    }
}

code_table! {
    /// Rig run mode. Test mode suspends the normal radio/faceplate bridge.
    pub enum RunMode {
        Normal = 0 => "NORMAL",
        Test = 1 => "TEST",
    }
}

code_table! {
    /// uPD16432B RAM area selected by the last data setting command.
    pub enum RamArea {
        DisplayData = 0 => "DISPLAY_DATA",
        Pictograph = 1 => "PICTOGRAPH",
        Chargen = 2 => "CHARGEN",
        None = 0xFF => "NONE",
    }
}

/// Size of the display data RAM bank.
pub const DISPLAY_DATA_RAM_SIZE: usize = 25;

/// Size of the pictograph RAM bank.
pub const PICTOGRAPH_RAM_SIZE: usize = 8;

/// Size of the character generator RAM bank (16 characters of 7 bytes).
pub const CHARGEN_RAM_SIZE: usize = 112;

/// Bytes per character generator glyph.
pub const CHARGEN_CHAR_SIZE: usize = 7;

impl RamArea {
    /// Bank size the device reports as `ram_size` for this area.
    pub fn size(self) -> usize {
        match self {
            RamArea::DisplayData => DISPLAY_DATA_RAM_SIZE,
            RamArea::Pictograph => PICTOGRAPH_RAM_SIZE,
            RamArea::Chargen => CHARGEN_RAM_SIZE,
            RamArea::None => 0,
        }
    }
}

/// A request to the rig, one variant per opcode.
///
/// Payload-carrying variants are forwarded byte for byte; nothing here
/// checks their length against device limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetLed { led: Led, on: bool },
    Echo(Bytes),
    SetRunMode(RunMode),
    EmuUpdDumpState,
    EmuUpdSendCommand(Bytes),
    EmuUpdReset,
    RadioLoadKeyData(Bytes),
    RadioStateProcess(Bytes),
    RadioStateDump,
    RadioStateReset,
    FaceplateUpdDumpState,
    FaceplateUpdSendCommand(Bytes),
    FaceplateClearDisplay,
}

impl Command {
    /// Get the opcode for this command.
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::SetLed { .. } => Opcode::SetLed,
            Command::Echo(_) => Opcode::Echo,
            Command::SetRunMode(_) => Opcode::SetRunMode,
            Command::EmuUpdDumpState => Opcode::EmuUpdDumpState,
            Command::EmuUpdSendCommand(_) => Opcode::EmuUpdSendCommand,
            Command::EmuUpdReset => Opcode::EmuUpdReset,
            Command::RadioLoadKeyData(_) => Opcode::RadioLoadKeyData,
            Command::RadioStateProcess(_) => Opcode::RadioStateProcess,
            Command::RadioStateDump => Opcode::RadioStateDump,
            Command::RadioStateReset => Opcode::RadioStateReset,
            Command::FaceplateUpdDumpState => Opcode::FaceplateUpdDumpState,
            Command::FaceplateUpdSendCommand(_) => Opcode::FaceplateUpdSendCommand,
            Command::FaceplateClearDisplay => Opcode::FaceplateClearDisplay,
        }
    }
}
