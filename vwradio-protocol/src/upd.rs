//! uPD16432B command bytes.
//!
//! These are the first byte of an SPI transfer forwarded with
//! `EMU_UPD_SEND_COMMAND` or `FACEPLATE_UPD_SEND_COMMAND`; any bytes after it
//! in the same transfer are data written at the current address.

use crate::types::RamArea;

/// Data setting command: selects the RAM area and increment mode.
pub const DATA_SETTING: u8 = 0b0100_0000;

/// Address setting command: low five bits are the address.
pub const ADDRESS_SETTING: u8 = 0b1000_0000;

/// Set in a data setting command to hold the address after each write.
pub const INCREMENT_OFF: u8 = 0b0000_1000;

/// RAM select bits of a data setting command.
pub const RAM_SELECT_MASK: u8 = 0b0000_0111;

/// Address bits of an address setting command.
pub const ADDRESS_MASK: u8 = 0b0001_1111;

/// Build a data setting command from raw RAM select bits.
pub fn data_setting_bits(ram_select: u8, increment: bool) -> u8 {
    let mut cmd = DATA_SETTING | (ram_select & RAM_SELECT_MASK);
    if !increment {
        cmd |= INCREMENT_OFF;
    }
    cmd
}

/// Build a data setting command for `area`. [`RamArea::None`] encodes as
/// the unassigned select value `0b111`.
pub fn data_setting(area: RamArea, increment: bool) -> u8 {
    let select = match area {
        RamArea::None => RAM_SELECT_MASK,
        other => other.code(),
    };
    data_setting_bits(select, increment)
}

/// Build an address setting command. Chargen addresses are glyph indexes.
pub fn address_setting(address: u8) -> u8 {
    ADDRESS_SETTING | (address & ADDRESS_MASK)
}
