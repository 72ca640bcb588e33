//! Decoders for the two fixed-layout state dumps.
//!
//! uPD16432B dump (153 bytes, offset 0 is the status byte):
//! ```text
//! 1 ram_area | 2 ram_size | 3 address | 4 increment
//! 5..=29   display data RAM (25)  | 30  dirty
//! 31..=38  pictograph RAM (8)     | 39  dirty
//! 40..=151 chargen RAM (112)      | 152 dirty
//! ```
//!
//! Head unit dump (31 bytes):
//! ```text
//! 1 operation_mode | 2 display_mode | 3 safe_tries | 4-5 safe_code (LE)
//! 6 bass | 7 treble | 8 midrange | 9 balance | 10 fade   (all i8)
//! 11 tape_side | 12 cd_disc | 13 cd_track | 14-15 cd_cue_pos (LE)
//! 16-17 tuner_freq (LE) | 18 tuner_preset | 19 tuner_band
//! 20..=30 display (11 bytes of VFD text)
//! ```

use bytes::Buf;
use serde::{Deserialize, Serialize};

use crate::codes::{DisplayMode, OperationMode, TunerBand};
use crate::error::ProtocolError;
use crate::types::{
    RamArea, CHARGEN_RAM_SIZE, DISPLAY_DATA_RAM_SIZE, PICTOGRAPH_RAM_SIZE, RADIO_STATE_SIZE,
    UPD_STATE_SIZE,
};

/// Length of the VFD text carried in the head unit dump.
pub const DISPLAY_TEXT_SIZE: usize = 11;

/// Snapshot of a uPD16432B RAM emulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdState {
    pub ram_area: RamArea,
    pub ram_size: u8,
    /// Current write cursor within the selected bank.
    pub address: u8,
    /// Auto-advance the cursor after each data byte.
    pub increment: bool,
    pub display_data_ram: [u8; DISPLAY_DATA_RAM_SIZE],
    pub display_data_ram_dirty: bool,
    pub pictograph_ram: [u8; PICTOGRAPH_RAM_SIZE],
    pub pictograph_ram_dirty: bool,
    pub chargen_ram: [u8; CHARGEN_RAM_SIZE],
    pub chargen_ram_dirty: bool,
}

impl UpdState {
    /// Bank contents for `area`; empty for [`RamArea::None`].
    pub fn ram(&self, area: RamArea) -> &[u8] {
        match area {
            RamArea::DisplayData => &self.display_data_ram,
            RamArea::Pictograph => &self.pictograph_ram,
            RamArea::Chargen => &self.chargen_ram,
            RamArea::None => &[],
        }
    }

    /// Dirty flag for `area`; always false for [`RamArea::None`].
    pub fn is_dirty(&self, area: RamArea) -> bool {
        match area {
            RamArea::DisplayData => self.display_data_ram_dirty,
            RamArea::Pictograph => self.pictograph_ram_dirty,
            RamArea::Chargen => self.chargen_ram_dirty,
            RamArea::None => false,
        }
    }
}

/// Snapshot of the head unit state decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioState {
    pub operation_mode: OperationMode,
    pub display_mode: DisplayMode,
    pub safe_tries: u8,
    pub safe_code: u16,
    pub sound_bass: i8,
    pub sound_treble: i8,
    pub sound_midrange: i8,
    pub sound_balance: i8,
    pub sound_fade: i8,
    /// 0 = none, 1 = side A, 2 = side B.
    pub tape_side: u8,
    pub cd_disc: u8,
    pub cd_track: u8,
    pub cd_cue_pos: u16,
    /// Device-native units (AM in tenths of kHz).
    pub tuner_freq: u16,
    pub tuner_preset: u8,
    pub tuner_band: TunerBand,
    /// Verbatim VFD text the decoder consumed.
    pub display: [u8; DISPLAY_TEXT_SIZE],
}

impl RadioState {
    /// VFD text as a string, replacing bytes outside ASCII.
    pub fn display_text(&self) -> String {
        self.display
            .iter()
            .map(|&b| if b.is_ascii() && !b.is_ascii_control() { b as char } else { '\u{FFFD}' })
            .collect()
    }
}

fn check_len(layout: &'static str, raw: &[u8], expected: usize) -> Result<(), ProtocolError> {
    if raw.len() != expected {
        return Err(ProtocolError::DecodeError {
            layout,
            expected,
            actual: raw.len(),
        });
    }
    Ok(())
}

/// Decode a uPD16432B state dump. `raw` is the full reply body including the
/// status byte.
pub fn decode_upd_state(raw: &[u8]) -> Result<UpdState, ProtocolError> {
    check_len("uPD16432B state", raw, UPD_STATE_SIZE)?;

    let mut buf = &raw[1..];
    let ram_area = RamArea::from_code(buf.get_u8()).unwrap_or(RamArea::None);
    let ram_size = buf.get_u8();
    let address = buf.get_u8();
    let increment = buf.get_u8() != 0;

    let mut display_data_ram = [0u8; DISPLAY_DATA_RAM_SIZE];
    buf.copy_to_slice(&mut display_data_ram);
    let display_data_ram_dirty = buf.get_u8() != 0;

    let mut pictograph_ram = [0u8; PICTOGRAPH_RAM_SIZE];
    buf.copy_to_slice(&mut pictograph_ram);
    let pictograph_ram_dirty = buf.get_u8() != 0;

    let mut chargen_ram = [0u8; CHARGEN_RAM_SIZE];
    buf.copy_to_slice(&mut chargen_ram);
    let chargen_ram_dirty = buf.get_u8() != 0;

    Ok(UpdState {
        ram_area,
        ram_size,
        address,
        increment,
        display_data_ram,
        display_data_ram_dirty,
        pictograph_ram,
        pictograph_ram_dirty,
        chargen_ram,
        chargen_ram_dirty,
    })
}

/// Decode a head unit state dump. `raw` is the full reply body including
/// the status byte.
pub fn decode_radio_state(raw: &[u8]) -> Result<RadioState, ProtocolError> {
    check_len("radio state", raw, RADIO_STATE_SIZE)?;

    let mut buf = &raw[1..];
    let operation_mode = OperationMode::from_code(buf.get_u8()).unwrap_or(OperationMode::Unknown);
    let display_mode = DisplayMode::from_code(buf.get_u8()).unwrap_or(DisplayMode::Unknown);
    let safe_tries = buf.get_u8();
    let safe_code = buf.get_u16_le();
    let sound_bass = buf.get_i8();
    let sound_treble = buf.get_i8();
    let sound_midrange = buf.get_i8();
    let sound_balance = buf.get_i8();
    let sound_fade = buf.get_i8();
    let tape_side = buf.get_u8();
    let cd_disc = buf.get_u8();
    let cd_track = buf.get_u8();
    let cd_cue_pos = buf.get_u16_le();
    let tuner_freq = buf.get_u16_le();
    let tuner_preset = buf.get_u8();
    let tuner_band = TunerBand::from_code(buf.get_u8()).unwrap_or(TunerBand::Unknown);
    let mut display = [0u8; DISPLAY_TEXT_SIZE];
    buf.copy_to_slice(&mut display);

    Ok(RadioState {
        operation_mode,
        display_mode,
        safe_tries,
        safe_code,
        sound_bass,
        sound_treble,
        sound_midrange,
        sound_balance,
        sound_fade,
        tape_side,
        cd_disc,
        cd_track,
        cd_cue_pos,
        tuner_freq,
        tuner_preset,
        tuner_band,
        display,
    })
}
