//! In-memory stand-in for the rig firmware, used to exercise the client end
//! to end without hardware.

use std::collections::VecDeque;
use std::io;

use vwradio_protocol::upd::{ADDRESS_MASK, ADDRESS_SETTING, DATA_SETTING, INCREMENT_OFF, RAM_SELECT_MASK};
use vwradio_protocol::{
    Led, Opcode, RamArea, RunMode, ACK, CHARGEN_CHAR_SIZE, CHARGEN_RAM_SIZE,
    DISPLAY_DATA_RAM_SIZE, DISPLAY_TEXT_SIZE, MAX_SPI_SIZE, NAK, PICTOGRAPH_RAM_SIZE,
    RADIO_STATE_SIZE,
};

use super::transport::Transport;

const COMMAND_MASK: u8 = 0b1100_0000;
const RADIO_DISPLAY_OFFSET: usize = RADIO_STATE_SIZE - 1 - DISPLAY_TEXT_SIZE;

/// uPD16432B RAM emulator.
#[derive(Debug, Clone)]
pub(crate) struct UpdEmulator {
    area: RamArea,
    address: u8,
    increment: bool,
    display_data_ram: [u8; DISPLAY_DATA_RAM_SIZE],
    display_data_ram_dirty: bool,
    pictograph_ram: [u8; PICTOGRAPH_RAM_SIZE],
    pictograph_ram_dirty: bool,
    chargen_ram: [u8; CHARGEN_RAM_SIZE],
    chargen_ram_dirty: bool,
}

impl UpdEmulator {
    pub fn new() -> Self {
        Self {
            area: RamArea::None,
            address: 0,
            increment: false,
            display_data_ram: [0; DISPLAY_DATA_RAM_SIZE],
            display_data_ram_dirty: false,
            pictograph_ram: [0; PICTOGRAPH_RAM_SIZE],
            pictograph_ram_dirty: false,
            chargen_ram: [0; CHARGEN_RAM_SIZE],
            chargen_ram_dirty: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Handle one SPI transfer: a command byte followed by data bytes.
    pub fn process(&mut self, spi: &[u8]) {
        let Some((&cmd, data)) = spi.split_first() else {
            return;
        };
        match cmd & COMMAND_MASK {
            DATA_SETTING => self.data_setting(cmd),
            ADDRESS_SETTING => self.address_setting(cmd),
            // Display setting and status commands carry no RAM data.
            _ => return,
        }
        for &byte in data {
            self.write(byte);
        }
    }

    fn data_setting(&mut self, cmd: u8) {
        self.area = RamArea::from_code(cmd & RAM_SELECT_MASK).unwrap_or(RamArea::None);
        self.increment = match self.area {
            RamArea::Chargen | RamArea::None => true,
            _ => cmd & INCREMENT_OFF == 0,
        };
        self.address = 0;
    }

    fn address_setting(&mut self, cmd: u8) {
        let addr = cmd & ADDRESS_MASK;
        self.address = match self.area {
            RamArea::DisplayData if (addr as usize) < DISPLAY_DATA_RAM_SIZE => addr,
            RamArea::Pictograph if (addr as usize) < PICTOGRAPH_RAM_SIZE => addr,
            RamArea::Chargen if (addr as usize) < CHARGEN_RAM_SIZE / CHARGEN_CHAR_SIZE => {
                addr * CHARGEN_CHAR_SIZE as u8
            }
            _ => 0,
        };
    }

    fn write(&mut self, byte: u8) {
        let (ram, dirty) = match self.area {
            RamArea::DisplayData => (&mut self.display_data_ram[..], &mut self.display_data_ram_dirty),
            RamArea::Pictograph => (&mut self.pictograph_ram[..], &mut self.pictograph_ram_dirty),
            RamArea::Chargen => (&mut self.chargen_ram[..], &mut self.chargen_ram_dirty),
            RamArea::None => return,
        };
        let addr = self.address as usize;
        if ram[addr] != byte {
            ram[addr] = byte;
            *dirty = true;
        }
        if self.increment {
            self.address = ((addr + 1) % ram.len()) as u8;
        }
    }

    /// Blank the display data RAM.
    pub fn clear_display(&mut self) {
        if self.display_data_ram.iter().any(|&b| b != 0) {
            self.display_data_ram = [0; DISPLAY_DATA_RAM_SIZE];
            self.display_data_ram_dirty = true;
        }
    }

    /// Serialized state without the status byte.
    pub fn dump(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(152);
        out.push(self.area.code());
        out.push(self.area.size() as u8);
        out.push(self.address);
        out.push(u8::from(self.increment));
        out.extend_from_slice(&self.display_data_ram);
        out.push(u8::from(self.display_data_ram_dirty));
        out.extend_from_slice(&self.pictograph_ram);
        out.push(u8::from(self.pictograph_ram_dirty));
        out.extend_from_slice(&self.chargen_ram);
        out.push(u8::from(self.chargen_ram_dirty));
        out
    }
}

/// Fake rig speaking the framed protocol.
///
/// Host frames are parsed as soon as they are complete; each produces
/// exactly one reply frame in the outbox. Reading with an empty outbox
/// times out.
#[derive(Debug)]
pub(crate) struct FakeRig {
    inbox: Vec<u8>,
    outbox: VecDeque<u8>,
    pub emulated: UpdEmulator,
    pub faceplate: UpdEmulator,
    pub leds: [bool; 2],
    pub run_mode: RunMode,
    pub key_data: Vec<u8>,
    /// Head unit state as dumped, without the status byte.
    pub radio: [u8; RADIO_STATE_SIZE - 1],
}

impl FakeRig {
    pub fn new() -> Self {
        Self {
            inbox: Vec::new(),
            outbox: VecDeque::new(),
            emulated: UpdEmulator::new(),
            faceplate: UpdEmulator::new(),
            leds: [false; 2],
            run_mode: RunMode::Normal,
            key_data: Vec::new(),
            radio: [0; RADIO_STATE_SIZE - 1],
        }
    }

    fn dispatch(&mut self, body: &[u8]) -> Vec<u8> {
        let Some((&op, args)) = body.split_first() else {
            return vec![NAK];
        };
        let Ok(op) = Opcode::try_from(op) else {
            return vec![NAK];
        };

        match (op, args) {
            (Opcode::SetLed, &[led, state]) => match Led::from_code(led) {
                Some(led) => {
                    self.leds[led.code() as usize] = state != 0;
                    vec![ACK]
                }
                None => vec![NAK],
            },
            (Opcode::Echo, _) => with_ack(args),
            (Opcode::SetRunMode, &[mode]) => match RunMode::from_code(mode) {
                Some(mode) => {
                    self.run_mode = mode;
                    vec![ACK]
                }
                None => vec![NAK],
            },
            (Opcode::EmuUpdDumpState, []) => with_ack(&self.emulated.dump()),
            (Opcode::EmuUpdSendCommand, _) if args.len() <= MAX_SPI_SIZE => {
                self.emulated.process(args);
                vec![ACK]
            }
            (Opcode::EmuUpdReset, []) => {
                self.emulated.reset();
                vec![ACK]
            }
            (Opcode::RadioLoadKeyData, _) => {
                self.key_data = args.to_vec();
                vec![ACK]
            }
            (Opcode::RadioStateProcess, _) if args.len() == DISPLAY_TEXT_SIZE => {
                self.radio[RADIO_DISPLAY_OFFSET..].copy_from_slice(args);
                vec![ACK]
            }
            (Opcode::RadioStateDump, []) => with_ack(&self.radio),
            (Opcode::RadioStateReset, []) => {
                self.radio = [0; RADIO_STATE_SIZE - 1];
                vec![ACK]
            }
            (Opcode::FaceplateUpdDumpState, []) => with_ack(&self.faceplate.dump()),
            (Opcode::FaceplateUpdSendCommand, _) if args.len() <= MAX_SPI_SIZE => {
                self.faceplate.process(args);
                vec![ACK]
            }
            (Opcode::FaceplateClearDisplay, []) => {
                self.faceplate.clear_display();
                vec![ACK]
            }
            _ => vec![NAK],
        }
    }
}

fn with_ack(data: &[u8]) -> Vec<u8> {
    let mut reply = Vec::with_capacity(1 + data.len());
    reply.push(ACK);
    reply.extend_from_slice(data);
    reply
}

impl Transport for FakeRig {
    fn write_all_flush(&mut self, data: &[u8]) -> io::Result<()> {
        self.inbox.extend_from_slice(data);
        while let Some(&len) = self.inbox.first() {
            let end = 1 + len as usize;
            if self.inbox.len() < end {
                break;
            }
            let body: Vec<u8> = self.inbox.drain(..end).skip(1).collect();
            let reply = self.dispatch(&body);
            self.outbox.push_back(reply.len() as u8);
            self.outbox.extend(reply);
        }
        Ok(())
    }

    fn read_some(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.outbox.is_empty() {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "Operation timed out"));
        }
        let n = buf.len().min(self.outbox.len());
        for (dst, src) in buf.iter_mut().zip(self.outbox.drain(..n)) {
            *dst = src;
        }
        Ok(n)
    }

    fn bytes_waiting(&mut self) -> io::Result<usize> {
        Ok(self.outbox.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::connection::Connection;
    use crate::error::ClientError;
    use vwradio_protocol::upd::{address_setting, data_setting, data_setting_bits};
    use vwradio_protocol::{
        encode_frame, DisplayMode, OperationMode, ProtocolError, TunerBand, UpdState,
    };

    fn rig() -> Connection<FakeRig> {
        Connection::new(FakeRig::new())
    }

    fn spi(conn: &mut Connection<FakeRig>, bytes: &[u8]) {
        conn.emulated_upd_send_command(bytes).unwrap();
    }

    fn dump(conn: &mut Connection<FakeRig>) -> UpdState {
        conn.emulated_upd_dump_state().unwrap()
    }

    #[test]
    fn test_echo_returns_payload_for_every_length() {
        let mut conn = rig();
        for len in 0..=254usize {
            let data: Vec<u8> = (0..len).map(|i| (i * 7) as u8).collect();
            assert_eq!(&conn.echo(&data).unwrap()[..], &data[..], "length {}", len);
        }
    }

    #[test]
    fn test_zero_length_and_unknown_commands_nak() {
        let mut conn = rig();
        assert_eq!(&conn.command_raw(&[], true).unwrap()[..], &[NAK]);
        assert_eq!(&conn.command_raw(&[0xFF], true).unwrap()[..], &[NAK]);
        assert!(conn.command_raw(&[0x04], false).unwrap_err().is_nak());
    }

    #[test]
    fn test_set_led() {
        let mut conn = rig();
        conn.set_led(Led::Red, true).unwrap();
        conn.set_led(Led::Green, true).unwrap();
        conn.set_led(Led::Green, false).unwrap();
        assert_eq!(conn.transport_mut().leds, [false, true]);

        for args in [&[][..], &[1][..], &[1, 1, 1][..]] {
            assert_eq!(&conn.command(Opcode::SetLed, args, true).unwrap()[..], &[NAK]);
        }
        assert_eq!(&conn.command(Opcode::SetLed, &[2, 1], true).unwrap()[..], &[NAK]);
    }

    #[test]
    fn test_set_run_mode() {
        let mut conn = rig();
        conn.set_run_mode(RunMode::Test).unwrap();
        assert_eq!(conn.transport_mut().run_mode, RunMode::Test);

        assert_eq!(&conn.command(Opcode::SetRunMode, &[], true).unwrap()[..], &[NAK]);
        assert_eq!(&conn.command(Opcode::SetRunMode, &[0, 0], true).unwrap()[..], &[NAK]);
        assert_eq!(&conn.command(Opcode::SetRunMode, &[2], true).unwrap()[..], &[NAK]);
    }

    #[test]
    fn test_reset_and_dump_take_no_args() {
        let mut conn = rig();
        for op in [Opcode::EmuUpdReset, Opcode::EmuUpdDumpState, Opcode::FaceplateClearDisplay] {
            assert_eq!(&conn.command(op, &[1], true).unwrap()[..], &[NAK], "{}", op);
        }
    }

    #[test]
    fn test_upd_reset_state() {
        let mut conn = rig();
        spi(&mut conn, &[data_setting(RamArea::Pictograph, true)]);
        spi(&mut conn, &[address_setting(0), 0xAA, 0xBB]);
        conn.emulated_upd_reset().unwrap();

        let state = dump(&mut conn);
        assert_eq!(state.ram_area, RamArea::None);
        assert_eq!(state.ram_size, 0);
        assert_eq!(state.address, 0);
        assert!(!state.increment);
        assert_eq!(state.display_data_ram, [0; 25]);
        assert_eq!(state.pictograph_ram, [0; 8]);
        assert_eq!(state.chargen_ram, [0; 112]);
        assert!(!state.display_data_ram_dirty);
        assert!(!state.pictograph_ram_dirty);
        assert!(!state.chargen_ram_dirty);
    }

    #[test]
    fn test_upd_data_setting() {
        let cases = [
            (RamArea::DisplayData, false, 25, false),
            (RamArea::DisplayData, true, 25, true),
            (RamArea::Pictograph, false, 8, false),
            (RamArea::Chargen, true, 112, true),
            (RamArea::Chargen, false, 112, true),
        ];
        let mut conn = rig();
        for (area, increment, size, expected_increment) in cases {
            conn.emulated_upd_reset().unwrap();
            spi(&mut conn, &[data_setting(area, increment)]);
            let state = dump(&mut conn);
            assert_eq!(state.ram_area, area);
            assert_eq!(state.ram_size, size);
            assert_eq!(state.increment, expected_increment, "{}", area);
        }
    }

    #[test]
    fn test_upd_unrecognized_ram_area() {
        let mut conn = rig();
        for select in 3..=7 {
            for increment in [true, false] {
                conn.emulated_upd_reset().unwrap();
                spi(&mut conn, &[data_setting_bits(select, increment)]);
                let state = dump(&mut conn);
                assert_eq!(state.ram_area, RamArea::None);
                assert_eq!(state.ram_size, 0);
                assert_eq!(state.address, 0);
                assert!(state.increment);
            }
        }
    }

    #[test]
    fn test_upd_address_setting_without_area() {
        let mut conn = rig();
        spi(&mut conn, &[address_setting(3)]);
        assert_eq!(dump(&mut conn).address, 0);
    }

    #[test]
    fn test_upd_address_setting_per_area() {
        let cases = [
            (RamArea::DisplayData, 0, 0),
            (RamArea::DisplayData, 0x18, 0x18),
            (RamArea::DisplayData, 0x19, 0),
            (RamArea::Pictograph, 0, 0),
            (RamArea::Pictograph, 0x07, 0x07),
            (RamArea::Pictograph, 0x08, 0),
            (RamArea::Chargen, 0, 0),
            (RamArea::Chargen, 0x0F, 0x69),
            (RamArea::Chargen, 0x10, 0),
        ];
        let mut conn = rig();
        for (area, address, expected) in cases {
            conn.emulated_upd_reset().unwrap();
            spi(&mut conn, &[data_setting(area, true)]);
            assert_eq!(dump(&mut conn).ram_area, area);
            spi(&mut conn, &[address_setting(address)]);
            assert_eq!(dump(&mut conn).address, expected, "{} at {:#04x}", area, address);
        }
    }

    #[test]
    fn test_upd_no_area_ignores_data() {
        let mut conn = rig();
        conn.emulated_upd_reset().unwrap();
        let before = dump(&mut conn);
        let mut transfer = vec![address_setting(0)];
        transfer.extend(1..8);
        spi(&mut conn, &transfer);
        assert_eq!(dump(&mut conn), before);
    }

    #[test]
    fn test_upd_display_data_wraps_around() {
        let mut conn = rig();
        conn.emulated_upd_reset().unwrap();
        spi(&mut conn, &[data_setting(RamArea::DisplayData, true)]);
        let data: Vec<u8> = (1..=25).collect();
        let mut transfer = vec![address_setting(0)];
        transfer.extend_from_slice(&data);
        spi(&mut conn, &transfer);

        let state = dump(&mut conn);
        assert_eq!(state.ram_area, RamArea::DisplayData);
        assert!(state.increment);
        assert_eq!(state.address, 0);
        assert_eq!(state.display_data_ram.to_vec(), data);
        assert!(state.display_data_ram_dirty);
    }

    #[test]
    fn test_upd_pictograph_wraps_around() {
        let mut conn = rig();
        spi(&mut conn, &[data_setting(RamArea::Pictograph, true)]);
        let mut transfer = vec![address_setting(0)];
        transfer.extend(1..=8);
        spi(&mut conn, &transfer);
        let state = dump(&mut conn);
        assert_eq!(state.address, 0);
        assert_eq!(state.pictograph_ram, [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_upd_increment_off_rewrites_one_address() {
        let mut conn = rig();
        spi(&mut conn, &[data_setting(RamArea::DisplayData, false)]);
        spi(&mut conn, &[address_setting(5), 1, 2, 3, 4, 5, 6, 7]);
        let state = dump(&mut conn);
        assert!(!state.increment);
        assert_eq!(state.address, 5);
        assert_eq!(state.display_data_ram[5], 7);
        assert_eq!(state.display_data_ram.iter().filter(|&&b| b != 0).count(), 1);
    }

    #[test]
    fn test_upd_chargen_always_increments() {
        let mut conn = rig();
        spi(&mut conn, &[data_setting(RamArea::Chargen, false)]);
        spi(&mut conn, &[address_setting(1), 0x11, 0x22, 0x33]);
        let state = dump(&mut conn);
        assert_eq!(&state.chargen_ram[7..10], &[0x11, 0x22, 0x33]);
        assert_eq!(state.address, 10);
    }

    #[test]
    fn test_upd_dirty_flags() {
        for area in [RamArea::DisplayData, RamArea::Pictograph, RamArea::Chargen] {
            let mut conn = rig();
            spi(&mut conn, &[data_setting(area, false)]);
            spi(&mut conn, &[address_setting(0), 0]);
            assert!(!dump(&mut conn).is_dirty(area), "{} same value", area);

            spi(&mut conn, &[address_setting(0), 1]);
            let state = dump(&mut conn);
            assert_eq!(state.ram(area)[0], 1);
            assert!(state.is_dirty(area), "{} new value", area);

            // Writing the old value back keeps the flag set.
            spi(&mut conn, &[address_setting(0), 1]);
            assert!(dump(&mut conn).is_dirty(area));

            conn.emulated_upd_reset().unwrap();
            let state = dump(&mut conn);
            assert!(!state.is_dirty(area));
            assert_eq!(state.ram(area)[0], 0);
        }
    }

    #[test]
    fn test_upd_spi_size_limit() {
        let mut conn = rig();
        assert_eq!(&conn.command(Opcode::EmuUpdSendCommand, &[], true).unwrap()[..], &[ACK]);
        assert_eq!(&conn.command(Opcode::EmuUpdSendCommand, &[0; 32], true).unwrap()[..], &[ACK]);
        assert_eq!(&conn.command(Opcode::EmuUpdSendCommand, &[0; 33], true).unwrap()[..], &[NAK]);
        assert!(conn.emulated_upd_send_command(&[0; 33]).unwrap_err().is_nak());

        let mut transfer = vec![address_setting(0)];
        transfer.extend([0; 31]);
        conn.faceplate_upd_send_command(&transfer).unwrap();
        assert!(conn.faceplate_upd_send_command(&[0; 33]).unwrap_err().is_nak());
    }

    #[test]
    fn test_faceplate_is_separate_from_emulator() {
        let mut conn = rig();
        conn.faceplate_upd_send_command(&[data_setting(RamArea::DisplayData, true)]).unwrap();
        conn.faceplate_upd_send_command(&[address_setting(0), 0, 0, 0x6F, 0x6C, 0x6C, 0x65, 0x48])
            .unwrap();

        let faceplate = conn.faceplate_upd_dump_state().unwrap();
        assert_eq!(&faceplate.display_data_ram[..7], &[0, 0, 0x6F, 0x6C, 0x6C, 0x65, 0x48]);
        assert_eq!(dump(&mut conn).display_data_ram, [0; 25]);

        conn.faceplate_clear_display().unwrap();
        assert_eq!(conn.faceplate_upd_dump_state().unwrap().display_data_ram, [0; 25]);
    }

    #[test]
    fn test_radio_state_process_and_reset() {
        let mut conn = rig();
        conn.radio_state_process(b"TAPE PLAY A").unwrap();
        let state = conn.radio_state_dump().unwrap();
        assert_eq!(state.display_text(), "TAPE PLAY A");

        assert!(conn.radio_state_process(b"SHORT").unwrap_err().is_nak());

        conn.radio_state_reset().unwrap();
        let state = conn.radio_state_dump().unwrap();
        assert_eq!(state.display, [0; DISPLAY_TEXT_SIZE]);
        assert_eq!(state.operation_mode, OperationMode::Unknown);
    }

    #[test]
    fn test_radio_state_dump_decodes_fields() {
        let mut conn = rig();
        {
            let radio = &mut conn.transport_mut().radio;
            radio[0] = 20;
            radio[1] = 10;
            radio[5..10].copy_from_slice(&[0xF7, 0x01, 0x00, 0xFF, 0x09]);
            radio[15..17].copy_from_slice(&887u16.to_le_bytes());
            radio[17] = 3;
            radio[18] = 1;
        }
        conn.radio_state_process(b"FM1  887MHZ").unwrap();

        let state = conn.radio_state_dump().unwrap();
        assert_eq!(state.operation_mode, OperationMode::TunerPlaying);
        assert_eq!(state.display_mode, DisplayMode::ShowingOperation);
        assert_eq!(
            [state.sound_bass, state.sound_treble, state.sound_midrange, state.sound_balance, state.sound_fade],
            [-9, 1, 0, -1, 9]
        );
        assert_eq!(state.tuner_freq, 887);
        assert_eq!(state.tuner_preset, 3);
        assert_eq!(state.tuner_band, TunerBand::Fm1);
        assert_eq!(state.display_text(), "FM1  887MHZ");
    }

    #[test]
    fn test_radio_load_key_data() {
        let mut conn = rig();
        conn.radio_load_key_data(&[0, 0, 0, 0x02]).unwrap();
        assert_eq!(conn.transport_mut().key_data, vec![0, 0, 0, 0x02]);
    }

    #[test]
    fn test_pipelined_replies_fail_as_too_long() {
        let mut conn = rig();
        let mut frames = encode_frame(&[Opcode::EmuUpdReset.into()]).unwrap().to_vec();
        frames.extend_from_slice(&encode_frame(&[Opcode::RadioStateReset.into()]).unwrap());
        conn.transport_mut().write_all_flush(&frames).unwrap();

        match conn.receive(false).unwrap_err() {
            ClientError::Protocol(ProtocolError::TooLong { expected, actual, data }) => {
                assert_eq!(expected, 1);
                assert_eq!(actual, 3);
                assert_eq!(data, vec![ACK, 1, ACK]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(matches!(conn.receive(false), Err(ClientError::NoReplyHeader)));
    }
}
