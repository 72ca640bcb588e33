//! Request/response connection to the rig.

use std::io;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use log::{debug, trace, warn};
use serialport::SerialPort;

use vwradio_protocol::{
    check_reply, decode_radio_state, decode_reply, decode_upd_state, encode_body, encode_command,
    encode_frame, Command, Led, Opcode, ProtocolError, RadioState, Reply, RunMode, UpdState,
};

use crate::client::transport::{open_serial, Transport};
use crate::error::ClientError;

/// Default serial speed of the rig firmware.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default inactivity timeout for both the header and the body wait.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Connection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Serial device, e.g. `/dev/ttyUSB0`.
    pub port: String,
    pub baud_rate: u32,
    /// Longest gap tolerated between received bytes.
    pub timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Exclusive owner of a transport to the rig.
///
/// Every call is one complete request/response transaction; nothing is
/// buffered or retried between calls.
pub struct Connection<T: Transport> {
    transport: T,
}

impl Connection<Box<dyn SerialPort>> {
    /// Open the configured serial port.
    pub fn open(config: &ConnectionConfig) -> Result<Self, ClientError> {
        Ok(Self::new(open_serial(config)?))
    }
}

impl<T: Transport> Connection<T> {
    /// Wrap an already opened transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Get a mutable reference to the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Release the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    // =========================================================================
    // Low level
    // =========================================================================

    /// Write one frame carrying `body`.
    pub fn send(&mut self, body: &[u8]) -> Result<(), ClientError> {
        let frame = encode_frame(body)?;
        trace!("tx {:02X?}", &frame[..]);
        self.transport.write_all_flush(&frame)?;
        Ok(())
    }

    /// Read one reply frame and return its body, status byte included.
    ///
    /// Bytes already waiting after the announced body length are drained
    /// into the same reply, which then fails as too long; they are not kept
    /// for the next call.
    pub fn receive(&mut self, ignore_nak: bool) -> Result<Bytes, ClientError> {
        let mut head = [0u8; 1];
        if self.read_within_timeout(&mut head)? == 0 {
            warn!("No reply header byte received");
            return Err(ClientError::NoReplyHeader);
        }
        let expected = head[0] as usize;

        let mut body = BytesMut::with_capacity(expected);
        let mut chunk = [0u8; 256];
        while body.len() < expected {
            let want = expected - body.len();
            let n = self.read_within_timeout(&mut chunk[..want])?;
            if n == 0 {
                warn!("Reply stalled after {} of {} bytes", body.len(), expected);
                return Err(ClientError::IncompleteReply {
                    expected,
                    actual: body.len(),
                    received: body.to_vec(),
                });
            }
            body.extend_from_slice(&chunk[..n]);
        }

        let mut waiting = self.transport.bytes_waiting()?;
        while waiting > 0 {
            let len = waiting.min(chunk.len());
            let n = self.read_within_timeout(&mut chunk[..len])?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n]);
            waiting -= n.min(waiting);
        }

        trace!("rx [{:02X}] {:02X?}", head[0], &body[..]);
        let body = check_reply(expected, body.freeze(), ignore_nak).map_err(|e| {
            if let ProtocolError::Nak(_) = e {
                debug!("{}", e);
            } else {
                warn!("{}", e);
            }
            e
        })?;
        Ok(body)
    }

    /// Send a raw body and read the reply.
    ///
    /// The body is not checked against the opcode table, so empty or unknown
    /// commands reach the device as given.
    pub fn command_raw(&mut self, body: &[u8], ignore_nak: bool) -> Result<Bytes, ClientError> {
        self.send(body)?;
        self.receive(ignore_nak)
    }

    /// Send `opcode` with `payload` and read the reply.
    pub fn command(
        &mut self,
        opcode: Opcode,
        payload: &[u8],
        ignore_nak: bool,
    ) -> Result<Bytes, ClientError> {
        let body = encode_body(opcode.into(), payload)?;
        debug!("{} with {} payload bytes", opcode, payload.len());
        self.command_raw(&body, ignore_nak)
    }

    fn transact(&mut self, cmd: &Command) -> Result<Bytes, ClientError> {
        let body = encode_command(cmd)?;
        debug!("{} ({} bytes)", cmd.opcode(), body.len());
        self.command_raw(&body, false)
    }

    /// Run `cmd` and decode its reply by opcode.
    pub fn execute(&mut self, cmd: &Command) -> Result<Reply, ClientError> {
        let body = self.transact(cmd)?;
        Ok(decode_reply(cmd.opcode(), body)?)
    }

    fn read_within_timeout(&mut self, buf: &mut [u8]) -> Result<usize, ClientError> {
        match self.transport.read_some(buf) {
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }

    // =========================================================================
    // High level
    // =========================================================================

    /// Echo `data` back from the rig. Returns the reply without its status
    /// byte.
    pub fn echo(&mut self, data: &[u8]) -> Result<Bytes, ClientError> {
        let body = self.transact(&Command::Echo(Bytes::copy_from_slice(data)))?;
        Ok(body.slice(1..))
    }

    /// Switch a status LED.
    pub fn set_led(&mut self, led: Led, on: bool) -> Result<(), ClientError> {
        self.transact(&Command::SetLed { led, on })?;
        Ok(())
    }

    /// Select normal or test run mode.
    pub fn set_run_mode(&mut self, mode: RunMode) -> Result<(), ClientError> {
        self.transact(&Command::SetRunMode(mode))?;
        Ok(())
    }

    pub fn emulated_upd_dump_state(&mut self) -> Result<UpdState, ClientError> {
        let body = self.transact(&Command::EmuUpdDumpState)?;
        Ok(decode_upd_state(&body)?)
    }

    /// Forward one SPI transfer to the emulated uPD16432B.
    pub fn emulated_upd_send_command(&mut self, spi_bytes: &[u8]) -> Result<(), ClientError> {
        self.transact(&Command::EmuUpdSendCommand(Bytes::copy_from_slice(spi_bytes)))?;
        Ok(())
    }

    pub fn emulated_upd_reset(&mut self) -> Result<(), ClientError> {
        self.transact(&Command::EmuUpdReset)?;
        Ok(())
    }

    /// Load raw key matrix data into the head unit emulation.
    pub fn radio_load_key_data(&mut self, key_bytes: &[u8]) -> Result<(), ClientError> {
        self.transact(&Command::RadioLoadKeyData(Bytes::copy_from_slice(key_bytes)))?;
        Ok(())
    }

    /// Feed VFD text to the head unit state decoder.
    pub fn radio_state_process(&mut self, display: &[u8]) -> Result<(), ClientError> {
        self.transact(&Command::RadioStateProcess(Bytes::copy_from_slice(display)))?;
        Ok(())
    }

    pub fn radio_state_dump(&mut self) -> Result<RadioState, ClientError> {
        let body = self.transact(&Command::RadioStateDump)?;
        Ok(decode_radio_state(&body)?)
    }

    pub fn radio_state_reset(&mut self) -> Result<(), ClientError> {
        self.transact(&Command::RadioStateReset)?;
        Ok(())
    }

    pub fn faceplate_upd_dump_state(&mut self) -> Result<UpdState, ClientError> {
        let body = self.transact(&Command::FaceplateUpdDumpState)?;
        Ok(decode_upd_state(&body)?)
    }

    /// Forward one SPI transfer to the real faceplate's uPD16432B.
    pub fn faceplate_upd_send_command(&mut self, spi_bytes: &[u8]) -> Result<(), ClientError> {
        self.transact(&Command::FaceplateUpdSendCommand(Bytes::copy_from_slice(spi_bytes)))?;
        Ok(())
    }

    pub fn faceplate_clear_display(&mut self) -> Result<(), ClientError> {
        self.transact(&Command::FaceplateClearDisplay)?;
        Ok(())
    }
}
