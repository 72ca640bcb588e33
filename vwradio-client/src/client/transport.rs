//! Byte transport underneath a [`Connection`](super::Connection).

use std::io::{self, Read, Write};

use log::info;
use serialport::SerialPort;

use crate::client::connection::ConnectionConfig;
use crate::error::ClientError;

/// A duplex byte stream with a timeout-bounded read.
///
/// `read_some` blocks until at least one byte is available or the
/// inactivity timeout passes. A timeout is reported as `Ok(0)` or as an
/// `io::ErrorKind::TimedOut` / `WouldBlock` error; both are treated alike.
pub trait Transport {
    /// Write every byte of `data` and flush it to the device.
    fn write_all_flush(&mut self, data: &[u8]) -> io::Result<()>;

    /// Read up to `buf.len()` bytes.
    fn read_some(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Number of received bytes waiting to be read without blocking.
    fn bytes_waiting(&mut self) -> io::Result<usize>;
}

impl Transport for Box<dyn SerialPort> {
    fn write_all_flush(&mut self, data: &[u8]) -> io::Result<()> {
        self.write_all(data)?;
        self.flush()
    }

    fn read_some(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }

    fn bytes_waiting(&mut self) -> io::Result<usize> {
        Ok(self.bytes_to_read()? as usize)
    }
}

/// Open the serial port named in `config`. The port's read timeout is the
/// protocol inactivity timeout.
pub fn open_serial(config: &ConnectionConfig) -> Result<Box<dyn SerialPort>, ClientError> {
    if config.port.is_empty() {
        return Err(ClientError::Config("no serial port configured".to_string()));
    }

    let port = serialport::new(&config.port, config.baud_rate)
        .timeout(config.timeout)
        .open()?;
    info!(
        "Opened {} at {} baud (timeout {:?})",
        config.port, config.baud_rate, config.timeout
    );
    Ok(port)
}
