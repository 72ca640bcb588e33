//! Client module for the rig.

pub mod connection;
pub mod transport;

#[cfg(test)]
mod fake_rig;

pub use connection::{Connection, ConnectionConfig, DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT};
pub use transport::{open_serial, Transport};
