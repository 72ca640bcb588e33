//! Serial client for the vwradio AVR test rig.
//!
//! The rig answers length-prefixed command frames over a serial line. A
//! [`Connection`] owns the port exclusively and runs one blocking
//! request/response transaction per call.
//!
//! ```no_run
//! use vwradio_client::{Connection, ConnectionConfig};
//!
//! let config = ConnectionConfig {
//!     port: "/dev/ttyUSB0".to_string(),
//!     ..Default::default()
//! };
//! let mut conn = Connection::open(&config)?;
//! let state = conn.radio_state_dump()?;
//! println!("{} {}", state.operation_mode, state.display_text());
//! # Ok::<(), vwradio_client::ClientError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod logging;

pub use client::{Connection, ConnectionConfig, Transport};
pub use config::{load_config, Settings};
pub use error::ClientError;
