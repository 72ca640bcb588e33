//! Configuration loading for the rig client.
//!
//! Settings come from a TOML file and the environment, in this order of
//! precedence (highest first):
//! 1. `VWRADIO_*` environment variables
//! 2. The file given with `--config`, or `vwradio.toml` in the current
//!    directory
//! 3. Default values
//!
//! Command line flags are applied on top by the binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;

use crate::client::ConnectionConfig;
use crate::error::ClientError;

/// File looked up in the current directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "vwradio.toml";

pub const ENV_PORT: &str = "VWRADIO_PORT";
pub const ENV_BAUD: &str = "VWRADIO_BAUD";
pub const ENV_TIMEOUT_MS: &str = "VWRADIO_TIMEOUT_MS";

/// Configuration file format.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub serial: SerialSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SerialSection {
    pub port: Option<String>,
    pub baud_rate: Option<u32>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    pub log_dir: Option<PathBuf>,
    pub level: Option<String>,
}

/// Resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub connection: ConnectionConfig,
    /// Directory for daily log files; console only when unset.
    pub log_dir: Option<PathBuf>,
    /// Default filter directive, overridden by `RUST_LOG`.
    pub log_level: Option<String>,
}

/// Load settings from `path` (or the default file) and the environment.
///
/// An explicit path that cannot be read is an error; a missing default
/// file is not.
pub fn load_config(path: Option<&Path>) -> Result<Settings, ClientError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

fn load_config_with<F>(path: Option<&Path>, env: F) -> Result<Settings, ClientError>
where
    F: Fn(&str) -> Option<String>,
{
    let file = match path.map(Path::to_path_buf).or_else(find_config_file) {
        Some(path) => {
            debug!("Loading configuration from {:?}", path);
            let contents = fs::read_to_string(&path).map_err(|e| {
                ClientError::Config(format!("cannot read {}: {}", path.display(), e))
            })?;
            parse_config(&contents)?
        }
        None => ConfigFile::default(),
    };

    Ok(resolve(file, env))
}

/// Parse the TOML configuration format.
pub fn parse_config(contents: &str) -> Result<ConfigFile, ClientError> {
    toml::from_str(contents).map_err(|e| ClientError::Config(e.to_string()))
}

fn find_config_file() -> Option<PathBuf> {
    let path = std::env::current_dir().ok()?.join(DEFAULT_CONFIG_FILE);
    path.exists().then_some(path)
}

/// Merge file values, environment lookups and defaults.
fn resolve<F>(file: ConfigFile, env: F) -> Settings
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = ConnectionConfig::default();

    let port = env(ENV_PORT)
        .or(file.serial.port)
        .unwrap_or(defaults.port);

    let baud_rate = env_parsed(&env, ENV_BAUD)
        .or(file.serial.baud_rate)
        .unwrap_or(defaults.baud_rate);

    let timeout = env_parsed(&env, ENV_TIMEOUT_MS)
        .or(file.serial.timeout_ms)
        .map(Duration::from_millis)
        .unwrap_or(defaults.timeout);

    debug!("Configuration: port={:?}, baud_rate={}, timeout={:?}", port, baud_rate, timeout);

    Settings {
        connection: ConnectionConfig {
            port,
            baud_rate,
            timeout,
        },
        log_dir: file.logging.log_dir,
        log_level: file.logging.level,
    }
}

fn env_parsed<F, T>(env: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let value = env(key)?;
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring invalid {}={:?}", key, value);
            None
        }
    }
}
