// src/config.rs
//! Reader configuration
//!
//! Nothing is loaded implicitly. Defaults match the usual Raspberry Pi wiring
//! of a serial GPS module; a JSON file can be supplied explicitly and command
//! line flags override whatever it contains.

use crate::{
    error::{GpsError, Result},
    reader::ReadMode,
};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

pub const DEFAULT_PORT: &str = "/dev/serial0";
pub const DEFAULT_BAUDRATE: u32 = 9600;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;

/// How fixes are rendered by the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub serial_port: String,
    pub serial_baudrate: u32,
    /// Per-read timeout of the transport
    pub read_timeout_ms: u64,
    pub mode: ReadMode,
    /// Upper bound on how long batch mode waits for both fixes; unbounded if unset
    pub max_wait_secs: Option<u64>,
    pub output: OutputFormat,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            serial_port: DEFAULT_PORT.to_string(),
            serial_baudrate: DEFAULT_BAUDRATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            mode: ReadMode::Batch,
            max_wait_secs: None,
            output: OutputFormat::Text,
        }
    }
}

impl ReaderConfig {
    /// Load configuration from an explicitly named JSON file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GpsError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            GpsError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the transport cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.serial_port.is_empty() {
            return Err(GpsError::Config("serial port must not be empty".to_string()));
        }
        if self.serial_baudrate == 0 {
            return Err(GpsError::Config("baud rate must be positive".to_string()));
        }
        if self.read_timeout_ms == 0 {
            return Err(GpsError::Config("read timeout must be positive".to_string()));
        }
        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait_secs.map(Duration::from_secs)
    }

    /// Update serial port settings
    pub fn update_serial(&mut self, port: String, baudrate: u32) {
        self.serial_port = port;
        self.serial_baudrate = baudrate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ReaderConfig::default();
        assert_eq!(config.serial_port, "/dev/serial0");
        assert_eq!(config.serial_baudrate, 9600);
        assert_eq!(config.read_timeout(), Duration::from_secs(1));
        assert_eq!(config.mode, ReadMode::Batch);
        assert_eq!(config.max_wait(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_update_serial() {
        let mut config = ReaderConfig::default();
        config.update_serial("/dev/ttyUSB0".to_string(), 115200);
        assert_eq!(config.serial_port, "/dev/ttyUSB0");
        assert_eq!(config.serial_baudrate, 115200);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ReaderConfig =
            serde_json::from_str(r#"{"mode":"stream","max_wait_secs":30,"output":"json"}"#).unwrap();
        assert_eq!(config.mode, ReadMode::Stream);
        assert_eq!(config.max_wait(), Some(Duration::from_secs(30)));
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.serial_port, DEFAULT_PORT);
        assert_eq!(config.serial_baudrate, DEFAULT_BAUDRATE);
    }

    #[test]
    fn test_load_from_path() {
        let path = std::env::temp_dir().join(format!("gps-fix-config-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"serial_port":"/dev/ttyACM0","serial_baudrate":4800}}"#).unwrap();
        drop(file);

        let config = ReaderConfig::load_from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.serial_port, "/dev/ttyACM0");
        assert_eq!(config.serial_baudrate, 4800);
        assert_eq!(config.read_timeout_ms, DEFAULT_READ_TIMEOUT_MS);
    }

    #[test]
    fn test_load_missing_file() {
        let result = ReaderConfig::load_from_path(Path::new("/nonexistent/gps-fix.json"));
        assert!(matches!(result, Err(GpsError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = ReaderConfig {
            serial_baudrate: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ReaderConfig {
            read_timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
