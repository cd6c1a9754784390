//! Device Configuration
//!
//! Brightness, idle timeouts and the last display mode, persisted as a small
//! checksummed record and written back after changes settle.
//!
//! # Layers
//!
//! - [`record`]: the binary layout
//! - [`store`]: where the bytes live
//! - [`manager`]: load-or-default, change tracking, debounced autosave
//! - [`settings`]: optional `companion.toml` overrides
//!
//! # Example Settings File
//!
//! ```toml
//! [display]
//! brightness = 200
//! dim_timeout_secs = 45
//! sleep_timeout_secs = 300
//!
//! [animation]
//! seed = 42
//! ```

pub mod manager;
pub mod record;
pub mod settings;
pub mod store;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mode::DisplayMode;

pub use manager::{ConfigManager, AUTOSAVE_DELAY_MS};
pub use record::{RecordError, RECORD_LEN};
pub use settings::{ConfigSource, Overrides, ResolvedSettings, Setting, SettingsFile};
pub use store::{ConfigStorage, FileStorage, MemoryStorage};

/// Record layout version written by this build
pub const CONFIG_VERSION: u8 = 1;

// =============================================================================
// Error Types
// =============================================================================

/// Errors from loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("Failed to read {path}: {source}")]
    Read {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("Failed to write {path}: {source}")]
    Write {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// Stored record was rejected
    #[error("Invalid stored record: {0}")]
    Record(#[from] RecordError),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

// =============================================================================
// Device Config
// =============================================================================

/// Persisted device settings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Record layout version
    pub version: u8,
    /// Full panel contrast (0–255)
    pub brightness: u8,
    /// Seconds without touch before dimming
    pub dim_timeout_secs: u16,
    /// Seconds without touch before sleeping
    pub sleep_timeout_secs: u16,
    /// Mode restored at startup
    pub last_mode: DisplayMode,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            brightness: 128,
            dim_timeout_secs: 30,
            sleep_timeout_secs: 120,
            last_mode: DisplayMode::Face,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DeviceConfig::default();
        assert_eq!(config.version, 1);
        assert_eq!(config.brightness, 128);
        assert_eq!(config.dim_timeout_secs, 30);
        assert_eq!(config.sleep_timeout_secs, 120);
        assert_eq!(config.last_mode, DisplayMode::Face);
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::from(RecordError::Truncated { len: 3 });
        assert_eq!(
            err.to_string(),
            "Invalid stored record: record truncated: 3 of 11 bytes"
        );
    }
}
