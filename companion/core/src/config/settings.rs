//! TOML Settings File
//!
//! Optional `companion.toml` in the XDG config directory. Values resolve
//! with the following priority (highest first):
//! 1. CLI arguments
//! 2. Settings file
//! 3. Stored record
//! 4. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ConfigError, DeviceConfig};

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from the TOML settings file
    File,
    /// Value from the persisted record
    Stored,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::File => write!(f, "settings file"),
            Self::Stored => write!(f, "stored record"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// A resolved value and where it came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Setting<T> {
    /// Value in effect
    pub value: T,
    /// Layer that supplied it
    pub source: ConfigSource,
}

impl<T> Setting<T> {
    const fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

// =============================================================================
// TOML Structures
// =============================================================================

/// `[display]` section
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayToml {
    /// Full panel contrast (0–255)
    pub brightness: Option<u8>,

    /// Seconds without touch before dimming
    pub dim_timeout_secs: Option<u16>,

    /// Seconds without touch before sleeping
    pub sleep_timeout_secs: Option<u16>,
}

/// `[animation]` section
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationToml {
    /// Fixed RNG seed for blink and gaze intervals
    pub seed: Option<u64>,
}

/// Root of `companion.toml`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    /// Display overrides
    pub display: DisplayToml,

    /// Animation overrides
    pub animation: AnimationToml,
}

impl SettingsFile {
    /// File values as an override layer
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            brightness: self.display.brightness,
            dim_timeout_secs: self.display.dim_timeout_secs,
            sleep_timeout_secs: self.display.sleep_timeout_secs,
            seed: self.animation.seed,
        }
    }
}

/// One layer of optional overrides
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Brightness override
    pub brightness: Option<u8>,
    /// Dim timeout override
    pub dim_timeout_secs: Option<u16>,
    /// Sleep timeout override
    pub sleep_timeout_secs: Option<u16>,
    /// RNG seed override
    pub seed: Option<u64>,
}

/// Settings after layering
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedSettings {
    /// Full brightness
    pub brightness: Setting<u8>,
    /// Dim timeout
    pub dim_timeout_secs: Setting<u16>,
    /// Sleep timeout
    pub sleep_timeout_secs: Setting<u16>,
    /// RNG seed; `None` means entropy
    pub seed: Setting<Option<u64>>,
}

impl ResolvedSettings {
    /// Layer CLI over file over the stored record
    ///
    /// `stored` is `None` when the record was missing or rejected, in which
    /// case its values count as defaults.
    #[must_use]
    pub fn resolve(cli: &Overrides, file: &Overrides, stored: Option<&DeviceConfig>) -> Self {
        let base_source = if stored.is_some() {
            ConfigSource::Stored
        } else {
            ConfigSource::Default
        };
        let base = stored.copied().unwrap_or_default();

        Self {
            brightness: pick(cli.brightness, file.brightness, base.brightness, base_source),
            dim_timeout_secs: pick(
                cli.dim_timeout_secs,
                file.dim_timeout_secs,
                base.dim_timeout_secs,
                base_source,
            ),
            sleep_timeout_secs: pick(
                cli.sleep_timeout_secs,
                file.sleep_timeout_secs,
                base.sleep_timeout_secs,
                base_source,
            ),
            seed: match (cli.seed, file.seed) {
                (Some(seed), _) => Setting::new(Some(seed), ConfigSource::Cli),
                (None, Some(seed)) => Setting::new(Some(seed), ConfigSource::File),
                (None, None) => Setting::new(None, ConfigSource::Default),
            },
        }
    }
}

fn pick<T>(cli: Option<T>, file: Option<T>, base: T, base_source: ConfigSource) -> Setting<T> {
    match (cli, file) {
        (Some(value), _) => Setting::new(value, ConfigSource::Cli),
        (None, Some(value)) => Setting::new(value, ConfigSource::File),
        (None, None) => Setting::new(base, base_source),
    }
}

// =============================================================================
// Loading
// =============================================================================

/// `$XDG_CONFIG_HOME/desk-companion/companion.toml`
#[must_use]
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("desk-companion").join("companion.toml"))
}

/// Parse settings text
pub fn parse_settings(text: &str) -> Result<SettingsFile, ConfigError> {
    let settings: SettingsFile = toml::from_str(text)?;
    let display = &settings.display;
    if display.dim_timeout_secs == Some(0) || display.sleep_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "timeouts must be at least one second".to_string(),
        ));
    }
    Ok(settings)
}

/// Read the settings file; a missing file is empty settings
pub fn load_settings(path: &Path) -> Result<SettingsFile, ConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "Settings file not found, using defaults");
        return Ok(SettingsFile::default());
    }

    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let settings = parse_settings(&text)?;
    info!(path = %path.display(), "Loaded settings file");
    Ok(settings)
}
