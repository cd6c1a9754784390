//! Command Line
//!
//! Every display override can also come from the environment, so a session
//! can be pinned from a shell profile.

use std::path::PathBuf;

use clap::Parser;

use companion_core::config::settings::{default_settings_path, Overrides};
use companion_core::Millis;

/// Desk companion panel simulator
#[derive(Debug, Clone, Parser)]
#[command(name = "companion-sim", version, about)]
pub struct Args {
    /// Run without a terminal, printing one JSON snapshot per simulated second
    #[arg(long)]
    pub headless: bool,

    /// Simulated seconds to run in headless mode
    #[arg(long, default_value_t = 60)]
    pub seconds: u32,

    /// Simulated frame step in headless mode (must divide 1000)
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub frame_ms: u32,

    /// Fixed RNG seed for blink and gaze timing
    #[arg(long, env = "COMPANION_SEED")]
    pub seed: Option<u64>,

    /// Start the millisecond clock this many ms before it wraps
    #[arg(long, value_name = "MS")]
    pub clock_offset: Option<u32>,

    /// Full panel brightness (0-255)
    #[arg(long, env = "COMPANION_BRIGHTNESS")]
    pub brightness: Option<u8>,

    /// Seconds without touch before dimming
    #[arg(long, env = "COMPANION_DIM_TIMEOUT", value_parser = clap::value_parser!(u16).range(1..))]
    pub dim_timeout: Option<u16>,

    /// Seconds without touch before sleeping
    #[arg(long, env = "COMPANION_SLEEP_TIMEOUT", value_parser = clap::value_parser!(u16).range(1..))]
    pub sleep_timeout: Option<u16>,

    /// Persisted record location (headless runs keep it in memory otherwise)
    #[arg(long, env = "COMPANION_CONFIG_PATH")]
    pub config_path: Option<PathBuf>,

    /// Settings file (`companion.toml`)
    #[arg(long, env = "COMPANION_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Log file for terminal mode
    #[arg(long, env = "COMPANION_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// CLI layer of the settings resolution
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            brightness: self.brightness,
            dim_timeout_secs: self.dim_timeout,
            sleep_timeout_secs: self.sleep_timeout,
            seed: self.seed,
        }
    }

    /// First loop timestamp
    #[must_use]
    pub fn start_millis(&self) -> Millis {
        self.clock_offset.map_or(0, |offset| 0u32.wrapping_sub(offset))
    }

    /// Settings file to read, if any
    ///
    /// Headless runs only read a file named explicitly.
    #[must_use]
    pub fn settings_path(&self) -> Option<PathBuf> {
        match &self.settings {
            Some(path) => Some(path.clone()),
            None if self.headless => None,
            None => default_settings_path(),
        }
    }

    /// Where terminal mode logs go
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("companion-sim.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_overrides_from_flags() {
        let args = Args::parse_from([
            "companion-sim",
            "--brightness",
            "200",
            "--sleep-timeout",
            "90",
            "--seed",
            "5",
        ]);
        assert_eq!(
            args.overrides(),
            Overrides {
                brightness: Some(200),
                dim_timeout_secs: None,
                sleep_timeout_secs: Some(90),
                seed: Some(5),
            }
        );
    }

    #[test]
    fn test_clock_offset_starts_before_wrap() {
        let args = Args::parse_from(["companion-sim", "--clock-offset", "5000"]);
        assert_eq!(args.start_millis(), u32::MAX - 4_999);
        assert_eq!(Args::parse_from(["companion-sim"]).start_millis(), 0);
    }

    #[test]
    fn test_rejects_zero_timeout() {
        assert!(Args::try_parse_from(["companion-sim", "--dim-timeout", "0"]).is_err());
        assert!(Args::try_parse_from(["companion-sim", "--frame-ms", "0"]).is_err());
    }

    #[test]
    fn test_headless_skips_default_settings() {
        let args = Args::parse_from(["companion-sim", "--headless"]);
        assert_eq!(args.settings_path(), None);

        let args = Args::parse_from(["companion-sim", "--headless", "--settings", "x.toml"]);
        assert_eq!(args.settings_path(), Some(PathBuf::from("x.toml")));
    }
}
