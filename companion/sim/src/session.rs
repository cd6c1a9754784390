//! Session Setup
//!
//! Opens the record store, reads the settings file and layers the CLI on
//! top before the companion starts.

use anyhow::Context;
use tracing::info;

use companion_core::config::settings::{load_settings, ResolvedSettings, SettingsFile};
use companion_core::{
    sampler_from_seed, Companion, ConfigManager, ConfigStorage, FileStorage, MemoryStorage, Millis,
};

use crate::cli::Args;

/// Storage type the simulator runs with
pub type SimStorage = Box<dyn ConfigStorage>;

/// Companion as the simulator runs it
pub type SimCompanion = Companion<SimStorage>;

/// Record store for this run
///
/// An explicit path always wins. Headless runs otherwise stay in memory so
/// their output does not depend on the host.
pub fn open_storage(args: &Args) -> anyhow::Result<SimStorage> {
    if let Some(path) = &args.config_path {
        return Ok(Box::new(FileStorage::new(path)));
    }
    if args.headless {
        return Ok(Box::new(MemoryStorage::new()));
    }
    let storage = FileStorage::at_default_path().context("Failed to locate the data directory")?;
    info!(path = %storage.path().display(), "Using record store");
    Ok(Box::new(storage))
}

/// Load config, apply overrides and build the companion at `now`
pub fn start_companion(args: &Args, storage: SimStorage, now: Millis) -> anyhow::Result<SimCompanion> {
    let mut manager = ConfigManager::load(storage, now);

    let file = match args.settings_path() {
        Some(path) => load_settings(&path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?,
        None => SettingsFile::default(),
    };

    let stored = manager.was_restored().then(|| *manager.config());
    let resolved = ResolvedSettings::resolve(&args.overrides(), &file.overrides(), stored.as_ref());
    info!(
        brightness = resolved.brightness.value,
        brightness_source = %resolved.brightness.source,
        dim_secs = resolved.dim_timeout_secs.value,
        dim_source = %resolved.dim_timeout_secs.source,
        sleep_secs = resolved.sleep_timeout_secs.value,
        sleep_source = %resolved.sleep_timeout_secs.source,
        seed = ?resolved.seed.value,
        "Settings resolved"
    );
    manager.apply(&resolved, now);

    Ok(Companion::new(manager, sampler_from_seed(resolved.seed.value), now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_overrides_reach_the_companion() {
        let args = Args::parse_from(["companion-sim", "--headless", "--brightness", "40"]);
        let storage = open_storage(&args).unwrap();
        let companion = start_companion(&args, storage, 0).unwrap();
        assert_eq!(companion.modes().brightness(), 40);
        assert_eq!(companion.config().config().brightness, 40);
        assert!(companion.config().is_dirty());
    }

    #[test]
    fn test_missing_settings_file_is_fine() {
        let args = Args::parse_from([
            "companion-sim",
            "--headless",
            "--settings",
            "/nonexistent/companion.toml",
        ]);
        let storage = open_storage(&args).unwrap();
        assert!(start_companion(&args, storage, 0).is_ok());
    }
}
