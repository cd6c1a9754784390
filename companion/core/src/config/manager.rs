//! Config Manager
//!
//! Holds the live [`DeviceConfig`], tracks unsaved changes and writes them
//! back once they have been stable for [`AUTOSAVE_DELAY_MS`]. Storage
//! failures never reach the main loop as fatal: a failed autosave is logged
//! and retried one delay later.

use tracing::{debug, info, warn};

use super::record::{decode, encode};
use super::settings::ResolvedSettings;
use super::store::ConfigStorage;
use super::{ConfigError, DeviceConfig};
use crate::mode::DisplayMode;
use crate::time::{has_elapsed, Millis};

/// Quiet period after the last change before writing
pub const AUTOSAVE_DELAY_MS: Millis = 5_000;

/// Live config plus its backing store
#[derive(Debug)]
pub struct ConfigManager<S> {
    storage: S,
    config: DeviceConfig,
    dirty: bool,
    last_change: Millis,
    restored: bool,
}

impl<S: ConfigStorage> ConfigManager<S> {
    /// Load the stored record, falling back to defaults
    ///
    /// A missing or rejected record is replaced with the defaults right away.
    pub fn load(storage: S, now: Millis) -> Self {
        let mut manager = Self {
            storage,
            config: DeviceConfig::default(),
            dirty: false,
            last_change: now,
            restored: false,
        };

        match manager.read_record() {
            Ok(Some(config)) => {
                info!(
                    brightness = config.brightness,
                    dim_secs = config.dim_timeout_secs,
                    sleep_secs = config.sleep_timeout_secs,
                    mode = %config.last_mode,
                    "Configuration loaded"
                );
                manager.config = config;
                manager.restored = true;
            }
            Ok(None) => {
                info!("No stored configuration, using defaults");
                manager.save_or_warn();
            }
            Err(e) => {
                warn!(error = %e, "Stored configuration rejected, using defaults");
                manager.save_or_warn();
            }
        }

        manager
    }

    fn read_record(&mut self) -> Result<Option<DeviceConfig>, ConfigError> {
        match self.storage.load()? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn save_or_warn(&mut self) {
        if let Err(e) = self.save() {
            warn!(error = %e, "Failed to save configuration");
        }
    }

    /// Write the current config now
    pub fn save(&mut self) -> Result<(), ConfigError> {
        self.storage.save(&encode(&self.config))?;
        self.dirty = false;
        debug!("Configuration saved");
        Ok(())
    }

    /// Autosave once changes have settled; returns whether a write happened
    ///
    /// On failure the change stays pending and the next attempt is one
    /// delay after `now`.
    pub fn update(&mut self, now: Millis) -> Result<bool, ConfigError> {
        if !self.dirty || !has_elapsed(now, self.last_change, AUTOSAVE_DELAY_MS) {
            return Ok(false);
        }
        if let Err(e) = self.save() {
            self.last_change = now;
            return Err(e);
        }
        info!("Configuration autosaved");
        Ok(true)
    }

    /// Write pending changes immediately
    pub fn flush(&mut self) -> Result<(), ConfigError> {
        if self.dirty {
            self.save()?;
        }
        Ok(())
    }

    /// Erase the store and go back to defaults
    pub fn factory_reset(&mut self) -> Result<(), ConfigError> {
        info!("Factory reset");
        self.config = DeviceConfig::default();
        self.restored = false;
        self.storage.clear()?;
        self.save()
    }

    fn mark_dirty(&mut self, now: Millis) {
        self.dirty = true;
        self.last_change = now;
    }

    /// Set full brightness
    pub fn set_brightness(&mut self, value: u8, now: Millis) {
        if self.config.brightness != value {
            self.config.brightness = value;
            self.mark_dirty(now);
        }
    }

    /// Set the dim timeout
    pub fn set_dim_timeout(&mut self, secs: u16, now: Millis) {
        if self.config.dim_timeout_secs != secs {
            self.config.dim_timeout_secs = secs;
            self.mark_dirty(now);
        }
    }

    /// Set the sleep timeout
    pub fn set_sleep_timeout(&mut self, secs: u16, now: Millis) {
        if self.config.sleep_timeout_secs != secs {
            self.config.sleep_timeout_secs = secs;
            self.mark_dirty(now);
        }
    }

    /// Set the mode restored at startup
    pub fn set_last_mode(&mut self, mode: DisplayMode, now: Millis) {
        if self.config.last_mode != mode {
            self.config.last_mode = mode;
            self.mark_dirty(now);
        }
    }

    /// Apply resolved overrides through the change-tracked setters
    pub fn apply(&mut self, settings: &ResolvedSettings, now: Millis) {
        self.set_brightness(settings.brightness.value, now);
        self.set_dim_timeout(settings.dim_timeout_secs.value, now);
        self.set_sleep_timeout(settings.sleep_timeout_secs.value, now);
    }

    /// Live config
    #[must_use]
    pub const fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Whether changes are waiting to be written
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the config came from a valid stored record
    #[must_use]
    pub const fn was_restored(&self) -> bool {
        self.restored
    }

    /// Backing store
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Backing store, mutably
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}
