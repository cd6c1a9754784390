//! Record Storage
//!
//! Where the persisted record lives. The manager only sees bytes.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::ConfigError;

/// Byte store for the persisted record
pub trait ConfigStorage {
    /// Stored bytes, `None` if nothing was ever saved
    fn load(&mut self) -> Result<Option<Vec<u8>>, ConfigError>;

    /// Replace the stored bytes
    fn save(&mut self, bytes: &[u8]) -> Result<(), ConfigError>;

    /// Erase the stored bytes
    fn clear(&mut self) -> Result<(), ConfigError>;
}

impl<S: ConfigStorage + ?Sized> ConfigStorage for Box<S> {
    fn load(&mut self) -> Result<Option<Vec<u8>>, ConfigError> {
        (**self).load()
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), ConfigError> {
        (**self).save(bytes)
    }

    fn clear(&mut self) -> Result<(), ConfigError> {
        (**self).clear()
    }
}

// ============================================================================
// File
// ============================================================================

/// Record stored in a single file
#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Store at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$XDG_DATA_HOME/desk-companion/config.bin`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("desk-companion").join("config.bin"))
    }

    /// Store at [`Self::default_path`]
    pub fn at_default_path() -> Result<Self, ConfigError> {
        Self::default_path()
            .map(Self::new)
            .ok_or_else(|| ConfigError::Validation("no data directory".to_string()))
    }

    /// Backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, source: std::io::Error) -> ConfigError {
        ConfigError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl ConfigStorage for FileStorage {
    fn load(&mut self) -> Result<Option<Vec<u8>>, ConfigError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }

        // Write-then-rename so a crash never leaves half a record
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes).map_err(|e| self.write_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.write_error(e))?;

        debug!(path = %self.path.display(), len = bytes.len(), "Record written");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ConfigError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.write_error(e)),
        }
    }
}

// ============================================================================
// Memory
// ============================================================================

/// Record kept in memory
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    bytes: Option<Vec<u8>>,
    saves: usize,
    fail_writes: bool,
}

impl MemoryStorage {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with `bytes`
    #[must_use]
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Some(bytes.into()),
            ..Self::default()
        }
    }

    /// Make every save fail, for exercising retry paths
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Current bytes
    #[must_use]
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    /// Successful saves so far
    #[must_use]
    pub const fn saves(&self) -> usize {
        self.saves
    }
}

impl ConfigStorage for MemoryStorage {
    fn load(&mut self) -> Result<Option<Vec<u8>>, ConfigError> {
        Ok(self.bytes.clone())
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), ConfigError> {
        if self.fail_writes {
            return Err(ConfigError::Write {
                path: PathBuf::from("<memory>"),
                source: std::io::Error::other("writes disabled"),
            });
        }
        self.bytes = Some(bytes.to_vec());
        self.saves += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ConfigError> {
        self.bytes = None;
        Ok(())
    }
}
