//! Store configuration.
//!
//! Everything has a sensible default; a `config.yaml` in the data
//! directory can override the lock tuning or point the store elsewhere.
//! Absence of the file is the normal case, not an error.

use crate::error::{Error, Result};
use crate::store::LockConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = ".mull";

const CONFIG_FILE: &str = "config.yaml";

/// Configuration for a [`crate::store::FileStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the record file, the lock file, and the optional
    /// `config.yaml`.
    pub data_dir: PathBuf,

    /// Lock acquisition tuning.
    pub lock: LockConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            lock: LockConfig::default(),
        }
    }
}

/// On-disk shape of `config.yaml`. Every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    lock_initial_delay_ms: Option<u64>,
    lock_max_delay_ms: Option<u64>,
    lock_max_attempts: Option<u32>,
}

impl StoreConfig {
    /// Loads configuration rooted at `dir`, merging `dir/config.yaml` over
    /// the defaults when it exists.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when the file exists but does not parse;
    /// [`Error::Io`] for read failures other than absence.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut config = StoreConfig {
            data_dir: dir.to_path_buf(),
            lock: LockConfig::default(),
        };

        let path = dir.join(CONFIG_FILE);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(config),
            Err(e) => return Err(Error::Io(e)),
        };

        let file: ConfigFile = serde_yaml::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;

        if let Some(data_dir) = file.data_dir {
            config.data_dir = data_dir;
        }
        if let Some(ms) = file.lock_initial_delay_ms {
            config.lock.initial_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = file.lock_max_delay_ms {
            config.lock.max_delay = Duration::from_millis(ms);
        }
        if let Some(attempts) = file.lock_max_attempts {
            config.lock.max_attempts = attempts;
        }
        Ok(config)
    }
}
