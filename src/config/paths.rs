//! Path resolution for syncq configuration and data files.
//!
//! All syncq data is stored in `~/.syncq/` unless `SYNCQ_HOME` points elsewhere:
//! - `config.yaml` - Main configuration file
//! - `syncq.db` - SQLite database holding the sync queue

use std::path::PathBuf;

use crate::error::SyncError;

/// Environment variable that overrides the data directory.
pub const HOME_ENV: &str = "SYNCQ_HOME";

/// Paths to syncq configuration and data files.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.syncq/`
    pub root: PathBuf,
    /// Config file: `~/.syncq/config.yaml`
    pub config_file: PathBuf,
    /// Database file: `~/.syncq/syncq.db`
    pub database: PathBuf,
}

impl Paths {
    /// Resolve paths from `SYNCQ_HOME`, falling back to the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if neither location can be determined.
    pub fn new() -> Result<Self, SyncError> {
        if let Ok(root) = std::env::var(HOME_ENV) {
            if !root.is_empty() {
                return Ok(Self::with_root(PathBuf::from(root)));
            }
        }

        let home = std::env::var("HOME").map_err(|_| {
            SyncError::Config("Could not determine home directory".to_string())
        })?;

        Ok(Self::with_root(PathBuf::from(home).join(".syncq")))
    }

    /// Create paths with a custom root directory (useful for testing).
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            database: root.join("syncq.db"),
            root,
        }
    }

    /// Ensure the data directory exists.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), SyncError> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| {
                SyncError::Config(format!(
                    "Failed to create directory {}: {e}",
                    self.root.display()
                ))
            })?;
        }

        Ok(())
    }
}
