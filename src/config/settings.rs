//! Configuration settings for syncq.
//!
//! Settings are loaded from `~/.syncq/config.yaml`, then environment
//! variables are applied on top.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Paths;
use crate::error::SyncError;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Remote API settings.
    pub api: ApiConfig,
    /// Sync queue and scheduling settings.
    pub sync: SyncConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Remote API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the remote service.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Sync queue settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncConfig {
    /// Failed attempts allowed before an entry becomes terminal.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Maximum entries processed per cycle.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Seconds between automatic cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Whether `watch` runs cycles on a timer.
    #[serde(default = "default_true")]
    pub auto_sync: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter level when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions for serde
fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

const fn default_timeout_ms() -> u64 {
    10_000
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_batch_size() -> usize {
    50
}

const fn default_interval_secs() -> u64 {
    60
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            batch_size: default_batch_size(),
            interval_secs: default_interval_secs(),
            auto_sync: default_true(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ApiConfig {
    /// Request timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl SyncConfig {
    /// Interval between automatic cycles as a `Duration`.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Config {
    /// Load configuration from the default path and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed, or if
    /// an override holds an invalid value.
    pub fn load() -> Result<Self, SyncError> {
        let paths = Paths::new()?;
        Self::load_with_env(&paths.config_file)
    }

    /// Load configuration from a specific path and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the result is invalid.
    pub fn load_with_env(path: &Path) -> Result<Self, SyncError> {
        let mut config = Self::load_from_path(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load_from_path(path: &Path) -> Result<Self, SyncError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            SyncError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Apply overrides from an environment lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric override does not parse.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("API_BASE_URL").filter(|v| !v.is_empty()) {
            self.api.base_url = url;
        }
        if let Some(v) = lookup("API_TIMEOUT") {
            self.api.timeout_ms = parse_env("API_TIMEOUT", &v)?;
        }
        if let Some(level) = lookup("LOG_LEVEL").filter(|v| !v.is_empty()) {
            self.logging.level = level;
        }
        if let Some(v) = lookup("SYNC_INTERVAL_SECS") {
            self.sync.interval_secs = parse_env("SYNC_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = lookup("SYNC_MAX_RETRIES") {
            self.sync.max_retries = parse_env("SYNC_MAX_RETRIES", &v)?;
        }
        if let Some(v) = lookup("SYNC_BATCH_SIZE") {
            self.sync.batch_size = parse_env("SYNC_BATCH_SIZE", &v)?;
        }
        if let Some(v) = lookup("ENABLE_AUTO_SYNC") {
            self.sync.auto_sync = v == "true" || v == "1";
        }
        Ok(())
    }

    /// Reject settings the coordinator cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.sync.max_retries == 0 {
            return Err(SyncError::Config("sync.max_retries must be at least 1".to_string()));
        }
        if self.sync.batch_size == 0 {
            return Err(SyncError::Config("sync.batch_size must be at least 1".to_string()));
        }
        if self.sync.interval_secs == 0 {
            return Err(SyncError::Config("sync.interval_secs must be at least 1".to_string()));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(SyncError::Config("api.base_url must not be empty".to_string()));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, SyncError> {
    value
        .trim()
        .parse()
        .map_err(|_| SyncError::Config(format!("Invalid value for {key}: '{value}'")))
}
