//! Configuration management for syncq.
//!
//! This module handles loading configuration from `~/.syncq/` and applying
//! environment overrides on top of it.

mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{ApiConfig, Config, LoggingConfig, SyncConfig};
