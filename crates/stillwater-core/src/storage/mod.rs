mod config;
pub mod database;
pub mod keyring_store;

pub use config::{ChatConfig, Config, DashboardConfig, ReflectionConfig, RhythmConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/stillwater[-dev]/` based on STILLWATER_ENV.
///
/// Set STILLWATER_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("STILLWATER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("stillwater-dev")
    } else {
        base_dir.join("stillwater")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}
