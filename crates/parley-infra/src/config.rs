//! Configuration loader for Parley.
//!
//! Resolves the data directory and reads `config.toml` from it, deserializing
//! into [`ParleyConfig`]. Falls back to defaults when the file is missing or
//! malformed.

use std::path::{Path, PathBuf};

use parley_types::config::ParleyConfig;

use crate::sqlite::pool::default_database_url;

/// Resolve the data directory.
///
/// Priority:
/// 1. `PARLEY_DATA_DIR` environment variable
/// 2. `~/.parley`
/// 3. `.parley` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PARLEY_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".parley");
    }

    PathBuf::from(".parley")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`ParleyConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
pub async fn load_config(data_dir: &Path) -> ParleyConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ParleyConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ParleyConfig::default();
        }
    };

    match toml::from_str::<ParleyConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ParleyConfig::default()
        }
    }
}

/// The configured database URL, or `parley.db` inside the data directory.
pub fn resolve_database_url(config: &ParleyConfig, data_dir: &Path) -> String {
    config
        .database_url
        .clone()
        .unwrap_or_else(|| default_database_url(data_dir))
}
