//! Service configuration types for Parley.
//!
//! `ParleyConfig` represents the top-level `config.toml` that controls the
//! database location, the listen address, and pagination limits.

use serde::{Deserialize, Serialize};

use crate::page::DEFAULT_PAGE_LIMIT;

/// Top-level configuration for the Parley service.
///
/// Loaded from `~/.parley/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParleyConfig {
    /// SQLite URL. Defaults to `parley.db` inside the data directory.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Address the REST server binds to.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Page size used when a listing request omits `limit`.
    #[serde(default = "default_page_limit")]
    pub default_page_limit: u32,

    /// Largest `limit` a listing request may ask for.
    #[serde(default = "default_max_page_limit")]
    pub max_page_limit: u32,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[serde(default)]
    pub otel: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

fn default_max_page_limit() -> u32 {
    100
}

impl Default for ParleyConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            host: default_host(),
            port: default_port(),
            default_page_limit: default_page_limit(),
            max_page_limit: default_max_page_limit(),
            otel: false,
        }
    }
}
