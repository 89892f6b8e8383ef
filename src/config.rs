//! Configuration management for dq-pulse.
//!
//! Handles loading configuration from TOML files with environment variable
//! overrides. Precedence, lowest to highest: built-in defaults, config
//! file, environment, CLI flags (applied by the binary).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PulseError, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Data gateway settings.
    #[serde(default)]
    pub gateway: GatewayOptions,

    /// Query definition store settings.
    #[serde(default)]
    pub store: StoreOptions,
}

/// Data gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOptions {
    /// Full URL of the query-execution endpoint.
    #[serde(default = "default_gateway_url")]
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_gateway_url() -> String {
    "http://localhost:8080/query".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Query definition store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreOptions {
    /// Path of the SQLite database file.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dq-pulse")
        .join("state.db")
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dq-pulse")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| PulseError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            PulseError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies environment variable overrides.
    ///
    /// `DATA_GATEWAY_URL` (the name the original deployment used),
    /// `DQPULSE_GATEWAY_TIMEOUT_SECS`, and `DQPULSE_STORE_PATH`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATA_GATEWAY_URL") {
            self.gateway.url = url;
        }
        if let Ok(timeout) = std::env::var("DQPULSE_GATEWAY_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                self.gateway.timeout_secs = secs;
            }
        }
        if let Ok(path) = std::env::var("DQPULSE_STORE_PATH") {
            self.store.path = PathBuf::from(path);
        }
    }
}
