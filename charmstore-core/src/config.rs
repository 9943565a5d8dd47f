//! Client configuration
//!
//! ## Configuration Sources (in precedence order)
//!
//! 1. CLI flags (`--api`)
//! 2. Environment (`CHARMSTORE_API_URL`, `CHARMSTORE_TIMEOUT`)
//! 3. `~/.config/charmstore/config.yaml`
//! 4. Built-in defaults
//!
//! ```yaml
//! api_url: https://api.jujucharms.com/v4
//! timeout_seconds: 30
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{CatalogError, Result};

/// Default catalog API endpoint
pub const DEFAULT_API_URL: &str = "https://api.jujucharms.com/v4";

/// Environment variable overriding the API endpoint
pub const API_URL_ENV: &str = "CHARMSTORE_API_URL";

/// Environment variable overriding the request timeout
pub const TIMEOUT_ENV: &str = "CHARMSTORE_TIMEOUT";

const MIN_TIMEOUT_SECONDS: u64 = 1;

/// Catalog client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the catalog API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Timeout for catalog requests in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Custom User-Agent header (defaults to `charmstore/<version>`)
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_seconds: default_timeout(),
            user_agent: None,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl StoreConfig {
    /// Load configuration from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    ///
    /// A missing file yields the defaults; an unreadable or malformed one is an error.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default().normalized());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;

        let config: StoreConfig = serde_yaml_ng::from_str(&content).map_err(|e| {
            CatalogError::Config(format!("Failed to parse {}: {e}", path.display()))
        })?;

        debug!("Loaded config from {}", path.display());
        Ok(config.normalized())
    }

    /// Apply `CHARMSTORE_API_URL` / `CHARMSTORE_TIMEOUT` overrides from the environment
    pub fn apply_env(self) -> Result<Self> {
        self.apply_overrides(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(TIMEOUT_ENV).ok(),
        )
    }

    fn apply_overrides(mut self, api_url: Option<String>, timeout: Option<String>) -> Result<Self> {
        if let Some(api_url) = api_url.filter(|v| !v.is_empty()) {
            self.api_url = api_url;
        }

        if let Some(timeout) = timeout.filter(|v| !v.is_empty()) {
            self.timeout_seconds = timeout.parse().map_err(|_| {
                CatalogError::Config(format!(
                    "{TIMEOUT_ENV} must be a number of seconds, got '{timeout}'"
                ))
            })?;
        }

        Ok(self.normalized())
    }

    /// Override the API endpoint
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self.normalized()
    }

    /// The User-Agent sent with every request
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| concat!("charmstore/", env!("CARGO_PKG_VERSION")).to_string())
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(self)
            .map_err(|e| CatalogError::Config(format!("Failed to serialize config: {e}")))
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "charmstore", "charmstore")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .or_else(|| dirs::config_dir().map(|d| d.join("charmstore")))
            .map(|dir| dir.join("config.yaml"))
    }

    fn normalized(mut self) -> Self {
        while self.api_url.ends_with('/') {
            self.api_url.pop();
        }

        if self.timeout_seconds < MIN_TIMEOUT_SECONDS {
            warn!(
                "Configured timeout_seconds={} is too low; using minimum of {} seconds",
                self.timeout_seconds, MIN_TIMEOUT_SECONDS
            );
            self.timeout_seconds = MIN_TIMEOUT_SECONDS;
        }

        self
    }
}
