//! Host configuration loaded from TOML.
//!
//! The file holds a single `[search]` table that maps onto
//! [`SearchConfig`]. Every field is optional; a missing file means defaults.
//! API keys left empty in the file are taken from the provider's
//! environment variable (`RENTCAST_API_KEY`, `SERPAPI_API_KEY`, ...).
//!
//! `[[search.providers]]` entries override the built-in catalog by `id`;
//! providers a file does not mention keep their defaults.

use std::path::{Path, PathBuf};

use cf1_search::{ProviderId, SearchConfig};
use serde::{Deserialize, Serialize};

use crate::error::{HostError, Result};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "CF1_SEARCH_CONFIG";

/// Top-level host configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub search: SearchConfig,
}

impl HostConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| HostError::Config(format!("{}: {e}", path.display())))
    }

    /// Load from `path`, or return defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }
        let config = Self::from_file(path)?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load from the resolved config path and fill credentials from the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Same as [`HostConfig::load_or_default`].
    pub fn load() -> Result<Self> {
        let mut config = Self::load_or_default(&config_path())?;
        config.resolve_credentials(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Fill every provider without a usable key from `lookup`, keyed by the
    /// provider's credential variable. Blank values count as absent.
    pub fn resolve_credentials(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for descriptor in &mut self.search.providers {
            if descriptor.credential().is_some() {
                continue;
            }
            let var = descriptor.id.credential_env_var();
            match lookup(var).filter(|v| !v.trim().is_empty()) {
                Some(key) => {
                    *descriptor = descriptor.clone().with_api_key(key);
                    tracing::debug!(provider = %descriptor.id, var, "credential from environment");
                }
                None => descriptor.api_key = None,
            }
        }
    }

    /// Providers that will make live calls.
    pub fn live_providers(&self) -> Vec<ProviderId> {
        self.search
            .providers
            .iter()
            .filter(|d| d.credential().is_some())
            .map(|d| d.id)
            .collect()
    }
}

/// Config file path: `CF1_SEARCH_CONFIG` if set, otherwise
/// [`default_config_path`].
pub fn config_path() -> PathBuf {
    match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => default_config_path(),
    }
}

/// Returns the default config file path: `~/.config/cf1/search.toml`.
pub fn default_config_path() -> PathBuf {
    if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(config).join("cf1").join("search.toml")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config").join("cf1").join("search.toml")
    } else {
        PathBuf::from("/tmp/cf1-config/search.toml")
    }
}
