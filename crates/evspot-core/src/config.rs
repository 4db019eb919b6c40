//! Application configuration management.
//!
//! Holds the API base URL, where credentials are stored, and the last used
//! username. Configuration is stored at `~/.config/evspot/config.json`; the
//! `EVSPOT_API_URL` environment variable overrides the stored base URL.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Application name used for config/data directory paths
const APP_NAME: &str = "evspot";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Credential storage file name
const STORAGE_FILE: &str = "storage.json";

/// Cookie jar file name, kept beside the credential store
const COOKIES_FILE: &str = "cookies.json";

/// Environment variable that overrides `api_base_url`
pub const API_URL_ENV: &str = "EVSPOT_API_URL";

/// Development server address
pub const DEFAULT_API_URL: &str = "http://localhost:8000/";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not find {0} directory")]
    NoDirectory(&'static str),

    #[error("Config I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file is invalid: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
    #[serde(default)]
    pub last_username: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            let config = serde_json::from_str(&contents)?;
            debug!(path = %path.display(), "Config loaded");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoDirectory("config"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// API base URL: environment, then config file, then the dev server
    pub fn base_url(&self) -> String {
        let from_env = std::env::var(API_URL_ENV).ok();
        Self::resolve_base_url(from_env.as_deref(), self.api_base_url.as_deref())
    }

    fn resolve_base_url(from_env: Option<&str>, configured: Option<&str>) -> String {
        let url = [from_env, configured]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|u| !u.is_empty())
            .unwrap_or(DEFAULT_API_URL);

        // Relative endpoint paths resolve against the URL, so keep a trailing slash
        if url.ends_with('/') {
            url.to_string()
        } else {
            format!("{}/", url)
        }
    }

    /// Where the credential store lives
    pub fn storage_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.storage_path {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_dir().ok_or(ConfigError::NoDirectory("data"))?;
        Ok(data_dir.join(APP_NAME).join(STORAGE_FILE))
    }

    /// Where the HTTP cookie jar lives: next to the credential store
    pub fn cookies_path(&self) -> Result<PathBuf, ConfigError> {
        let storage = self.storage_path()?;
        Ok(storage.with_file_name(COOKIES_FILE))
    }
}
