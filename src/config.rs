//! Application configuration management.
//!
//! The API base URL resolves in order: the `PAWPORT_API_URL` environment
//! variable (a `.env` file is honored), the saved config value, then the
//! built-in default. The config also remembers the last email used.
//!
//! Configuration is stored at `~/.config/pawport/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "pawport";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default account API endpoint
const DEFAULT_API_BASE_URL: &str = "https://api.pawport.app";

/// Environment variable overriding the API base URL
const API_URL_ENV: &str = "PAWPORT_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir =
            dirs::cache_dir().ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Resolved API base URL: environment override, saved value, default.
    pub fn api_base_url(&self) -> String {
        std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the env var mutation cannot race a parallel test.
    #[test]
    fn test_api_base_url_resolution_order() {
        std::env::remove_var(API_URL_ENV);

        let mut config = Config::default();
        assert_eq!(config.api_base_url(), DEFAULT_API_BASE_URL);

        config.api_url = Some("https://staging.pawport.app".to_string());
        assert_eq!(config.api_base_url(), "https://staging.pawport.app");

        std::env::set_var(API_URL_ENV, "http://localhost:3030");
        assert_eq!(config.api_base_url(), "http://localhost:3030");

        // Blank override falls through to the saved value
        std::env::set_var(API_URL_ENV, "  ");
        assert_eq!(config.api_base_url(), "https://staging.pawport.app");

        std::env::remove_var(API_URL_ENV);
    }
}
