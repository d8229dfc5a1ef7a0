use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::gateway::DEFAULT_BASE_URL;

/// Environment variable that overrides the configured gateway URL
pub const BASE_URL_ENV: &str = "KIWI_API_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `~/.config/kiwi/config.json`, or defaults when it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config file {:?}: {}", config_path, e))?;
        Ok(config)
    }

    /// Gateway URL: env var first, then config, then the local default
    pub fn resolve_base_url(&self) -> String {
        let env_url = std::env::var(BASE_URL_ENV).ok();
        self.base_url_with_override(env_url.as_deref())
    }

    fn base_url_with_override(&self, env_url: Option<&str>) -> String {
        env_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .or_else(|| self.base_url.as_deref().map(str::trim))
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("kiwi").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn test_load_base_url_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "base_url": "http://gateway.internal:9000/" }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://gateway.internal:9000/"));
        assert_eq!(config.base_url_with_override(None), "http://gateway.internal:9000");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_base_url_resolution_order() {
        let config = Config {
            base_url: Some("http://from-config:8080".to_string()),
        };
        assert_eq!(
            config.base_url_with_override(Some("http://from-env:1234")),
            "http://from-env:1234"
        );
        assert_eq!(config.base_url_with_override(Some("  ")), "http://from-config:8080");
        assert_eq!(Config::new().base_url_with_override(None), DEFAULT_BASE_URL);
    }
}
