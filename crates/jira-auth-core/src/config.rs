//! Application configuration management.
//!
//! This module handles loading and saving the configuration, which holds the
//! JIRA base URL, the last used username and the request timeout.
//!
//! Configuration is stored at `~/.config/jira-auth/config.json`. The
//! `JIRA_URL` and `JIRA_USERNAME` environment variables override stored values.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::client::REQUEST_TIMEOUT_SECS;

/// Application name used for config directory paths
const APP_NAME: &str = "jira-auth";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_BASE_URL: &str = "JIRA_URL";
pub const ENV_USERNAME: &str = "JIRA_USERNAME";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub base_url: Option<String>,
    pub last_username: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply `JIRA_URL` / `JIRA_USERNAME` from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`; empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_empty(ENV_BASE_URL) {
            self.base_url = Some(url);
        }
        if let Some(username) = non_empty(ENV_USERNAME) {
            self.last_username = Some(username);
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(REQUEST_TIMEOUT_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_stored_values() {
        let mut config = Config {
            base_url: Some("https://old.example.com".to_string()),
            last_username: Some("wilma".to_string()),
            timeout_secs: None,
        };
        config.apply_overrides(|key| match key {
            ENV_BASE_URL => Some("https://jira.example.com".to_string()),
            ENV_USERNAME => Some("fred".to_string()),
            _ => None,
        });
        assert_eq!(config.base_url.as_deref(), Some("https://jira.example.com"));
        assert_eq!(config.last_username.as_deref(), Some("fred"));
    }

    #[test]
    fn test_empty_overrides_ignored() {
        let mut config = Config {
            base_url: Some("https://jira.example.com".to_string()),
            ..Default::default()
        };
        config.apply_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.base_url.as_deref(), Some("https://jira.example.com"));
        assert_eq!(config.last_username, None);
    }

    #[test]
    fn test_request_timeout_default() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(REQUEST_TIMEOUT_SECS));

        let config = Config {
            timeout_secs: Some(5),
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = serde_json::from_str(r#"{"base_url":"https://jira.example.com"}"#)
            .expect("Failed to parse config JSON");
        assert_eq!(config.base_url.as_deref(), Some("https://jira.example.com"));
        assert_eq!(config.timeout_secs, None);
    }
}
