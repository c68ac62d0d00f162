use anyhow::{Context, Result};
use roster::adapters::outbound::{DEFAULT_REGISTER_PATH, DEFAULT_SIGN_IN_PATH};
use roster::domain::CalendarLocale;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Base URL of the auth server, e.g. "http://localhost:3000"
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Base URL of the table store; tables live under `/rest/v1/`
    #[serde(default = "default_store_url")]
    pub store_url: String,
    #[serde(default)]
    pub store_api_key: Option<String>,
    #[serde(default = "default_sign_in_path")]
    pub sign_in_path: String,
    #[serde(default = "default_register_path")]
    pub register_path: String,
    /// Month names in calendar labels: "english" or "indonesian"
    #[serde(default)]
    pub locale: CalendarLocale,
    /// Used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_store_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_sign_in_path() -> String {
    DEFAULT_SIGN_IN_PATH.to_string()
}

fn default_register_path() -> String {
    DEFAULT_REGISTER_PATH.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            store_url: default_store_url(),
            store_api_key: None,
            sign_in_path: default_sign_in_path(),
            register_path: default_register_path(),
            locale: CalendarLocale::default(),
            log_level: default_log_level(),
        }
    }
}

impl RosterConfig {
    fn root_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Cannot determine config directory")?
            .join("roster"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::root_path()?.join("config.toml"))
    }

    /// Directory holding the session slot files.
    pub fn storage_path() -> Result<PathBuf> {
        Ok(Self::root_path()?.join("storage"))
    }

    /// Load config from disk. Returns default config if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(&path, raw)
            .with_context(|| format!("Failed to write config at {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(RosterConfig::parse("").unwrap(), RosterConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = RosterConfig::parse(
            r#"
            store_url = "https://db.example.com"
            store_api_key = "anon-key"
            locale = "indonesian"
            "#,
        )
        .unwrap();

        assert_eq!(config.store_url, "https://db.example.com");
        assert_eq!(config.store_api_key.as_deref(), Some("anon-key"));
        assert_eq!(config.locale, CalendarLocale::Indonesian);
        assert_eq!(config.sign_in_path, "/api/auth/masuk");
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn saved_form_parses_back() {
        let config = RosterConfig {
            store_api_key: Some("k".to_string()),
            ..Default::default()
        };
        let raw = toml::to_string_pretty(&config).unwrap();
        assert_eq!(RosterConfig::parse(&raw).unwrap(), config);
    }
}
