//! Configuration management for chorus.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Provider credentials support `${ENV_VAR}` indirection so keys
//! never have to live in the file itself.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for chorus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Dispatch settings (retries, timeouts, optional deadline)
    pub dispatch: DispatchConfig,

    /// Report output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Per-provider settings
    pub providers: ProvidersConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.chorus.chorus/config.toml
    /// - Linux: ~/.config/chorus/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\chorus\config\config.toml
    ///
    /// Falls back to ~/.chorus/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "chorus", "chorus")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".chorus").join("config.toml")
            })
    }

    /// Get the resolved output directory path (with ~ expansion).
    pub fn output_dir(&self) -> PathBuf {
        let path_str = self.general.output_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.dispatch.retry_attempts, 3);
        assert_eq!(config.dispatch.retry_delay_ms, 1000);
        assert_eq!(config.dispatch.call_timeout_ms, 60_000);
        assert!(config.dispatch.deadline_ms.is_none());
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[dispatch]"));
    }

    #[test]
    fn test_load_from_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.dispatch.retry_attempts = 5;
        std::fs::write(&path, config.to_toml().unwrap()).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.dispatch.retry_attempts, 5);
    }

    #[test]
    fn test_load_from_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[dispatch\nretry_attempts = 3").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_output_dir_expands_tilde() {
        let config = Config::default();
        let dir = config.output_dir();
        assert!(!dir.to_string_lossy().contains('~'));
    }

    #[test]
    fn test_provider_defaults_present() {
        let config = Config::default();
        assert!(config.providers.titan.is_some());
        assert!(config.providers.stability.is_some());
        assert!(config.providers.anthropic.is_some());
        assert!(config.providers.openai.is_some());
    }
}
