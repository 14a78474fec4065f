//! Configuration management for babylog.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "babylog";

/// Cached profile roster file name.
const PROFILES_FILE_NAME: &str = "profiles.json";

/// Remembered login session file name.
const SESSION_FILE_NAME: &str = "session.json";

/// Default base URL of the hosted event store.
const DEFAULT_BASE_URL: &str = "https://baby-log-server-prod.onrender.com/v1/babies";

/// Default base URL for the liveness probe.
const DEFAULT_HEALTH_URL: &str = "https://baby-log-server-prod.onrender.com";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `BABYLOG_`)
/// 2. TOML config file at `~/.config/babylog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote API configuration.
    pub api: ApiConfig,
    /// Local cache configuration.
    pub cache: CacheConfig,
    /// Stopwatch display configuration.
    pub timer: TimerConfig,
}

/// Remote API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the profile/event store.
    pub base_url: String,
    /// Base URL of the health endpoint.
    pub health_url: String,
}

/// Local cache configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding the cached roster and session documents.
    /// Defaults to `~/.local/share/babylog`.
    pub data_dir: Option<PathBuf>,
}

/// Stopwatch display configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Interval between stopwatch display refreshes in milliseconds.
    ///
    /// Display cadence only; elapsed time is always wall-clock derived.
    pub refresh_interval_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            health_url: DEFAULT_HEALTH_URL.to_string(),
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 250,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `BABYLOG_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("BABYLOG_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("api.base_url", &self.api.base_url),
            ("api.health_url", &self.api.health_url),
        ] {
            if url.trim().is_empty() {
                return Err(Error::ConfigValidation {
                    message: format!("{name} must not be empty"),
                });
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(Error::ConfigValidation {
                    message: format!("{name} must be an http(s) URL, got: {url}"),
                });
            }
        }

        if self.timer.refresh_interval_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "timer.refresh_interval_ms must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the data directory, resolving the default if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.cache
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Path of the cached profile roster document.
    #[must_use]
    pub fn profiles_path(&self) -> PathBuf {
        self.data_dir().join(PROFILES_FILE_NAME)
    }

    /// Path of the remembered session document.
    #[must_use]
    pub fn session_path(&self) -> PathBuf {
        self.data_dir().join(SESSION_FILE_NAME)
    }

    /// Get the stopwatch display refresh interval as a Duration.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.timer.refresh_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.health_url, DEFAULT_HEALTH_URL);
        assert!(config.cache.data_dir.is_none());
        assert_eq!(config.timer.refresh_interval_ms, 250);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_base_url() {
        let mut config = Config::default();
        config.api.base_url = String::new();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("api.base_url"));
    }

    #[test]
    fn test_validate_non_http_url() {
        let mut config = Config::default();
        config.api.health_url = "ftp://example.com".to_string();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("http(s)"));
    }

    #[test]
    fn test_validate_zero_refresh_interval() {
        let mut config = Config::default();
        config.timer.refresh_interval_ms = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("refresh_interval_ms"));
    }

    #[test]
    fn test_data_dir_default() {
        let config = Config::default();
        assert!(config.data_dir().to_string_lossy().contains("babylog"));
    }

    #[test]
    fn test_data_dir_custom() {
        let mut config = Config::default();
        config.cache.data_dir = Some(PathBuf::from("/custom/cache"));

        assert_eq!(config.data_dir(), PathBuf::from("/custom/cache"));
        assert_eq!(
            config.profiles_path(),
            PathBuf::from("/custom/cache/profiles.json")
        );
        assert_eq!(
            config.session_path(),
            PathBuf::from("/custom/cache/session.json")
        );
    }

    #[test]
    fn test_refresh_interval() {
        let config = Config::default();
        assert_eq!(config.refresh_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("babylog"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());

        let config = result.unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_serialize() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("base_url"));
        assert!(json.contains("refresh_interval_ms"));
    }

    #[test]
    fn test_api_config_deserialize() {
        let json = r#"{"base_url": "http://localhost:4000/v1/babies"}"#;
        let api: ApiConfig = serde_json::from_str(json).unwrap();
        assert_eq!(api.base_url, "http://localhost:4000/v1/babies");
        // Unset fields fall back to defaults
        assert_eq!(api.health_url, DEFAULT_HEALTH_URL);
    }
}
