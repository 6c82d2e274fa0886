//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SNAPSEEK_*)
//! 2. TOML config file (if SNAPSEEK_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! Rate-limit gaps, cache TTLs, and the title-cache capacity are fixed
//! constants of the engine, deliberately not configurable here.

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::model::ArchiveService;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SNAPSEEK_*)
/// 2. TOML config file (if SNAPSEEK_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Which archive service to query.
    ///
    /// Set via SNAPSEEK_SERVICE environment variable (wayback|ghostarchive).
    #[serde(default = "default_service")]
    pub service: ArchiveService,

    /// Maximum snapshots to return per lookup (1-300).
    ///
    /// Set via SNAPSEEK_MAX_SNAPSHOTS environment variable.
    #[serde(default = "default_max_snapshots")]
    pub max_snapshots: usize,

    /// Provider request timeout in milliseconds.
    ///
    /// Set via SNAPSEEK_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Title-fetch timeout in milliseconds (1-60s).
    ///
    /// Set via SNAPSEEK_TITLE_TIMEOUT_MS environment variable.
    #[serde(default = "default_title_timeout_ms")]
    pub title_timeout_ms: u64,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via SNAPSEEK_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_service() -> ArchiveService {
    ArchiveService::Wayback
}

fn default_max_snapshots() -> usize {
    50
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_title_timeout_ms() -> u64 {
    5_000
}

fn default_user_agent() -> String {
    "snapseek/0.1".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service: default_service(),
            max_snapshots: default_max_snapshots(),
            timeout_ms: default_timeout_ms(),
            title_timeout_ms: default_title_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl AppConfig {
    /// Provider request timeout as a Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Title-fetch timeout as a Duration.
    pub fn title_timeout(&self) -> Duration {
        Duration::from_millis(self.title_timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SNAPSEEK_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SNAPSEEK_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.service, ArchiveService::Wayback);
        assert_eq!(config.max_snapshots, 50);
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.title_timeout_ms, 5_000);
        assert_eq!(config.user_agent, "snapseek/0.1");
    }

    #[test]
    fn test_timeout_durations() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(10_000));
        assert_eq!(config.title_timeout(), Duration::from_millis(5_000));
    }

    #[test]
    fn test_service_deserializes_from_string() {
        let config: AppConfig = serde_json::from_str(r#"{"service": "ghostarchive"}"#).unwrap();
        assert_eq!(config.service, ArchiveService::GhostArchive);
    }
}
