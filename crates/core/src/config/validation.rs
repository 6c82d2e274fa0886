//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_snapshots` is outside 1-300
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `title_timeout_ms` is outside 1-60 seconds
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_snapshots == 0 {
            return Err(ConfigError::Invalid {
                field: "max_snapshots".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.max_snapshots > 300 {
            return Err(ConfigError::Invalid {
                field: "max_snapshots".into(),
                reason: "must not exceed 300".into(),
            });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.title_timeout_ms < 1_000 {
            return Err(ConfigError::Invalid {
                field: "title_timeout_ms".into(),
                reason: "must be at least 1 second (1000ms)".into(),
            });
        }
        if self.title_timeout_ms > 60_000 {
            return Err(ConfigError::Invalid {
                field: "title_timeout_ms".into(),
                reason: "must not exceed 60 seconds (60000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_max_snapshots_zero() {
        let config = AppConfig { max_snapshots: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_snapshots"));
    }

    #[test]
    fn test_validate_max_snapshots_exceeds_limit() {
        let config = AppConfig { max_snapshots: 301, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_snapshots"));
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_title_timeout_bounds() {
        let config = AppConfig { title_timeout_ms: 500, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "title_timeout_ms"));

        let config = AppConfig { title_timeout_ms: 61_000, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "title_timeout_ms"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig { max_snapshots: 1, timeout_ms: 100, title_timeout_ms: 1_000, ..Default::default() };
        assert!(config.validate().is_ok());

        let config =
            AppConfig { max_snapshots: 300, timeout_ms: 300_000, title_timeout_ms: 60_000, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
