//! Root configuration type.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, LoggingSection, ServerSection};

/// Complete Switchyard service configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use switchyard_config::SwitchyardConfig;
///
/// let config = SwitchyardConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct SwitchyardConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl SwitchyardConfig {
    /// Checks values that deserialize fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.http_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_ms",
                "must be greater than zero",
            ));
        }

        if self.server.body_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.body_timeout_ms",
                "must be greater than zero",
            ));
        }

        if self.server.max_connections == Some(0) {
            return Err(ConfigError::invalid_value(
                "server.max_connections",
                "must be greater than zero when set",
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "logging.level",
                "must not be empty",
            ));
        }

        Ok(())
    }

    /// Local development preset: pretty debug logs.
    #[must_use]
    pub fn development() -> Self {
        Self {
            server: ServerSection {
                http_addr: "127.0.0.1:8080".to_string(),
                ..ServerSection::default()
            },
            logging: LoggingSection {
                enabled: true,
                level: "debug".to_string(),
                format: LogFormat::Pretty,
            },
        }
    }

    /// Production preset: JSON logs at `info`.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }
}
