//! Telemetry error types.

use thiserror::Error;

/// Errors from setting up telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The log level or filter directive does not parse.
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    /// A global subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::LoggingInit("already set".to_string());
        assert_eq!(err.to_string(), "Failed to initialize logging: already set");

        let err = TelemetryError::InvalidFilter("=x".to_string());
        assert!(err.to_string().starts_with("Invalid log filter"));
    }
}
