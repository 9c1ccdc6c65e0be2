//! Configuration sections.

use serde::{Deserialize, Serialize};

/// `[server]` section.
///
/// # Example
///
/// ```
/// use switchyard_config::ServerSection;
///
/// let section = ServerSection {
///     http_addr: "127.0.0.1:3000".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(section.request_timeout_ms, 60_000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// HTTP server bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Per-request deadline in milliseconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// How long a timed-out handler gets to observe cancellation before it
    /// is aborted, in milliseconds.
    #[serde(default = "default_cancel_grace")]
    pub cancel_grace_ms: u64,

    /// Deadline for reading the request body, in milliseconds.
    #[serde(default = "default_body_timeout")]
    pub body_timeout_ms: u64,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Maximum number of concurrent connections. None means unlimited.
    #[serde(default)]
    pub max_connections: Option<usize>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            request_timeout_ms: default_request_timeout(),
            cancel_grace_ms: default_cancel_grace(),
            body_timeout_ms: default_body_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            max_connections: None,
        }
    }
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_request_timeout() -> u64 {
    60_000
}

fn default_cancel_grace() -> u64 {
    100
}

fn default_body_timeout() -> u64 {
    30_000
}

fn default_shutdown_timeout() -> u64 {
    30
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or `EnvFilter` directive (e.g. `info`, `switchyard=debug`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_defaults() {
        let section = ServerSection::default();
        assert_eq!(section.http_addr, "0.0.0.0:8080");
        assert_eq!(section.request_timeout_ms, 60_000);
        assert_eq!(section.cancel_grace_ms, 100);
        assert!(section.max_connections.is_none());
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let section: ServerSection = toml::from_str(r#"http_addr = "127.0.0.1:9000""#).unwrap();
        assert_eq!(section.http_addr, "127.0.0.1:9000");
        assert_eq!(section.request_timeout_ms, 60_000);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = toml::from_str::<ServerSection>("http2_enabled = true");
        assert!(result.is_err());
    }

    #[test]
    fn test_log_format_names() {
        let section: LoggingSection = toml::from_str(r#"format = "pretty""#).unwrap();
        assert_eq!(section.format, LogFormat::Pretty);
        assert!(section.enabled);
        assert_eq!(section.level, "info");
    }
}
