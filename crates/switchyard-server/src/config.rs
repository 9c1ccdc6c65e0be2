//! Server configuration types.
//!
//! # Example
//!
//! ```rust
//! use switchyard_server::ServerConfig;
//! use std::time::Duration;
//!
//! let config = ServerConfig::builder()
//!     .http_addr("127.0.0.1:3000")
//!     .request_timeout(Duration::from_secs(5))
//!     .build();
//!
//! assert_eq!(config.http_addr(), "127.0.0.1:3000");
//! assert_eq!(config.dispatch().request_timeout, Duration::from_secs(5));
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use switchyard_config::SwitchyardConfig;

use crate::dispatch::DispatchConfig;

/// Default HTTP bind address.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default deadline for reading a request body, in seconds.
pub const DEFAULT_BODY_TIMEOUT_SECS: u64 = 30;

/// Runtime server configuration.
///
/// Use [`ServerConfig::builder()`] to construct instances, or convert a
/// loaded [`SwitchyardConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP server bind address (e.g., "0.0.0.0:8080")
    http_addr: String,

    /// Deadline and cancellation settings for each request
    dispatch: DispatchConfig,

    /// Deadline for collecting the request body
    body_timeout: Duration,

    /// How long to wait for in-flight connections during shutdown
    shutdown_timeout: Duration,

    /// Maximum concurrent connections (None = unlimited)
    max_connections: Option<usize>,
}

impl ServerConfig {
    /// Creates a new server configuration builder.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Returns the HTTP bind address.
    #[must_use]
    pub fn http_addr(&self) -> &str {
        &self.http_addr
    }

    /// Parses and returns the HTTP address as a `SocketAddr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be parsed.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.http_addr.parse()
    }

    /// Returns the per-request dispatch settings.
    #[must_use]
    pub fn dispatch(&self) -> DispatchConfig {
        self.dispatch
    }

    /// Returns the body collection deadline.
    #[must_use]
    pub fn body_timeout(&self) -> Duration {
        self.body_timeout
    }

    /// Returns the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Returns the maximum number of concurrent connections, if configured.
    #[must_use]
    pub fn max_connections(&self) -> Option<usize> {
        self.max_connections
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl From<&SwitchyardConfig> for ServerConfig {
    fn from(config: &SwitchyardConfig) -> Self {
        let server = &config.server;
        Self::builder()
            .http_addr(server.http_addr.clone())
            .request_timeout(Duration::from_millis(server.request_timeout_ms))
            .cancel_grace(Duration::from_millis(server.cancel_grace_ms))
            .body_timeout(Duration::from_millis(server.body_timeout_ms))
            .shutdown_timeout(Duration::from_secs(server.shutdown_timeout_secs))
            .max_connections(server.max_connections)
            .build()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    http_addr: String,
    dispatch: DispatchConfig,
    body_timeout: Duration,
    shutdown_timeout: Duration,
    max_connections: Option<usize>,
}

impl ServerConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            dispatch: DispatchConfig::default(),
            body_timeout: Duration::from_secs(DEFAULT_BODY_TIMEOUT_SECS),
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            max_connections: None,
        }
    }

    /// Sets the HTTP bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.http_addr = addr.into();
        self
    }

    /// Sets the per-request deadline.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.dispatch.request_timeout = timeout;
        self
    }

    /// Sets how long a timed-out handler may keep running after its
    /// cancellation signal fires.
    #[must_use]
    pub fn cancel_grace(mut self, grace: Duration) -> Self {
        self.dispatch.cancel_grace = grace;
        self
    }

    /// Sets the body collection deadline.
    #[must_use]
    pub fn body_timeout(mut self, timeout: Duration) -> Self {
        self.body_timeout = timeout;
        self
    }

    /// Sets the graceful shutdown timeout.
    ///
    /// This is the maximum time the server will wait for in-flight
    /// connections to finish during shutdown.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Sets the maximum number of concurrent connections.
    ///
    /// Set to `None` for unlimited connections (default).
    #[must_use]
    pub fn max_connections(mut self, max: Option<usize>) -> Self {
        self.max_connections = max;
        self
    }

    /// Builds the [`ServerConfig`] with the configured values.
    #[must_use]
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            http_addr: self.http_addr,
            dispatch: self.dispatch,
            body_timeout: self.body_timeout,
            shutdown_timeout: self.shutdown_timeout,
            max_connections: self.max_connections,
        }
    }
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
