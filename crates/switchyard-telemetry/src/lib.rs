//! Logging setup for Switchyard services.
//!
//! Everything in Switchyard logs through `tracing`. This crate installs the
//! subscriber that decides where those events go:
//!
//! - JSON lines for production, pretty output for development
//! - `EnvFilter` directives for levels (`info`, `switchyard_server=debug`)
//! - Built from the `[logging]` config section
//!
//! # Example
//!
//! ```rust,ignore
//! use switchyard_config::ConfigLoader;
//! use switchyard_telemetry::{init_logging, LogConfig};
//!
//! let config = ConfigLoader::new().load()?;
//! init_logging(&LogConfig::from(&config.logging))?;
//! ```

#![doc(html_root_url = "https://docs.rs/switchyard-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
