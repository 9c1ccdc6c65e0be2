//! Typed configuration for Switchyard services.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides (`SWITCHYARD__SECTION__KEY`)
//! - Optional `.env` loading via `dotenvy`
//! - Strict parsing: unknown fields are errors
//!
//! # Example
//!
//! ```no_run
//! use switchyard_config::ConfigLoader;
//!
//! # fn main() -> Result<(), switchyard_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()
//!     .with_optional_file("switchyard.toml")?
//!     .with_env_prefix("SWITCHYARD")
//!     .load()?;
//!
//! println!("listening on {}", config.server.http_addr);
//! # Ok(())
//! # }
//! ```
//!
//! # File format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! request_timeout_ms = 60000
//! cancel_grace_ms = 100
//! body_timeout_ms = 30000
//! shutdown_timeout_secs = 30
//! max_connections = 10000
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```

#![doc(html_root_url = "https://docs.rs/switchyard-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::SwitchyardConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{LogFormat, LoggingSection, ServerSection};
