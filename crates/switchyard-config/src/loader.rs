//! Layered configuration loading.
//!
//! Layers apply in order, later ones overriding earlier ones:
//!
//! 1. Defaults (or a preset)
//! 2. A TOML or JSON file
//! 3. `PREFIX__SECTION__KEY` environment variables
//!
//! Validation runs last, in [`ConfigLoader::load`].

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::{ConfigError, LogFormat, SwitchyardConfig};

/// Default prefix for environment overrides.
pub const DEFAULT_ENV_PREFIX: &str = "SWITCHYARD";

/// Configuration loader with layered approach.
///
/// # Example
///
/// ```no_run
/// use switchyard_config::ConfigLoader;
///
/// # fn main() -> Result<(), switchyard_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("switchyard.toml")?
///     .with_env_prefix("SWITCHYARD")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: SwitchyardConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader starting from default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SwitchyardConfig::default(),
            env_prefix: None,
        }
    }

    /// Starts from the development preset.
    ///
    /// ```
    /// use switchyard_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = SwitchyardConfig::development();
        self
    }

    /// Starts from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = SwitchyardConfig::production();
        self
    }

    /// Loads a configuration file. The format follows the extension
    /// (`.toml` or `.json`).
    ///
    /// # Errors
    ///
    /// Fails if the file is missing, unreadable, malformed, or contains
    /// unknown fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        self.config = parse(&content, format)?;
        Ok(self)
    }

    /// Loads a configuration file if it exists.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be used.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration from a string in the named format.
    ///
    /// ```
    /// use switchyard_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[server]\nhttp_addr = \"127.0.0.1:3000\"\n", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.server.http_addr, "127.0.0.1:3000");
    /// ```
    ///
    /// # Errors
    ///
    /// Fails on an unknown format or malformed content.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, format)?;
        Ok(self)
    }

    /// Reads `PREFIX__SECTION__KEY` variables from the process environment
    /// when [`load`](Self::load) runs.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Loads a `.env` file into the process environment, if there is one.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        // A missing .env file is not an error.
        let _ = dotenvy::dotenv();
        self
    }

    /// Applies overrides from explicit `(name, value)` pairs.
    ///
    /// Pairs whose name does not start with `prefix` are ignored, as are
    /// unknown keys under the prefix.
    ///
    /// # Errors
    ///
    /// Fails if a recognised key carries an unparsable value.
    pub fn with_overrides<I, K, V>(mut self, prefix: &str, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let prefix = prefix.to_uppercase();
        for (key, value) in vars {
            self.apply_var(&prefix, key.as_ref(), value.as_ref())?;
        }
        Ok(self)
    }

    /// Applies environment overrides and validates the result.
    ///
    /// # Errors
    ///
    /// Fails on an unparsable override or an invalid final configuration.
    pub fn load(mut self) -> Result<SwitchyardConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self = self.with_overrides(&prefix, env::vars())?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the configuration without overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> SwitchyardConfig {
        self.config
    }

    fn apply_var(&mut self, prefix: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        let Some(rest) = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
        else {
            return Ok(());
        };

        let parts: Vec<&str> = rest.split("__").collect();
        let server = &mut self.config.server;
        let logging = &mut self.config.logging;

        match parts.as_slice() {
            ["SERVER", "HTTP_ADDR"] => server.http_addr = value.to_string(),
            ["SERVER", "REQUEST_TIMEOUT_MS"] => server.request_timeout_ms = number(key, value)?,
            ["SERVER", "CANCEL_GRACE_MS"] => server.cancel_grace_ms = number(key, value)?,
            ["SERVER", "BODY_TIMEOUT_MS"] => server.body_timeout_ms = number(key, value)?,
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                server.shutdown_timeout_secs = number(key, value)?;
            }
            ["SERVER", "MAX_CONNECTIONS"] => {
                server.max_connections = if value.eq_ignore_ascii_case("none") || value.is_empty()
                {
                    None
                } else {
                    Some(number(key, value)?)
                };
            }

            ["LOGGING", "ENABLED"] => {
                logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }

            _ => {}
        }

        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<SwitchyardConfig, ConfigError> {
    match format.to_lowercase().as_str() {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

fn number<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
