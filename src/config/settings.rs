//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file with an environment variable
//! override for the API token.
//!
//! # Example
//!
//! ```no_run
//! use upsdash::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("upsdash.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::realtime::{RealtimeConfig, ServerConfig};
use crate::error::{ConfigError, Result};

/// Environment variable that supplies the backend API token.
pub const API_TOKEN_ENV: &str = "UPSDASH_API_TOKEN";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Backend location and credentials.
    #[serde(default)]
    pub server: ServerConfig,

    /// Realtime connection timings.
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// The API token is taken from `UPSDASH_API_TOKEN` when set, otherwise
    /// from `server.api_token` in the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let token = std::env::var(API_TOKEN_ENV).ok();
        Self::parse_toml_with_token(content, token)
    }

    /// Parse configuration from TOML content with an explicit token override.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml_with_token(content: &str, token: Option<String>) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if let Some(token) = token.filter(|t| !t.is_empty()) {
            config.server.api_token = Some(token);
        }

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// malformed, or validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.server.base_url.is_empty() {
            return Err(ConfigError::MissingField { field: "base_url" }.into());
        }
        if !self.server.ws_path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "ws_path",
                reason: "must start with '/'".to_string(),
            }
            .into());
        }
        if !self.server.status_path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "status_path",
                reason: "must start with '/'".to_string(),
            }
            .into());
        }
        // Surfaces scheme, parse, and missing-token problems at load time.
        self.server.ws_url()?;

        if self.realtime.reconnect_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reconnect_interval_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.realtime.heartbeat_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "heartbeat_interval_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.realtime.heartbeat_probe.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "heartbeat_probe",
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        if self.realtime.notification_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "notification_capacity",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.realtime.stale_after_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "stale_after_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
