//! Backend endpoint and realtime channel configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, Result};

/// Where the monitoring backend lives and how to authenticate against it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Base HTTP(S) URL of the backend, e.g. `http://nas.local:8000`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token. Prefer the `UPSDASH_API_TOKEN` environment variable.
    #[serde(default, skip_serializing)]
    pub api_token: Option<String>,
    /// Path of the realtime WebSocket endpoint.
    #[serde(default = "default_ws_path")]
    pub ws_path: String,
    /// Path of the one-shot status endpoint.
    #[serde(default = "default_status_path")]
    pub status_path: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".into()
}

fn default_ws_path() -> String {
    "/api/ws".into()
}

fn default_status_path() -> String {
    "/api/status".into()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            ws_path: default_ws_path(),
            status_path: default_status_path(),
        }
    }
}

impl ServerConfig {
    /// The configured API token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when no token was configured.
    pub fn token(&self) -> Result<&str> {
        self.api_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingField { field: "api_token" }.into())
    }

    /// Realtime endpoint URL with the token attached as a query parameter.
    ///
    /// `http` maps to `ws` and `https` to `wss`; `ws`/`wss` base URLs are
    /// accepted unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse, uses an unsupported
    /// scheme, or no token is configured.
    pub fn ws_url(&self) -> Result<Url> {
        let token = self.token()?;
        let mut url = Url::parse(&self.base_url)?;
        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => {
                return Err(ConfigError::InvalidValue {
                    field: "base_url",
                    reason: format!("unsupported scheme '{other}'"),
                }
                .into())
            }
        };
        url.set_scheme(scheme).map_err(|()| ConfigError::InvalidValue {
            field: "base_url",
            reason: format!("cannot use scheme '{scheme}'"),
        })?;
        url.set_path(&self.ws_path);
        url.query_pairs_mut().clear().append_pair("token", token);
        Ok(url)
    }

    /// URL of the one-shot status endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse.
    pub fn status_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.set_path(&self.status_path);
        url.set_query(None);
        Ok(url)
    }
}

/// Tuning for the shared realtime connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RealtimeConfig {
    /// Fixed delay before each reconnect attempt (milliseconds).
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
    /// Period of the liveness probe while connected (milliseconds).
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
    /// Token sent as the liveness probe.
    #[serde(default = "default_heartbeat_probe")]
    pub heartbeat_probe: String,
    /// Capacity of the notification broadcast channel.
    #[serde(default = "default_notification_capacity")]
    pub notification_capacity: usize,
    /// Age after which received data is reported as stale (seconds).
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
}

const fn default_reconnect_interval_ms() -> u64 {
    5_000
}

const fn default_heartbeat_interval_ms() -> u64 {
    25_000
}

fn default_heartbeat_probe() -> String {
    "ping".into()
}

const fn default_notification_capacity() -> usize {
    256
}

const fn default_stale_after_secs() -> u64 {
    60
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            reconnect_interval_ms: default_reconnect_interval_ms(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            heartbeat_probe: default_heartbeat_probe(),
            notification_capacity: default_notification_capacity(),
            stale_after_secs: default_stale_after_secs(),
        }
    }
}

impl RealtimeConfig {
    /// Delay before each reconnect attempt.
    #[must_use]
    pub const fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    /// Period of the liveness probe.
    #[must_use]
    pub const fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    /// Age after which data counts as stale.
    #[must_use]
    pub const fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn server(base_url: &str) -> ServerConfig {
        ServerConfig {
            base_url: base_url.into(),
            api_token: Some("secret".into()),
            ..Default::default()
        }
    }

    #[test]
    fn ws_url_maps_http_to_ws() {
        let url = server("http://nas.local:8000").ws_url().unwrap();
        assert_eq!(url.as_str(), "ws://nas.local:8000/api/ws?token=secret");
    }

    #[test]
    fn ws_url_maps_https_to_wss() {
        let url = server("https://ups.example.com").ws_url().unwrap();
        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.path(), "/api/ws");
    }

    #[test]
    fn ws_url_replaces_existing_query() {
        let url = server("http://host/?token=old&x=1").ws_url().unwrap();
        assert_eq!(url.query(), Some("token=secret"));
    }

    #[test]
    fn ws_url_escapes_token() {
        let mut cfg = server("http://host");
        cfg.api_token = Some("a b&c".into());
        let url = cfg.ws_url().unwrap();
        assert_eq!(url.query(), Some("token=a+b%26c"));
    }

    #[test]
    fn ws_url_rejects_unknown_scheme() {
        let result = server("ftp://host").ws_url();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "base_url",
                ..
            }))
        ));
    }

    #[test]
    fn ws_url_requires_token() {
        let mut cfg = server("http://host");
        cfg.api_token = Some(String::new());
        assert!(matches!(
            cfg.ws_url(),
            Err(Error::Config(ConfigError::MissingField { field: "api_token" }))
        ));
    }

    #[test]
    fn status_url_uses_status_path() {
        let url = server("http://nas.local:8000").status_url().unwrap();
        assert_eq!(url.as_str(), "http://nas.local:8000/api/status");
    }

    #[test]
    fn realtime_defaults_match_reference_timings() {
        let cfg = RealtimeConfig::default();
        assert_eq!(cfg.reconnect_interval(), Duration::from_secs(5));
        assert_eq!(cfg.heartbeat_interval(), Duration::from_secs(25));
        assert_eq!(cfg.heartbeat_probe, "ping");
    }
}
