//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use crate::config::{Config, RealtimeConfig, ServerConfig};

/// Realtime tuning with the production timings: 5 s retry, 25 s heartbeat.
///
/// Tests run these under paused time, so there is no real waiting.
pub fn realtime() -> RealtimeConfig {
    RealtimeConfig::default()
}

/// A full config pointing at `base_url` with a test token.
pub fn config(base_url: &str) -> Config {
    Config {
        server: ServerConfig {
            base_url: base_url.into(),
            api_token: Some("test-token".into()),
            ..Default::default()
        },
        ..Default::default()
    }
}
