//! Configuration loading.
//!
//! - [`settings`] - Top-level [`Config`] aggregate, TOML parsing and validation
//! - [`realtime`] - Backend endpoint and realtime channel tuning
//! - [`logging`] - Tracing subscriber setup

pub mod logging;
pub mod realtime;
pub mod settings;

pub use logging::LoggingConfig;
pub use realtime::{RealtimeConfig, ServerConfig};
pub use settings::{Config, API_TOKEN_ENV};
