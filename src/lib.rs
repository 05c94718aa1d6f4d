//! upsdash - realtime UPS telemetry client.
//!
//! Keeps one live connection to a UPS monitoring backend per process,
//! shared by any number of consumers, and maintains the latest telemetry
//! snapshot from the frames it pushes.
//!
//! # Architecture
//!
//! - **`realtime`** - The connection manager: consumer reference counting,
//!   fixed-interval reconnect, heartbeat, frame dispatch and snapshot merge
//! - **`port`** - The [`TransportSocket`](port::TransportSocket) trait the
//!   manager drives
//! - **`adapter`** - WebSocket and REST adapters for the backend, and the CLI
//!
//! # Modules
//!
//! - [`config`] - TOML configuration with an environment token override
//! - [`domain`] - Snapshot, event and status types
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use upsdash::adapter::outbound::backend::socket_factory;
//! use upsdash::config::Config;
//! use upsdash::realtime::ConnectionManager;
//!
//! # async fn demo() -> upsdash::error::Result<()> {
//! let config = Config::load("upsdash.toml")?;
//! let manager = ConnectionManager::new(
//!     &config.realtime,
//!     socket_factory(config.server.ws_url()?),
//! )?;
//! let consumer = manager.consumer();
//! // ... read manager.snapshot() ...
//! drop(consumer);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;
pub mod realtime;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
