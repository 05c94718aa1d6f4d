//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`transport`] - Mock [`TransportSocket`](crate::port::TransportSocket)
//!   implementations: `ScriptedSocket`, `TransportHarness`.
//! - [`domain`] - Canned realtime frames and snapshots.
//! - [`config`] - Canonical test configurations.

pub mod config;
pub mod domain;
pub mod transport;
