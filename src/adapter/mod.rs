//! Adapters connecting the realtime core to the outside world.
//!
//! - [`inbound::cli`] - The `upsdash` command-line interface
//! - [`outbound::backend`] - WebSocket transport and REST client for the
//!   monitoring backend

pub mod inbound;
pub mod outbound;
