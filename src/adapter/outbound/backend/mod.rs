//! Monitoring backend adapter.
//!
//! - [`WebSocketTransport`] - [`TransportSocket`](crate::port::TransportSocket)
//!   over `tokio-tungstenite`
//! - [`StatusClient`] - one-shot `GET` of the current snapshot

mod client;
mod stream;

pub use client::StatusClient;
pub use stream::{socket_factory, WebSocketTransport};
