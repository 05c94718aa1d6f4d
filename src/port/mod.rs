//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Available Ports
//!
//! - [`TransportSocket`] - One duplex connection to the backend's realtime
//!   endpoint, produced on demand by a [`SocketFactory`]

pub mod outbound;

pub use outbound::transport::{SocketFactory, TransportEvent, TransportSocket};
