//! Realtime connection and state sync.
//!
//! One [`ConnectionManager`] per process owns the live link to the backend.
//! Any number of consumers attach to it; the link is opened by the first
//! and closed by the last.
//!
//! # Modules
//!
//! - [`activation`] - Consumer reference counting
//! - [`heartbeat`] - Periodic liveness probe
//! - [`reconnect`] - Fixed-interval retry timer
//! - [`message`] - Inbound frame decoding
//! - [`merge`] - Countdown patch merge into the current snapshot
//! - [`dispatch`] - Routes decoded frames to state
//! - [`manager`] - The connection state machine and consumer API

pub mod activation;
pub mod dispatch;
pub mod heartbeat;
pub mod manager;
pub mod merge;
pub mod message;
pub mod notification;
pub mod reconnect;

pub use activation::{Activation, ActivationRefCounter, Deactivation};
pub use dispatch::{MessageDispatcher, TelemetryState};
pub use heartbeat::HeartbeatScheduler;
pub use manager::{ConnectionManager, Consumer};
pub use merge::merge;
pub use message::{decode, CountdownTick, InboundMessage};
pub use notification::Notification;
pub use reconnect::ReconnectPolicy;
