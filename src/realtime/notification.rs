//! Discrete notifications broadcast to consumers.

use std::sync::Arc;

use crate::domain::{ConnectionEvent, ConnectionStatus, HookProgress, ServerEvent, Snapshot};

/// A change observed by the connection manager.
///
/// Notifications are a convenience feed; the manager's getters are the
/// source of truth. A lagging receiver may miss notifications but never
/// misses state.
#[derive(Debug, Clone)]
pub enum Notification {
    /// The connection status changed.
    Status(ConnectionStatus),
    /// A transport error was recorded.
    Error(String),
    /// A new snapshot was committed, full or merged.
    Snapshot(Arc<Snapshot>),
    /// The latest hook progress was replaced.
    HookProgress(Arc<HookProgress>),
    /// A source-link event was recorded.
    ConnectionEvent(ConnectionEvent),
    /// Any `event` frame, recognized or not.
    ServerEvent(Arc<ServerEvent>),
    /// The backend reported a configuration change.
    ConfigChanged,
}
