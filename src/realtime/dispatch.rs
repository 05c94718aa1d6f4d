//! Inbound frame dispatch.
//!
//! [`MessageDispatcher`] decodes a frame and applies it to the
//! [`TelemetryState`] owned by the connection manager. Dispatch runs inside
//! the connection's message loop, so it never fails: bad frames are logged
//! and dropped.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, error, info, trace};

use super::merge::merge;
use super::message::{decode, InboundMessage};
use super::notification::Notification;
use crate::domain::{ConnectionEvent, HookProgress, Snapshot, SourceLinkEvent};

/// Telemetry received over the realtime channel.
#[derive(Debug, Clone, Default)]
pub struct TelemetryState {
    snapshot: Option<Arc<Snapshot>>,
    hook_progress: Option<Arc<HookProgress>>,
    connection_event: Option<ConnectionEvent>,
    last_received: Option<Instant>,
}

impl TelemetryState {
    /// Latest committed snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.clone()
    }

    /// Latest hook progress record.
    #[must_use]
    pub fn hook_progress(&self) -> Option<Arc<HookProgress>> {
        self.hook_progress.clone()
    }

    /// Latest source-link transition.
    #[must_use]
    pub fn connection_event(&self) -> Option<ConnectionEvent> {
        self.connection_event.clone()
    }

    /// When the last data frame was accepted.
    #[must_use]
    pub const fn last_received(&self) -> Option<Instant> {
        self.last_received
    }
}

/// Routes decoded frames to state mutations by message kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageDispatcher;

impl MessageDispatcher {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decode `text` and apply it to `state`.
    ///
    /// Returns the notifications produced. Undecodable frames produce none.
    pub fn dispatch(
        &self,
        state: &mut TelemetryState,
        text: &str,
        now: Instant,
    ) -> Vec<Notification> {
        match decode(text) {
            Ok(message) => {
                trace!(kind = message.kind(), "Dispatching frame");
                self.apply(state, message, now)
            }
            Err(e) => {
                error!(error = %e, bytes = text.len(), "Dropping inbound frame");
                Vec::new()
            }
        }
    }

    /// Apply an already-decoded message to `state`.
    pub fn apply(
        &self,
        state: &mut TelemetryState,
        message: InboundMessage,
        now: Instant,
    ) -> Vec<Notification> {
        match message {
            InboundMessage::StatusUpdate(snapshot) => {
                let snapshot = Arc::new(snapshot);
                state.snapshot = Some(Arc::clone(&snapshot));
                state.last_received = Some(now);
                vec![Notification::Snapshot(snapshot)]
            }
            InboundMessage::ShutdownCountdown(tick) => {
                let Some(base) = state.snapshot.as_deref() else {
                    debug!(
                        remaining_seconds = ?tick.remaining_seconds,
                        "Countdown tick before first snapshot, dropped"
                    );
                    return Vec::new();
                };
                let merged = Arc::new(merge(base, &tick.to_patch()));
                state.snapshot = Some(Arc::clone(&merged));
                state.last_received = Some(now);
                vec![Notification::Snapshot(merged)]
            }
            InboundMessage::HookProgress(progress) => {
                let progress = Arc::new(progress);
                state.hook_progress = Some(Arc::clone(&progress));
                vec![Notification::HookProgress(progress)]
            }
            InboundMessage::Event(event) => {
                let mut out = Vec::with_capacity(2);
                if let Some(kind) = SourceLinkEvent::from_event_type(&event.event_type) {
                    info!(event_type = %kind, message = %event.message, "Source link event");
                    let recorded = ConnectionEvent {
                        kind,
                        message: event.message.clone(),
                        received_at: now,
                    };
                    state.connection_event = Some(recorded.clone());
                    out.push(Notification::ConnectionEvent(recorded));
                }
                out.push(Notification::ServerEvent(Arc::new(event)));
                out
            }
            InboundMessage::Heartbeat => {
                trace!("Heartbeat received");
                Vec::new()
            }
            InboundMessage::ConfigChanged => {
                debug!("Backend configuration changed");
                vec![Notification::ConfigChanged]
            }
        }
    }
}
