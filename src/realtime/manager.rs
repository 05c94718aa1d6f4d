//! The process-wide realtime connection.
//!
//! [`ConnectionManager`] owns one socket at a time, however many consumers
//! are attached. All of its state sits behind a single lock and every
//! transition (attach, detach, connect, disconnect, opened, frame, error,
//! closed, retry fired) runs to completion while holding it, so transitions
//! are applied one at a time in the order they happen.
//!
//! # State machine
//!
//! ```text
//!              connect()            opened
//! Disconnected ─────────► Connecting ──────► Connected
//!      ▲                      │                  │
//!      │        closed        │      closed      │
//!      └──────────────────────┴──────────────────┘
//!      (retry after a fixed interval while consumers remain attached)
//! ```
//!
//! `disconnect()` from any state lands in a manual `Disconnected` with no
//! retry pending.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::activation::{Activation, ActivationRefCounter, Deactivation};
use super::dispatch::{MessageDispatcher, TelemetryState};
use super::heartbeat::HeartbeatScheduler;
use super::notification::Notification;
use super::reconnect::ReconnectPolicy;
use crate::config::RealtimeConfig;
use crate::domain::{ConnectionEvent, ConnectionStatus, HookProgress, Snapshot};
use crate::error::{Error, Result};
use crate::port::{SocketFactory, TransportEvent, TransportSocket};

/// Queue depth for frames waiting to be written to the socket.
const OUTBOUND_CAPACITY: usize = 16;

/// Shared handle to the realtime connection. Cloning is cheap; all clones
/// drive the same connection.
#[derive(Clone)]
pub struct ConnectionManager {
    shared: Arc<Shared>,
}

struct Shared {
    factory: SocketFactory,
    runtime: Handle,
    dispatcher: MessageDispatcher,
    notifications: broadcast::Sender<Notification>,
    inner: Mutex<Inner>,
}

struct Inner {
    status: ConnectionStatus,
    manual_stop: bool,
    consumers: ActivationRefCounter,
    session: Option<SessionHandle>,
    generation: u64,
    error: Option<String>,
    telemetry: TelemetryState,
    heartbeat: HeartbeatScheduler,
    reconnect: ReconnectPolicy,
}

/// The manager's side of a running session task.
struct SessionHandle {
    generation: u64,
    cancel: CancellationToken,
    outbound: mpsc::Sender<String>,
}

impl Inner {
    fn is_current(&self, generation: u64) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.generation == generation)
    }
}

impl ConnectionManager {
    /// Create a manager on the current tokio runtime.
    ///
    /// Nothing connects until the first consumer attaches or
    /// [`connect`](Self::connect) is called.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] when called outside a tokio runtime.
    pub fn new(config: &RealtimeConfig, factory: SocketFactory) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| Error::Runtime(e.to_string()))?;
        Ok(Self::with_runtime(config, factory, runtime))
    }

    /// Create a manager that spawns its tasks on `runtime`.
    pub fn with_runtime(config: &RealtimeConfig, factory: SocketFactory, runtime: Handle) -> Self {
        let (notifications, _) = broadcast::channel(config.notification_capacity.max(1));
        let inner = Inner {
            status: ConnectionStatus::Disconnected,
            manual_stop: false,
            consumers: ActivationRefCounter::new(),
            session: None,
            generation: 0,
            error: None,
            telemetry: TelemetryState::default(),
            heartbeat: HeartbeatScheduler::new(
                config.heartbeat_interval(),
                config.heartbeat_probe.clone(),
                runtime.clone(),
            ),
            reconnect: ReconnectPolicy::new(config.reconnect_interval(), runtime.clone()),
        };
        Self {
            shared: Arc::new(Shared {
                factory,
                runtime,
                dispatcher: MessageDispatcher::new(),
                notifications,
                inner: Mutex::new(inner),
            }),
        }
    }

    /// Register a consumer. The first consumer opens the connection.
    pub fn attach(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.consumers.attach() == Activation::Activate {
            debug!("First consumer attached");
            self.shared.connect_locked(&mut inner);
        }
    }

    /// Release a consumer. The last consumer closes the connection.
    ///
    /// A detach without a matching attach is logged and ignored.
    pub fn detach(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.consumers.detach() == Deactivation::Deactivate {
            debug!("Last consumer detached");
            self.shared.disconnect_locked(&mut inner);
        }
    }

    /// Attach and return a guard that detaches when dropped.
    #[must_use = "dropping the guard detaches immediately"]
    pub fn consumer(&self) -> Consumer {
        self.attach();
        Consumer {
            manager: self.clone(),
        }
    }

    /// Open the connection unless one is already open or opening.
    pub fn connect(&self) {
        let mut inner = self.shared.inner.lock();
        self.shared.connect_locked(&mut inner);
    }

    /// Close the connection and cancel pending timers. Idempotent.
    pub fn disconnect(&self) {
        let mut inner = self.shared.inner.lock();
        self.shared.disconnect_locked(&mut inner);
    }

    /// Receive discrete change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.shared.notifications.subscribe()
    }

    /// Current connection status.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.shared.inner.lock().status
    }

    /// True while the socket is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.status().is_connected()
    }

    /// True after [`disconnect`](Self::disconnect) until the next connect.
    #[must_use]
    pub fn is_manually_stopped(&self) -> bool {
        self.shared.inner.lock().manual_stop
    }

    /// Latest snapshot, absent until the first full update arrives.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.shared.inner.lock().telemetry.snapshot()
    }

    /// Last transport error message, cleared on a successful open.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.shared.inner.lock().error.clone()
    }

    /// True when a transport error is recorded.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.shared.inner.lock().error.is_some()
    }

    /// Latest pre-shutdown hook progress.
    #[must_use]
    pub fn hook_progress(&self) -> Option<Arc<HookProgress>> {
        self.shared.inner.lock().telemetry.hook_progress()
    }

    /// Latest source-link transition reported by the backend.
    #[must_use]
    pub fn connection_event(&self) -> Option<ConnectionEvent> {
        self.shared.inner.lock().telemetry.connection_event()
    }

    /// When the last data frame was accepted.
    #[must_use]
    pub fn last_received(&self) -> Option<Instant> {
        self.shared.inner.lock().telemetry.last_received()
    }

    /// Time since the last data frame, if any has arrived.
    #[must_use]
    pub fn data_age(&self) -> Option<Duration> {
        self.last_received().map(|at| at.elapsed())
    }

    /// True when no data has arrived or the last data is older than
    /// `threshold`.
    #[must_use]
    pub fn is_stale(&self, threshold: Duration) -> bool {
        self.data_age().map_or(true, |age| age > threshold)
    }

    /// Number of attached consumers.
    #[must_use]
    pub fn ref_count(&self) -> usize {
        self.shared.inner.lock().consumers.count()
    }

    /// True while a retry timer is armed.
    #[must_use]
    pub fn reconnect_pending(&self) -> bool {
        self.shared.inner.lock().reconnect.is_pending()
    }

    /// True while the liveness probe task is alive.
    #[must_use]
    pub fn heartbeat_running(&self) -> bool {
        self.shared.inner.lock().heartbeat.is_running()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("ConnectionManager")
            .field("status", &inner.status)
            .field("consumers", &inner.consumers.count())
            .field("generation", &inner.generation)
            .finish_non_exhaustive()
    }
}

impl Shared {
    fn notify(&self, notification: Notification) {
        // No receivers is fine; the getters stay authoritative.
        let _ = self.notifications.send(notification);
    }

    fn set_status(&self, inner: &mut Inner, status: ConnectionStatus) {
        if inner.status != status {
            inner.status = status;
            self.notify(Notification::Status(status));
        }
    }

    fn connect_locked(self: &Arc<Self>, inner: &mut Inner) {
        if inner.status.is_active() {
            debug!(status = %inner.status, "Connect ignored");
            return;
        }

        inner.reconnect.cancel();
        inner.manual_stop = false;
        inner.generation += 1;
        let generation = inner.generation;
        let cancel = CancellationToken::new();
        let (outbound, outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);
        inner.session = Some(SessionHandle {
            generation,
            cancel: cancel.clone(),
            outbound,
        });
        self.set_status(inner, ConnectionStatus::Connecting);

        let socket = (self.factory)();
        info!(
            generation,
            transport = socket.transport_name(),
            "Opening realtime connection"
        );
        self.runtime.spawn(run_session(
            Arc::downgrade(self),
            generation,
            socket,
            outbound_rx,
            cancel,
        ));
    }

    fn disconnect_locked(&self, inner: &mut Inner) {
        inner.reconnect.cancel();
        inner.heartbeat.stop();
        if let Some(session) = inner.session.take() {
            session.cancel.cancel();
            info!(generation = session.generation, "Closing realtime connection");
        }
        inner.manual_stop = true;
        self.set_status(inner, ConnectionStatus::Disconnected);
    }

    fn on_open(&self, generation: u64) {
        let mut inner = self.inner.lock();
        if !inner.is_current(generation) {
            return;
        }

        info!(generation, "Realtime connection open");
        self.set_status(&mut inner, ConnectionStatus::Connected);
        inner.error = None;
        inner.reconnect.reset();
        if let Some(outbound) = inner.session.as_ref().map(|s| s.outbound.clone()) {
            inner.heartbeat.start(outbound);
        }
    }

    fn on_frame(&self, generation: u64, text: &str) {
        let mut inner = self.inner.lock();
        if !inner.is_current(generation) {
            return;
        }

        let notifications = self
            .dispatcher
            .dispatch(&mut inner.telemetry, text, Instant::now());
        for notification in notifications {
            self.notify(notification);
        }
    }

    fn on_error(&self, generation: u64, message: String) {
        let mut inner = self.inner.lock();
        if !inner.is_current(generation) {
            return;
        }

        warn!(generation, error = %message, "Realtime transport error");
        inner.error = Some(message.clone());
        self.notify(Notification::Error(message));
    }

    fn on_close(self: &Arc<Self>, generation: u64, reason: &str) {
        let mut inner = self.inner.lock();
        if !inner.is_current(generation) {
            return;
        }

        inner.session = None;
        inner.heartbeat.stop();
        self.set_status(&mut inner, ConnectionStatus::Disconnected);

        if inner.consumers.is_active() {
            warn!(
                generation,
                reason,
                consumers = inner.consumers.count(),
                "Realtime connection closed, will reconnect"
            );
            let weak = Arc::downgrade(self);
            inner.reconnect.schedule_retry(move |id| {
                if let Some(shared) = weak.upgrade() {
                    shared.on_retry(id);
                }
            });
        } else {
            info!(generation, reason, "Realtime connection closed");
            inner.error = None;
        }
    }

    fn on_retry(self: &Arc<Self>, id: u64) {
        let mut inner = self.inner.lock();
        if !inner.reconnect.acknowledge(id) {
            return;
        }
        if !inner.consumers.is_active() || inner.manual_stop {
            debug!("Retry fired with no consumers, staying disconnected");
            return;
        }
        self.connect_locked(&mut inner);
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Some(session) = self.inner.get_mut().session.take() {
            session.cancel.cancel();
        }
    }
}

enum Step {
    Cancelled,
    Send(String),
    Event(Option<TransportEvent>),
}

/// Drive one socket from open to close, reporting each transition back to
/// the manager. Reports from a superseded session are ignored there.
async fn run_session(
    shared: Weak<Shared>,
    generation: u64,
    mut socket: Box<dyn TransportSocket>,
    mut outbound: mpsc::Receiver<String>,
    cancel: CancellationToken,
) {
    let opened = tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        result = socket.connect() => Some(result),
    };
    let Some(opened) = opened else {
        socket.close().await;
        debug!(generation, "Session cancelled while connecting");
        return;
    };

    match opened {
        Ok(()) => match shared.upgrade() {
            Some(shared) => shared.on_open(generation),
            None => {
                socket.close().await;
                return;
            }
        },
        Err(e) => {
            if let Some(shared) = shared.upgrade() {
                shared.on_error(generation, format!("connection failed: {e}"));
                shared.on_close(generation, "connection failed");
            }
            return;
        }
    }

    loop {
        let step = tokio::select! {
            biased;
            () = cancel.cancelled() => Step::Cancelled,
            Some(text) = outbound.recv() => Step::Send(text),
            event = socket.next_event() => Step::Event(event),
        };

        let Some(manager) = shared.upgrade() else {
            socket.close().await;
            return;
        };

        match step {
            Step::Cancelled => {
                socket.close().await;
                debug!(generation, "Session cancelled");
                return;
            }
            Step::Send(text) => {
                if let Err(e) = socket.send_text(text).await {
                    debug!(generation, error = %e, "Outbound frame not sent");
                }
            }
            Step::Event(Some(TransportEvent::Frame(text))) => manager.on_frame(generation, &text),
            Step::Event(Some(TransportEvent::Error(message))) => {
                manager.on_error(generation, message);
            }
            Step::Event(Some(TransportEvent::Closed { reason })) => {
                manager.on_close(generation, &reason);
                return;
            }
            Step::Event(None) => {
                manager.on_close(generation, "stream ended");
                return;
            }
        }
    }
}

/// An attached consumer. Detaches when dropped.
#[derive(Debug)]
pub struct Consumer {
    manager: ConnectionManager,
}

impl Consumer {
    #[must_use]
    pub fn manager(&self) -> &ConnectionManager {
        &self.manager
    }
}

impl Drop for Consumer {
    fn drop(&mut self) {
        self.manager.detach();
    }
}
