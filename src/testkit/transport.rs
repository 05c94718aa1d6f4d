//! Mock [`TransportSocket`] implementations for testing.
//!
//! - [`ScriptedSocket`] - Pre-loaded connect result and event queue. Stays
//!   open and quiet once the queue is drained.
//!   Best for: single-session dispatch tests.
//!
//! - [`TransportHarness`] - Factory of channel-backed sockets with an
//!   external control handle.
//!   Best for: connection manager tests that close, fail and reconnect.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::port::{SocketFactory, TransportEvent, TransportSocket};

// ---------------------------------------------------------------------------
// ScriptedSocket
// ---------------------------------------------------------------------------

/// A socket with a scripted connect result and a fixed event queue.
pub struct ScriptedSocket {
    connect_result: Option<Result<()>>,
    events: VecDeque<TransportEvent>,
    sent: Arc<Mutex<Vec<String>>>,
    open: bool,
}

impl ScriptedSocket {
    pub fn new() -> Self {
        Self {
            connect_result: None,
            events: VecDeque::new(),
            sent: Arc::new(Mutex::new(Vec::new())),
            open: false,
        }
    }

    pub fn with_connect_result(mut self, result: Result<()>) -> Self {
        self.connect_result = Some(result);
        self
    }

    pub fn with_events(mut self, events: Vec<TransportEvent>) -> Self {
        self.events = events.into();
        self
    }

    /// Frames written to the socket, shared so tests can inspect them after
    /// the socket is moved into a factory.
    pub fn sent(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.sent)
    }
}

impl Default for ScriptedSocket {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransportSocket for ScriptedSocket {
    async fn connect(&mut self) -> Result<()> {
        let result = self.connect_result.take().unwrap_or(Ok(()));
        self.open = result.is_ok();
        result
    }

    async fn send_text(&mut self, text: String) -> Result<()> {
        if !self.open {
            return Err(Error::Connection("not open".into()));
        }
        self.sent.lock().push(text);
        Ok(())
    }

    async fn next_event(&mut self) -> Option<TransportEvent> {
        match self.events.pop_front() {
            Some(event) => {
                if matches!(event, TransportEvent::Closed { .. }) {
                    self.open = false;
                }
                Some(event)
            }
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) {
        self.open = false;
    }

    fn transport_name(&self) -> &'static str {
        "scripted"
    }
}

// ---------------------------------------------------------------------------
// TransportHarness
// ---------------------------------------------------------------------------

struct SocketLink {
    events: mpsc::UnboundedSender<TransportEvent>,
    closed_by_client: Arc<AtomicBool>,
}

#[derive(Default)]
struct HarnessState {
    connect_results: VecDeque<std::result::Result<(), String>>,
    sockets: Vec<SocketLink>,
    sent: Vec<String>,
}

/// Control handle for sockets produced by [`TransportHarness::factory`].
///
/// Events pushed through the harness go to the most recently created
/// socket, which is the one the manager is using.
#[derive(Clone, Default)]
pub struct TransportHarness {
    state: Arc<Mutex<HarnessState>>,
    connect_count: Arc<AtomicU32>,
}

impl TransportHarness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue connect outcomes, one per attempt. `Err` carries the failure
    /// message. Attempts past the end of the queue succeed.
    pub fn with_connect_results(self, results: Vec<std::result::Result<(), String>>) -> Self {
        self.state.lock().connect_results.extend(results);
        self
    }

    pub fn factory(&self) -> SocketFactory {
        let harness = self.clone();
        Arc::new(move || Box::new(harness.create_socket()) as Box<dyn TransportSocket>)
    }

    fn create_socket(&self) -> ChannelSocket {
        let (tx, rx) = mpsc::unbounded_channel();
        let closed_by_client = Arc::new(AtomicBool::new(false));
        self.state.lock().sockets.push(SocketLink {
            events: tx,
            closed_by_client: Arc::clone(&closed_by_client),
        });
        ChannelSocket {
            state: Arc::clone(&self.state),
            connect_count: Arc::clone(&self.connect_count),
            events: rx,
            closed_by_client,
            open: false,
        }
    }

    /// Sockets created so far.
    pub fn sockets_created(&self) -> usize {
        self.state.lock().sockets.len()
    }

    /// Connect calls made so far, successful or not.
    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::SeqCst)
    }

    /// Sockets the client side has closed.
    pub fn closed_by_client(&self) -> usize {
        self.state
            .lock()
            .sockets
            .iter()
            .filter(|s| s.closed_by_client.load(Ordering::SeqCst))
            .count()
    }

    /// Every frame written by the client, across all sockets.
    pub fn sent(&self) -> Vec<String> {
        self.state.lock().sent.clone()
    }

    /// Deliver an inbound text frame to the current socket.
    pub fn send_frame(&self, text: impl Into<String>) -> bool {
        self.push(TransportEvent::Frame(text.into()))
    }

    /// Report a transport error on the current socket.
    pub fn send_error(&self, message: impl Into<String>) -> bool {
        self.push(TransportEvent::Error(message.into()))
    }

    /// Close the current socket from the server side.
    pub fn close(&self, reason: impl Into<String>) -> bool {
        self.push(TransportEvent::Closed {
            reason: reason.into(),
        })
    }

    /// Deliver an event to the socket created `index`-th.
    pub fn push_to(&self, index: usize, event: TransportEvent) -> bool {
        self.state
            .lock()
            .sockets
            .get(index)
            .is_some_and(|link| link.events.send(event).is_ok())
    }

    fn push(&self, event: TransportEvent) -> bool {
        self.state
            .lock()
            .sockets
            .last()
            .is_some_and(|link| link.events.send(event).is_ok())
    }
}

/// A socket fed by a [`TransportHarness`].
pub struct ChannelSocket {
    state: Arc<Mutex<HarnessState>>,
    connect_count: Arc<AtomicU32>,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    closed_by_client: Arc<AtomicBool>,
    open: bool,
}

#[async_trait]
impl TransportSocket for ChannelSocket {
    async fn connect(&mut self) -> Result<()> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        let next = self.state.lock().connect_results.pop_front();
        match next {
            Some(Err(message)) => Err(Error::Connection(message)),
            Some(Ok(())) | None => {
                self.open = true;
                Ok(())
            }
        }
    }

    async fn send_text(&mut self, text: String) -> Result<()> {
        if !self.open {
            return Err(Error::Connection("not open".into()));
        }
        self.state.lock().sent.push(text);
        Ok(())
    }

    async fn next_event(&mut self) -> Option<TransportEvent> {
        if !self.open {
            return None;
        }
        let event = self.events.recv().await?;
        if matches!(event, TransportEvent::Closed { .. }) {
            self.open = false;
        }
        Some(event)
    }

    async fn close(&mut self) {
        self.open = false;
        self.closed_by_client.store(true, Ordering::SeqCst);
    }

    fn transport_name(&self) -> &'static str {
        "channel"
    }
}
