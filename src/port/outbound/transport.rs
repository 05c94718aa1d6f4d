//! Transport port for the realtime channel.
//!
//! A [`TransportSocket`] wraps one physical duplex connection. The
//! connection manager only sees the four transitions a socket can go
//! through: opened (a successful [`connect`](TransportSocket::connect)),
//! frame, error, and closed. Any duplex-stream primitive that can report
//! those fits behind this trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Error;

/// Something that happened on an open socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// An inbound text frame.
    Frame(String),
    /// A non-fatal I/O or protocol failure. A [`TransportEvent::Closed`]
    /// follows when the failure ends the connection.
    Error(String),
    /// The connection is gone.
    Closed { reason: String },
}

/// One physical duplex connection.
#[async_trait]
pub trait TransportSocket: Send {
    /// Open the connection. `Ok` is the "opened" transition.
    async fn connect(&mut self) -> Result<(), Error>;

    /// Send a text frame on the open connection.
    async fn send_text(&mut self, text: String) -> Result<(), Error>;

    /// Receive the next event.
    ///
    /// Must be cancel-safe: the caller may drop the future to send a frame
    /// and call again. Returns `None` once the socket is finished.
    async fn next_event(&mut self) -> Option<TransportEvent>;

    /// Close the connection. Safe to call when not open.
    async fn close(&mut self);

    /// Short transport name for logging.
    fn transport_name(&self) -> &'static str;
}

/// Produces a fresh, unopened socket for every connection attempt.
pub type SocketFactory = Arc<dyn Fn() -> Box<dyn TransportSocket> + Send + Sync>;
