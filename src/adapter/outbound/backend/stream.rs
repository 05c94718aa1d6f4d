//! WebSocket transport for the backend's realtime endpoint.
//!
//! Protocol-level ping frames are answered here. Application-level liveness
//! (`ping` text frames) is the heartbeat scheduler's business.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::port::{SocketFactory, TransportEvent, TransportSocket};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One WebSocket connection to the backend.
pub struct WebSocketTransport {
    url: Url,
    ws: Option<WsStream>,
    /// Set after a stream error; reported as `Closed` on the next read.
    pending_close: Option<String>,
}

impl WebSocketTransport {
    /// Create an unopened transport. `url` carries the auth token.
    #[must_use]
    pub const fn new(url: Url) -> Self {
        Self {
            url,
            ws: None,
            pending_close: None,
        }
    }

    /// The endpoint with the token masked, for logging.
    #[must_use]
    pub fn redacted_url(&self) -> String {
        redact(&self.url)
    }
}

/// A factory producing a fresh [`WebSocketTransport`] for `url` per attempt.
#[must_use]
pub fn socket_factory(url: Url) -> SocketFactory {
    Arc::new(move || Box::new(WebSocketTransport::new(url.clone())) as Box<dyn TransportSocket>)
}

fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    if url.query().is_some() {
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| {
                let v = if k == "token" { "***".to_string() } else { v.into_owned() };
                (k.into_owned(), v)
            })
            .collect();
        shown.query_pairs_mut().clear().extend_pairs(pairs);
    }
    shown.to_string()
}

#[async_trait]
impl TransportSocket for WebSocketTransport {
    async fn connect(&mut self) -> Result<()> {
        info!(url = %self.redacted_url(), "Connecting to WebSocket");
        let (ws_stream, response) = connect_async(self.url.as_str()).await?;
        info!(status = %response.status(), "WebSocket connected");
        self.ws = Some(ws_stream);
        self.pending_close = None;
        Ok(())
    }

    async fn send_text(&mut self, text: String) -> Result<()> {
        let ws = self
            .ws
            .as_mut()
            .ok_or_else(|| Error::Connection("Not connected".into()))?;
        ws.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn next_event(&mut self) -> Option<TransportEvent> {
        if let Some(reason) = self.pending_close.take() {
            return Some(TransportEvent::Closed { reason });
        }

        let ws = self.ws.as_mut()?;
        loop {
            let Some(frame) = ws.next().await else {
                self.ws = None;
                return Some(TransportEvent::Closed {
                    reason: "stream ended".into(),
                });
            };

            match frame {
                Ok(Message::Text(text)) => {
                    trace!(bytes = text.len(), "Received WebSocket text frame");
                    return Some(TransportEvent::Frame(text));
                }
                Ok(Message::Ping(data)) => {
                    trace!("Received WebSocket ping");
                    if let Err(e) = ws.send(Message::Pong(data)).await {
                        self.ws = None;
                        self.pending_close = Some("failed to send pong".into());
                        return Some(TransportEvent::Error(e.to_string()));
                    }
                }
                Ok(Message::Close(frame)) => {
                    info!(frame = ?frame, "WebSocket closed by server");
                    self.ws = None;
                    return Some(TransportEvent::Closed {
                        reason: frame.map(|f| f.reason.to_string()).unwrap_or_default(),
                    });
                }
                Ok(Message::Binary(data)) => {
                    debug!(bytes = data.len(), "Ignoring binary frame");
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "WebSocket error");
                    self.ws = None;
                    self.pending_close = Some(e.to_string());
                    return Some(TransportEvent::Error(e.to_string()));
                }
            }
        }
    }

    async fn close(&mut self) {
        self.pending_close = None;
        if let Some(mut ws) = self.ws.take() {
            if let Err(e) = ws.close(None).await {
                debug!(error = %e, "WebSocket close handshake failed");
            }
        }
    }

    fn transport_name(&self) -> &'static str {
        "websocket"
    }
}
