//! Server-pushed events and progress records.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Upstream source transitions that the realtime layer tracks itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLinkEvent {
    /// The backend lost its connection to the UPS data source.
    Lost,
    /// The backend re-established its connection to the UPS data source.
    Restored,
}

impl SourceLinkEvent {
    /// Map a server `event_type` onto the recognized set.
    #[must_use]
    pub fn from_event_type(event_type: &str) -> Option<Self> {
        match event_type {
            "NUT_DISCONNECTED" => Some(Self::Lost),
            "NUT_RECONNECTED" => Some(Self::Restored),
            _ => None,
        }
    }

    /// Wire name of the event type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lost => "NUT_DISCONNECTED",
            Self::Restored => "NUT_RECONNECTED",
        }
    }
}

impl fmt::Display for SourceLinkEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest source-link transition, overwritten by the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionEvent {
    pub kind: SourceLinkEvent,
    pub message: String,
    /// Monotonic time at which the client received the event.
    pub received_at: Instant,
}

/// Payload of an `event` frame.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerEvent {
    pub event_type: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Server-side timestamp as sent (ISO 8601, possibly without offset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Progress of a pre-shutdown hook, replaced wholesale on every update.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct HookProgress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_id: Option<String>,
    /// `pending`, `executing`, `success`, `failed` or `skipped`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    /// Execution time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Overall progress block, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<serde_json::Value>,
}
