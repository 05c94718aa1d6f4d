//! Connection status as seen by consumers.

use std::fmt;

/// Lifecycle state of the shared realtime connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No socket is open. A retry may be pending.
    #[default]
    Disconnected,
    /// A socket is being opened.
    Connecting,
    /// The socket is open and frames are flowing.
    Connected,
}

impl ConnectionStatus {
    /// True only in [`ConnectionStatus::Connected`].
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// True while a socket exists, open or opening.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }

    /// Lowercase name used in logs and JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
