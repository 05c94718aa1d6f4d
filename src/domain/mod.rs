//! Transport-agnostic telemetry types.

pub mod event;
pub mod snapshot;
pub mod status;

pub use event::{ConnectionEvent, HookProgress, ServerEvent, SourceLinkEvent};
pub use snapshot::{ShutdownPatch, ShutdownState, Snapshot, UpsStatus};
pub use status::ConnectionStatus;
