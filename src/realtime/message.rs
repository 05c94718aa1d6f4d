//! Inbound frame types and decoder.
//!
//! The backend sends JSON frames shaped `{"type": "<kind>", "data": {...}}`.
//! [`decode`] turns them into a closed [`InboundMessage`] union; unknown
//! kinds and payloads of the wrong shape become a [`DecodeError`] instead of
//! a partially-typed value.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{HookProgress, ServerEvent, ShutdownPatch, Snapshot};
use crate::error::DecodeError;

/// Every message kind this client understands.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Full snapshot; replaces the current one.
    StatusUpdate(Snapshot),
    /// Shutdown countdown tick; merged into the current snapshot.
    ShutdownCountdown(CountdownTick),
    /// Pre-shutdown hook progress.
    HookProgress(HookProgress),
    /// General server event.
    Event(ServerEvent),
    /// Server liveness frame (`heartbeat`, `ping` or `pong`).
    Heartbeat,
    /// The backend configuration changed.
    ConfigChanged,
}

impl InboundMessage {
    /// Wire name of the message kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::StatusUpdate(_) => "status_update",
            Self::ShutdownCountdown(_) => "shutdown_countdown",
            Self::HookProgress(_) => "hook_progress",
            Self::Event(_) => "event",
            Self::Heartbeat => "heartbeat",
            Self::ConfigChanged => "config_changed",
        }
    }
}

/// Payload of a `shutdown_countdown` frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CountdownTick {
    #[serde(default)]
    pub remaining_seconds: Option<u64>,
    #[serde(default)]
    pub in_final_countdown: Option<bool>,
}

impl CountdownTick {
    /// The shutdown patch this tick represents. A tick always means a
    /// shutdown is in progress.
    #[must_use]
    pub fn to_patch(&self) -> ShutdownPatch {
        ShutdownPatch {
            shutting_down: Some(true),
            elapsed_seconds: None,
            remaining_seconds: self.remaining_seconds,
            in_final_countdown: self.in_final_countdown,
        }
    }
}

/// Decode one text frame.
///
/// # Errors
///
/// Returns a [`DecodeError`] for invalid JSON, a missing or non-string
/// `type`, an unknown `type`, or a `data` payload of the wrong shape.
pub fn decode(text: &str) -> Result<InboundMessage, DecodeError> {
    let mut frame: Value = serde_json::from_str(text).map_err(DecodeError::Malformed)?;
    let kind = frame
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingKind)?
        .to_owned();
    let data = frame.get_mut("data").map(Value::take).unwrap_or(Value::Null);

    match kind.as_str() {
        "status_update" => payload("status_update", data).map(InboundMessage::StatusUpdate),
        "shutdown_countdown" => {
            payload("shutdown_countdown", data).map(InboundMessage::ShutdownCountdown)
        }
        "hook_progress" => payload("hook_progress", data).map(InboundMessage::HookProgress),
        "event" => payload("event", data).map(InboundMessage::Event),
        "heartbeat" | "ping" | "pong" => Ok(InboundMessage::Heartbeat),
        "config_changed" => Ok(InboundMessage::ConfigChanged),
        _ => Err(DecodeError::UnknownKind(kind)),
    }
}

fn payload<T: DeserializeOwned>(kind: &'static str, data: Value) -> Result<T, DecodeError> {
    serde_json::from_value(data).map_err(|source| DecodeError::InvalidPayload { kind, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_status_update() {
        let json = r#"{"type":"status_update","data":{"battery_charge":80,"shutdown":{"shutting_down":false}}}"#;
        match decode(json).unwrap() {
            InboundMessage::StatusUpdate(snapshot) => {
                assert_eq!(snapshot.battery_charge, Some(80.0));
                assert!(!snapshot.shutdown.shutting_down);
            }
            other => panic!("Expected StatusUpdate, got {other:?}"),
        }
    }

    #[test]
    fn decodes_shutdown_countdown() {
        let json = r#"{"type":"shutdown_countdown","data":{"remaining_seconds":30,"in_final_countdown":false}}"#;
        match decode(json).unwrap() {
            InboundMessage::ShutdownCountdown(tick) => {
                assert_eq!(tick.remaining_seconds, Some(30));
                assert_eq!(tick.in_final_countdown, Some(false));
                assert_eq!(tick.to_patch().shutting_down, Some(true));
            }
            other => panic!("Expected ShutdownCountdown, got {other:?}"),
        }
    }

    #[test]
    fn decodes_hook_progress() {
        let json = r#"{"type":"hook_progress","data":{"hook_name":"Synology","hook_id":"synology_shutdown","status":"success","priority":1,"duration":2.5,"error":null,"progress":{"current":1,"total":3}}}"#;
        match decode(json).unwrap() {
            InboundMessage::HookProgress(progress) => {
                assert_eq!(progress.hook_id.as_deref(), Some("synology_shutdown"));
                assert_eq!(progress.duration, Some(2.5));
                assert!(progress.error.is_none());
            }
            other => panic!("Expected HookProgress, got {other:?}"),
        }
    }

    #[test]
    fn decodes_event() {
        let json = r#"{"type":"event","data":{"event_type":"NUT_DISCONNECTED","message":"lost","metadata":null,"timestamp":"2024-05-01T10:00:00"}}"#;
        match decode(json).unwrap() {
            InboundMessage::Event(event) => {
                assert_eq!(event.event_type, "NUT_DISCONNECTED");
                assert_eq!(event.message, "lost");
            }
            other => panic!("Expected Event, got {other:?}"),
        }
    }

    #[test]
    fn liveness_frames_decode_without_data() {
        for kind in ["heartbeat", "ping", "pong"] {
            let json = format!(r#"{{"type":"{kind}"}}"#);
            assert_eq!(decode(&json).unwrap(), InboundMessage::Heartbeat);
        }
    }

    #[test]
    fn decodes_config_changed() {
        let json = r#"{"type":"config_changed","data":{"timestamp":"2024-05-01T10:00:00"}}"#;
        assert_eq!(decode(json).unwrap(), InboundMessage::ConfigChanged);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let result = decode(r#"{"type":"mystery","data":{}}"#);
        assert!(matches!(result, Err(DecodeError::UnknownKind(k)) if k == "mystery"));
    }

    #[test]
    fn missing_kind_is_rejected() {
        assert!(matches!(
            decode(r#"{"data":{}}"#),
            Err(DecodeError::MissingKind)
        ));
        assert!(matches!(
            decode(r#"{"type":7,"data":{}}"#),
            Err(DecodeError::MissingKind)
        ));
        assert!(matches!(decode("[1,2,3]"), Err(DecodeError::MissingKind)));
    }

    #[test]
    fn wrong_payload_shape_is_rejected() {
        let result = decode(r#"{"type":"status_update","data":[1,2]}"#);
        assert!(matches!(
            result,
            Err(DecodeError::InvalidPayload {
                kind: "status_update",
                ..
            })
        ));
        let result = decode(r#"{"type":"event","data":{"message":"no type"}}"#);
        assert!(matches!(
            result,
            Err(DecodeError::InvalidPayload { kind: "event", .. })
        ));
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(matches!(decode("not json"), Err(DecodeError::Malformed(_))));
    }
}
