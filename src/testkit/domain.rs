//! Canned realtime frames and snapshots.

use serde_json::json;

use crate::domain::Snapshot;

/// A `status_update` frame carrying a minimal on-line snapshot.
pub fn status_update_frame(battery_charge: f64) -> String {
    json!({
        "type": "status_update",
        "data": {
            "status": "ONLINE",
            "battery_charge": battery_charge,
            "load_percent": 31,
            "shutdown": { "shutting_down": false }
        }
    })
    .to_string()
}

/// A `shutdown_countdown` frame.
pub fn countdown_frame(remaining_seconds: u64, in_final_countdown: bool) -> String {
    json!({
        "type": "shutdown_countdown",
        "data": {
            "remaining_seconds": remaining_seconds,
            "in_final_countdown": in_final_countdown
        }
    })
    .to_string()
}

/// An `event` frame.
pub fn event_frame(event_type: &str, message: &str) -> String {
    json!({
        "type": "event",
        "data": { "event_type": event_type, "message": message }
    })
    .to_string()
}

/// A `hook_progress` frame.
pub fn hook_progress_frame(hook_name: &str, status: &str) -> String {
    json!({
        "type": "hook_progress",
        "data": { "hook_name": hook_name, "status": status }
    })
    .to_string()
}

pub fn heartbeat_frame() -> String {
    json!({ "type": "heartbeat" }).to_string()
}

/// The snapshot carried by [`status_update_frame`].
pub fn snapshot(battery_charge: f64) -> Snapshot {
    serde_json::from_value(json!({
        "status": "ONLINE",
        "battery_charge": battery_charge,
        "load_percent": 31,
        "shutdown": { "shutting_down": false }
    }))
    .expect("fixture snapshot is valid")
}
