//! Telemetry snapshot types.
//!
//! A [`Snapshot`] is the latest full record pushed by the backend. The
//! common fields are typed; everything else the backend sends is kept in
//! [`Snapshot::extra`] so nothing is lost when the server grows new fields.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Power state reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum UpsStatus {
    Online,
    OnBattery,
    LowBattery,
    ShuttingDown,
    PowerOff,
    Offline,
    /// A status string this client does not know about.
    Unknown(String),
}

impl UpsStatus {
    /// Wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Online => "ONLINE",
            Self::OnBattery => "ON_BATTERY",
            Self::LowBattery => "LOW_BATTERY",
            Self::ShuttingDown => "SHUTTING_DOWN",
            Self::PowerOff => "POWER_OFF",
            Self::Offline => "OFFLINE",
            Self::Unknown(raw) => raw,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Online => "on mains power",
            Self::OnBattery => "on battery",
            Self::LowBattery => "battery low",
            Self::ShuttingDown => "shutting down",
            Self::PowerOff => "powered off",
            Self::Offline => "offline",
            Self::Unknown(raw) => raw,
        }
    }

    /// True when the UPS is running from its battery.
    #[must_use]
    pub const fn is_on_battery(&self) -> bool {
        matches!(self, Self::OnBattery | Self::LowBattery)
    }
}

impl From<String> for UpsStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "ONLINE" => Self::Online,
            "ON_BATTERY" => Self::OnBattery,
            "LOW_BATTERY" => Self::LowBattery,
            "SHUTTING_DOWN" => Self::ShuttingDown,
            "POWER_OFF" => Self::PowerOff,
            "OFFLINE" => Self::Offline,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<UpsStatus> for String {
    fn from(status: UpsStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for UpsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shutdown sequence state nested in every snapshot.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ShutdownState {
    #[serde(default)]
    pub shutting_down: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_lost_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_final_countdown: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
}

/// Partial update of [`ShutdownState`]. Only present fields overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownPatch {
    pub shutting_down: Option<bool>,
    pub elapsed_seconds: Option<u64>,
    pub remaining_seconds: Option<u64>,
    pub in_final_countdown: Option<bool>,
}

impl ShutdownPatch {
    /// Apply the patch to `state` field by field.
    pub fn apply_to(&self, state: &mut ShutdownState) {
        if let Some(v) = self.shutting_down {
            state.shutting_down = v;
        }
        if let Some(v) = self.elapsed_seconds {
            state.elapsed_seconds = Some(v);
        }
        if let Some(v) = self.remaining_seconds {
            state.remaining_seconds = Some(v);
        }
        if let Some(v) = self.in_final_countdown {
            state.in_final_countdown = Some(v);
        }
    }
}

/// Latest full telemetry record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UpsStatus>,
    /// Raw NUT status string, e.g. `OB DISCHRG LB`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_flags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_charge: Option<f64>,
    /// Estimated runtime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_runtime: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_voltage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_voltage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ups_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ups_manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
    #[serde(default)]
    pub shutdown: ShutdownState,
    /// Every other field the backend reported.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Snapshot {
    /// Look up a field that has no typed accessor.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.extra.get(name).filter(|v| !v.is_null())
    }

    /// Numeric value of an untyped field.
    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.field(name).and_then(serde_json::Value::as_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_known_values() {
        let status: UpsStatus = serde_json::from_str(r#""ON_BATTERY""#).unwrap();
        assert_eq!(status, UpsStatus::OnBattery);
        assert!(status.is_on_battery());
        assert_eq!(serde_json::to_string(&status).unwrap(), r#""ON_BATTERY""#);
    }

    #[test]
    fn status_keeps_unknown_values() {
        let status: UpsStatus = serde_json::from_str(r#""BYPASS""#).unwrap();
        assert_eq!(status, UpsStatus::Unknown("BYPASS".into()));
        assert_eq!(status.label(), "BYPASS");
    }

    #[test]
    fn snapshot_keeps_untyped_fields() {
        let json = r#"{
            "status": "ONLINE",
            "battery_charge": 100,
            "input_frequency": 50.1,
            "battery_type": "PbAc",
            "ups_alarm": null,
            "shutdown": {"shutting_down": false}
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.battery_charge, Some(100.0));
        assert_eq!(snapshot.number("input_frequency"), Some(50.1));
        assert_eq!(
            snapshot.field("battery_type").and_then(|v| v.as_str()),
            Some("PbAc")
        );
        assert!(snapshot.field("ups_alarm").is_none());
    }

    #[test]
    fn snapshot_without_shutdown_defaults_to_idle() {
        let snapshot: Snapshot = serde_json::from_str(r#"{"battery_charge": 42}"#).unwrap();
        assert!(!snapshot.shutdown.shutting_down);
        assert!(snapshot.shutdown.remaining_seconds.is_none());
    }

    #[test]
    fn patch_only_overwrites_present_fields() {
        let mut state = ShutdownState {
            shutting_down: false,
            elapsed_seconds: Some(12),
            phase: Some("waiting".into()),
            ..Default::default()
        };
        let patch = ShutdownPatch {
            shutting_down: Some(true),
            remaining_seconds: Some(30),
            ..Default::default()
        };
        patch.apply_to(&mut state);
        assert!(state.shutting_down);
        assert_eq!(state.remaining_seconds, Some(30));
        assert_eq!(state.elapsed_seconds, Some(12));
        assert_eq!(state.phase.as_deref(), Some("waiting"));
    }
}
