//! Terminal rendering of UPS telemetry.
//!
//! Text mode prints one timestamped line per realtime update and short
//! reports for one-shot commands. JSON mode prints one
//! `{"type": ..., "payload": ...}` object per line instead, so `watch --json`
//! can be piped into other tools.
//!
//! The `*_line` builders return plain strings and carry no color; color is
//! added only when a line is printed.

use std::time::Duration;

use chrono::Local;
use owo_colors::OwoColorize;
use parking_lot::{const_rwlock, RwLock};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::config::Config;
use crate::domain::{
    ConnectionEvent, ConnectionStatus, HookProgress, ServerEvent, Snapshot, SourceLinkEvent,
};
use crate::error::Result;
use crate::realtime::Notification;

/// Output settings taken from the global CLI flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// One JSON object per line instead of text.
    pub json: bool,
    /// In text mode, print snapshots and errors only.
    pub quiet: bool,
    /// `-v` count. At 1 and above every server event is shown.
    pub verbose: u8,
}

impl OutputConfig {
    /// Build settings from the parsed flags.
    #[must_use]
    pub const fn new(json: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            json,
            quiet,
            verbose,
        }
    }
}

static SETTINGS: RwLock<OutputConfig> = const_rwlock(OutputConfig::new(false, false, 0));

/// Install the settings for the rest of the process.
pub fn configure(config: OutputConfig) {
    *SETTINGS.write() = config;
}

fn settings() -> OutputConfig {
    *SETTINGS.read()
}

/// True when `--json` was given.
#[must_use]
pub fn is_json() -> bool {
    settings().json
}

/// Number of `-v` flags given.
#[must_use]
pub fn verbosity() -> u8 {
    settings().verbose
}

/// Color of the label column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Plain,
    Good,
    Alert,
}

/// One line of the streaming view before it is printed.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    label: &'static str,
    tone: Tone,
    text: String,
}

impl Line {
    fn new(label: &'static str, tone: Tone, text: impl Into<String>) -> Self {
        Self {
            label,
            tone,
            text: text.into(),
        }
    }

    fn print(&self) {
        let now = Local::now().format("%H:%M:%S").to_string();
        let label = format!("{:<9}", self.label);
        let label = match self.tone {
            Tone::Plain => label.cyan().to_string(),
            Tone::Good => label.green().to_string(),
            Tone::Alert => label.yellow().to_string(),
        };
        println!("  {} {} {}", now.dimmed(), label, self.text);
    }
}

fn emit(kind: &str, payload: Value) {
    println!("{}", json!({ "type": kind, "payload": payload }));
}

fn emit_serialized<T: Serialize>(kind: &str, payload: &T) {
    match serde_json::to_value(payload) {
        Ok(value) => emit(kind, value),
        Err(e) => warn!(kind, error = %e, "Failed to serialize output record"),
    }
}

// ---- Line builders ----

/// Text for a connection status change.
#[must_use]
pub fn link_status_line(status: ConnectionStatus) -> String {
    match status {
        ConnectionStatus::Disconnected => "disconnected, waiting to reconnect".to_string(),
        other => other.as_str().to_string(),
    }
}

/// One-line summary of a snapshot: power state, readings, shutdown stage.
#[must_use]
pub fn snapshot_line(snapshot: &Snapshot) -> String {
    let mut parts = vec![power_state(snapshot).to_string()];
    if let Some(charge) = snapshot.battery_charge {
        parts.push(format!("battery {charge:.0}%"));
    }
    if let Some(load) = snapshot.load_percent {
        parts.push(format!("load {load:.0}%"));
    }
    if snapshot.shutdown.shutting_down {
        parts.push(shutdown_line(snapshot));
    }
    parts.join(", ")
}

/// Text for a hook progress update, e.g. `NAS: failed after 2.5s (timeout)`.
#[must_use]
pub fn hook_line(progress: &HookProgress) -> String {
    let name = progress.hook_name.as_deref().unwrap_or("hook");
    let state = progress.status.as_deref().unwrap_or("unknown");
    let mut line = format!("{name}: {state}");
    if let Some(secs) = progress.duration {
        line.push_str(&format!(" after {secs:.1}s"));
    }
    if let Some(error) = progress.error.as_deref().filter(|e| !e.is_empty()) {
        line.push_str(&format!(" ({error})"));
    }
    line
}

/// Text for a source-link transition reported by the backend.
#[must_use]
pub fn source_link_line(event: &ConnectionEvent) -> String {
    let headline = match event.kind {
        SourceLinkEvent::Lost => "UPS data source lost",
        SourceLinkEvent::Restored => "UPS data source restored",
    };
    if event.message.is_empty() {
        headline.to_string()
    } else {
        format!("{headline}: {}", event.message)
    }
}

/// Text for a generic server event.
#[must_use]
pub fn server_event_line(event: &ServerEvent) -> String {
    if event.message.is_empty() {
        event.event_type.clone()
    } else {
        format!("{} {}", event.event_type, event.message)
    }
}

/// Text for the stale-data warning. `age` is `None` when nothing arrived yet.
#[must_use]
pub fn stale_line(age: Option<Duration>) -> String {
    match age {
        Some(age) => format!("no data for {}s", age.as_secs()),
        None => "no data received yet".to_string(),
    }
}

fn power_state(snapshot: &Snapshot) -> &str {
    snapshot.status.as_ref().map_or("unknown", |s| s.label())
}

fn shutdown_line(snapshot: &Snapshot) -> String {
    let shutdown = &snapshot.shutdown;
    let stage = if shutdown.in_final_countdown == Some(true) {
        "final countdown"
    } else {
        "shutdown pending"
    };
    match shutdown.remaining_seconds {
        Some(secs) => format!("{stage}, {secs}s remaining"),
        None => stage.to_string(),
    }
}

fn format_runtime(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let (minutes, secs) = (total / 60, total % 60);
    if minutes > 0 {
        format!("{minutes}m {secs:02}s")
    } else {
        format!("{secs}s")
    }
}

/// The streaming line for a notification, or `None` if it is hidden.
///
/// Source-link events also arrive as server events; the generic copy is
/// shown only with `-v`.
fn notification_line(notification: &Notification, verbose: u8) -> Option<Line> {
    let line = match notification {
        Notification::Status(status) => {
            let tone = match status {
                ConnectionStatus::Connected => Tone::Good,
                ConnectionStatus::Connecting => Tone::Plain,
                ConnectionStatus::Disconnected => Tone::Alert,
            };
            Line::new("link", tone, link_status_line(*status))
        }
        Notification::Error(message) => Line::new("link", Tone::Alert, message.as_str()),
        Notification::Snapshot(snapshot) => {
            let tone = if snapshot.shutdown.shutting_down {
                Tone::Alert
            } else {
                Tone::Plain
            };
            Line::new("ups", tone, snapshot_line(snapshot))
        }
        Notification::HookProgress(progress) => {
            let tone = match progress.status.as_deref() {
                Some("failed") => Tone::Alert,
                Some("success") => Tone::Good,
                _ => Tone::Plain,
            };
            Line::new("hook", tone, hook_line(progress))
        }
        Notification::ConnectionEvent(event) => {
            let tone = match event.kind {
                SourceLinkEvent::Lost => Tone::Alert,
                SourceLinkEvent::Restored => Tone::Good,
            };
            Line::new("source", tone, source_link_line(event))
        }
        Notification::ServerEvent(event) => {
            let tracked = SourceLinkEvent::from_event_type(&event.event_type).is_some();
            if tracked && verbose == 0 {
                return None;
            }
            Line::new("event", Tone::Plain, server_event_line(event))
        }
        Notification::ConfigChanged => {
            Line::new("config", Tone::Plain, "backend configuration changed")
        }
    };
    Some(line)
}

fn emit_notification(notification: &Notification) {
    match notification {
        Notification::Status(status) => emit("link", json!({ "status": status.as_str() })),
        Notification::Error(message) => emit("link_error", json!({ "message": message })),
        Notification::Snapshot(snapshot) => emit_serialized("snapshot", snapshot.as_ref()),
        Notification::HookProgress(progress) => emit_serialized("hook", progress.as_ref()),
        Notification::ConnectionEvent(event) => emit(
            "source_link",
            json!({ "event": event.kind.as_str(), "message": event.message }),
        ),
        Notification::ServerEvent(event) => emit_serialized("event", event.as_ref()),
        Notification::ConfigChanged => emit("config_changed", json!({})),
    }
}

// ---- Printers ----

/// Print one realtime notification.
pub fn notification(notification: &Notification) {
    let settings = settings();
    if settings.json {
        emit_notification(notification);
        return;
    }
    if settings.quiet && !matches!(notification, Notification::Snapshot(_)) {
        return;
    }
    if let Some(line) = notification_line(notification, settings.verbose) {
        line.print();
    }
}

/// Warn that the connection is open but no data has arrived recently.
pub fn stale_warning(age: Option<Duration>) {
    let settings = settings();
    if settings.json {
        emit("stale", json!({ "age_secs": age.map(|a| a.as_secs()) }));
    } else if !settings.quiet {
        Line::new("link", Tone::Alert, stale_line(age)).print();
    }
}

/// Print the `watch` banner.
pub fn banner(version: &str, backend: &str) {
    let settings = settings();
    if settings.json {
        emit("watch", json!({ "version": version, "backend": backend }));
        return;
    }
    if settings.quiet {
        return;
    }
    println!("{} {}", "upsdash".bold(), version.dimmed());
    println!("  {} {}", "watching".dimmed(), backend);
    println!();
}

/// Print a dimmed remark. Text mode only.
pub fn notice(message: &str) {
    let settings = settings();
    if !settings.json && !settings.quiet {
        println!("  {}", message.dimmed());
    }
}

/// Print a confirmation.
pub fn confirm(message: &str) {
    let settings = settings();
    if settings.json {
        emit("ok", json!({ "message": message }));
    } else if !settings.quiet {
        println!("  {} {}", "✓".green(), message);
    }
}

/// Print an error to stderr. Never suppressed.
pub fn error(message: &str) {
    if is_json() {
        eprintln!("{}", json!({ "type": "error", "payload": { "message": message } }));
    } else {
        eprintln!("  {} {}", "×".red(), message);
    }
}

fn section(title: &str) {
    println!();
    println!("{}", title.bold());
}

fn field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<14} {}", label.dimmed(), value);
}

/// Print the full report for one snapshot, as used by `status`.
pub fn status_report(snapshot: &Snapshot) {
    let settings = settings();
    if settings.json {
        emit_serialized("status", snapshot);
        return;
    }
    if settings.quiet {
        println!("{}", snapshot_line(snapshot));
        return;
    }

    section("UPS Status");
    field("State", power_state(snapshot).cyan());
    if let Some(model) = &snapshot.ups_model {
        field("Model", model);
    }
    if let Some(charge) = snapshot.battery_charge {
        field("Battery", format!("{charge:.0}%"));
    }
    if let Some(runtime) = snapshot.battery_runtime {
        field("Runtime", format_runtime(runtime));
    }
    if let Some(load) = snapshot.load_percent {
        field("Load", format!("{load:.0}%"));
    }
    if let Some(volts) = snapshot.input_voltage {
        field("Input", format!("{volts:.1} V"));
    }
    if let Some(temp) = snapshot.temperature {
        field("Temperature", format!("{temp:.1} °C"));
    }
    if let Some(updated) = &snapshot.last_update {
        field("Updated", updated.dimmed());
    }

    if snapshot.shutdown.shutting_down {
        section("Shutdown");
        println!("  {} {}", "⚠".yellow(), shutdown_line(snapshot));
    }
}

/// Print the effective configuration, as used by `config show`.
///
/// The API token is never printed. `token_source` says where it came from.
pub fn config_report(config: &Config, token_source: &str) -> Result<()> {
    if is_json() {
        emit_serialized("config", config);
        return Ok(());
    }

    let mut ws_url = config.server.ws_url()?;
    ws_url.set_query(Some("token=***"));
    let realtime = &config.realtime;

    section("Server");
    field("Base URL", &config.server.base_url);
    field("Realtime", ws_url);
    field("Status", config.server.status_url()?);
    field("API token", format!("from {token_source}"));

    section("Realtime");
    field("Reconnect", format!("every {} ms", realtime.reconnect_interval_ms));
    field(
        "Heartbeat",
        format!(
            "'{}' every {} ms",
            realtime.heartbeat_probe, realtime.heartbeat_interval_ms
        ),
    );
    field("Stale after", format!("{} s", realtime.stale_after_secs));

    section("Logging");
    field("Level", &config.logging.level);
    field("Format", &config.logging.format);
    Ok(())
}
