//! Source boundary event definitions.
//!
//! Two independent producers feed the pipeline:
//!
//! - the **process supervisor**, delivering raw stdout/stderr lines and
//!   lifecycle status transitions of the child process;
//! - the **bridge connection**, delivering structured, typed log events
//!   when a debugging bridge is attached.
//!
//! Both are consumed at their channel boundary only; nothing here performs
//! I/O.

use serde::{Deserialize, Serialize};

use crate::types::{LogEntry, LogLevel};

// ─────────────────────────────────────────────────────────
// Process supervisor boundary
// ─────────────────────────────────────────────────────────

/// Lifecycle status of the supervised child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessStatus {
    Starting,
    Running,
    Stopping,
    Stopped { code: Option<i32> },
    Failed { reason: String },
}

impl ProcessStatus {
    /// Human-readable summary, rendered as a `System` entry.
    pub fn summary(&self) -> String {
        match self {
            ProcessStatus::Starting => "Process starting".to_string(),
            ProcessStatus::Running => "Process running".to_string(),
            ProcessStatus::Stopping => "Process stopping".to_string(),
            ProcessStatus::Stopped { code: Some(code) } => {
                format!("Process exited with code {code}")
            }
            ProcessStatus::Stopped { code: None } => "Process exited".to_string(),
            ProcessStatus::Failed { reason } => format!("Process failed: {reason}"),
        }
    }
}

/// Events from the process supervisor, delivered on an arbitrary thread.
#[derive(Debug, Clone)]
pub enum SupervisorEvent {
    /// One raw output line from the child process
    Line(String),
    /// A lifecycle status transition
    Status(ProcessStatus),
}

// ─────────────────────────────────────────────────────────
// Bridge boundary
// ─────────────────────────────────────────────────────────

/// Severity carried by structured bridge events.
///
/// Richer than the console's closed [`LogLevel`] set; `Trace` and `Fatal`
/// fold into `Debug` and `Error` during classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BridgeLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl BridgeLevel {
    /// Fold the bridge severity into the closed console level set.
    pub fn to_log_level(self) -> LogLevel {
        match self {
            BridgeLevel::Trace | BridgeLevel::Debug => LogLevel::Debug,
            BridgeLevel::Info => LogLevel::Info,
            BridgeLevel::Warn => LogLevel::Warn,
            BridgeLevel::Error | BridgeLevel::Fatal => LogLevel::Error,
        }
    }
}

/// One structured log event from an attached bridge.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeLogEvent {
    pub level: BridgeLevel,
    /// Fully qualified logger name (e.g. `com.example.auth.AuthService`)
    #[serde(default)]
    pub logger: Option<String>,
    pub message: String,
    /// Rendered throwable/error detail, if the event carried one
    #[serde(default)]
    pub thrown: Option<String>,
}

impl BridgeLogEvent {
    /// Parse a bridge event from its JSON wire payload.
    ///
    /// Returns `None` on malformed payloads; the caller degrades those to
    /// fallback raw-line classification rather than failing ingestion.
    pub fn parse(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }
}

/// Events from the bridge connection.
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    /// Bridge attached; ingestion should trust structured events
    Connected,
    /// One structured log event
    Log(BridgeLogEvent),
    /// Bridge detached; ingestion falls back to raw-text parsing
    Disconnected,
}

// ─────────────────────────────────────────────────────────
// Bridge classification
// ─────────────────────────────────────────────────────────

/// Classify a structured bridge event into a [`LogEntry`].
///
/// A direct field mapping, no grammar involved: the severity folds into
/// the closed level set, the logger name contributes only its most
/// specific component as `source`, and the thrown detail is appended as a
/// second rendered line.
pub fn classify_bridge(event: &BridgeLogEvent) -> LogEntry {
    let level = event.level.to_log_level();

    let source = event
        .logger
        .as_deref()
        .map(|name| name.rsplit('.').next().unwrap_or(name))
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    let message = match &event.thrown {
        Some(thrown) if !thrown.is_empty() => format!("{}\n{}", event.message, thrown),
        _ => event.message.clone(),
    };
    let raw = message.clone();

    LogEntry::new(level, source, message, raw)
}
