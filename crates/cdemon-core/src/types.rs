//! Core domain type definitions

use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ansi::strip_ansi_codes;

/// Counter for generating unique log entry IDs
static LOG_ENTRY_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Log severity levels.
///
/// `System` marks entries synthesized by the pipeline's own operator
/// (status transitions, "console cleared" notes) rather than output of
/// the child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    System,
}

impl LogLevel {
    /// Every level, in severity order with `System` last.
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::System,
    ];

    /// Get display prefix for log level
    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DBG",
            LogLevel::Info => "INF",
            LogLevel::Warn => "WRN",
            LogLevel::Error => "ERR",
            LogLevel::System => "SYS",
        }
    }

    /// Get numeric severity value for comparison.
    /// Higher values indicate more severe levels; `System` sits outside
    /// the severity ladder and compares above `Error`.
    pub fn severity(&self) -> u8 {
        match self {
            LogLevel::Debug => 0,
            LogLevel::Info => 1,
            LogLevel::Warn => 2,
            LogLevel::Error => 3,
            LogLevel::System => 4,
        }
    }

    /// Index into per-level tables (filter flags, style lookup).
    pub fn index(&self) -> usize {
        self.severity() as usize
    }
}

/// A single normalized console log entry.
///
/// Entries are immutable once appended to the retention buffer: filtering
/// and search only ever derive views, they never touch stored entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// When the entry was normalized (not the child process's clock)
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    /// Origin label extracted during classification, when determinable
    pub source: Option<String>,
    /// ANSI-stripped, display-ready text
    pub message: String,
    /// Original unmodified input line or event payload
    pub raw: String,
    /// Unique ID for this entry (stable handle for render sinks)
    pub id: u64,
}

impl LogEntry {
    /// Create a new log entry with the current timestamp.
    ///
    /// ANSI escape codes are stripped from the message; `raw` is stored
    /// untouched.
    pub fn new(
        level: LogLevel,
        source: Option<String>,
        message: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        let cleaned_message = strip_ansi_codes(&message.into());
        Self {
            timestamp: Local::now(),
            level,
            source,
            message: cleaned_message,
            raw: raw.into(),
            id: LOG_ENTRY_COUNTER.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Create an operator-synthesized `System` entry.
    pub fn system(message: impl Into<String>) -> Self {
        let message = message.into();
        let raw = message.clone();
        Self::new(LogLevel::System, None, message, raw)
    }

    /// Check if this is an error-level entry
    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    /// Format timestamp for display
    pub fn formatted_time(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }

    /// Format for single-line display.
    ///
    /// This is the text the render sink paints and the search index scans,
    /// so the format must be stable within a frame.
    pub fn display_line(&self) -> String {
        match &self.source {
            Some(source) => format!(
                "{} {} [{}] {}",
                self.formatted_time(),
                self.level.prefix(),
                source,
                self.message
            ),
            None => format!(
                "{} {} {}",
                self.formatted_time(),
                self.level.prefix(),
                self.message
            ),
        }
    }
}
