//! Severity filtering over the retention buffer.
//!
//! A small set of per-level visibility flags. Filtering is
//! non-destructive: it derives a visible subsequence from a buffer
//! snapshot and never touches stored entries.

use cdemon_core::{LogEntry, LogLevel};

use crate::buffer::RetentionBuffer;

/// Set of currently-enabled severity levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    enabled: [bool; LogLevel::ALL.len()],
}

impl Default for FilterState {
    /// Everything except `Debug` — operators opt in to debug noise.
    fn default() -> Self {
        let mut enabled = [true; LogLevel::ALL.len()];
        enabled[LogLevel::Debug.index()] = false;
        Self { enabled }
    }
}

impl FilterState {
    /// Filter with every level enabled.
    pub fn all() -> Self {
        Self {
            enabled: [true; LogLevel::ALL.len()],
        }
    }

    /// Toggle visibility of one level.
    pub fn set_enabled(&mut self, level: LogLevel, enabled: bool) {
        self.enabled[level.index()] = enabled;
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.enabled[level.index()]
    }

    /// Check if a log entry passes the filter
    pub fn matches(&self, entry: &LogEntry) -> bool {
        self.is_enabled(entry.level)
    }

    /// Check if any level is currently hidden
    pub fn is_active(&self) -> bool {
        self.enabled.iter().any(|enabled| !enabled)
    }

    /// Re-enable every level.
    pub fn reset(&mut self) {
        self.enabled = [true; LogLevel::ALL.len()];
    }

    /// The visible subsequence of the buffer, preserving arrival order.
    pub fn visible(&self, buffer: &RetentionBuffer) -> Vec<LogEntry> {
        buffer
            .iter()
            .filter(|entry| self.matches(entry))
            .cloned()
            .collect()
    }

    /// Count of entries passing the current filter.
    pub fn visible_count(&self, buffer: &RetentionBuffer) -> usize {
        buffer.iter().filter(|entry| self.matches(entry)).count()
    }
}
