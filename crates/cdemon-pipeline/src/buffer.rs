//! Bounded retention buffer for log entries.
//!
//! Append-only ring semantics: insertion order is arrival order, and when
//! the configured capacity is exceeded the oldest entry is evicted before
//! the append completes. The buffer is exclusively owned by the pipeline;
//! render sinks only ever receive snapshots.

use std::collections::VecDeque;

use cdemon_core::prelude::*;
use cdemon_core::LogEntry;

/// Default retention capacity
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Size-bounded FIFO store of [`LogEntry`].
#[derive(Debug)]
pub struct RetentionBuffer {
    entries: VecDeque<LogEntry>,
    max_entries: usize,
    /// Cached count of error-level entries, maintained across
    /// append/evict/clear for status display
    error_count: usize,
}

impl RetentionBuffer {
    /// Create a buffer retaining at most `max_entries` entries.
    ///
    /// Fails fast on a zero capacity — that is a configuration bug, not a
    /// runtime condition.
    pub fn new(max_entries: usize) -> Result<Self> {
        if max_entries == 0 {
            return Err(Error::config("retention capacity must be non-zero"));
        }
        Ok(Self {
            entries: VecDeque::with_capacity(max_entries.min(DEFAULT_MAX_ENTRIES)),
            max_entries,
            error_count: 0,
        })
    }

    /// Append an entry, evicting the oldest while over capacity.
    ///
    /// `len() <= max_entries` holds when this returns.
    pub fn append(&mut self, entry: LogEntry) {
        if entry.is_error() {
            self.error_count += 1;
        }
        self.entries.push_back(entry);

        while self.entries.len() > self.max_entries {
            if let Some(evicted) = self.entries.pop_front() {
                if evicted.is_error() {
                    self.error_count = self.error_count.saturating_sub(1);
                }
            }
        }
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.error_count = 0;
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured capacity.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Count of retained error-level entries.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Iterate retained entries in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Owned copy of all retained entries in arrival order.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdemon_core::LogLevel;

    fn entry(message: &str) -> LogEntry {
        LogEntry::new(LogLevel::Info, None, message, message)
    }

    fn error_entry(message: &str) -> LogEntry {
        LogEntry::new(LogLevel::Error, None, message, message)
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(RetentionBuffer::new(0).is_err());
    }

    #[test]
    fn test_append_within_capacity() {
        let mut buffer = RetentionBuffer::new(3).unwrap();
        buffer.append(entry("a"));
        buffer.append(entry("b"));
        assert_eq!(buffer.len(), 2);
        let messages: Vec<_> = buffer.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["a", "b"]);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut buffer = RetentionBuffer::new(2).unwrap();
        buffer.append(entry("a"));
        buffer.append(entry("b"));
        buffer.append(entry("c"));
        assert_eq!(buffer.len(), 2);
        let messages: Vec<_> = buffer.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["b", "c"]);
    }

    #[test]
    fn test_capacity_invariant_holds_for_any_append_sequence() {
        let mut buffer = RetentionBuffer::new(5).unwrap();
        for i in 0..100 {
            buffer.append(entry(&format!("line {i}")));
            assert!(buffer.len() <= 5);
        }
        // Retained entries are exactly the most recent 5, in arrival order
        let messages: Vec<_> = buffer.iter().map(|e| e.message.clone()).collect();
        let expected: Vec<_> = (95..100).map(|i| format!("line {i}")).collect();
        assert_eq!(messages, expected);
    }

    #[test]
    fn test_eviction_is_level_independent() {
        let mut buffer = RetentionBuffer::new(2).unwrap();
        buffer.append(error_entry("important"));
        buffer.append(entry("noise 1"));
        buffer.append(entry("noise 2"));
        // Oldest goes first even though it was an error
        let messages: Vec<_> = buffer.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["noise 1", "noise 2"]);
    }

    #[test]
    fn test_error_count_tracks_append_evict_clear() {
        let mut buffer = RetentionBuffer::new(2).unwrap();
        buffer.append(error_entry("e1"));
        assert_eq!(buffer.error_count(), 1);
        buffer.append(error_entry("e2"));
        assert_eq!(buffer.error_count(), 2);
        buffer.append(entry("info"));
        // e1 evicted
        assert_eq!(buffer.error_count(), 1);
        buffer.clear();
        assert_eq!(buffer.error_count(), 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let mut buffer = RetentionBuffer::new(4).unwrap();
        buffer.append(entry("a"));
        let snapshot = buffer.snapshot();
        buffer.append(entry("b"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(buffer.len(), 2);
    }
}
