//! Raw console line classification.
//!
//! Fallback-mode normalization: one raw text line in, one [`LogEntry`] out.
//! Servers and build tools disagree wildly about log line layout, so the
//! structured grammar here is best-effort: lines it does not recognize
//! degrade to keyword sniffing and finally to `Info`. Classification never
//! fails and never drops a line.
//!
//! Recognized structured shapes:
//!
//! ```text
//! [2025-01-01 10:00:00] [INFO] Server ready
//! [10:00:00] [Server thread/WARN]: Can't keep up!
//! [2025-01-01 10:00:00 ERROR] Boom
//! ```
//!
//! After the severity token, a further leading `[source]` token is split
//! off when present:
//!
//! ```text
//! [10:00:00] [INFO] [AuthPlugin] enabled
//! ```

use regex::Regex;
use std::sync::LazyLock;

use crate::ansi::strip_ansi_codes;
use crate::types::{LogEntry, LogLevel};

/// `[timestamp] [severity] rest` — the severity token may carry a thread
/// prefix (`Server thread/INFO`); only the last `/`-component counts.
static TWO_BRACKET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[([^\]]+)\]\s*\[([^\]]+)\]:?\s?(.*)$").expect("two-bracket pattern is valid")
});

/// `[date time SEVERITY] rest` — single leading bracket whose last
/// whitespace-separated token is the severity.
static ONE_BRACKET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(.+?)\s+([A-Za-z]+)\]:?\s?(.*)$").expect("one-bracket pattern is valid")
});

/// Leading `[source]` token in the post-severity remainder.
static SOURCE_PREFIX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[([^\]]+)\]:?\s?(.*)$").expect("source prefix pattern is valid")
});

/// Map a structured-grammar severity token to a [`LogLevel`].
///
/// Unrecognized tokens return `None`; within a structured match the caller
/// defaults them to `Info` rather than rejecting the line.
fn parse_severity_token(token: &str) -> Option<LogLevel> {
    // Thread-qualified tokens keep only the last path component
    let token = token.rsplit('/').next().unwrap_or(token);
    match token.trim().to_ascii_uppercase().as_str() {
        "DEBUG" => Some(LogLevel::Debug),
        "INFO" => Some(LogLevel::Info),
        "WARN" | "WARNING" => Some(LogLevel::Warn),
        "ERROR" | "SEVERE" => Some(LogLevel::Error),
        _ => None,
    }
}

/// Keyword sniffing for lines that miss the structured grammar.
///
/// Case-insensitive substring checks in decreasing severity order, so a
/// line mentioning both `ERROR` and `DEBUG` classifies as an error.
fn sniff_level(message: &str) -> LogLevel {
    let lower = message.to_lowercase();
    if lower.contains("error") {
        LogLevel::Error
    } else if lower.contains("warn") {
        LogLevel::Warn
    } else if lower.contains("debug") {
        LogLevel::Debug
    } else {
        LogLevel::Info
    }
}

/// Split an optional leading `[source]` token off a remainder.
fn split_source(rest: &str) -> (Option<String>, String) {
    match SOURCE_PREFIX_PATTERN.captures(rest) {
        Some(caps) => (Some(caps[1].to_string()), caps[2].to_string()),
        None => (None, rest.to_string()),
    }
}

/// Classify one raw console line into a [`LogEntry`].
///
/// Never fails: unparsable input degrades to keyword sniffing and then to
/// a plain `Info` entry. The original line is retained as `raw`.
pub fn classify_line(raw: &str) -> LogEntry {
    let clean = strip_ansi_codes(raw);

    // Structured shape 1: [timestamp] [severity] rest
    if let Some(caps) = TWO_BRACKET_PATTERN.captures(&clean) {
        let stamp = &caps[1];
        // The first bracket must look like a date/time token, otherwise
        // lines like "[worker] [idle] ..." would be misread as structured.
        if stamp.chars().any(|c| c.is_ascii_digit()) {
            let level = parse_severity_token(&caps[2]).unwrap_or(LogLevel::Info);
            let (source, message) = split_source(&caps[3]);
            return LogEntry::new(level, source, message, raw);
        }
    }

    // Structured shape 2: [date time SEVERITY] rest
    if let Some(caps) = ONE_BRACKET_PATTERN.captures(&clean) {
        if let Some(level) = parse_severity_token(&caps[2]) {
            let (source, message) = split_source(&caps[3]);
            return LogEntry::new(level, source, message, raw);
        }
    }

    // Unstructured: sniff keywords, keep the whole cleaned line
    LogEntry::new(sniff_level(&clean), None, clean.clone(), raw)
}
