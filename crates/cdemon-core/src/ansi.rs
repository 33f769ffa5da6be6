//! ANSI escape code handling utilities
//!
//! Provides functions to strip ANSI escape sequences from console output.
//! Child processes routinely emit color/cursor codes that would appear as
//! garbage in the rendered log view, so every message is cleaned during
//! classification. The raw line is retained unmodified on the entry.

use regex::Regex;
use std::sync::LazyLock;

/// Regex pattern for ANSI escape sequences.
///
/// Covers:
/// - CSI sequences: ESC [ parameter bytes, final alphabetic byte (colors, cursor)
/// - OSC sequences: ESC ] ... BEL or ST (hyperlinks, titles)
/// - Simple escapes: ESC letter
///
/// Deliberately anchored on the ESC byte so that legitimate bracketed text
/// like `[INFO]` or `[1/3]` is never touched.
static ANSI_ESCAPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \x1b\[[0-9;?]*[A-Za-z]               # CSI sequences
        | \x1b\][^\x07\x1b]*(?:\x07|\x1b\\)  # OSC sequences
        | \x1b[A-Za-z]                       # Simple escapes
        ",
    )
    .expect("ANSI regex pattern is valid")
});

/// Strip all ANSI escape sequences from a string.
///
/// Idempotent: stripping an already-clean string returns it unchanged.
///
/// # Examples
///
/// ```
/// use cdemon_core::ansi::strip_ansi_codes;
///
/// let input = "\x1b[31mred text\x1b[0m";
/// assert_eq!(strip_ansi_codes(input), "red text");
///
/// // Bracketed text that is not an escape sequence survives
/// let input = "[WARN] [worker] queue full";
/// assert_eq!(strip_ansi_codes(input), input);
/// ```
pub fn strip_ansi_codes(input: &str) -> String {
    let mut output = ANSI_ESCAPE_PATTERN.replace_all(input, "").into_owned();
    // Removing a sequence can splice its neighbors into a new escape
    // (e.g. "\x1b[3" + "\x1b[31m" + "1m"), so repeat until none remain.
    // Every pass with a match strictly shrinks the string.
    while ANSI_ESCAPE_PATTERN.is_match(&output) {
        output = ANSI_ESCAPE_PATTERN.replace_all(&output, "").into_owned();
    }
    output
}

/// Check if a string contains ANSI escape sequences.
pub fn contains_ansi_codes(input: &str) -> bool {
    ANSI_ESCAPE_PATTERN.is_match(input)
}
