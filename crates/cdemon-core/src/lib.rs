//! # cdemon-core - Core Domain Types
//!
//! Foundation crate for console-demon. Provides the canonical log record,
//! raw-line and bridge-event classification, error handling, and the
//! diagnostic logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on
//! external crates (serde, chrono, thiserror, regex, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`LogEntry`] - A single normalized console entry (timestamp, level,
//!   optional source, display message, raw input)
//! - [`LogLevel`] - Closed severity set (`Debug`, `Info`, `Warn`, `Error`,
//!   `System`)
//!
//! ### Classification (`classify`, `events`)
//! - [`classify_line()`] - Fallback-mode raw text line normalization
//! - [`classify_bridge()`] - Structured bridge event normalization
//! - [`BridgeLogEvent`], [`BridgeLevel`] - The typed bridge feed
//! - [`SupervisorEvent`], [`ProcessStatus`] - The process supervisor feed
//!
//! ### Error Handling (`error`)
//! - [`Error`] / [`Result`] - thiserror-based error enum and alias
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use cdemon_core::prelude::*;
//! ```

pub mod ansi;
pub mod classify;
pub mod error;
pub mod events;
pub mod logging;
pub mod types;

/// Prelude for common imports used throughout all console-demon crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use ansi::{contains_ansi_codes, strip_ansi_codes};
pub use classify::classify_line;
pub use error::{Error, Result, ResultExt};
pub use events::{
    classify_bridge, BridgeEvent, BridgeLevel, BridgeLogEvent, ProcessStatus, SupervisorEvent,
};
pub use types::{LogEntry, LogLevel};
