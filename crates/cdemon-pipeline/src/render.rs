//! Render sink boundary types.
//!
//! The pipeline never draws. On every mutation it derives a
//! [`RenderFrame`] — the visible entries with their presentation styles
//! plus the derived statistics — and hands it to whatever sink the
//! presentation layer registered. Style is a pure function of the entry
//! level; how a sink paints a style is its own business.

use cdemon_core::{LogEntry, LogLevel};

use crate::mode::SourceMode;

/// Display color tag, free of any toolkit types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleColor {
    Default,
    DarkGray,
    Yellow,
    Red,
    Cyan,
}

/// Presentation style for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryStyle {
    pub color: StyleColor,
    pub bold: bool,
    pub italic: bool,
}

/// Map a level to its presentation style. Pure: equal levels always
/// yield equal styles.
pub fn style_for(level: LogLevel) -> EntryStyle {
    match level {
        LogLevel::Debug => EntryStyle {
            color: StyleColor::DarkGray,
            bold: false,
            italic: false,
        },
        LogLevel::Info => EntryStyle {
            color: StyleColor::Default,
            bold: false,
            italic: false,
        },
        LogLevel::Warn => EntryStyle {
            color: StyleColor::Yellow,
            bold: false,
            italic: false,
        },
        LogLevel::Error => EntryStyle {
            color: StyleColor::Red,
            bold: true,
            italic: false,
        },
        LogLevel::System => EntryStyle {
            color: StyleColor::Cyan,
            bold: false,
            italic: true,
        },
    }
}

/// One styled line handed to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderLine {
    pub entry: LogEntry,
    pub style: EntryStyle,
}

/// Everything a sink needs to repaint the console after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFrame {
    /// Visible entries in arrival order, styled
    pub lines: Vec<RenderLine>,
    /// Entries currently retained (pre-filter)
    pub retained_count: usize,
    /// Entries passing the current filter
    pub visible_count: usize,
    /// Error-level entries currently retained
    pub error_count: usize,
    /// Search cursor/count, `0/0` when idle
    pub search_status: String,
    /// Rendered-text offset of the current search match, for scrolling
    pub search_offset: Option<usize>,
    /// Current ingestion mode
    pub mode: SourceMode,
}

impl RenderFrame {
    /// The concatenated visible text — the coordinate space search
    /// offsets refer to.
    pub fn rendered_text(&self) -> String {
        render_text(self.lines.iter().map(|line| &line.entry))
    }
}

/// Join entries' display lines into the searchable rendered text.
pub fn render_text<'a>(entries: impl Iterator<Item = &'a LogEntry>) -> String {
    entries
        .map(|entry| entry.display_line())
        .collect::<Vec<_>>()
        .join("\n")
}
