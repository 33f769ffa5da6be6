//! Console Demon - a log console pipeline for noisy child-process output
//!
//! This is the binary entry point: a thin harness that feeds stdin through
//! the pipeline and paints the visible entries. All logic lives in the
//! library crates.

use std::io::Write;

use clap::Parser;
use crossterm::style::{Color, Stylize};
use tokio::io::{AsyncBufReadExt, BufReader};

use cdemon_core::events::{BridgeEvent, BridgeLogEvent};
use cdemon_core::LogLevel;
use cdemon_pipeline::{PipelineConfig, RenderLine, StyleColor};

/// Console Demon - classify, filter, and search child-process console output
#[derive(Parser, Debug)]
#[command(name = "cdemon")]
#[command(about = "Classify, filter, and search console log streams", long_about = None)]
struct Args {
    /// Retention capacity (oldest entries are evicted beyond this)
    #[arg(long, default_value_t = cdemon_pipeline::DEFAULT_MAX_ENTRIES)]
    max_entries: usize,

    /// Show debug-level entries (hidden by default)
    #[arg(long)]
    show_debug: bool,

    /// Highlight matches for this query and report the match count
    #[arg(long, value_name = "QUERY")]
    search: Option<String>,

    /// Treat lines that parse as structured bridge JSON as bridge events
    #[arg(long)]
    bridge: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if let Err(err) = cdemon_core::logging::init() {
        eprintln!("Warning: diagnostic logging unavailable: {}", err);
    }

    let mut filter = cdemon_pipeline::FilterState::default();
    if args.show_debug {
        filter.set_enabled(LogLevel::Debug, true);
    }

    let (handle, mut frames, _mode_rx) = cdemon_pipeline::spawn(PipelineConfig {
        max_entries: args.max_entries,
        filter,
        raw_tap: None,
    })?;

    if let Some(query) = &args.search {
        handle.search(query.clone());
    }

    // Feed stdin to the pipeline; dropping the handle at EOF shuts it down.
    let bridge_mode = args.bridge;
    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut bridge_attached = false;
        while let Ok(Some(line)) = lines.next_line().await {
            if bridge_mode {
                if let Some(event) = BridgeLogEvent::parse(&line) {
                    if !bridge_attached {
                        bridge_attached = true;
                        handle.bridge_event(BridgeEvent::Connected);
                    }
                    handle.bridge_event(BridgeEvent::Log(event));
                    continue;
                }
            }
            handle.raw_line(line);
        }
        if bridge_attached {
            handle.bridge_event(BridgeEvent::Disconnected);
        }
    });

    let use_color = !args.no_color;
    let mut stdout = std::io::stdout().lock();
    let mut last_printed: Option<u64> = None;
    let mut last_frame = None;

    while let Some(frame) = frames.recv().await {
        for line in &frame.lines {
            if last_printed.is_some_and(|id| line.entry.id <= id) {
                continue;
            }
            last_printed = Some(line.entry.id);
            writeln!(stdout, "{}", format_line(line, use_color))?;
        }
        last_frame = Some(frame);
    }
    reader.await?;

    if let Some(frame) = last_frame {
        eprintln!(
            "{} retained, {} visible, {} errors, mode: {}",
            frame.retained_count,
            frame.visible_count,
            frame.error_count,
            frame.mode.label()
        );
        if args.search.is_some() {
            eprintln!("matches: {}", frame.search_status);
        }
    }

    Ok(())
}

fn format_line(line: &RenderLine, use_color: bool) -> String {
    let text = line.entry.display_line();
    if !use_color {
        return text;
    }
    let mut styled = text.with(terminal_color(line.style.color));
    if line.style.bold {
        styled = styled.bold();
    }
    if line.style.italic {
        styled = styled.italic();
    }
    styled.to_string()
}

fn terminal_color(color: StyleColor) -> Color {
    match color {
        StyleColor::Default => Color::Reset,
        StyleColor::DarkGray => Color::DarkGrey,
        StyleColor::Yellow => Color::Yellow,
        StyleColor::Red => Color::Red,
        StyleColor::Cyan => Color::Cyan,
    }
}
