//! The console pipeline — the single serialized append point.
//!
//! [`ConsolePipeline`] owns the retention buffer, filter set, search
//! state, and source mode, and applies every operation atomically. It is
//! deliberately synchronous: producers reach it through the command
//! channel set up by [`spawn`], so classification, eviction, and
//! recomputation for one input happen before the next is looked at.
//!
//! After every mutation a [`RenderFrame`] is derived and pushed to the
//! presentation side, which consumes frames on whatever execution context
//! it likes.

use tokio::sync::{mpsc, watch};

use cdemon_core::prelude::*;
use cdemon_core::{
    classify_bridge, classify_line, BridgeEvent, LogEntry, LogLevel, ProcessStatus,
    SupervisorEvent,
};

use crate::buffer::{RetentionBuffer, DEFAULT_MAX_ENTRIES};
use crate::filter::FilterState;
use crate::mode::{ModeController, SourceMode};
use crate::render::{render_text, style_for, RenderFrame, RenderLine};
use crate::search::SearchState;

// ─────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────

/// Pipeline construction parameters.
#[derive(Debug)]
pub struct PipelineConfig {
    /// Retention buffer capacity
    pub max_entries: usize,
    /// Initial filter set
    pub filter: FilterState,
    /// Pass-through hook receiving every raw supervisor line before
    /// classification (profiler/event-timeline consumers). Never sees
    /// bridge events or operator messages.
    pub raw_tap: Option<mpsc::UnboundedSender<String>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            filter: FilterState::default(),
            raw_tap: None,
        }
    }
}

// ─────────────────────────────────────────────────────────
// Synchronous core
// ─────────────────────────────────────────────────────────

/// Owns all mutable console state behind one append path.
#[derive(Debug)]
pub struct ConsolePipeline {
    buffer: RetentionBuffer,
    filter: FilterState,
    search: SearchState,
    mode: ModeController,
    raw_tap: Option<mpsc::UnboundedSender<String>>,
}

impl ConsolePipeline {
    /// Build a pipeline. Fails fast on invalid configuration.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Ok(Self {
            buffer: RetentionBuffer::new(config.max_entries)?,
            filter: config.filter,
            search: SearchState::new(),
            mode: ModeController::new(),
            raw_tap: config.raw_tap,
        })
    }

    // ── Ingestion ────────────────────────────────────────

    /// Ingest one event from the process supervisor.
    pub fn supervisor_event(&mut self, event: SupervisorEvent) {
        match event {
            SupervisorEvent::Line(line) => self.append_raw_line(&line),
            SupervisorEvent::Status(status) => self.process_status(status),
        }
    }

    /// Ingest one event from the bridge connection.
    pub fn bridge_event(&mut self, event: BridgeEvent) {
        match event {
            BridgeEvent::Connected => {
                self.mode.connect();
            }
            BridgeEvent::Disconnected => {
                self.mode.disconnect();
            }
            BridgeEvent::Log(log) => self.append_entry(classify_bridge(&log)),
        }
    }

    /// Classify and retain one raw console line.
    ///
    /// The raw tap fires first, pre-classification, so timeline consumers
    /// see exactly what the child process wrote.
    pub fn append_raw_line(&mut self, line: &str) {
        if let Some(tap) = &self.raw_tap {
            if tap.send(line.to_string()).is_err() {
                // Tap consumer went away; stop forwarding
                self.raw_tap = None;
            }
        }
        self.append_entry(classify_line(line));
    }

    /// Append an operator-synthesized message.
    pub fn append_system(&mut self, message: &str) {
        self.append_entry(LogEntry::system(message));
    }

    /// Render a child process lifecycle transition as a `System` entry.
    pub fn process_status(&mut self, status: ProcessStatus) {
        info!("child process status: {:?}", status);
        self.append_entry(LogEntry::system(status.summary()));
    }

    fn append_entry(&mut self, entry: LogEntry) {
        self.buffer.append(entry);
        self.refresh_search();
    }

    // ── Operator commands ────────────────────────────────

    /// Drop all retained entries and any search matches over them.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.refresh_search();
    }

    /// Toggle visibility of one severity level.
    pub fn set_filter_enabled(&mut self, level: LogLevel, enabled: bool) {
        self.filter.set_enabled(level, enabled);
        self.refresh_search();
    }

    /// Set the search query and rebuild the index over the visible text.
    pub fn search(&mut self, query: &str) {
        self.search.set_query(query);
        self.refresh_search();
    }

    /// Advance the search cursor. No-op with zero matches.
    pub fn search_next(&mut self) {
        self.search.next_match();
    }

    /// Step the search cursor back. No-op with zero matches.
    pub fn search_prev(&mut self) {
        self.search.prev_match();
    }

    // ── Views ────────────────────────────────────────────

    /// Current ingestion mode.
    pub fn mode(&self) -> SourceMode {
        self.mode.mode()
    }

    /// Observe mode transitions (one notification per actual change).
    pub fn subscribe_mode(&self) -> watch::Receiver<SourceMode> {
        self.mode.subscribe()
    }

    pub fn retained_count(&self) -> usize {
        self.buffer.len()
    }

    /// Count of entries passing the current filter.
    pub fn visible_count(&self) -> usize {
        self.filter.visible_count(&self.buffer)
    }

    pub fn search_status(&self) -> String {
        self.search.status()
    }

    /// The concatenated visible text — search offsets index into this.
    pub fn rendered_text(&self) -> String {
        render_text(self.buffer.iter().filter(|e| self.filter.matches(e)))
    }

    /// Derive the frame the render sink should paint now.
    pub fn render_frame(&self) -> RenderFrame {
        let lines: Vec<RenderLine> = self
            .filter
            .visible(&self.buffer)
            .into_iter()
            .map(|entry| {
                let style = style_for(entry.level);
                RenderLine { entry, style }
            })
            .collect();

        RenderFrame {
            visible_count: lines.len(),
            retained_count: self.buffer.len(),
            error_count: self.buffer.error_count(),
            search_status: self.search.status(),
            search_offset: self.search.current_offset(),
            mode: self.mode.mode(),
            lines,
        }
    }

    /// Full recomputation against the current visible text. Cheap because
    /// the retention buffer is bounded.
    fn refresh_search(&mut self) {
        let rendered = self.rendered_text();
        self.search.recompute(&rendered);
    }
}

// ─────────────────────────────────────────────────────────
// Command-channel front
// ─────────────────────────────────────────────────────────

/// Everything the pipeline task can be asked to do.
#[derive(Debug, Clone)]
pub enum PipelineCommand {
    Supervisor(SupervisorEvent),
    Bridge(BridgeEvent),
    AppendSystem(String),
    Clear,
    SetFilterEnabled { level: LogLevel, enabled: bool },
    Search(String),
    SearchNext,
    SearchPrev,
}

/// Clonable, non-blocking sender half handed to producers and the
/// operator UI. Dropping every handle shuts the pipeline task down.
#[derive(Debug, Clone)]
pub struct PipelineHandle {
    tx: mpsc::UnboundedSender<PipelineCommand>,
}

impl PipelineHandle {
    fn send(&self, command: PipelineCommand) {
        if self.tx.send(command).is_err() {
            trace!("pipeline task gone, dropping command");
        }
    }

    pub fn supervisor_event(&self, event: SupervisorEvent) {
        self.send(PipelineCommand::Supervisor(event));
    }

    pub fn raw_line(&self, line: impl Into<String>) {
        self.supervisor_event(SupervisorEvent::Line(line.into()));
    }

    pub fn process_status(&self, status: ProcessStatus) {
        self.supervisor_event(SupervisorEvent::Status(status));
    }

    pub fn bridge_event(&self, event: BridgeEvent) {
        self.send(PipelineCommand::Bridge(event));
    }

    pub fn append_system(&self, message: impl Into<String>) {
        self.send(PipelineCommand::AppendSystem(message.into()));
    }

    pub fn clear(&self) {
        self.send(PipelineCommand::Clear);
    }

    pub fn set_filter_enabled(&self, level: LogLevel, enabled: bool) {
        self.send(PipelineCommand::SetFilterEnabled { level, enabled });
    }

    pub fn search(&self, query: impl Into<String>) {
        self.send(PipelineCommand::Search(query.into()));
    }

    pub fn search_next(&self) {
        self.send(PipelineCommand::SearchNext);
    }

    pub fn search_prev(&self) {
        self.send(PipelineCommand::SearchPrev);
    }
}

/// Spawn the pipeline task.
///
/// Returns the command handle, the frame stream for the presentation
/// context, and a mode watch receiver for status indicators. The task
/// exits when every handle is dropped (commands already queued are still
/// processed first) or when the frame receiver goes away.
pub fn spawn(
    config: PipelineConfig,
) -> Result<(
    PipelineHandle,
    mpsc::UnboundedReceiver<RenderFrame>,
    watch::Receiver<SourceMode>,
)> {
    let mut pipeline = ConsolePipeline::new(config)?;
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<PipelineCommand>();
    let (frame_tx, frame_rx) = mpsc::unbounded_channel::<RenderFrame>();
    let mode_rx = pipeline.subscribe_mode();

    tokio::spawn(async move {
        while let Some(command) = cmd_rx.recv().await {
            apply(&mut pipeline, command);
            if frame_tx.send(pipeline.render_frame()).is_err() {
                // Presentation side hung up; nothing left to serve
                break;
            }
        }
        debug!("pipeline task stopped");
    });

    Ok((PipelineHandle { tx: cmd_tx }, frame_rx, mode_rx))
}

fn apply(pipeline: &mut ConsolePipeline, command: PipelineCommand) {
    match command {
        PipelineCommand::Supervisor(event) => pipeline.supervisor_event(event),
        PipelineCommand::Bridge(event) => pipeline.bridge_event(event),
        PipelineCommand::AppendSystem(message) => pipeline.append_system(&message),
        PipelineCommand::Clear => pipeline.clear(),
        PipelineCommand::SetFilterEnabled { level, enabled } => {
            pipeline.set_filter_enabled(level, enabled)
        }
        PipelineCommand::Search(query) => pipeline.search(&query),
        PipelineCommand::SearchNext => pipeline.search_next(),
        PipelineCommand::SearchPrev => pipeline.search_prev(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdemon_core::{BridgeLevel, BridgeLogEvent};

    fn pipeline(max_entries: usize) -> ConsolePipeline {
        ConsolePipeline::new(PipelineConfig {
            max_entries,
            ..Default::default()
        })
        .expect("valid config")
    }

    fn visible_messages(p: &ConsolePipeline) -> Vec<String> {
        p.render_frame()
            .lines
            .into_iter()
            .map(|line| line.entry.message)
            .collect()
    }

    #[test]
    fn test_invalid_capacity_fails_construction() {
        let result = ConsolePipeline::new(PipelineConfig {
            max_entries: 0,
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_raw_lines_classified_and_retained() {
        let mut p = pipeline(100);
        p.append_raw_line("[2025-01-01 10:00:00 INFO] Server ready");
        p.append_raw_line("[2025-01-01 10:00:01 ERROR] Boom");
        p.append_raw_line("hello world");

        let frame = p.render_frame();
        let levels: Vec<_> = frame.lines.iter().map(|l| l.entry.level).collect();
        assert_eq!(levels, [LogLevel::Info, LogLevel::Error, LogLevel::Info]);
        assert_eq!(frame.lines[2].entry.source, None);
        assert_eq!(frame.lines[2].entry.message, "hello world");
        assert_eq!(frame.error_count, 1);
    }

    #[test]
    fn test_capacity_eviction_through_pipeline() {
        let mut p = pipeline(2);
        p.append_raw_line("A");
        p.append_raw_line("B");
        p.append_raw_line("C");
        assert_eq!(p.retained_count(), 2);
        assert_eq!(visible_messages(&p), ["B", "C"]);
    }

    #[test]
    fn test_filter_hides_and_restores() {
        let mut p = pipeline(100);
        p.append_raw_line("[10:00:00] [INFO] fine");
        p.append_raw_line("[10:00:01] [ERROR] bad");

        p.set_filter_enabled(LogLevel::Info, false);
        assert_eq!(visible_messages(&p), ["bad"]);
        assert_eq!(p.visible_count(), 1);
        assert_eq!(p.retained_count(), 2);

        p.set_filter_enabled(LogLevel::Info, true);
        assert_eq!(visible_messages(&p), ["fine", "bad"]);
    }

    #[test]
    fn test_search_only_sees_visible_text() {
        let mut p = pipeline(100);
        p.append_raw_line("[10:00:00] [INFO] needle in info");
        p.append_raw_line("[10:00:01] [ERROR] plain failure");

        for level in LogLevel::ALL {
            p.set_filter_enabled(level, level == LogLevel::Error);
        }
        p.search("needle");
        assert_eq!(p.search_status(), "0/0");

        // Re-enabling the level brings the match back
        p.set_filter_enabled(LogLevel::Info, true);
        assert_eq!(p.search_status(), "1/1");
    }

    #[test]
    fn test_search_recomputed_on_append() {
        let mut p = pipeline(100);
        p.append_raw_line("alpha");
        p.search("alpha");
        assert_eq!(p.search_status(), "1/1");
        p.append_raw_line("alpha again");
        assert_eq!(p.search_status(), "1/2");
    }

    #[test]
    fn test_search_offset_valid_in_rendered_text() {
        let mut p = pipeline(100);
        p.append_raw_line("first line");
        p.append_raw_line("the target line");
        p.search("target");

        let frame = p.render_frame();
        let offset = frame.search_offset.expect("one match");
        let rendered = frame.rendered_text();
        assert_eq!(&rendered[offset..offset + "target".len()], "target");
        assert_eq!(rendered, p.rendered_text());
    }

    #[test]
    fn test_clear_resets_buffer_and_search() {
        let mut p = pipeline(100);
        p.append_raw_line("some error text");
        p.search("error");
        assert_eq!(p.search_status(), "1/1");

        p.clear();
        assert_eq!(p.retained_count(), 0);
        assert_eq!(p.search_status(), "0/0");
        assert!(p.render_frame().lines.is_empty());
    }

    #[test]
    fn test_system_messages_skip_grammar() {
        let mut p = pipeline(100);
        p.append_system("[not parsed] Console attached");
        let frame = p.render_frame();
        assert_eq!(frame.lines[0].entry.level, LogLevel::System);
        assert_eq!(frame.lines[0].entry.message, "[not parsed] Console attached");
    }

    #[test]
    fn test_process_status_becomes_system_entry() {
        let mut p = pipeline(100);
        p.supervisor_event(SupervisorEvent::Status(ProcessStatus::Stopped {
            code: Some(0),
        }));
        let frame = p.render_frame();
        assert_eq!(frame.lines[0].entry.level, LogLevel::System);
        assert!(frame.lines[0].entry.message.contains("exited with code 0"));
    }

    #[test]
    fn test_bridge_events_drive_mode_and_entries() {
        let mut p = pipeline(100);
        assert_eq!(p.mode(), SourceMode::FallbackParsing);

        p.bridge_event(BridgeEvent::Connected);
        assert_eq!(p.mode(), SourceMode::BridgeConnected);

        p.bridge_event(BridgeEvent::Log(BridgeLogEvent {
            level: BridgeLevel::Fatal,
            logger: Some("net.core.Server".to_string()),
            message: "tick overrun".to_string(),
            thrown: None,
        }));
        let frame = p.render_frame();
        assert_eq!(frame.lines[0].entry.level, LogLevel::Error);
        assert_eq!(frame.lines[0].entry.source.as_deref(), Some("Server"));

        p.bridge_event(BridgeEvent::Disconnected);
        assert_eq!(p.mode(), SourceMode::FallbackParsing);
        // Entry ingested while connected keeps its classification
        assert_eq!(
            p.render_frame().lines[0].entry.level,
            LogLevel::Error
        );
    }

    #[test]
    fn test_mode_observer_notified_once_per_transition() {
        let mut p = pipeline(100);
        let mut rx = p.subscribe_mode();

        p.bridge_event(BridgeEvent::Connected);
        p.bridge_event(BridgeEvent::Connected);
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
        assert!(!rx.has_changed().unwrap());

        p.bridge_event(BridgeEvent::Disconnected);
        p.bridge_event(BridgeEvent::Connected);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SourceMode::BridgeConnected);
    }

    #[test]
    fn test_raw_tap_sees_lines_pre_classification() {
        let (tap_tx, mut tap_rx) = mpsc::unbounded_channel();
        let mut p = ConsolePipeline::new(PipelineConfig {
            max_entries: 100,
            raw_tap: Some(tap_tx),
            ..Default::default()
        })
        .unwrap();

        let raw = "\x1b[31m[10:00:00] [ERROR] red\x1b[0m";
        p.append_raw_line(raw);
        p.append_system("operator note");
        p.bridge_event(BridgeEvent::Log(BridgeLogEvent {
            level: BridgeLevel::Info,
            logger: None,
            message: "bridge only".to_string(),
            thrown: None,
        }));

        // Only the supervisor line reaches the tap, unstripped
        assert_eq!(tap_rx.try_recv().unwrap(), raw);
        assert!(tap_rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_tap_does_not_disturb_ingestion() {
        let (tap_tx, tap_rx) = mpsc::unbounded_channel();
        drop(tap_rx);
        let mut p = ConsolePipeline::new(PipelineConfig {
            max_entries: 100,
            raw_tap: Some(tap_tx),
            ..Default::default()
        })
        .unwrap();

        p.append_raw_line("still ingested");
        p.append_raw_line("and this one");
        assert_eq!(p.retained_count(), 2);
    }

    // ── Command-channel front ────────────────────────────

    #[tokio::test]
    async fn test_spawned_pipeline_processes_commands_in_order() {
        let (handle, mut frames, _mode_rx) = spawn(PipelineConfig::default()).unwrap();

        handle.raw_line("[2025-01-01 10:00:00 INFO] Server ready");
        handle.raw_line("[2025-01-01 10:00:01 ERROR] Boom");

        let first = frames.recv().await.unwrap();
        assert_eq!(first.visible_count, 1);
        let second = frames.recv().await.unwrap();
        assert_eq!(second.visible_count, 2);
        assert_eq!(second.error_count, 1);
        assert_eq!(second.lines[1].entry.message, "Boom");
    }

    #[tokio::test]
    async fn test_spawned_pipeline_operator_commands() {
        let (handle, mut frames, _mode_rx) = spawn(PipelineConfig::default()).unwrap();

        handle.raw_line("alpha error");
        handle.search("error");
        handle.clear();

        let _append = frames.recv().await.unwrap();
        let searched = frames.recv().await.unwrap();
        assert_eq!(searched.search_status, "1/1");
        let cleared = frames.recv().await.unwrap();
        assert_eq!(cleared.retained_count, 0);
        assert_eq!(cleared.search_status, "0/0");
    }

    #[tokio::test]
    async fn test_spawned_pipeline_mode_watch() {
        let (handle, mut frames, mut mode_rx) = spawn(PipelineConfig::default()).unwrap();

        handle.bridge_event(BridgeEvent::Connected);
        let frame = frames.recv().await.unwrap();
        assert_eq!(frame.mode, SourceMode::BridgeConnected);
        mode_rx.changed().await.unwrap();
        assert_eq!(*mode_rx.borrow(), SourceMode::BridgeConnected);
    }

    #[tokio::test]
    async fn test_dropping_handles_shuts_pipeline_down() {
        let (handle, mut frames, _mode_rx) = spawn(PipelineConfig::default()).unwrap();
        handle.raw_line("last words");
        drop(handle);

        // The queued line is still processed, then the stream ends
        assert!(frames.recv().await.is_some());
        assert!(frames.recv().await.is_none());
    }
}
