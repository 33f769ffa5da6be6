//! Ingestion source mode.
//!
//! Two states: trust raw-text parsing, or trust structured bridge events.
//! Transitions are driven by the bridge connection signaling
//! connect/disconnect and are idempotent. Observers subscribe through a
//! watch channel and see exactly one notification per actual transition;
//! already-ingested entries are never reclassified.

use tokio::sync::watch;

/// Which source the pipeline currently trusts for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceMode {
    /// Derive entries from unstructured raw text lines
    #[default]
    FallbackParsing,
    /// Derive entries from the structured, typed bridge feed
    BridgeConnected,
}

impl SourceMode {
    /// Short indicator label for status displays.
    pub fn label(&self) -> &'static str {
        match self {
            SourceMode::FallbackParsing => "raw",
            SourceMode::BridgeConnected => "bridge",
        }
    }
}

/// Two-state machine over a watch channel.
#[derive(Debug)]
pub struct ModeController {
    tx: watch::Sender<SourceMode>,
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeController {
    /// Controller starting in [`SourceMode::FallbackParsing`].
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SourceMode::FallbackParsing);
        Self { tx }
    }

    /// Current mode.
    pub fn mode(&self) -> SourceMode {
        *self.tx.borrow()
    }

    pub fn is_bridge_connected(&self) -> bool {
        self.mode() == SourceMode::BridgeConnected
    }

    /// Observe transitions. Each receiver sees one change notification
    /// per actual transition.
    pub fn subscribe(&self) -> watch::Receiver<SourceMode> {
        self.tx.subscribe()
    }

    /// Bridge attached. Returns true if this was an actual transition.
    pub fn connect(&self) -> bool {
        self.transition(SourceMode::BridgeConnected)
    }

    /// Bridge detached. Returns true if this was an actual transition.
    pub fn disconnect(&self) -> bool {
        self.transition(SourceMode::FallbackParsing)
    }

    /// send_if_modified keeps repeated signals from waking observers.
    fn transition(&self, target: SourceMode) -> bool {
        let changed = self.tx.send_if_modified(|mode| {
            if *mode == target {
                false
            } else {
                *mode = target;
                true
            }
        });
        if changed {
            tracing::info!("source mode changed to {:?}", target);
        }
        changed
    }
}
