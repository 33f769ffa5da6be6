//! Console log pipeline: retention, filtering, search, and source-mode
//! tracking over the entries classified by `cdemon-core`.
//!
//! The crate is split along the data path:
//! - [`buffer`]: bounded FIFO retention
//! - [`filter`]: per-level visibility
//! - [`search`]: case-insensitive match index over the visible text
//! - [`mode`]: raw-parse vs bridge-connected source tracking
//! - [`render`]: the frame handed to a render sink
//! - [`pipeline`]: the serialized core and its command-channel front

pub mod buffer;
pub mod filter;
pub mod mode;
pub mod pipeline;
pub mod render;
pub mod search;

pub use buffer::{RetentionBuffer, DEFAULT_MAX_ENTRIES};
pub use filter::FilterState;
pub use mode::{ModeController, SourceMode};
pub use pipeline::{spawn, ConsolePipeline, PipelineCommand, PipelineConfig, PipelineHandle};
pub use render::{render_text, style_for, EntryStyle, RenderFrame, RenderLine, StyleColor};
pub use search::{SearchMatch, SearchState};
