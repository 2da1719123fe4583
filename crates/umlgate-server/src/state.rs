//! Application state.
//!
//! Shared state for all request handlers. Everything here is read-only
//! after startup.

use umlgate_engine::{ConfigLines, DiagramEngine};

use crate::watermark::WatermarkTemplate;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Render engine.
    pub(crate) engine: Box<dyn DiagramEngine>,
    /// Config lines applied to every render.
    pub(crate) config_lines: ConfigLines,
    /// Watermark overlay (`None` disables watermarking).
    pub(crate) watermark: Option<WatermarkTemplate>,
    /// Value of the `X-Powered-By` header.
    pub(crate) powered_by: String,
}
