//! Internal constants for diagram rendering.

use std::time::Duration;

/// Default HTTP timeout for Kroki requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Kroki endpoint serving `PlantUML` sources.
pub const PLANTUML_ENDPOINT: &str = "plantuml";

/// Maximum `!include` nesting depth.
pub const MAX_INCLUDE_DEPTH: usize = 10;

/// Description reported for error diagrams.
pub const ERROR_DESCRIPTION: &str = "(Error)";
