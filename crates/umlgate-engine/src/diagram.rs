//! Render engine contract.

use chrono::{DateTime, Utc};

use crate::{EngineError, FileFormat};

/// Error or warning reported by the engine for one source line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagramIssue {
    /// Human-readable message.
    pub message: String,
    /// Source line the message refers to.
    pub line: usize,
}

/// Per-diagram facts used for conditional requests and diagnostic headers.
///
/// Entity tag and last-modified time depend only on the diagram source, its
/// position and the render configuration, so equal inputs give equal values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagramMetadata {
    /// Last modification time, whole seconds.
    pub last_modified: DateTime<Utc>,
    /// Entity tag, unquoted.
    pub etag: String,
    /// Short human-readable description (e.g. `(Error)`).
    pub description: String,
    /// Errors of an error diagram; empty otherwise.
    pub errors: Vec<DiagramIssue>,
}

impl DiagramMetadata {
    /// Whether the engine rejected the source and renders an error diagram.
    #[must_use]
    pub fn is_error(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// One rendered image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageData {
    /// Encoded image in the requested format.
    pub bytes: Vec<u8>,
    /// Client-side image map markup, when the engine produces one.
    pub image_map: Option<String>,
}

/// A parsed diagram block.
pub trait Diagram: Send + Sync {
    /// Number of images the diagram renders to.
    fn image_count(&self) -> usize {
        1
    }

    /// Metadata of this diagram.
    ///
    /// # Errors
    ///
    /// Returns an error when the engine cannot be reached.
    fn metadata(&self) -> Result<DiagramMetadata, EngineError>;

    /// Render the image at `index` (0-based, below [`image_count`](Self::image_count)).
    ///
    /// Error diagrams still render: the image depicts the error.
    ///
    /// # Errors
    ///
    /// Returns an error when the engine cannot be reached or `index` is out of range.
    fn render(&self, index: usize, format: FileFormat) -> Result<ImageData, EngineError>;
}

/// Turns diagram source into renderable diagrams.
///
/// Implementations must be callable concurrently from independent requests.
pub trait DiagramEngine: Send + Sync {
    /// Parse `source` into its diagram blocks, applying `config` lines to each.
    ///
    /// # Errors
    ///
    /// Returns an error when the engine cannot process the source at all.
    fn parse(&self, source: &str, config: &[String]) -> Result<Vec<Box<dyn Diagram>>, EngineError>;
}
