//! Engine error types.

/// Failure to obtain a diagram from the render engine.
///
/// A syntactically invalid diagram is not an error: it renders as an error
/// diagram (see [`DiagramMetadata::is_error`](crate::DiagramMetadata::is_error)).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EngineError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("render request failed: {0}")]
    Http(#[from] ureq::Error),

    /// Render service answered with an unexpected status.
    #[error("render service returned HTTP {status}: {body}")]
    Service {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// Diagram has fewer images than requested.
    #[error("diagram has no image {index}")]
    NoSuchImage {
        /// Requested image index.
        index: usize,
    },
}
