//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use umlgate_engine::EngineError;

/// Server error type.
///
/// Only failures that leave no diagram to send end up here. Undecodable
/// payloads, invalid diagrams and watermark failures still produce an image.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Config lines file declared but unreadable.
    #[error("Cannot read config lines: {0}")]
    ConfigLoad(#[source] std::io::Error),

    /// Render engine failed.
    #[error("Render engine error: {0}")]
    Engine(#[from] EngineError),

    /// Diagram index beyond the images of the source.
    #[error("Diagram not found: {0}")]
    DiagramNotFound(usize),

    /// Unknown output kind in the request path.
    #[error("Unknown output format: {0}")]
    UnknownFormat(String),

    /// Source could not be encoded.
    #[error("Cannot encode source: {0}")]
    Encode(#[source] std::io::Error),

    /// Render task panicked or was cancelled.
    #[error("Render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::ConfigLoad(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "Cannot read config lines", "detail": e.to_string()}),
            ),
            Self::Engine(e) => (StatusCode::BAD_GATEWAY, json!({"error": e.to_string()})),
            Self::DiagramNotFound(index) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Diagram not found", "index": index}),
            ),
            Self::UnknownFormat(kind) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Unknown output format", "format": kind}),
            ),
            Self::Encode(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": e.to_string()}),
            ),
            Self::Join(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": e.to_string()}),
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        (status, axum::Json(body)).into_response()
    }
}
