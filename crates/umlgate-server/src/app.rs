//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers::{coder, diagram};
use crate::state::AppState;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `public_segment` - Path segment of the unwatermarked namespace
pub(crate) fn create_router(state: Arc<AppState>, public_segment: &str) -> Router {
    let public_routes = Router::new()
        .route("/{kind}", post(diagram::post_public_diagram))
        .route(
            "/{kind}/{*tail}",
            get(diagram::get_public_diagram).post(diagram::post_public_diagram),
        );

    Router::new()
        .route("/coder", post(coder::encode_source))
        .route("/{kind}", post(diagram::post_diagram))
        .route(
            "/{kind}/{*tail}",
            get(diagram::get_diagram).post(diagram::post_diagram),
        )
        .nest(&format!("/{public_segment}"), public_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
