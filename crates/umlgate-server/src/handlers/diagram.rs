//! Diagram endpoints.
//!
//! `GET /{format}/[{index}/]{token}` carries the source as a URL token.
//! `POST /{format}/[{index}/][{scheme}]` carries it in the body, encoded
//! as named by `scheme` (verbatim when absent or unknown).
//!
//! Both are also served under the opt-out segment, where SVG output is
//! never watermarked.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use chrono::Utc;
use serde::Deserialize;
use umlgate_codec::{Scheme, UrlTail, decode_or_placeholder};
use umlgate_engine::source::{is_cacheable, select_image};
use umlgate_engine::{Diagram, FileFormat};

use crate::emit::Emitter;
use crate::error::ServerError;
use crate::negotiate::{ConditionalHeaders, Negotiation, negotiate};
use crate::route::OutputFormat;
use crate::state::AppState;
use crate::watermark;

/// Path parameters of the diagram routes.
#[derive(Debug, Deserialize)]
pub(crate) struct DiagramPath {
    kind: String,
    #[serde(default)]
    tail: String,
}

/// Which URL namespace served the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Namespace {
    Default,
    /// Opt-out namespace: no watermark.
    Public,
}

/// Everything the render pipeline needs from a request.
#[derive(Debug)]
struct DiagramRequest {
    source: String,
    index: usize,
    format: OutputFormat,
    watermark: bool,
    conditional: ConditionalHeaders,
}

/// Handle GET /{format}/{*tail}.
pub(crate) async fn get_diagram(
    State(state): State<Arc<AppState>>,
    Path(path): Path<DiagramPath>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    get_impl(state, &path, &headers, Namespace::Default).await
}

/// Handle GET /{public_segment}/{format}/{*tail}.
pub(crate) async fn get_public_diagram(
    State(state): State<Arc<AppState>>,
    Path(path): Path<DiagramPath>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    get_impl(state, &path, &headers, Namespace::Public).await
}

/// Handle POST /{format} and POST /{format}/{*tail}.
pub(crate) async fn post_diagram(
    State(state): State<Arc<AppState>>,
    Path(path): Path<DiagramPath>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ServerError> {
    post_impl(state, &path, &headers, &body, Namespace::Default).await
}

/// Handle POST under the opt-out segment.
pub(crate) async fn post_public_diagram(
    State(state): State<Arc<AppState>>,
    Path(path): Path<DiagramPath>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ServerError> {
    post_impl(state, &path, &headers, &body, Namespace::Public).await
}

async fn get_impl(
    state: Arc<AppState>,
    path: &DiagramPath,
    headers: &HeaderMap,
    namespace: Namespace,
) -> Result<Response, ServerError> {
    let format = output_format(&path.kind)?;
    let tail = UrlTail::parse(&path.tail);
    let source = decode_or_placeholder(tail.token.as_bytes(), Scheme::Compressed);
    respond(state, request(source, tail.index, format, headers, namespace)).await
}

async fn post_impl(
    state: Arc<AppState>,
    path: &DiagramPath,
    headers: &HeaderMap,
    body: &[u8],
    namespace: Namespace,
) -> Result<Response, ServerError> {
    let format = output_format(&path.kind)?;
    let tail = UrlTail::parse(&path.tail);
    let scheme = Scheme::from_selector(&tail.token);
    let source = decode_or_placeholder(body, scheme);
    respond(state, request(source, tail.index, format, headers, namespace)).await
}

fn output_format(kind: &str) -> Result<OutputFormat, ServerError> {
    OutputFormat::from_segment(kind).ok_or_else(|| ServerError::UnknownFormat(kind.to_owned()))
}

fn request(
    source: String,
    index: usize,
    format: OutputFormat,
    headers: &HeaderMap,
    namespace: Namespace,
) -> DiagramRequest {
    DiagramRequest {
        source,
        index,
        format,
        watermark: namespace == Namespace::Default
            && format == OutputFormat::Image(FileFormat::Svg),
        conditional: ConditionalHeaders::from_headers(headers),
    }
}

/// Run the blocking render pipeline off the async runtime.
async fn respond(state: Arc<AppState>, request: DiagramRequest) -> Result<Response, ServerError> {
    tokio::task::spawn_blocking(move || render(&state, &request)).await?
}

fn render(state: &AppState, request: &DiagramRequest) -> Result<Response, ServerError> {
    let diagrams = parse(state, &request.source)?;
    let (diagram, image) = select_image(&diagrams, request.index)
        .ok_or(ServerError::DiagramNotFound(request.index))?;
    let mut emitter = Emitter::new(request.format);

    match request.format {
        OutputFormat::Base64 => {
            let png = diagram.render(image, FileFormat::Png)?;
            Ok(emitter.base64(&png.bytes))
        }
        OutputFormat::Check => Ok(emitter.check(&diagram.metadata()?)),
        OutputFormat::Map => {
            if is_cacheable(&request.source) {
                emitter.cache_headers(&diagram.metadata()?, &state.powered_by, Utc::now());
            }
            let image = diagram.render(image, FileFormat::Png)?;
            Ok(emitter.map(image.image_map))
        }
        OutputFormat::Image(format) => {
            let metadata = diagram.metadata()?;
            if is_cacheable(&request.source) {
                emitter.cache_headers(&metadata, &state.powered_by, Utc::now());
                if negotiate(&request.conditional, &metadata) == Negotiation::NotModified {
                    return Ok(emitter.not_modified());
                }
            }

            let mut bytes = diagram.render(image, format)?.bytes;
            if request.watermark
                && let Some(template) = &state.watermark
            {
                bytes = watermark::apply(&bytes, template);
            }
            Ok(emitter.image(bytes, metadata.is_error()))
        }
    }
}

/// Parse with the config lines, or without them if they break the source.
fn parse(state: &AppState, source: &str) -> Result<Vec<Box<dyn Diagram>>, ServerError> {
    let config = state.config_lines.get().map_err(ServerError::ConfigLoad)?;
    let diagrams = state.engine.parse(source, config)?;
    if config.is_empty() {
        return Ok(diagrams);
    }

    let rejected = match diagrams.first() {
        Some(first) => first.metadata()?.is_error(),
        None => false,
    };
    if rejected {
        tracing::debug!("Source rejected with config lines, parsing without them");
        return Ok(state.engine.parse(source, &[])?);
    }
    Ok(diagrams)
}
