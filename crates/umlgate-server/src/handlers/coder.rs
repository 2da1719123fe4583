//! Text coder endpoint.
//!
//! `POST /coder` turns diagram source into the URL token a `GET` request
//! would carry.

use axum::http::header;
use axum::response::IntoResponse;
use umlgate_codec::{Scheme, encode};

use crate::error::ServerError;

/// Handle POST /coder.
pub(crate) async fn encode_source(body: String) -> Result<impl IntoResponse, ServerError> {
    let token = encode(&body, Scheme::Compressed).map_err(ServerError::Encode)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain;charset=UTF-8"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        ],
        token,
    ))
}
