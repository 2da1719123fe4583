//! Response emitter.
//!
//! Every response starts with `Access-Control-Allow-Origin` and the
//! content type of its [`OutputFormat`]; the branches add cache headers,
//! a status and the body.

use axum::body::Body;
use axum::http::header;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, TimeDelta, Utc};
use umlgate_engine::DiagramMetadata;

use crate::route::OutputFormat;

/// Client cache lifetime (5 days).
const MAX_AGE_SECS: i64 = 5 * 24 * 3600;

/// Prefix of base64 output.
const DATA_URI_PREFIX: &str = "data:image/png;base64,";

const DESCRIPTION: &str = "x-plantuml-diagram-description";
const ERROR: &str = "x-plantuml-diagram-error";
const ERROR_LINE: &str = "x-plantuml-diagram-error-line";
const POWERED_BY: &str = "x-powered-by";
const PATREON: &str = "x-patreon";
const DONATE: &str = "x-donate";

const PATREON_VALUE: &str = "Support us on https://plantuml.com/patreon";
const DONATE_VALUE: &str = "https://plantuml.com/paypal";

/// Format a timestamp as an HTTP date.
pub(crate) fn http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// `Cache-Control` value matching the `Expires` lifetime.
fn cache_control() -> String {
    format!("public, max-age={MAX_AGE_SECS}")
}

/// Header value from free text; control characters become spaces.
fn text_value(text: &str) -> Option<HeaderValue> {
    let clean: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    HeaderValue::from_str(&clean).ok()
}

/// Builder for one diagram response.
pub(crate) struct Emitter {
    headers: HeaderMap,
}

impl Emitter {
    pub(crate) fn new(format: OutputFormat) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(format.mime_type()),
        );
        Self { headers }
    }

    /// Add cache and diagnostic headers for a cacheable diagram.
    pub(crate) fn cache_headers(
        &mut self,
        metadata: &DiagramMetadata,
        powered_by: &str,
        now: DateTime<Utc>,
    ) {
        let expires = now + TimeDelta::seconds(MAX_AGE_SECS);
        let dates = [
            (header::EXPIRES, expires),
            (header::DATE, now),
            (header::LAST_MODIFIED, metadata.last_modified),
        ];
        for (name, time) in dates {
            if let Some(value) = text_value(&http_date(time)) {
                self.headers.insert(name, value);
            }
        }
        if let Some(value) = text_value(&cache_control()) {
            self.headers.insert(header::CACHE_CONTROL, value);
        }
        if let Some(value) = text_value(&format!("\"{}\"", metadata.etag)) {
            self.headers.insert(header::ETAG, value);
        }
        if let Some(value) = text_value(&metadata.description) {
            self.headers.insert(DESCRIPTION, value);
        }
        for issue in &metadata.errors {
            if let Some(value) = text_value(&issue.message) {
                self.headers.append(ERROR, value);
            }
            self.headers.append(ERROR_LINE, HeaderValue::from(issue.line));
        }
        if let Some(value) = text_value(powered_by) {
            self.headers.insert(POWERED_BY, value);
        }
        self.headers
            .insert(PATREON, HeaderValue::from_static(PATREON_VALUE));
        self.headers
            .insert(DONATE, HeaderValue::from_static(DONATE_VALUE));
    }

    /// 304 without a body.
    pub(crate) fn not_modified(self) -> Response {
        (StatusCode::NOT_MODIFIED, self.headers).into_response()
    }

    /// Image bytes; error diagrams are sent with status 400.
    pub(crate) fn image(self, bytes: Vec<u8>, is_error: bool) -> Response {
        let status = if is_error {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::OK
        };
        (status, self.headers, Body::from(bytes)).into_response()
    }

    /// PNG bytes as a `data:` URI.
    pub(crate) fn base64(self, png: &[u8]) -> Response {
        let body = format!("{DATA_URI_PREFIX}{}", STANDARD.encode(png));
        (self.headers, body).into_response()
    }

    /// Image map markup; empty body when there is none.
    pub(crate) fn map(self, image_map: Option<String>) -> Response {
        (self.headers, image_map.unwrap_or_default()).into_response()
    }

    /// Syntax check report: the description, then one line per error.
    pub(crate) fn check(self, metadata: &DiagramMetadata) -> Response {
        let mut report = metadata.description.clone();
        for issue in &metadata.errors {
            report.push_str(&format!("\nline {}: {}", issue.line, issue.message));
        }
        (self.headers, report).into_response()
    }
}
