//! Conditional request handling.

use axum::http::{HeaderMap, header};
use chrono::{DateTime, Utc};
use umlgate_engine::DiagramMetadata;

/// Conditional headers of a request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ConditionalHeaders {
    /// Raw `If-None-Match` value (one tag, a comma-separated list, or `*`).
    pub if_none_match: Option<String>,
    /// Parsed `If-Modified-Since`; unparseable dates count as absent.
    pub if_modified_since: Option<DateTime<Utc>>,
}

impl ConditionalHeaders {
    pub(crate) fn from_headers(headers: &HeaderMap) -> Self {
        let if_none_match = headers
            .get(header::IF_NONE_MATCH)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let if_modified_since = headers
            .get(header::IF_MODIFIED_SINCE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| DateTime::parse_from_rfc2822(value.trim()).ok())
            .map(|date| date.with_timezone(&Utc));

        Self {
            if_none_match,
            if_modified_since,
        }
    }
}

/// Outcome of conditional request evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Negotiation {
    /// Render and send the diagram.
    Proceed,
    /// Client copy is current; answer 304.
    NotModified,
}

/// Decide whether the client's cached copy of a diagram is still current.
///
/// A differing `If-Modified-Since` always means the content changed.
/// Otherwise the diagram is unchanged when `If-None-Match` mentions its
/// entity tag.
pub(crate) fn negotiate(conditional: &ConditionalHeaders, metadata: &DiagramMetadata) -> Negotiation {
    if let Some(since) = conditional.if_modified_since
        && since.timestamp() != metadata.last_modified.timestamp()
    {
        return Negotiation::Proceed;
    }

    match conditional.if_none_match.as_deref() {
        Some(tags) if tags.trim() == "*" || tags.contains(metadata.etag.as_str()) => {
            Negotiation::NotModified
        }
        _ => Negotiation::Proceed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const ETAG: &str = "0123456789abcdef0123456789abcdef";

    fn metadata() -> DiagramMetadata {
        DiagramMetadata {
            last_modified: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            etag: ETAG.to_owned(),
            description: "(2 participants)".to_owned(),
            errors: Vec::new(),
        }
    }

    fn conditional(if_none_match: Option<&str>, since: Option<i64>) -> ConditionalHeaders {
        ConditionalHeaders {
            if_none_match: if_none_match.map(str::to_owned),
            if_modified_since: since.and_then(|secs| DateTime::from_timestamp(secs, 0)),
        }
    }

    #[test]
    fn test_no_conditions_proceeds() {
        assert_eq!(
            negotiate(&ConditionalHeaders::default(), &metadata()),
            Negotiation::Proceed
        );
    }

    #[test]
    fn test_matching_etag_not_modified() {
        let quoted = format!("\"{ETAG}\"");
        assert_eq!(
            negotiate(&conditional(Some(&quoted), None), &metadata()),
            Negotiation::NotModified
        );
    }

    #[test]
    fn test_etag_in_list_not_modified() {
        let list = format!("\"ffff\", \"{ETAG}\"");
        assert_eq!(
            negotiate(&conditional(Some(&list), None), &metadata()),
            Negotiation::NotModified
        );
    }

    #[test]
    fn test_wildcard_not_modified() {
        assert_eq!(
            negotiate(&conditional(Some("*"), None), &metadata()),
            Negotiation::NotModified
        );
    }

    #[test]
    fn test_other_etag_proceeds() {
        assert_eq!(
            negotiate(&conditional(Some("\"ffff\""), None), &metadata()),
            Negotiation::Proceed
        );
    }

    #[test]
    fn test_differing_date_wins_over_etag() {
        let quoted = format!("\"{ETAG}\"");
        assert_eq!(
            negotiate(&conditional(Some(&quoted), Some(1_600_000_000)), &metadata()),
            Negotiation::Proceed
        );
        assert_eq!(
            negotiate(&conditional(Some(&quoted), Some(1_800_000_000)), &metadata()),
            Negotiation::Proceed
        );
    }

    #[test]
    fn test_equal_date_defers_to_etag() {
        let quoted = format!("\"{ETAG}\"");
        assert_eq!(
            negotiate(&conditional(Some(&quoted), Some(1_700_000_000)), &metadata()),
            Negotiation::NotModified
        );
        assert_eq!(
            negotiate(&conditional(None, Some(1_700_000_000)), &metadata()),
            Negotiation::Proceed
        );
    }

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("\"abc\""));
        headers.insert(
            header::IF_MODIFIED_SINCE,
            HeaderValue::from_static("Tue, 14 Nov 2023 22:13:20 GMT"),
        );

        let conditional = ConditionalHeaders::from_headers(&headers);
        assert_eq!(conditional.if_none_match.as_deref(), Some("\"abc\""));
        assert_eq!(
            conditional.if_modified_since.map(|d| d.timestamp()),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn test_unparseable_date_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::IF_MODIFIED_SINCE, HeaderValue::from_static("yesterday"));
        assert_eq!(ConditionalHeaders::from_headers(&headers).if_modified_since, None);
    }
}
