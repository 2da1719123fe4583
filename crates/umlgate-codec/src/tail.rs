//! Parsing of the URL tail that follows the output-format segment.

/// Diagram index and payload token taken from a URL tail.
///
/// The tail has the shape `[<index>/]<token>`: `svg/1/SyfF...` selects the
/// second image of the encoded source, `svg/SyfF...` the first. For POST
/// requests the token names the body's encoding scheme instead.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UrlTail {
    /// 0-based diagram index.
    pub index: usize,
    /// Last path segment (encoded diagram or scheme selector).
    pub token: String,
}

impl UrlTail {
    /// Parse a URL tail. Missing or malformed indexes default to 0.
    #[must_use]
    pub fn parse(tail: &str) -> Self {
        let mut segments = tail.trim_matches('/').rsplit('/');
        let token = segments.next().unwrap_or_default().to_owned();
        let index = segments
            .next()
            .and_then(|segment| segment.parse::<usize>().ok())
            .unwrap_or(0);
        Self { index, token }
    }
}
