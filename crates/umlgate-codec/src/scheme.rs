//! Encoding schemes and the decode entry points.

use std::fmt;

use percent_encoding::percent_decode_str;

use crate::{DecodeError, alphabet, deflate};

/// Diagram source substituted for payloads that cannot be decoded.
pub const PLACEHOLDER_SOURCE: &str = "@startuml\ntitle Unable to decode string\n@enduml";

/// Marker for the explicit deflate + alphabet form of a URL token.
const DEFLATE_PREFIX: &str = "~1";

/// Marker for hex-encoded URL tokens.
const HEX_PREFIX: &str = "~h";

/// Transport encoding of a diagram source payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scheme {
    /// Raw deflate followed by the URL alphabet. Used by GET URLs.
    Compressed,
    /// URL alphabet followed by raw deflate. Binary request bodies.
    Zopfli,
    /// URL alphabet only.
    Plain,
    /// Payload is the diagram source itself.
    #[default]
    Verbatim,
}

impl Scheme {
    /// Scheme named by a request path segment.
    ///
    /// Matching is case-insensitive. Unknown selectors mean [`Scheme::Verbatim`].
    #[must_use]
    pub fn from_selector(selector: &str) -> Self {
        match selector.to_ascii_lowercase().as_str() {
            "compressed" => Self::Compressed,
            "zopfli" => Self::Zopfli,
            "plain" => Self::Plain,
            _ => Self::Verbatim,
        }
    }

    /// Path segment selecting this scheme.
    #[must_use]
    pub fn selector(self) -> &'static str {
        match self {
            Self::Compressed => "compressed",
            Self::Zopfli => "zopfli",
            Self::Plain => "plain",
            Self::Verbatim => "none",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

/// Decode a transport payload into diagram source.
///
/// # Errors
///
/// Returns [`DecodeError`] when the payload does not match the scheme.
pub fn decode(payload: &[u8], scheme: Scheme) -> Result<String, DecodeError> {
    match scheme {
        Scheme::Compressed => {
            let token = std::str::from_utf8(payload)?;
            decode_url_token(token)
        }
        Scheme::Zopfli => {
            let inflated = String::from_utf8(deflate::inflate(payload)?)?;
            decode_alphabet_text(&inflated)
        }
        Scheme::Plain => decode_alphabet_text(std::str::from_utf8(payload)?),
        Scheme::Verbatim => Ok(String::from_utf8(payload.to_vec())?),
    }
}

/// Decode a payload, substituting [`PLACEHOLDER_SOURCE`] on failure.
#[must_use]
pub fn decode_or_placeholder(payload: &[u8], scheme: Scheme) -> String {
    decode(payload, scheme).unwrap_or_else(|err| {
        tracing::debug!(%scheme, error = %err, "Payload could not be decoded");
        PLACEHOLDER_SOURCE.to_owned()
    })
}

/// Encode diagram source with the given scheme.
///
/// Inverse of [`decode`]: `decode(&encode(s, scheme)?, scheme)` yields `s`
/// for every scheme.
///
/// # Errors
///
/// Returns an I/O error if compression fails.
pub fn encode(source: &str, scheme: Scheme) -> std::io::Result<Vec<u8>> {
    Ok(match scheme {
        Scheme::Compressed => {
            let compressed = deflate::deflate(source.as_bytes())?;
            alphabet::encode_full_groups(&compressed).into_bytes()
        }
        Scheme::Zopfli => deflate::deflate(alphabet::encode(source.as_bytes()).as_bytes())?,
        Scheme::Plain => alphabet::encode(source.as_bytes()).into_bytes(),
        Scheme::Verbatim => source.as_bytes().to_vec(),
    })
}

/// Decode a URL token: percent-decoding, optional `~1`/`~h` marker, then
/// alphabet + inflate. Sources without an `@start` line get wrapped.
fn decode_url_token(token: &str) -> Result<String, DecodeError> {
    let token = percent_decode_str(token.trim()).decode_utf8()?;

    let text = if let Some(hex_text) = token.strip_prefix(HEX_PREFIX) {
        String::from_utf8(hex::decode(hex_text)?)?
    } else {
        let body = token.strip_prefix(DEFLATE_PREFIX).unwrap_or(&token);
        String::from_utf8(deflate::inflate(&alphabet::decode(body)?)?)?
    };

    Ok(wrap_uml(text))
}

/// Decode alphabet text into UTF-8 source.
///
/// Text that already is diagram source (starts with `@start`) cannot be
/// alphabet output and is returned unchanged.
fn decode_alphabet_text(text: &str) -> Result<String, DecodeError> {
    if text.trim_start().starts_with("@start") {
        return Ok(text.to_owned());
    }
    let mut bytes = alphabet::decode(text)?;
    // Zero-filled final group from full-group encoders
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    Ok(String::from_utf8(bytes)?)
}

/// Wrap bare diagram text in `@startuml`/`@enduml`.
fn wrap_uml(text: String) -> String {
    if text.starts_with("@start") {
        return text;
    }
    let newline = if text.ends_with('\n') { "" } else { "\n" };
    format!("@startuml\n{text}{newline}@enduml")
}
