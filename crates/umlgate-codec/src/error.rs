//! Decoding error types.

use std::string::FromUtf8Error;

/// Error while turning a transport payload back into diagram source.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// Payload contains characters outside the URL alphabet.
    #[error("invalid alphabet encoding")]
    Alphabet(#[from] base64::DecodeError),

    /// Deflate stream is corrupt or truncated.
    #[error("inflate failed")]
    Inflate(#[source] std::io::Error),

    /// Inflated data exceeds the source size limit.
    #[error("decoded source exceeds {limit} bytes")]
    TooLarge {
        /// Maximum accepted size in bytes.
        limit: u64,
    },

    /// Hex payload (`~h` prefix) is malformed.
    #[error("invalid hex encoding")]
    Hex(#[from] hex::FromHexError),

    /// Decoded bytes are not valid UTF-8.
    #[error("decoded source is not UTF-8")]
    Utf8(#[from] FromUtf8Error),

    /// Percent-decoded URL segment is not valid UTF-8.
    #[error("URL segment is not UTF-8")]
    PercentUtf8(#[from] std::str::Utf8Error),
}
