//! URL-safe 64-symbol alphabet used by diagram URLs.
//!
//! Bit layout matches base64 (three bytes to four symbols), only the symbol
//! table differs: digits first, then upper case, lower case, `-` and `_`.

use base64::Engine;
use base64::alphabet::Alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::DecodeError;

const SYMBOLS: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

const URL_ALPHABET: Alphabet = match Alphabet::new(SYMBOLS) {
    Ok(alphabet) => alphabet,
    Err(_) => panic!("invalid URL alphabet"),
};

const URL_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &URL_ALPHABET,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

/// Encode bytes with the URL alphabet, without padding.
pub(crate) fn encode(data: &[u8]) -> String {
    URL_ENGINE.encode(data)
}

/// Encode bytes with the URL alphabet, zero-filling the last group.
///
/// Encoders in the wild always emit whole four-symbol groups, so decoders
/// may not accept a short tail. Only safe for self-delimiting payloads such
/// as deflate streams, which ignore the trailing zero bytes.
pub(crate) fn encode_full_groups(data: &[u8]) -> String {
    let remainder = data.len() % 3;
    if remainder == 0 {
        return encode(data);
    }
    let mut padded = Vec::with_capacity(data.len() + 3 - remainder);
    padded.extend_from_slice(data);
    padded.resize(data.len() + 3 - remainder, 0);
    encode(&padded)
}

/// Decode URL alphabet text back into bytes.
pub(crate) fn decode(text: &str) -> Result<Vec<u8>, DecodeError> {
    Ok(URL_ENGINE.decode(text.trim())?)
}
