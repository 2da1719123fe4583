//! Raw deflate (no zlib header) compression.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

use crate::DecodeError;

/// Upper bound for inflated diagram source.
pub(crate) const MAX_INFLATED_BYTES: u64 = 8 * 1024 * 1024;

/// Compress bytes into a raw deflate stream.
pub(crate) fn deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Inflate a raw deflate stream.
///
/// Bytes after the end of the stream are ignored.
pub(crate) fn inflate(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::new();
    DeflateDecoder::new(data)
        .take(MAX_INFLATED_BYTES + 1)
        .read_to_end(&mut out)
        .map_err(DecodeError::Inflate)?;
    if out.len() as u64 > MAX_INFLATED_BYTES {
        return Err(DecodeError::TooLarge {
            limit: MAX_INFLATED_BYTES,
        });
    }
    Ok(out)
}
