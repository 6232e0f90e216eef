//! Transparent gzip detection and wrapping.
//!
//! Binary and JSON dumps may or may not be gzip-compressed. Readers sniff
//! the standard gzip magic at offset 0 and decompress before parsing; the
//! payload format underneath is identical either way. Imports buffer the
//! whole input first, so the sniff never needs to rewind the source stream.

use std::borrow::Cow;
use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::error::{DecodeError, EncodeError};
use crate::limits::{GZIP_MAGIC, MAX_DUMP_SIZE};

/// Returns true if the buffer starts with the gzip magic bytes.
pub fn is_gzip(data: &[u8]) -> bool {
    data.len() >= GZIP_MAGIC.len() && data[..GZIP_MAGIC.len()] == GZIP_MAGIC
}

/// Sniffs for gzip framing and returns the raw payload bytes.
///
/// Uncompressed input is returned borrowed; compressed input is inflated
/// into an owned buffer, bounded by [`MAX_DUMP_SIZE`].
pub fn decompress_if_gzip(data: &[u8]) -> Result<Cow<'_, [u8]>, DecodeError> {
    if !is_gzip(data) {
        return Ok(Cow::Borrowed(data));
    }

    let mut decoder = GzDecoder::new(data).take(MAX_DUMP_SIZE as u64 + 1);
    let mut inflated = Vec::new();
    decoder
        .read_to_end(&mut inflated)
        .map_err(|e| DecodeError::DecompressionFailed(e.to_string()))?;
    if inflated.len() > MAX_DUMP_SIZE {
        return Err(DecodeError::TooLarge {
            size: inflated.len(),
            max: MAX_DUMP_SIZE,
        });
    }
    Ok(Cow::Owned(inflated))
}

/// Wraps payload bytes in a gzip stream.
///
/// Uses the default compression level; the header carries no timestamp, so
/// compressing the same payload twice yields identical bytes.
pub fn gzip_compress(data: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| EncodeError::CompressionFailed(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| EncodeError::CompressionFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_magic() {
        assert!(is_gzip(&[0x1F, 0x8B, 0x08]));
        assert!(!is_gzip(b"AIB1"));
        assert!(!is_gzip(&[0x1F]));
        assert!(!is_gzip(&[]));
    }

    #[test]
    fn test_raw_passthrough_borrows() {
        let data = b"AIB1 raw payload";
        let result = decompress_if_gzip(data).unwrap();
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result.as_ref(), data);
    }

    #[test]
    fn test_compress_roundtrip() {
        let payload: Vec<u8> = (0..4096).map(|i| (i % 251) as u8).collect();
        let wrapped = gzip_compress(&payload).unwrap();
        assert!(is_gzip(&wrapped));

        let inflated = decompress_if_gzip(&wrapped).unwrap();
        assert_eq!(inflated.as_ref(), payload.as_slice());
    }

    #[test]
    fn test_compress_is_deterministic() {
        let payload = b"the same payload twice";
        assert_eq!(
            gzip_compress(payload).unwrap(),
            gzip_compress(payload).unwrap()
        );
    }

    #[test]
    fn test_corrupt_gzip_rejected() {
        // Valid magic, garbage stream.
        let mut bogus = GZIP_MAGIC.to_vec();
        bogus.extend_from_slice(&[0xAA; 16]);
        let result = decompress_if_gzip(&bogus);
        assert!(matches!(result, Err(DecodeError::DecompressionFailed(_))));
    }
}
