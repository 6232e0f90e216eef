//! Wire-format constants and security limits for decoding.
//!
//! The decoder is designed to safely handle untrusted input, so every
//! allocation it makes is bounded by one of the limits below.

/// Magic bytes identifying an uncompressed AIB binary dump.
pub const MAGIC: [u8; 4] = *b"AIB1";

/// Magic bytes identifying a gzip stream (RFC 1952).
///
/// Binary and JSON dumps may be transparently gzip-wrapped; readers sniff
/// these two bytes to decide whether to decompress before parsing.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Current binary format version, written by the encoder.
pub const FORMAT_VERSION: u16 = 1;

/// Oldest binary format version the decoder accepts.
pub const MIN_FORMAT_VERSION: u16 = 1;

/// Maximum length in bytes of any length-prefixed string field.
///
/// This is inherent to the wire format: lengths are encoded as `u16`.
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Maximum size in bytes of a dump after decompression.
///
/// Bounds the allocation a hostile gzip stream can force on the reader.
pub const MAX_DUMP_SIZE: usize = 256 * 1024 * 1024;

/// Minimum length in characters of a report identifier.
pub const MIN_REPORT_ID_LEN: usize = 8;
