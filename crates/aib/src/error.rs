//! Error types for AIB encoding/decoding and record validation.

use thiserror::Error;

use crate::limits::MIN_REPORT_ID_LEN;
use crate::model::DateError;

/// Error raised when an [`Incident`](crate::Incident) field invariant is
/// violated at construction or mutation time.
///
/// No partially-invalid record ever exists: every constructor and setter
/// returns one of these instead of storing a bad value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error(
        "report id {id:?} must be a single whitespace-free token of at least {MIN_REPORT_ID_LEN} characters"
    )]
    InvalidReportId { id: String },

    #[error("{field} must be non-empty")]
    EmptyField { field: &'static str },

    #[error("{field} must not contain embedded newlines")]
    EmbeddedNewline { field: &'static str },

    #[error("pilot percent hours on type {value} out of range [0, 100]")]
    PercentOutOfRange { value: f64 },

    #[error("pilot total hours {value} must be strictly positive")]
    NonPositiveHours { value: i32 },

    #[error("invalid date: {0}")]
    Date(#[from] DateError),
}

/// Error during binary or object-graph decoding.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid magic bytes: expected AIB1, found {found:?}")]
    InvalidMagic { found: [u8; 4] },

    #[error("unsupported format version {version} (newest supported: {supported})")]
    UnsupportedVersion { version: u16, supported: u16 },

    #[error("unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("record {record} truncated while reading {context}")]
    TruncatedRecord { record: usize, context: &'static str },

    #[error("invalid UTF-8 in {field}")]
    InvalidUtf8 { field: &'static str },

    #[error("invalid bool value {value:#04x} (expected 0x00 or 0x01)")]
    InvalidBool { value: u8 },

    #[error("record {record} failed validation")]
    InvalidRecord {
        record: usize,
        #[source]
        source: ValidationError,
    },

    #[error("corrupt data: {message}")]
    CorruptData { message: String },

    #[error("dump size {size} exceeds maximum {max}")]
    TooLarge { size: usize, max: usize },

    #[error("gzip decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error during export in any of the four representations.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("gzip compression failed: {0}")]
    CompressionFailed(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error during text-format import, from either parsing strategy.
///
/// Every variant that corresponds to a concrete input line carries its
/// one-based line number.
#[derive(Debug, Error)]
pub enum TextParseError {
    #[error("line {line}: expected a [report id] header, found {found:?}")]
    UnexpectedLine { line: usize, found: String },

    #[error("line {line}: malformed entry (expected key=value)")]
    MalformedEntry { line: usize },

    #[error("line {line}: unknown field {field:?}")]
    UnknownField { line: usize, field: String },

    #[error("line {line}: invalid value {value:?} for {field}")]
    InvalidValue {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: record block is missing required field {field}")]
    MissingField { line: usize, field: &'static str },

    #[error("line {line}: record failed validation")]
    InvalidRecord {
        line: usize,
        #[source]
        source: ValidationError,
    },

    #[error("unexpected end of input inside the record block starting at line {line}")]
    UnexpectedEof { line: usize },

    #[error("text input is not valid UTF-8")]
    InvalidUtf8,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl TextParseError {
    /// Returns the one-based input line the error points at, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            TextParseError::UnexpectedLine { line, .. }
            | TextParseError::MalformedEntry { line }
            | TextParseError::UnknownField { line, .. }
            | TextParseError::InvalidValue { line, .. }
            | TextParseError::MissingField { line, .. }
            | TextParseError::InvalidRecord { line, .. }
            | TextParseError::UnexpectedEof { line } => Some(*line),
            _ => None,
        }
    }
}
