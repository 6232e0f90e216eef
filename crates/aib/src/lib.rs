//! AIB: persistence for collections of aviation-incident reports.
//!
//! This crate stores an in-memory, key-sorted collection of validated
//! incident records and serializes it to four interchangeable
//! representations:
//!
//! - **Binary** (`AIB1`): a framed little-endian format with a 4-byte magic,
//!   a 16-bit version, and length-prefixed strings, optionally gzip-wrapped.
//! - **Text**: line-oriented `[id]` + `key=value` blocks with sentinel-
//!   delimited narratives, importable by two independent parser strategies.
//! - **JSON**: a self-describing object graph, optionally gzip-wrapped.
//! - **XML**: a one-way tree-markup export.
//!
//! # Quick Start
//!
//! ```rust
//! use aib::{Date, Incident, IncidentCollection};
//! use aib::codec::binary;
//!
//! let mut collection = IncidentCollection::new();
//! collection.insert(
//!     Incident::builder("20230001", Date::new(2023, 1, 5)?)
//!         .airport("JFK")
//!         .aircraft("N12345", "B737")
//!         .pilot_hours(12.5, 4300)
//!         .narrative("Bird strike on approach.")
//!         .build()?,
//! );
//!
//! // Encode to binary and back.
//! let bytes = binary::encode(&collection)?;
//! let decoded = binary::decode(&bytes)?;
//! assert_eq!(collection, decoded);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! - [`model`]: core data types (`Date`, `Incident`, `IncidentCollection`)
//! - [`codec`]: the four codecs plus shared primitives and gzip sniffing
//! - [`error`]: error types
//! - [`limits`]: wire constants and decoder security limits
//!
//! # Security
//!
//! Decoders are safe on untrusted input: every allocation is bounded by
//! [`limits`], strings are UTF-8 checked, and malformed data is rejected
//! with a descriptive error instead of panicking.
//!
//! # Wire Format
//!
//! Binary dumps start with the `AIB1` magic and a little-endian `u16`
//! version. Binary and JSON dumps may additionally be gzip-compressed;
//! readers sniff the gzip magic at offset 0 and handle both forms.

pub mod codec;
pub mod error;
pub mod limits;
pub mod model;

// Re-export commonly used types at crate root
pub use error::{DecodeError, EncodeError, TextParseError, ValidationError};
pub use model::{Date, DateError, Incident, IncidentBuilder, IncidentCollection};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
