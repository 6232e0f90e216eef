//! The four incident-collection codecs.
//!
//! Each codec module exposes the same surface: slice-level
//! `encode`/`decode` plus stream-level `export`/`import` (XML is export
//! only). Codecs never call each other; the gzip sniffing in [`compress`]
//! is the one shared cross-cutting helper, used by the binary and JSON
//! codecs.

pub mod binary;
pub mod compress;
pub mod json;
pub mod primitives;
pub mod text;
pub mod xml;

pub use compress::{decompress_if_gzip, gzip_compress, is_gzip};
pub use primitives::{Reader, Writer};
