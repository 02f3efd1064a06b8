//! QNOT binary interchange format
//!
//! A QNOT stream is a 16-byte header followed by any number of records and
//! nothing else: end of input is end of records.
//!
//! ```text
//! header   | "QNOT" (4) | version u32 (4) | created i64 unix secs (8) |
//! record   | type u8 (1) | payload ... |
//!
//! book (0) | id i64 | created i64 | modified i64 | name str |
//! tag  (1) | id i64 | created i64 | modified i64 | name str |
//! note (2) | id i64 | created i64 | modified i64 | type str | title str |
//!          | body str | book id i64 | tag count u64 | tag id i64 * count |
//!
//! str      | byte length u64 | raw UTF-8 bytes |
//! ```
//!
//! Integers are big-endian. A book or tag must appear before the first note
//! that references it; the encoder guarantees this by writing each one on
//! first use, and the decoder rejects notes that point at anything it has
//! not seen yet.

mod decoder;
mod encoder;
mod error;
pub(crate) mod wire;

use chrono::{DateTime, Utc};

pub use decoder::{Decoder, NoteFeed, Notes};
pub use encoder::Encoder;
pub use error::CodecError;

/// Magic token opening every stream
pub const MAGIC: &[u8; 4] = b"QNOT";

/// Format version written by the encoder and the newest one the decoder accepts
pub const CURRENT_VERSION: u32 = 1;

/// Length of the header block in bytes
pub const HEADER_LEN: usize = 16;

/// Default upper bound on any single string field
pub const DEFAULT_MAX_STRING_LEN: u64 = 16 * 1024 * 1024;

/// Upper bound accepted for a configured string limit
pub const MAX_STRING_LEN_LIMIT: u64 = 1024 * 1024 * 1024;

/// Leading byte identifying a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordType {
    Book = 0,
    Tag = 1,
    Note = 2,
}

impl TryFrom<u8> for RecordType {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RecordType::Book),
            1 => Ok(RecordType::Tag),
            2 => Ok(RecordType::Note),
            other => Err(CodecError::InvalidRecordType(other)),
        }
    }
}

/// Parsed stream header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub version: u32,
    pub created: DateTime<Utc>,
}
