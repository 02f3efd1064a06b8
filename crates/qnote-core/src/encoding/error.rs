use std::io;

use thiserror::Error;

/// Failures while writing or reading a QNOT stream
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("header has not been written yet")]
    HeaderNotWritten,

    #[error("header has not been parsed yet")]
    HeaderNotParsed,

    #[error("invalid or corrupted QNOT stream")]
    CorruptFormat,

    #[error("unsupported QNOT version {found} (newest supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("invalid record type {0:#04x}")]
    InvalidRecordType(u8),

    #[error("note references unknown book {0}")]
    UnknownBook(i64),

    #[error("note references unknown tag {0}")]
    UnknownTag(i64),

    #[error("string of {len} bytes exceeds the {max} byte limit")]
    OversizedString { len: u64, max: u64 },

    #[error("string field is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid note type {0:?}")]
    InvalidNoteType(String),

    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(i64),

    #[error("unexpected end of stream")]
    Truncated,

    #[error("decoder thread panicked")]
    DecoderPanicked,

    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for CodecError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            CodecError::Truncated
        } else {
            CodecError::Io(err)
        }
    }
}

impl CodecError {
    /// Stable identifier used in JSON error output
    pub fn kind(&self) -> &'static str {
        match self {
            CodecError::HeaderNotWritten => "header_not_written",
            CodecError::HeaderNotParsed => "header_not_parsed",
            CodecError::CorruptFormat
            | CodecError::UnsupportedVersion { .. }
            | CodecError::InvalidRecordType(_)
            | CodecError::InvalidUtf8
            | CodecError::InvalidNoteType(_)
            | CodecError::InvalidTimestamp(_)
            | CodecError::Truncated => "corrupt_format",
            CodecError::UnknownBook(_) | CodecError::UnknownTag(_) => "referential_violation",
            CodecError::OversizedString { .. } => "oversized_field",
            CodecError::DecoderPanicked | CodecError::Io(_) => "io_error",
        }
    }

    /// True when a note pointed at a book or tag the stream never declared
    pub fn is_referential(&self) -> bool {
        matches!(self, CodecError::UnknownBook(_) | CodecError::UnknownTag(_))
    }
}
