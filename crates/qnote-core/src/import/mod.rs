//! Merging incoming notes into a store
//!
//! Two sources feed the store:
//! - a QNOT stream ([`import_stream`]), imported sequentially and halted by
//!   the first storage failure;
//! - a JSON array ([`import_json`]), fanned out to a worker pool where each
//!   note succeeds or fails on its own.
//!
//! Books and tags are always matched by name; IDs carried by the source are
//! never reused.

mod binary;
mod pool;
mod resolve;

use serde::Serialize;

use crate::config::ImportConfig;
use crate::encoding::{Header, DEFAULT_MAX_STRING_LEN};
use crate::error::QnoteError;
use crate::note::Note;

pub use binary::{import_notes, import_stream};
pub use pool::{import_json, JsonNote, PoolOptions};

/// Policy for QNOT imports
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Save every note even when an identical one already exists
    pub skip_dup_check: bool,
    /// Keep the incoming modification time instead of stamping "now"
    pub preserve_modified: bool,
    /// Slots between the decoder thread and the importer
    pub decode_queue: usize,
    /// Largest string field the decoder accepts
    pub max_string_len: u64,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            skip_dup_check: false,
            preserve_modified: false,
            decode_queue: 1024,
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }
}

impl ImportOptions {
    /// Queue and size limits from config, duplicate policy left at defaults
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            decode_queue: config.decode_queue,
            max_string_len: config.max_string_len,
            ..Self::default()
        }
    }
}

/// Final counts of an import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub saved: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl ImportSummary {
    /// Notes that reached a final state, successful or not
    pub fn total(&self) -> usize {
        self.saved + self.skipped + self.errors
    }
}

/// Per-note progress callbacks.
///
/// Calls may arrive from several worker threads during a JSON import.
pub trait ImportReporter: Send + Sync {
    fn header(&self, _header: &Header) {}

    /// A note was persisted and indexed; `note` carries its new ID
    fn saved(&self, _note: &Note) {}

    /// An identical note already existed
    fn skipped(&self, _note: &Note) {}

    fn failed(&self, _title: &str, _error: &QnoteError) {}
}

/// Reporter that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ImportReporter for NoopReporter {}
