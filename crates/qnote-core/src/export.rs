//! Writing notes out as a QNOT stream

use std::io::Write;
use std::time::Instant;

use tracing::debug;

use crate::encoding::Encoder;
use crate::error::{QnoteError, Result};
use crate::note::Note;
use crate::store::NoteStore;

/// Counts from an export run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub notes: usize,
    pub books: usize,
    pub tags: usize,
    pub bytes: u64,
}

/// Encode `notes` in the given order, header first.
///
/// Returns the summary together with the writer so wrapping encoders (gzip)
/// can be finished by the caller.
pub fn export_notes<'a, W: Write>(
    notes: impl IntoIterator<Item = &'a Note>,
    writer: W,
) -> Result<(ExportSummary, W)> {
    let start = Instant::now();
    let mut encoder = Encoder::new(writer);
    let mut summary = ExportSummary {
        bytes: encoder.write_header()?,
        ..ExportSummary::default()
    };

    for note in notes {
        summary.bytes += encoder.write_note(note)?;
        summary.notes += 1;
    }
    summary.books = encoder.books_written();
    summary.tags = encoder.tags_written();

    let writer = encoder.into_inner()?;
    debug!(
        notes = summary.notes,
        books = summary.books,
        tags = summary.tags,
        bytes = summary.bytes,
        elapsed = ?start.elapsed(),
        "export finished"
    );
    Ok((summary, writer))
}

/// Export every note in the store, oldest first
pub fn export_all<W: Write>(store: &dyn NoteStore, writer: W) -> Result<(ExportSummary, W)> {
    let notes = store.all_notes()?;
    export_notes(&notes, writer)
}

/// Export the notes of the named books, book by book in the order given.
///
/// Every name is checked before anything is written.
pub fn export_books<W: Write>(
    store: &dyn NoteStore,
    names: &[String],
    writer: W,
) -> Result<(ExportSummary, W)> {
    let mut books = Vec::with_capacity(names.len());
    for name in names {
        match store.find_book_by_name(name)? {
            Some(book) if !books.contains(&book) => books.push(book),
            Some(_) => {}
            None => return Err(QnoteError::BookNotFound { name: name.clone() }),
        }
    }

    let mut notes = Vec::new();
    for book in &books {
        notes.extend(store.book_notes(book)?);
    }
    export_notes(&notes, writer)
}
