use std::io::Read;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::resolve::RunCache;
use super::{ImportOptions, ImportReporter, ImportSummary};
use crate::encoding::Decoder;
use crate::error::Result;
use crate::note::{self, Note};
use crate::store::{NoteStore, SearchIndex};

enum Outcome {
    Saved(Note),
    Skipped,
}

/// Import a QNOT stream.
///
/// Decoding runs on its own thread behind a bounded queue. The first storage
/// or index failure stops the run, as does a decode error once the notes
/// before it have been imported.
pub fn import_stream<R: Read + Send + 'static>(
    reader: R,
    store: &dyn NoteStore,
    index: &dyn SearchIndex,
    options: &ImportOptions,
    reporter: &dyn ImportReporter,
) -> Result<ImportSummary> {
    let start = Instant::now();

    let mut decoder = Decoder::new(reader).with_max_string_len(options.max_string_len);
    let header = decoder.parse_header()?;
    debug!(version = header.version, created = %header.created, "parsed header");
    reporter.header(header);

    let mut feed = decoder.spawn(options.decode_queue)?;
    let summary = import_notes(&mut feed, store, index, options, reporter)?;

    if let Err(e) = feed.finish() {
        warn!(
            saved = summary.saved,
            skipped = summary.skipped,
            error = %e,
            "stream ended with an error"
        );
        return Err(e.into());
    }

    debug!(
        saved = summary.saved,
        skipped = summary.skipped,
        elapsed = ?start.elapsed(),
        "stream imported"
    );
    Ok(summary)
}

/// Merge already decoded notes into the store, stopping at the first failure
pub fn import_notes(
    notes: impl IntoIterator<Item = Note>,
    store: &dyn NoteStore,
    index: &dyn SearchIndex,
    options: &ImportOptions,
    reporter: &dyn ImportReporter,
) -> Result<ImportSummary> {
    let mut cache = RunCache::default();
    let mut summary = ImportSummary::default();

    for incoming in notes {
        match import_one(&incoming, &mut cache, store, index, options) {
            Ok(Outcome::Saved(stored)) => {
                summary.saved += 1;
                reporter.saved(&stored);
            }
            Ok(Outcome::Skipped) => {
                summary.skipped += 1;
                reporter.skipped(&incoming);
            }
            Err(e) => {
                warn!(
                    title = %incoming.title,
                    saved = summary.saved,
                    skipped = summary.skipped,
                    error = %e,
                    "import halted"
                );
                reporter.failed(&incoming.title, &e);
                return Err(e);
            }
        }
    }

    info!(
        saved = summary.saved,
        skipped = summary.skipped,
        "import finished"
    );
    Ok(summary)
}

fn import_one(
    incoming: &Note,
    cache: &mut RunCache,
    store: &dyn NoteStore,
    index: &dyn SearchIndex,
    options: &ImportOptions,
) -> Result<Outcome> {
    let (book, book_is_new) = cache.book(store, &incoming.book)?;

    if !book_is_new && !options.skip_dup_check {
        if let Some(existing) = store.find_note_by_identity(
            &book,
            incoming.note_type,
            &incoming.title,
            &incoming.body,
        )? {
            debug!(title = %incoming.title, existing = existing.id, "duplicate note");
            return Ok(Outcome::Skipped);
        }
    }

    let tags = incoming
        .tags
        .iter()
        .map(|t| cache.tag(store, t))
        .collect::<Result<Vec<_>>>()?;

    let note = Note {
        id: 0,
        created: incoming.created,
        modified: if options.preserve_modified {
            incoming.modified
        } else {
            note::now()
        },
        note_type: incoming.note_type,
        title: incoming.title.clone(),
        body: incoming.body.clone(),
        book,
        tags,
    };

    let stored = store.create_note(&note)?;
    index.index_note(&stored)?;
    Ok(Outcome::Saved(stored))
}
