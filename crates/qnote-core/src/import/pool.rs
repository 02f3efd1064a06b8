//! Worker-pool import of a JSON array of notes
//!
//! ```text
//!  reader ──► array decoder ──[task queue]──► N workers ──[results]──► aggregator
//! ```
//!
//! The decoder hands each array element to the task queue as soon as it is
//! parsed, so the input is never held in memory as a whole.

use std::fmt;
use std::io::{BufReader, Read};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Mutex;
use std::thread;
use std::time::Instant;

use serde::de::{self, DeserializeSeed, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use super::resolve::SharedCache;
use super::{ImportReporter, ImportSummary};
use crate::config::{Config, DEFAULT_BOOK};
use crate::error::{QnoteError, Result};
use crate::note::{Note, NoteType};
use crate::store::{NoteStore, SearchIndex};

/// One element of the JSON input array.
///
/// `type` stays a string here so an unknown type fails only its own note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonNote {
    pub title: String,
    #[serde(rename = "type")]
    pub note_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub body: String,
    /// Empty or missing means the default book
    #[serde(default)]
    pub book: String,
}

/// Sizing of the import worker pool
#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub workers: usize,
    pub task_queue: usize,
    pub result_queue: usize,
    /// Book for notes that do not name one
    pub default_book: String,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            workers: 16,
            task_queue: 1024,
            result_queue: 2048,
            default_book: DEFAULT_BOOK.to_string(),
        }
    }
}

impl PoolOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            workers: config.import.workers,
            task_queue: config.import.task_queue,
            result_queue: config.import.result_queue,
            default_book: config.default_book.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            crate::bail_invalid!("worker count", "0 (must be at least 1)");
        }
        if self.task_queue == 0 || self.result_queue == 0 {
            crate::bail_invalid!("queue capacity", "0 (must be at least 1)");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum TaskResult {
    Saved,
    Failed,
}

/// Everything a worker needs besides its queues
struct WorkerContext<'a> {
    store: &'a dyn NoteStore,
    index: &'a dyn SearchIndex,
    reporter: &'a dyn ImportReporter,
    cache: &'a SharedCache,
    default_book: &'a str,
}

/// Import a JSON array of [`JsonNote`]s through a pool of workers.
///
/// A note that fails is counted and reported without stopping the others.
/// Malformed JSON stops reading; notes already queued are still imported
/// before the parse error is returned.
pub fn import_json<R: Read>(
    reader: R,
    store: &dyn NoteStore,
    index: &dyn SearchIndex,
    options: &PoolOptions,
    reporter: &dyn ImportReporter,
) -> Result<ImportSummary> {
    options.validate()?;
    let start = Instant::now();

    let cache = SharedCache::default();
    let ctx = WorkerContext {
        store,
        index,
        reporter,
        cache: &cache,
        default_book: &options.default_book,
    };
    let (task_tx, task_rx) = mpsc::sync_channel::<JsonNote>(options.task_queue);
    let tasks = Mutex::new(task_rx);
    let (result_tx, result_rx) = mpsc::sync_channel::<TaskResult>(options.result_queue);

    let (summary, parsed) = thread::scope(|s| -> Result<_> {
        // Owned here so an early return closes the queues and lets workers exit
        let task_tx = task_tx;
        let result_tx = result_tx;

        let aggregator = thread::Builder::new()
            .name("qnote-aggregator".into())
            .spawn_scoped(s, move || aggregate(result_rx))?;

        for id in 0..options.workers {
            let results = result_tx.clone();
            let tasks = &tasks;
            let ctx = &ctx;
            thread::Builder::new()
                .name(format!("qnote-worker-{id}"))
                .spawn_scoped(s, move || run_worker(id, tasks, results, ctx))?;
        }
        drop(result_tx);

        let parsed = feed_tasks(BufReader::new(reader), &task_tx);
        drop(task_tx);

        let summary = aggregator
            .join()
            .map_err(|_| QnoteError::Other("import aggregator panicked".to_string()))?;
        Ok((summary, parsed))
    })?;

    match parsed {
        Ok(count) => {
            debug!(count, "input array fully read");
            info!(
                saved = summary.saved,
                errors = summary.errors,
                elapsed = ?start.elapsed(),
                "JSON import finished"
            );
            Ok(summary)
        }
        Err(e) => {
            warn!(
                saved = summary.saved,
                errors = summary.errors,
                error = %e,
                "JSON input rejected"
            );
            Err(e.into())
        }
    }
}

/// Count results until every worker has dropped its sender
fn aggregate(results: Receiver<TaskResult>) -> ImportSummary {
    let mut summary = ImportSummary::default();
    for result in results {
        match result {
            TaskResult::Saved => summary.saved += 1,
            TaskResult::Failed => summary.errors += 1,
        }
    }
    summary
}

fn run_worker(
    id: usize,
    tasks: &Mutex<Receiver<JsonNote>>,
    results: SyncSender<TaskResult>,
    ctx: &WorkerContext<'_>,
) {
    let mut handled = 0usize;
    loop {
        let task = match tasks.lock() {
            Ok(rx) => rx.recv(),
            Err(_) => break,
        };
        let Ok(task) = task else {
            break;
        };

        let result = match save_task(&task, ctx) {
            Ok(note) => {
                ctx.reporter.saved(&note);
                TaskResult::Saved
            }
            Err(e) => {
                warn!(worker = id, title = %task.title, error = %e, "failed to import note");
                ctx.reporter.failed(&task.title, &e);
                TaskResult::Failed
            }
        };
        handled += 1;

        if results.send(result).is_err() {
            break;
        }
    }
    debug!(worker = id, handled, "worker done");
}

fn save_task(task: &JsonNote, ctx: &WorkerContext<'_>) -> Result<Note> {
    let note_type: NoteType = task.note_type.parse()?;

    let book_name = if task.book.trim().is_empty() {
        ctx.default_book
    } else {
        task.book.as_str()
    };
    let book = ctx.cache.book(ctx.store, book_name)?;
    let tags = task
        .tags
        .iter()
        .map(|name| ctx.cache.tag(ctx.store, name))
        .collect::<Result<Vec<_>>>()?;

    let note = Note::new(book, note_type, task.title.as_str())
        .with_body(task.body.as_str())
        .with_tags(tags);
    let stored = ctx.store.create_note(&note)?;
    ctx.index.index_note(&stored)?;
    Ok(stored)
}

/// Parse the top-level array, queueing each element; returns the element count
fn feed_tasks<R: Read>(
    reader: R,
    tasks: &SyncSender<JsonNote>,
) -> std::result::Result<usize, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_reader(reader);
    let count = TaskFeeder { tasks }.deserialize(&mut de)?;
    de.end()?;
    Ok(count)
}

struct TaskFeeder<'a> {
    tasks: &'a SyncSender<JsonNote>,
}

impl<'de> DeserializeSeed<'de> for TaskFeeder<'_> {
    type Value = usize;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<usize, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for TaskFeeder<'_> {
    type Value = usize;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON array of notes")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<usize, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut count = 0;
        while let Some(note) = seq.next_element::<JsonNote>()? {
            if self.tasks.send(note).is_err() {
                return Err(de::Error::custom("import workers stopped"));
            }
            count += 1;
        }
        Ok(count)
    }
}
