use std::collections::HashMap;
use std::io::Read;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::wire::{read_i64, read_record_byte, read_string, read_time, read_u32, read_u64};
use super::{CodecError, Header, RecordType, CURRENT_VERSION, DEFAULT_MAX_STRING_LEN, MAGIC};
use crate::note::{Book, Note, NoteType, Tag};

/// Tag lists longer than this grow on demand instead of trusting the count
const MAX_PREALLOCATED_TAGS: u64 = 64;

/// Reads a QNOT stream back into notes.
///
/// Books and tags are absorbed into lookup tables as they appear; only notes
/// are yielded. A failure ends the note sequence and is kept as the terminal
/// error, available from [`Decoder::err`] once the sequence is exhausted.
#[derive(Debug)]
pub struct Decoder<R> {
    reader: R,
    header: Option<Header>,
    err: Option<CodecError>,
    books: HashMap<i64, Book>,
    tags: HashMap<i64, Tag>,
    max_string_len: u64,
}

impl<R: Read> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            header: None,
            err: None,
            books: HashMap::new(),
            tags: HashMap::new(),
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }

    /// Cap on any single string field; longer length prefixes are rejected
    pub fn with_max_string_len(mut self, max: u64) -> Self {
        self.max_string_len = max;
        self
    }

    /// Parse the header block. Must succeed before [`Decoder::notes`].
    pub fn parse_header(&mut self) -> Result<&Header, CodecError> {
        let mut magic = [0u8; 4];
        self.reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(CodecError::CorruptFormat);
        }

        let version = read_u32(&mut self.reader)?;
        if version > CURRENT_VERSION {
            return Err(CodecError::UnsupportedVersion {
                found: version,
                supported: CURRENT_VERSION,
            });
        }
        let created = read_time(&mut self.reader)?;

        Ok(self.header.insert(Header { version, created }))
    }

    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    /// Lazily decode the remaining records as notes.
    ///
    /// The iterator ends at the end of the stream or at the first error;
    /// check [`Decoder::err`] afterwards to tell the two apart.
    pub fn notes(&mut self) -> Result<Notes<'_, R>, CodecError> {
        if self.header.is_none() {
            return Err(CodecError::HeaderNotParsed);
        }
        Ok(Notes { decoder: self })
    }

    /// Terminal error recorded while decoding notes, if any
    pub fn err(&self) -> Option<&CodecError> {
        self.err.as_ref()
    }

    pub fn take_err(&mut self) -> Option<CodecError> {
        self.err.take()
    }

    /// Read records until the next note, or `None` at a clean end of stream
    fn next_note(&mut self) -> Result<Option<Note>, CodecError> {
        loop {
            let Some(byte) = read_record_byte(&mut self.reader)? else {
                return Ok(None);
            };

            match RecordType::try_from(byte)? {
                RecordType::Book => {
                    let (id, created, modified, name) = self.read_named()?;
                    self.books.insert(
                        id,
                        Book {
                            id,
                            name,
                            created,
                            modified,
                        },
                    );
                }
                RecordType::Tag => {
                    let (id, created, modified, name) = self.read_named()?;
                    self.tags.insert(
                        id,
                        Tag {
                            id,
                            name,
                            created,
                            modified,
                        },
                    );
                }
                RecordType::Note => return self.read_note().map(Some),
            }
        }
    }

    fn read_named(&mut self) -> Result<(i64, DateTime<Utc>, DateTime<Utc>, String), CodecError> {
        let id = read_i64(&mut self.reader)?;
        let created = read_time(&mut self.reader)?;
        let modified = read_time(&mut self.reader)?;
        let name = read_string(&mut self.reader, self.max_string_len)?;
        Ok((id, created, modified, name))
    }

    fn read_note(&mut self) -> Result<Note, CodecError> {
        let id = read_i64(&mut self.reader)?;
        let created = read_time(&mut self.reader)?;
        let modified = read_time(&mut self.reader)?;

        let type_str = read_string(&mut self.reader, self.max_string_len)?;
        let note_type = type_str
            .parse::<NoteType>()
            .map_err(|_| CodecError::InvalidNoteType(type_str))?;
        let title = read_string(&mut self.reader, self.max_string_len)?;
        let body = read_string(&mut self.reader, self.max_string_len)?;

        let book_id = read_i64(&mut self.reader)?;
        let book = self
            .books
            .get(&book_id)
            .cloned()
            .ok_or(CodecError::UnknownBook(book_id))?;

        let count = read_u64(&mut self.reader)?;
        let mut tags = Vec::with_capacity(count.min(MAX_PREALLOCATED_TAGS) as usize);
        for _ in 0..count {
            let tag_id = read_i64(&mut self.reader)?;
            let tag = self
                .tags
                .get(&tag_id)
                .cloned()
                .ok_or(CodecError::UnknownTag(tag_id))?;
            tags.push(tag);
        }

        Ok(Note {
            id,
            created,
            modified,
            note_type,
            title,
            body,
            book,
            tags,
        })
    }
}

impl<R: Read + Send + 'static> Decoder<R> {
    /// Move the decoder onto its own thread, feeding notes through a queue of
    /// `capacity` slots. The producer blocks while the queue is full and stops
    /// when the returned feed is dropped.
    pub fn spawn(mut self, capacity: usize) -> Result<NoteFeed, CodecError> {
        let header = self.header.clone().ok_or(CodecError::HeaderNotParsed)?;
        let (tx, rx) = mpsc::sync_channel(capacity);

        let handle = thread::Builder::new()
            .name("qnote-decoder".into())
            .spawn(move || {
                let mut decoded = 0usize;
                for note in self.notes().into_iter().flatten() {
                    if tx.send(note).is_err() {
                        debug!(decoded, "note consumer went away, stopping decoder");
                        return None;
                    }
                    decoded += 1;
                }
                debug!(decoded, failed = self.err.is_some(), "decoder finished");
                self.take_err()
            })?;

        Ok(NoteFeed {
            header,
            rx: Some(rx),
            handle: Some(handle),
            err: None,
        })
    }
}

/// Single-pass note iterator borrowed from a [`Decoder`]
#[derive(Debug)]
pub struct Notes<'a, R> {
    decoder: &'a mut Decoder<R>,
}

impl<R: Read> Iterator for Notes<'_, R> {
    type Item = Note;

    fn next(&mut self) -> Option<Note> {
        if self.decoder.err.is_some() {
            return None;
        }
        match self.decoder.next_note() {
            Ok(note) => note,
            Err(e) => {
                self.decoder.err = Some(e);
                None
            }
        }
    }
}

/// Notes produced by a decoder running on a background thread.
///
/// Iteration ends when the producer stops; the producer's terminal error is
/// then available through [`NoteFeed::err`] or [`NoteFeed::finish`].
#[derive(Debug)]
pub struct NoteFeed {
    header: Header,
    rx: Option<Receiver<Note>>,
    handle: Option<JoinHandle<Option<CodecError>>>,
    err: Option<CodecError>,
}

impl NoteFeed {
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Terminal error of the producer; only meaningful once iteration has ended
    pub fn err(&self) -> Option<&CodecError> {
        self.err.as_ref()
    }

    /// Stop the producer (if still running) and return its terminal error
    pub fn finish(mut self) -> Result<(), CodecError> {
        self.rx.take();
        self.join();
        match self.err.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.err = match handle.join() {
                Ok(err) => err,
                Err(_) => Some(CodecError::DecoderPanicked),
            };
        }
    }
}

impl Iterator for NoteFeed {
    type Item = Note;

    fn next(&mut self) -> Option<Note> {
        let received = self.rx.as_ref()?.recv();
        match received {
            Ok(note) => Some(note),
            Err(_) => {
                // Sender dropped: the producer is done
                self.rx.take();
                self.join();
                None
            }
        }
    }
}

impl Drop for NoteFeed {
    fn drop(&mut self) {
        // Closing the queue first unblocks a producer waiting on a full queue
        self.rx.take();
        self.join();
    }
}
