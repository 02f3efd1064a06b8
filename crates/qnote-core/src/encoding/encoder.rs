use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, Utc};

use super::wire::{put_i64, put_str, put_time, put_u32, put_u64, put_u8};
use super::{CodecError, RecordType, CURRENT_VERSION, HEADER_LEN, MAGIC};
use crate::note::{self, Book, Note, Tag};

/// Streams notes into the QNOT format.
///
/// Each book and tag is written once per encoder, the first time a note
/// references it, so the stream never refers to a record it has not emitted.
#[derive(Debug)]
pub struct Encoder<W: Write> {
    writer: W,
    created: DateTime<Utc>,
    header_written: bool,
    written_books: HashSet<i64>,
    written_tags: HashSet<i64>,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            created: note::now(),
            header_written: false,
            written_books: HashSet::new(),
            written_tags: HashSet::new(),
        }
    }

    /// Override the creation time stamped into the header
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = created;
        self
    }

    /// Write the header block. Calling this more than once has no effect.
    pub fn write_header(&mut self) -> Result<u64, CodecError> {
        if self.header_written {
            return Ok(0);
        }

        let mut buf = Vec::with_capacity(HEADER_LEN);
        buf.extend_from_slice(MAGIC);
        put_u32(&mut buf, CURRENT_VERSION);
        put_time(&mut buf, &self.created);

        let written = self.write_record(&buf)?;
        self.header_written = true;
        Ok(written)
    }

    /// Write a note, preceded by its book and any tags not yet in the stream.
    /// Returns the number of bytes written.
    pub fn write_note(&mut self, note: &Note) -> Result<u64, CodecError> {
        if !self.header_written {
            return Err(CodecError::HeaderNotWritten);
        }

        let mut written = self.write_book(&note.book)?;
        for tag in &note.tags {
            written += self.write_tag(tag)?;
        }
        written += self.write_note_record(note)?;

        Ok(written)
    }

    /// Number of distinct books emitted so far
    pub fn books_written(&self) -> usize {
        self.written_books.len()
    }

    /// Number of distinct tags emitted so far
    pub fn tags_written(&self) -> usize {
        self.written_tags.len()
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(mut self) -> Result<W, CodecError> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write_book(&mut self, book: &Book) -> Result<u64, CodecError> {
        if self.written_books.contains(&book.id) {
            return Ok(0);
        }

        let buf = named_record(
            RecordType::Book,
            book.id,
            &book.created,
            &book.modified,
            &book.name,
        );
        let written = self.write_record(&buf)?;
        self.written_books.insert(book.id);
        Ok(written)
    }

    fn write_tag(&mut self, tag: &Tag) -> Result<u64, CodecError> {
        if self.written_tags.contains(&tag.id) {
            return Ok(0);
        }

        let buf = named_record(
            RecordType::Tag,
            tag.id,
            &tag.created,
            &tag.modified,
            &tag.name,
        );
        let written = self.write_record(&buf)?;
        self.written_tags.insert(tag.id);
        Ok(written)
    }

    fn write_note_record(&mut self, note: &Note) -> Result<u64, CodecError> {
        let mut buf = Vec::with_capacity(
            73 + note.title.len() + note.body.len() + note.tags.len() * 8,
        );
        put_u8(&mut buf, RecordType::Note as u8);
        put_i64(&mut buf, note.id);
        put_time(&mut buf, &note.created);
        put_time(&mut buf, &note.modified);
        put_str(&mut buf, note.note_type.as_str());
        put_str(&mut buf, &note.title);
        put_str(&mut buf, &note.body);
        put_i64(&mut buf, note.book.id);
        put_u64(&mut buf, note.tags.len() as u64);
        for tag in &note.tags {
            put_i64(&mut buf, tag.id);
        }

        self.write_record(&buf)
    }

    fn write_record(&mut self, buf: &[u8]) -> Result<u64, CodecError> {
        self.writer.write_all(buf)?;
        Ok(buf.len() as u64)
    }
}

/// Book and tag records share one layout
fn named_record(
    kind: RecordType,
    id: i64,
    created: &DateTime<Utc>,
    modified: &DateTime<Utc>,
    name: &str,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(33 + name.len());
    put_u8(&mut buf, kind as u8);
    put_i64(&mut buf, id);
    put_time(&mut buf, created);
    put_time(&mut buf, modified);
    put_str(&mut buf, name);
    buf
}
