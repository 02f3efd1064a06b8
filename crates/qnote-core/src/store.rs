//! Storage and search contracts used by the import/export pipeline
//!
//! The pipeline never talks to SQLite directly; [`crate::db::Database`] is the
//! shipped implementation of both traits.

use serde::Serialize;

use crate::error::Result;
use crate::note::{Book, Note, NoteType, Tag};

/// Relational note storage: books and tags are unique by name, IDs are
/// assigned by the store.
pub trait NoteStore: Send + Sync {
    fn find_book_by_name(&self, name: &str) -> Result<Option<Book>>;

    /// Store `book` under a new ID, keeping its name and timestamps.
    /// Fails if the name is taken.
    fn create_book(&self, book: &Book) -> Result<Book>;

    fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>>;

    /// Tag counterpart of [`NoteStore::create_book`]
    fn create_tag(&self, tag: &Tag) -> Result<Tag>;

    /// Look up a note with the same book, type, title, and body
    fn find_note_by_identity(
        &self,
        book: &Book,
        note_type: NoteType,
        title: &str,
        body: &str,
    ) -> Result<Option<Note>>;

    /// Persist a note whose book and tags already exist in this store.
    /// Returns the stored note carrying its new ID.
    fn create_note(&self, note: &Note) -> Result<Note>;

    /// Find the book or create it stamped with the current time. Implementations that can be called from
    /// several threads should make this atomic so racing callers converge.
    fn get_or_create_book(&self, name: &str) -> Result<Book> {
        match self.find_book_by_name(name)? {
            Some(book) => Ok(book),
            None => self.create_book(&Book::new(name)),
        }
    }

    /// Tag counterpart of [`NoteStore::get_or_create_book`]
    fn get_or_create_tag(&self, name: &str) -> Result<Tag> {
        match self.find_tag_by_name(name)? {
            Some(tag) => Ok(tag),
            None => self.create_tag(&Tag::new(name)),
        }
    }

    /// Every note, oldest first
    fn all_notes(&self) -> Result<Vec<Note>>;

    /// Notes of one book, oldest first
    fn book_notes(&self, book: &Book) -> Result<Vec<Note>>;
}

/// Full-text index keyed by note ID
pub trait SearchIndex: Send + Sync {
    /// Add or replace the index entry for a stored note
    fn index_note(&self, note: &Note) -> Result<()>;

    fn delete_note(&self, note_id: i64) -> Result<()>;

    /// Best matches first; a blank query yields nothing
    fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;
}

/// A single search result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub note_id: i64,
    pub title: String,
    pub book: String,
    /// BM25 rank; lower is a better match
    pub rank: f64,
}
