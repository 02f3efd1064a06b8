//! Name-keyed caches that map incoming book/tag names to stored records

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{QnoteError, Result};
use crate::note::{Book, Tag};
use crate::store::NoteStore;

/// Per-run resolver for the sequential import.
///
/// Remembers which books this run created: notes going into a fresh book
/// cannot have duplicates, so the duplicate probe is skipped for them.
#[derive(Debug, Default)]
pub(crate) struct RunCache {
    books: HashMap<String, (Book, bool)>,
    tags: HashMap<String, Tag>,
}

impl RunCache {
    /// Resolve an incoming book by name; the flag is true when this run
    /// created it. A created book keeps the incoming timestamps.
    pub fn book(&mut self, store: &dyn NoteStore, incoming: &Book) -> Result<(Book, bool)> {
        if let Some((book, created)) = self.books.get(&incoming.name) {
            return Ok((book.clone(), *created));
        }

        let resolved = match store.find_book_by_name(&incoming.name)? {
            Some(book) => (book, false),
            None => {
                let book = store.create_book(incoming)?;
                tracing::debug!(book = %book.name, id = book.id, "created book");
                (book, true)
            }
        };
        self.books.insert(incoming.name.clone(), resolved.clone());
        Ok(resolved)
    }

    pub fn tag(&mut self, store: &dyn NoteStore, incoming: &Tag) -> Result<Tag> {
        if let Some(tag) = self.tags.get(&incoming.name) {
            return Ok(tag.clone());
        }

        let tag = match store.find_tag_by_name(&incoming.name)? {
            Some(tag) => tag,
            None => store.create_tag(incoming)?,
        };
        self.tags.insert(incoming.name.clone(), tag.clone());
        Ok(tag)
    }
}

/// Resolver shared by the JSON workers of one import.
///
/// The lock only guards the maps; lookups that miss go to the store's
/// get-or-create, which keeps racing workers on the same record.
#[derive(Debug, Default)]
pub(crate) struct SharedCache {
    books: Mutex<HashMap<String, Book>>,
    tags: Mutex<HashMap<String, Tag>>,
}

impl SharedCache {
    pub fn book(&self, store: &dyn NoteStore, name: &str) -> Result<Book> {
        get_or_resolve(&self.books, name, |n| store.get_or_create_book(n))
    }

    pub fn tag(&self, store: &dyn NoteStore, name: &str) -> Result<Tag> {
        get_or_resolve(&self.tags, name, |n| store.get_or_create_tag(n))
    }
}

fn get_or_resolve<T: Clone>(
    cache: &Mutex<HashMap<String, T>>,
    name: &str,
    resolve: impl FnOnce(&str) -> Result<T>,
) -> Result<T> {
    if let Some(hit) = lock(cache)?.get(name) {
        return Ok(hit.clone());
    }

    let value = resolve(name)?;
    lock(cache)?.insert(name.to_string(), value.clone());
    Ok(value)
}

fn lock<T>(cache: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>> {
    cache
        .lock()
        .map_err(|_| QnoteError::Other("name cache lock poisoned".to_string()))
}
