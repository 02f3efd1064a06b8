use std::collections::HashMap;

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{timestamp, Database};
use crate::error::{QnoteError, Result};
use crate::note::{self, Book, Note, NoteType, Tag};
use crate::store::NoteStore;

const NAMED_COLUMNS: &str = "id, name, created, modified";

const NOTE_SELECT: &str = "SELECT n.id, n.created, n.modified, n.type, n.title, n.body, \
     b.id, b.name, b.created, b.modified \
     FROM notes n JOIN books b ON b.id = n.book_id";

/// Which notes a query loads
#[derive(Debug, Clone, Copy)]
enum NoteFilter {
    All,
    Book(i64),
    Id(i64),
}

impl NoteFilter {
    fn clause(self) -> (&'static str, Option<i64>) {
        match self {
            NoteFilter::All => ("", None),
            NoteFilter::Book(id) => (" WHERE n.book_id = ?1", Some(id)),
            NoteFilter::Id(id) => (" WHERE n.id = ?1", Some(id)),
        }
    }
}

fn book_from_row(row: &Row, offset: usize) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        created: timestamp(offset + 2, row.get(offset + 2)?)?,
        modified: timestamp(offset + 3, row.get(offset + 3)?)?,
    })
}

fn tag_from_row(row: &Row, offset: usize) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        created: timestamp(offset + 2, row.get(offset + 2)?)?,
        modified: timestamp(offset + 3, row.get(offset + 3)?)?,
    })
}

/// Note row without its tags; the type is still the stored string
fn note_from_row(row: &Row) -> rusqlite::Result<(Note, String)> {
    let type_str: String = row.get(3)?;
    let note = Note {
        id: row.get(0)?,
        created: timestamp(1, row.get(1)?)?,
        modified: timestamp(2, row.get(2)?)?,
        note_type: NoteType::default(),
        title: row.get(4)?,
        body: row.get(5)?,
        book: book_from_row(row, 6)?,
        tags: Vec::new(),
    };
    Ok((note, type_str))
}

fn select_notes(conn: &Connection, filter: NoteFilter) -> Result<Vec<Note>> {
    let (clause, param) = filter.clause();

    let sql = format!("{NOTE_SELECT}{clause} ORDER BY n.created, n.id");
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| crate::map_db_err!("prepare note query", e))?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(param), note_from_row)
        .map_err(|e| crate::map_db_err!("query notes", e))?;

    let mut notes = Vec::new();
    for row in rows {
        let (mut note, type_str) = row.map_err(|e| crate::map_db_err!("read note row", e))?;
        note.note_type = type_str.parse()?;
        notes.push(note);
    }

    let mut tags = select_note_tags(conn, filter)?;
    for note in &mut notes {
        if let Some(list) = tags.remove(&note.id) {
            note.tags = list;
        }
    }

    Ok(notes)
}

/// Ordered tags per note ID for the notes matching `filter`
fn select_note_tags(conn: &Connection, filter: NoteFilter) -> Result<HashMap<i64, Vec<Tag>>> {
    let (clause, param) = filter.clause();

    let sql = format!(
        "SELECT nt.note_id, t.id, t.name, t.created, t.modified \
         FROM note_tags nt \
         JOIN tags t ON t.id = nt.tag_id \
         JOIN notes n ON n.id = nt.note_id{clause} \
         ORDER BY nt.note_id, nt.position"
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| crate::map_db_err!("prepare tag query", e))?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(param), |row| {
            Ok((row.get::<_, i64>(0)?, tag_from_row(row, 1)?))
        })
        .map_err(|e| crate::map_db_err!("query note tags", e))?;

    let mut by_note: HashMap<i64, Vec<Tag>> = HashMap::new();
    for row in rows {
        let (note_id, tag) = row.map_err(|e| crate::map_db_err!("read note tag row", e))?;
        by_note.entry(note_id).or_default().push(tag);
    }
    Ok(by_note)
}

fn find_named<T>(
    conn: &Connection,
    table: &str,
    name: &str,
    from_row: fn(&Row, usize) -> rusqlite::Result<T>,
) -> Result<Option<T>> {
    conn.query_row(
        &format!("SELECT {NAMED_COLUMNS} FROM {table} WHERE name = ?1"),
        [name],
        |row| from_row(row, 0),
    )
    .optional()
    .map_err(|e| QnoteError::db_operation(&format!("look up {table} entry {name:?}"), e))
}

/// Name and timestamps of a book or tag row to insert
struct NamedRow<'a> {
    name: &'a str,
    created: i64,
    modified: i64,
}

impl<'a> NamedRow<'a> {
    fn stamped_now(name: &'a str) -> Self {
        let now = note::now().timestamp();
        Self {
            name,
            created: now,
            modified: now,
        }
    }
}

fn insert_named(conn: &Connection, table: &str, row: &NamedRow, or_ignore: bool) -> Result<usize> {
    let verb = if or_ignore {
        "INSERT OR IGNORE"
    } else {
        "INSERT"
    };
    conn.execute(
        &format!("{verb} INTO {table} (name, created, modified) VALUES (?1, ?2, ?3)"),
        params![row.name, row.created, row.modified],
    )
    .map_err(|e| QnoteError::db_operation(&format!("create {table} entry {:?}", row.name), e))
}

fn create_named<T>(
    conn: &Connection,
    table: &str,
    row: &NamedRow,
    from_row: fn(&Row, usize) -> rusqlite::Result<T>,
) -> Result<T> {
    insert_named(conn, table, row, false)?;
    find_named(conn, table, row.name, from_row)?
        .ok_or_else(|| QnoteError::not_found(table, row.name))
}

/// Insert unless present, then read back; atomic while the lock is held
fn get_or_create_named<T>(
    conn: &Connection,
    table: &str,
    name: &str,
    from_row: fn(&Row, usize) -> rusqlite::Result<T>,
) -> Result<T> {
    if insert_named(conn, table, &NamedRow::stamped_now(name), true)? > 0 {
        tracing::debug!(table, name, "created");
    }
    find_named(conn, table, name, from_row)?
        .ok_or_else(|| QnoteError::not_found(table, name))
}

impl NoteStore for Database {
    fn find_book_by_name(&self, name: &str) -> Result<Option<Book>> {
        find_named(&*self.lock()?, "books", name, book_from_row)
    }

    fn create_book(&self, book: &Book) -> Result<Book> {
        let row = NamedRow {
            name: &book.name,
            created: book.created.timestamp(),
            modified: book.modified.timestamp(),
        };
        create_named(&*self.lock()?, "books", &row, book_from_row)
    }

    fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
        find_named(&*self.lock()?, "tags", name, tag_from_row)
    }

    fn create_tag(&self, tag: &Tag) -> Result<Tag> {
        let row = NamedRow {
            name: &tag.name,
            created: tag.created.timestamp(),
            modified: tag.modified.timestamp(),
        };
        create_named(&*self.lock()?, "tags", &row, tag_from_row)
    }

    fn get_or_create_book(&self, name: &str) -> Result<Book> {
        get_or_create_named(&*self.lock()?, "books", name, book_from_row)
    }

    fn get_or_create_tag(&self, name: &str) -> Result<Tag> {
        get_or_create_named(&*self.lock()?, "tags", name, tag_from_row)
    }

    fn find_note_by_identity(
        &self,
        book: &Book,
        note_type: NoteType,
        title: &str,
        body: &str,
    ) -> Result<Option<Note>> {
        let conn = self.lock()?;
        let id: Option<i64> = conn
            .query_row(
                "SELECT id FROM notes \
                 WHERE book_id = ?1 AND type = ?2 AND title = ?3 AND body = ?4 \
                 ORDER BY id LIMIT 1",
                params![book.id, note_type.as_str(), title, body],
                |r| r.get(0),
            )
            .optional()
            .map_err(|e| QnoteError::note_operation(title, "look up", e))?;

        match id {
            Some(id) => Ok(select_notes(&conn, NoteFilter::Id(id))?.pop()),
            None => Ok(None),
        }
    }

    fn create_note(&self, note: &Note) -> Result<Note> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| crate::map_db_err!("begin transaction", e))?;

        tx.execute(
            "INSERT INTO notes (created, modified, type, title, body, book_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                note.created.timestamp(),
                note.modified.timestamp(),
                note.note_type.as_str(),
                note.title,
                note.body,
                note.book.id,
            ],
        )
        .map_err(|e| QnoteError::note_operation(&note.title, "insert", e))?;
        let id = tx.last_insert_rowid();

        for (position, tag) in note.tags.iter().enumerate() {
            tx.execute(
                "INSERT OR IGNORE INTO note_tags (note_id, tag_id, position) VALUES (?1, ?2, ?3)",
                params![id, tag.id, position as i64],
            )
            .map_err(|e| QnoteError::note_operation(&note.title, "tag", e))?;
        }

        tx.commit()
            .map_err(|e| QnoteError::note_operation(&note.title, "commit", e))?;

        let mut stored = note.clone();
        stored.id = id;
        Ok(stored)
    }

    fn all_notes(&self) -> Result<Vec<Note>> {
        select_notes(&*self.lock()?, NoteFilter::All)
    }

    fn book_notes(&self, book: &Book) -> Result<Vec<Note>> {
        select_notes(&*self.lock()?, NoteFilter::Book(book.id))
    }
}
