//! SQLite database schema for qnote

use rusqlite::{Connection, OptionalExtension};

use crate::error::{QnoteError, Result};

pub const CURRENT_SCHEMA_VERSION: i32 = 1;

const SCHEMA_SQL: &str = r#"
-- Books and tags are unique by name; IDs are local to this database
CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    created INTEGER NOT NULL,
    modified INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    created INTEGER NOT NULL,
    modified INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created INTEGER NOT NULL,
    modified INTEGER NOT NULL,
    type TEXT NOT NULL,
    title TEXT NOT NULL,
    body TEXT NOT NULL,
    book_id INTEGER NOT NULL REFERENCES books(id)
);
CREATE INDEX IF NOT EXISTS idx_notes_identity ON notes(book_id, type, title);
CREATE INDEX IF NOT EXISTS idx_notes_created ON notes(created);

-- Tag order on a note is kept by position
CREATE TABLE IF NOT EXISTS note_tags (
    note_id INTEGER NOT NULL REFERENCES notes(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tags(id),
    position INTEGER NOT NULL,
    PRIMARY KEY (note_id, tag_id)
);
CREATE INDEX IF NOT EXISTS idx_note_tags_tag ON note_tags(tag_id);

-- Full-text search index with FTS5, rowid = notes.id
CREATE VIRTUAL TABLE IF NOT EXISTS notes_fts USING fts5(
    title,
    body,
    tags,
    book,
    tokenize='porter unicode61'
);

CREATE TABLE IF NOT EXISTS index_meta (
    key TEXT PRIMARY KEY,
    value TEXT
);
"#;

/// Schema version recorded in `index_meta`, if the table exists
pub(crate) fn stored_version(conn: &Connection) -> Result<Option<i32>> {
    let has_meta: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'index_meta'",
            [],
            |r| r.get::<_, i64>(0).map(|n| n > 0),
        )
        .map_err(|e| crate::map_db_err!("inspect schema", e))?;
    if !has_meta {
        return Ok(None);
    }

    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM index_meta WHERE key = 'schema_version'",
            [],
            |r| r.get(0),
        )
        .optional()
        .map_err(|e| crate::map_db_err!("read schema version", e))?;

    match value {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| QnoteError::invalid_value("schema version", v)),
    }
}

/// Create the schema on a fresh database, or verify an existing one
pub fn create_schema(conn: &Connection) -> Result<()> {
    match stored_version(conn)? {
        None => {
            conn.execute_batch(SCHEMA_SQL)
                .map_err(|e| crate::map_db_err!("create database schema", e))?;
            conn.execute(
                "INSERT OR REPLACE INTO index_meta (key, value) VALUES ('schema_version', ?1)",
                [&CURRENT_SCHEMA_VERSION.to_string()],
            )
            .map_err(|e| crate::map_db_err!("record schema version", e))?;
            tracing::debug!(version = CURRENT_SCHEMA_VERSION, "created database schema");
            Ok(())
        }
        Some(v) if v == CURRENT_SCHEMA_VERSION => Ok(()),
        Some(v) => Err(QnoteError::Other(format!(
            "database schema version {} is not supported (expected {})",
            v, CURRENT_SCHEMA_VERSION
        ))),
    }
}
