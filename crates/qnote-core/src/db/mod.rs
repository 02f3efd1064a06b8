//! SQLite database module for qnote

mod notes;
mod schema;
mod search;

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::error::{QnoteError, Result};

pub use schema::{create_schema, CURRENT_SCHEMA_VERSION};

/// Database file name inside the data directory
pub const DB_FILE: &str = "notes.db";

/// SQLite store holding books, tags, notes, and the full-text index.
///
/// One connection is shared behind a mutex so the store can be handed to
/// several import workers at once.
#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create `notes.db` in the given data directory
    pub fn open(data_dir: &Path) -> Result<Self> {
        if data_dir.exists() && !data_dir.is_dir() {
            return Err(QnoteError::InvalidDataDir {
                path: data_dir.to_path_buf(),
                reason: "not a directory".to_string(),
            });
        }
        fs::create_dir_all(data_dir).map_err(|e| {
            QnoteError::io_operation("create data directory", data_dir.display(), e)
        })?;

        let db_path = data_dir.join(DB_FILE);
        let conn = Connection::open(&db_path).map_err(|e| {
            QnoteError::Other(format!(
                "failed to open database at {}: {}",
                db_path.display(),
                e
            ))
        })?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| QnoteError::Other(format!("failed to enable WAL mode: {}", e)))?;

        tracing::debug!(path = %db_path.display(), "opened database");
        Self::init(conn)
    }

    /// Fresh in-memory database, mostly for tests and dry runs
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| crate::map_db_err!("open in-memory database", e))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| crate::map_db_err!("enable foreign keys", e))?;
        create_schema(&conn)?;
        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| QnoteError::Other("database connection lock poisoned".to_string()))
    }

    pub fn note_count(&self) -> Result<i64> {
        self.lock()?
            .query_row("SELECT COUNT(*) FROM notes", [], |r| r.get(0))
            .map_err(|e| crate::map_db_err!("count notes", e))
    }

    pub fn book_count(&self) -> Result<i64> {
        self.lock()?
            .query_row("SELECT COUNT(*) FROM books", [], |r| r.get(0))
            .map_err(|e| crate::map_db_err!("count books", e))
    }

    pub fn tag_count(&self) -> Result<i64> {
        self.lock()?
            .query_row("SELECT COUNT(*) FROM tags", [], |r| r.get(0))
            .map_err(|e| crate::map_db_err!("count tags", e))
    }

    pub fn schema_version(&self) -> Result<i32> {
        schema::stored_version(&*self.lock()?)?
            .ok_or_else(|| QnoteError::Other("schema version missing".to_string()))
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        // Fold the WAL back into the main file before closing
        if let Ok(conn) = self.conn.get_mut() {
            let _ = conn.pragma_update(None, "wal_checkpoint", "TRUNCATE");
        }
    }
}

/// Columns store whole Unix seconds
fn timestamp(idx: usize, secs: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, secs))
}
