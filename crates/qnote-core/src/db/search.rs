//! Full-text search over the FTS5 index

use rusqlite::params;

use super::Database;
use crate::error::{QnoteError, Result};
use crate::note::Note;
use crate::store::{SearchHit, SearchIndex};

/// BM25 column weights, in `notes_fts` column order: title, body, tags, book
const TITLE_WEIGHT: f64 = 2.0;
const BODY_WEIGHT: f64 = 1.0;
const TAGS_WEIGHT: f64 = 1.5;
const BOOK_WEIGHT: f64 = 1.0;

/// Quote the query as an FTS5 phrase so punctuation is not read as syntax
fn phrase(query: &str) -> String {
    format!("\"{}\"", query.replace('"', "\"\""))
}

impl SearchIndex for Database {
    fn index_note(&self, note: &Note) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM notes_fts WHERE rowid = ?1", [note.id])
            .map_err(|e| QnoteError::note_operation(&note.title, "unindex", e))?;
        conn.execute(
            "INSERT INTO notes_fts (rowid, title, body, tags, book) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                note.id,
                note.title,
                note.body,
                note.tag_names().join(" "),
                note.book.name,
            ],
        )
        .map_err(|e| QnoteError::note_operation(&note.title, "index", e))?;
        Ok(())
    }

    fn delete_note(&self, note_id: i64) -> Result<()> {
        self.lock()?
            .execute("DELETE FROM notes_fts WHERE rowid = ?1", [note_id])
            .map_err(|e| crate::map_db_err!("remove note from search index", e))?;
        Ok(())
    }

    fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let conn = self.lock()?;
        let sql = format!(
            "SELECT n.id, n.title, b.name, \
             bm25(notes_fts, {TITLE_WEIGHT:.1}, {BODY_WEIGHT:.1}, {TAGS_WEIGHT:.1}, {BOOK_WEIGHT:.1}) AS rank \
             FROM notes_fts \
             JOIN notes n ON n.id = notes_fts.rowid \
             JOIN books b ON b.id = n.book_id \
             WHERE notes_fts MATCH ?1 \
             ORDER BY rank, n.id \
             LIMIT ?2"
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| crate::map_db_err!("prepare search query", e))?;

        let rows = stmt
            .query_map(
                params![phrase(query), limit as i64],
                |row| {
                    Ok(SearchHit {
                        note_id: row.get(0)?,
                        title: row.get(1)?,
                        book: row.get(2)?,
                        rank: row.get(3)?,
                    })
                },
            )
            .map_err(|e| crate::map_db_err!("execute search query", e))?;

        let hits = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| crate::map_db_err!("read search results", e))?;

        tracing::debug!(query, hits = hits.len(), "search");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_escapes_quotes() {
        assert_eq!(phrase("standup"), "\"standup\"");
        assert_eq!(phrase("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
