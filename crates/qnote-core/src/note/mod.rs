//! Note, Book, and Tag models
//!
//! Books and tags are identified by name inside a store; their numeric IDs
//! only mean something to the store that assigned them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QnoteError;

/// Kind of note content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    #[default]
    Basic,
    Url,
}

impl NoteType {
    pub const BASIC: &'static str = "basic";
    pub const URL: &'static str = "url";

    /// All accepted type names, in display order
    pub const ALL: [&'static str; 2] = [Self::BASIC, Self::URL];

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteType::Basic => Self::BASIC,
            NoteType::Url => Self::URL,
        }
    }
}

impl FromStr for NoteType {
    type Err = QnoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::BASIC => Ok(NoteType::Basic),
            Self::URL => Ok(NoteType::Url),
            other => Err(QnoteError::invalid_value(
                &format!("note type (expected one of: {})", Self::ALL.join(", ")),
                other,
            )),
        }
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notebook grouping notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Book {
    /// A book that has not been stored yet (ID 0)
    pub fn new(name: impl Into<String>) -> Self {
        let now = now();
        Self {
            id: 0,
            name: name.into(),
            created: now,
            modified: now,
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Book ID: {} Name: {}>", self.id, self.name)
    }
}

/// A label attached to notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        let now = now();
        Self {
            id: 0,
            name: name.into(),
            created: now,
            modified: now,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Tag ID: {} Name: {}>", self.id, self.name)
    }
}

/// A note with its resolved book and ordered tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub note_type: NoteType,
    pub title: String,
    pub body: String,
    pub book: Book,
    pub tags: Vec<Tag>,
}

impl Note {
    /// A new, unsaved note stamped with the current time
    pub fn new(book: Book, note_type: NoteType, title: impl Into<String>) -> Self {
        let now = now();
        Self {
            id: 0,
            created: now,
            modified: now,
            note_type,
            title: title.into(),
            body: String::new(),
            book,
            tags: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn tag_ids(&self) -> Vec<i64> {
        self.tags.iter().map(|t| t.id).collect()
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Note ID: {} Title: {} Book: {} Tags: {}>",
            self.id,
            self.title,
            self.book.name,
            self.tag_names().join(", ")
        )
    }
}

/// Current time truncated to whole seconds, the resolution stores and streams keep
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}
