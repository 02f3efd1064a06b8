//! `qnote export` - write notes as a QNOT stream
//!
//! - all notes by default, oldest first
//! - `export book <name>...` narrows to the named books
//! - stdout unless `--out-file` is given; `--compress` wraps the stream in gzip

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use flate2::{Compression, GzBuilder};
use qnote_core::db::Database;
use qnote_core::error::{QnoteError, Result};
use qnote_core::export::{export_all, export_books, ExportSummary};
use qnote_core::format::OutputFormat;
use qnote_core::store::NoteStore;
use serde::Serialize;
use tracing::info;

use crate::commands::dispatch::CommandContext;

const DEFAULT_FILE_NAME: &str = "notes.qnot";
const GZIP_COMMENT: &str = "Exported notes from qnote";

/// Which notes to export
#[derive(Debug, Clone, Copy)]
pub enum Selection<'a> {
    All,
    Books(&'a [String]),
}

/// Summary printed after writing to a file
#[derive(Debug, Serialize)]
struct ExportReport<'a> {
    path: &'a str,
    notes: usize,
    books: usize,
    tags: usize,
    bytes: u64,
}

/// Output location and the file name recorded in the gzip header
#[derive(Debug, PartialEq, Eq)]
struct Target {
    path: Option<PathBuf>,
    name: String,
}

impl Target {
    fn resolve(out_file: Option<&Path>, compress: bool) -> Self {
        let Some(out_file) = out_file else {
            return Self {
                path: None,
                name: DEFAULT_FILE_NAME.to_string(),
            };
        };

        let mut path = out_file.to_path_buf();
        let mut name = out_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

        if compress {
            if name.ends_with(".gz") {
                name.truncate(name.len() - 3);
            } else {
                path.as_mut_os_string().push(".gz");
            }
        }

        Self {
            path: Some(path),
            name,
        }
    }
}

/// Execute the export command
pub fn execute(
    ctx: &CommandContext,
    selection: Selection<'_>,
    out_file: Option<&Path>,
    compress: bool,
) -> Result<()> {
    let db = ctx.open_database()?;

    // Unknown books fail before the output file is created
    if let Selection::Books(names) = selection {
        for name in names {
            if db.find_book_by_name(name)?.is_none() {
                return Err(QnoteError::BookNotFound { name: name.clone() });
            }
        }
    }

    let target = Target::resolve(out_file, compress);
    let summary = match &target.path {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| QnoteError::io_operation("create", path.display(), e))?;
            write_stream(&db, selection, BufWriter::new(file), compress, &target.name)?
        }
        None => write_stream(
            &db,
            selection,
            BufWriter::new(io::stdout().lock()),
            compress,
            &target.name,
        )?,
    };

    info!(
        notes = summary.notes,
        books = summary.books,
        tags = summary.tags,
        bytes = summary.bytes,
        compressed = compress,
        "exported"
    );

    // With no file the stream owns stdout
    if let Some(path) = &target.path {
        match ctx.cli.format {
            OutputFormat::Json => {
                let path = path.display().to_string();
                let report = ExportReport {
                    path: &path,
                    notes: summary.notes,
                    books: summary.books,
                    tags: summary.tags,
                    bytes: summary.bytes,
                };
                println!("{}", serde_json::to_string(&report)?);
            }
            OutputFormat::Human if !ctx.cli.quiet => println!(
                "Exported {} notes ({} books, {} tags) to {}",
                summary.notes,
                summary.books,
                summary.tags,
                path.display()
            ),
            OutputFormat::Human => {}
        }
    }
    Ok(())
}

fn write_stream<W: Write>(
    db: &Database,
    selection: Selection<'_>,
    out: W,
    compress: bool,
    name: &str,
) -> Result<ExportSummary> {
    if compress {
        let gz = GzBuilder::new()
            .filename(name)
            .comment(GZIP_COMMENT)
            .mtime(u32::try_from(Utc::now().timestamp()).unwrap_or(0))
            .write(out, Compression::default());
        let (summary, gz) = encode(db, selection, gz)?;
        gz.finish()?.flush()?;
        Ok(summary)
    } else {
        let (summary, mut out) = encode(db, selection, out)?;
        out.flush()?;
        Ok(summary)
    }
}

fn encode<W: Write>(db: &Database, selection: Selection<'_>, out: W) -> Result<(ExportSummary, W)> {
    match selection {
        Selection::All => export_all(db, out),
        Selection::Books(names) => export_books(db, names, out),
    }
}
