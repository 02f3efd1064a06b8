//! `qnote import` - merge a QNOT stream into the notes database

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use qnote_core::error::{QnoteError, Result};
use qnote_core::import::{import_stream, ImportOptions};
use tracing::debug;

use super::report::{ConsoleReporter, Source};
use crate::cli::ImportArgs;
use crate::commands::dispatch::CommandContext;

/// Execute the import command, reading the file or stdin
pub fn execute(ctx: &CommandContext, args: &ImportArgs) -> Result<()> {
    let db = ctx.open_database()?;

    let options = ImportOptions {
        skip_dup_check: args.skip_dup_check,
        preserve_modified: args.preserve_modified,
        ..ImportOptions::from_config(&ctx.config.import)
    };

    let compressed = args.compress || args.file.as_deref().is_some_and(is_gzip_path);
    debug!(file = ?args.file, compressed, "import");
    let reader = open_input(args.file.as_deref(), compressed)?;

    let reporter = ConsoleReporter::new(ctx.cli, Source::Stream);
    let summary = import_stream(reader, &db, &db, &options, &reporter)?;
    reporter.summary(&summary)
}

fn is_gzip_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

fn open_input(path: Option<&Path>, compressed: bool) -> Result<Box<dyn Read + Send>> {
    let raw: Box<dyn Read + Send> = match path {
        Some(path) => Box::new(
            File::open(path).map_err(|e| QnoteError::io_operation("open", path.display(), e))?,
        ),
        None => Box::new(io::stdin()),
    };

    Ok(if compressed {
        Box::new(BufReader::new(GzDecoder::new(raw)))
    } else {
        Box::new(BufReader::new(raw))
    })
}
