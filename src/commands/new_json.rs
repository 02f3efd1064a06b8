//! `qnote new json` - create notes from a JSON array through the worker pool

use std::io;

use qnote_core::error::Result;
use qnote_core::import::{import_json, PoolOptions};

use super::report::{ConsoleReporter, Source};
use crate::commands::dispatch::CommandContext;

/// Execute `new json`, reading the argument or stdin
pub fn execute(ctx: &CommandContext, json: Option<&str>, workers: Option<usize>) -> Result<()> {
    let db = ctx.open_database()?;

    let mut options = PoolOptions::from_config(ctx.config);
    if let Some(workers) = workers {
        options.workers = workers;
    }

    let reporter = ConsoleReporter::new(ctx.cli, Source::Json);
    let summary = match json {
        Some(text) => import_json(text.as_bytes(), &db, &db, &options, &reporter)?,
        None => import_json(io::stdin().lock(), &db, &db, &options, &reporter)?,
    };

    reporter.summary(&summary)
}
