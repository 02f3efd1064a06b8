//! `qnote search` - full-text search over indexed notes

use qnote_core::error::Result;
use qnote_core::format::OutputFormat;
use qnote_core::store::SearchIndex;
use tracing::debug;

use crate::commands::dispatch::CommandContext;

/// Execute the search command
pub fn execute(ctx: &CommandContext, query: &str, limit: usize) -> Result<()> {
    let db = ctx.open_database()?;
    let hits = db.search(query, limit)?;
    debug!(query, hits = hits.len(), "search");

    match ctx.cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&hits)?),
        OutputFormat::Human => {
            if hits.is_empty() {
                if !ctx.cli.quiet {
                    println!("No matches");
                }
                return Ok(());
            }
            for hit in &hits {
                println!("{}\t{}\t{}", hit.note_id, hit.book, hit.title);
            }
        }
    }
    Ok(())
}
