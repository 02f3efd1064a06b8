//! Console reporting for import runs

use qnote_core::encoding::Header;
use qnote_core::error::{QnoteError, Result};
use qnote_core::format::OutputFormat;
use qnote_core::import::{ImportReporter, ImportSummary};
use qnote_core::note::Note;

use crate::cli::Cli;

/// Which import produced the events; the wording differs per source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Stream,
    Json,
}

/// Prints per-note progress in human mode and a summary object in JSON mode
pub struct ConsoleReporter {
    source: Source,
    format: OutputFormat,
    quiet: bool,
}

impl ConsoleReporter {
    pub fn new(cli: &Cli, source: Source) -> Self {
        Self {
            source,
            format: cli.format,
            quiet: cli.quiet,
        }
    }

    fn chatty(&self) -> bool {
        self.format == OutputFormat::Human && !self.quiet
    }

    pub fn summary(&self, summary: &ImportSummary) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(summary)?),
            OutputFormat::Human if self.quiet => {}
            OutputFormat::Human => match self.source {
                Source::Stream => println!(
                    "{} notes imported, {} duplicates skipped",
                    summary.saved, summary.skipped
                ),
                Source::Json => {
                    println!("{} notes added", summary.saved);
                    if summary.errors > 0 {
                        println!("{} notes failed", summary.errors);
                    }
                }
            },
        }
        Ok(())
    }
}

impl ImportReporter for ConsoleReporter {
    fn header(&self, header: &Header) {
        if self.chatty() {
            println!("Version: {}", header.version);
            println!("Created: {}", header.created);
        }
    }

    fn saved(&self, note: &Note) {
        if self.chatty() {
            match self.source {
                Source::Stream => println!("Saved Note: {}", note),
                Source::Json => println!("Note added: {}", note),
            }
        }
    }

    fn skipped(&self, note: &Note) {
        if self.chatty() {
            println!("Skipping Dup: {}", note);
        }
    }

    fn failed(&self, title: &str, error: &QnoteError) {
        // A stream failure ends the run and is printed once by main
        if self.source == Source::Json && !self.quiet {
            eprintln!("error: note {:?}: {}", title, error);
        }
    }
}
