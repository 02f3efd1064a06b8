//! CLI argument parsing for qnote
//!
//! Global flags: --data-dir, --format, --quiet, --verbose, --log-level, --log-json

pub mod parse;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub use qnote_core::format::OutputFormat;
use parse::{parse_output_format, parse_positive};

/// qnote - notebook CLI with a portable binary interchange format
#[derive(Parser, Debug)]
#[command(name = "qnote")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the notes database
    #[arg(long, global = true, env = "QNOTE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output format (human or json)
    #[arg(long, global = true, default_value = "human", value_parser = parse_output_format)]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log filter (e.g. debug, qnote_core=trace); overrides --verbose
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export notes as a QNOT stream (all notes unless a subcommand narrows it)
    Export(ExportArgs),

    /// Import notes from a QNOT stream
    Import(ImportArgs),

    /// Create notes
    New {
        #[command(subcommand)]
        command: NewCommands,
    },

    /// Full-text search over imported and created notes
    Search {
        /// Search query, matched as a phrase
        query: String,

        /// Maximum number of hits
        #[arg(long, short = 'n', default_value = "20", value_parser = parse_positive)]
        limit: usize,
    },
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Write to this file instead of stdout
    #[arg(long, short = 'o', global = true)]
    pub out_file: Option<PathBuf>,

    /// Gzip the stream (adds .gz to the file name)
    #[arg(long, short = 'c', global = true)]
    pub compress: bool,

    #[command(subcommand)]
    pub command: Option<ExportCommands>,
}

#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export only the notes of the named books
    Book {
        /// Book names, exported in the order given
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Save notes even when an identical one already exists
    #[arg(long, short = 's')]
    pub skip_dup_check: bool,

    /// Keep each note's modification time instead of stamping now
    #[arg(long, short = 'p')]
    pub preserve_modified: bool,

    /// Input is gzipped (implied by a .gz extension)
    #[arg(long, short = 'c')]
    pub compress: bool,

    /// QNOT file to read; stdin when omitted
    pub file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum NewCommands {
    /// Create notes from a JSON array of {title, type, tags, body, book}
    Json {
        /// JSON text; read from stdin when omitted
        json: Option<String>,

        /// Worker threads (defaults to import.workers from config)
        #[arg(long, value_parser = parse_positive)]
        workers: Option<usize>,
    },
}
