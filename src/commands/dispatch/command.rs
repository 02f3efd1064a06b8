//! Command trait and context for dispatching commands

use std::time::Instant;

use qnote_core::config::Config;
use qnote_core::db::Database;
use qnote_core::error::Result;
use tracing::debug;

use crate::cli::Cli;

/// Shared context for command execution
pub struct CommandContext<'a> {
    pub cli: &'a Cli,
    pub config: &'a Config,
    pub start: Instant,
}

impl<'a> CommandContext<'a> {
    pub fn new(cli: &'a Cli, config: &'a Config, start: Instant) -> Self {
        Self { cli, config, start }
    }

    /// Open the notes database: --data-dir / QNOTE_DATA_DIR, then config, then platform default
    pub fn open_database(&self) -> Result<Database> {
        let dir = self.config.resolve_data_dir(self.cli.data_dir.as_deref())?;
        let db = Database::open(&dir)?;
        debug!(elapsed = ?self.start.elapsed(), dir = %dir.display(), "open_database");
        Ok(db)
    }
}

/// Trait for commands that can be executed
pub trait Command {
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// No-op command (when no subcommand is provided)
pub struct NoCommand;

impl Command for NoCommand {
    fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        println!("qnote {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("A notebook CLI with a portable binary interchange format.");
        println!();
        println!("Run `qnote --help` for usage information.");
        Ok(())
    }
}
