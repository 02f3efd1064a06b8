//! Routing of parsed subcommands to their implementations

use qnote_core::error::Result;
use tracing::debug;

use crate::cli::{Commands, ExportArgs, ExportCommands, NewCommands};
use crate::commands::dispatch::command::{Command, CommandContext};
use crate::commands::{export, import, new_json, search};

impl Command for Commands {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let result = match self {
            Commands::Export(args) => execute_export(ctx, args),
            Commands::Import(args) => import::execute(ctx, args),
            Commands::New {
                command: NewCommands::Json { json, workers },
            } => new_json::execute(ctx, json.as_deref(), *workers),
            Commands::Search { query, limit } => search::execute(ctx, query, *limit),
        };
        debug!(elapsed = ?ctx.start.elapsed(), "execute_command");
        result
    }
}

fn execute_export(ctx: &CommandContext, args: &ExportArgs) -> Result<()> {
    let selection = match &args.command {
        None => export::Selection::All,
        Some(ExportCommands::Book { names }) => export::Selection::Books(names),
    };
    export::execute(ctx, selection, args.out_file.as_deref(), args.compress)
}
