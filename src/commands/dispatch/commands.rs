//! Command implementations for all textreuse commands

use crate::cli::Commands;
use crate::commands;
use crate::commands::dispatch::command::{Command, CommandContext};
use textreuse_core::error::Result;

impl Command for Commands {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let result = match self {
            Commands::Init(args) => commands::init::execute(ctx, args),
            Commands::Detect(args) => commands::detect::execute(ctx, args),
            Commands::Neighbors(args) => commands::neighbors::execute(ctx, args),
            Commands::Index(args) => commands::index::execute(ctx, args),
        };
        tracing::debug!(elapsed = ?ctx.start.elapsed(), "execute_command");
        result
    }
}
