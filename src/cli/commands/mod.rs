//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Opens the repository and loads configuration
//! 3. Formats and displays output

mod completion;
mod config_cmd;
mod graph;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use config_cmd::{get as config_get, set as config_set, show as config_show};
pub use graph::{format_row, graph, GraphArgs};

use crate::cli::args::{Command, ConfigAction};
use crate::cli::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Graph {
            revs,
            all,
            batch_size,
            threads,
            sequential,
            max_rows,
            json,
            no_decorate,
        } => graph(
            ctx,
            GraphArgs {
                revs,
                all,
                batch_size,
                threads,
                sequential,
                max_rows,
                json,
                no_decorate,
            },
        ),
        Command::Config { action } => match action {
            ConfigAction::Show => config_show(ctx),
            ConfigAction::Get { key } => config_get(ctx, &key),
            ConfigAction::Set { key, value, global } => config_set(ctx, &key, &value, global),
        },
        Command::Completion { shell } => completion(shell),
    }
}
