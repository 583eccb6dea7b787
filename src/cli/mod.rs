//! CLI module for ndcserve
//!
//! Provides the command-line interface:
//! - serve: Boot the HTTP server
//! - check: One-shot source/index validation

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::run_command;
pub use errors::{CliError, CliResult};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli)
}
