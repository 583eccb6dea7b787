//! CLI command implementations
//!
//! `serve` boots the HTTP server: load config, open sources, build the
//! suggestion index, bind. `check` performs the same boot without
//! binding, prints the index size and exits - a cheap way to validate a
//! deployment's backup file and schema.

use std::path::Path;

use crate::config::ServiceConfig;
use crate::http_server::{HttpServer, LookupState};
use crate::observability::Logger;

use super::args::{Cli, Command};
use super::errors::CliResult;

/// Dispatch a parsed CLI invocation
pub fn run_command(cli: Cli) -> CliResult<()> {
    match cli.command {
        Command::Serve { config } => serve(&config),
        Command::Check { config } => check(&config),
    }
}

fn serve(config_path: &Path) -> CliResult<()> {
    let config = ServiceConfig::load(config_path)?;
    Logger::info(
        "BOOT",
        &[("config", &config_path.display().to_string())],
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let server = HttpServer::from_config(config);
        server.start().await
    })?;

    Ok(())
}

fn check(config_path: &Path) -> CliResult<()> {
    let config = ServiceConfig::load(config_path)?;
    let state = LookupState::from_config(config);

    println!("backup: {}", if state.backup().is_some() { "open" } else { "absent" });
    println!("primary: {}", if state.primary.is_some() { "open" } else { "absent" });
    println!("suggest index entries: {}", state.index.len());

    Ok(())
}
