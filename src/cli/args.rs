//! CLI argument definitions using clap
//!
//! Commands:
//! - ndcserve serve --config <path>
//! - ndcserve check --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ndcserve - An assisted NDC lookup service
#[derive(Parser, Debug)]
#[command(name = "ndcserve")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the lookup server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./ndcserve.json")]
        config: PathBuf,
    },

    /// Open the sources, build the suggestion index once, report and exit
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./ndcserve.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
