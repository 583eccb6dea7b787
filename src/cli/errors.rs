//! CLI-specific error types

use thiserror::Error;

use crate::config::ConfigError;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration loading failed
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Runtime or I/O failure while serving
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}
