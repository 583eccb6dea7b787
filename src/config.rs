//! Service configuration for ndcserve
//!
//! Loaded from a JSON file; every field has a default so a missing file
//! boots a usable (if source-less) service. A service without a backup
//! path runs in "no backup" mode: lookups are primary-only and
//! suggestion queries return empty results.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::assist::DEFAULT_DEADLINE_MS;
use crate::http_server::HttpServerConfig;
use crate::source::BackupSchema;
use crate::suggest::{SuggestConfig, DEFAULT_QUERY_LIMIT, DEFAULT_ROW_LIMIT};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// HTTP bind and CORS settings
    #[serde(default)]
    pub http: HttpServerConfig,

    /// Backup SQLite file; absent enables "no backup" mode
    #[serde(default)]
    pub backup_path: Option<PathBuf>,

    /// Primary SQLite file; absent disables the primary source
    #[serde(default)]
    pub primary_path: Option<PathBuf>,

    /// Primary lookup table name
    #[serde(default = "default_primary_table")]
    pub primary_table: String,

    /// Backup suggestion view and column names
    #[serde(default)]
    pub backup: BackupSchema,

    /// Load the substance column into the suggestion index
    #[serde(default = "default_true")]
    pub include_substance: bool,

    /// Load the strength columns into the suggestion index
    #[serde(default = "default_true")]
    pub include_strength: bool,

    /// Assisted-lookup deadline in milliseconds
    #[serde(default = "default_deadline")]
    pub assist_deadline_ms: u64,

    /// Maximum rows loaded into the suggestion index
    #[serde(default = "default_row_limit")]
    pub suggest_row_limit: usize,

    /// Maximum results per suggestion query
    #[serde(default = "default_result_limit")]
    pub suggest_result_limit: usize,

    /// Minimum digit count before a digit-bearing query hits the index
    #[serde(default = "default_min_digits")]
    pub suggest_min_digits: usize,

    /// Minimum character count before a text query hits the index
    #[serde(default = "default_min_chars")]
    pub suggest_min_chars: usize,
}

fn default_primary_table() -> String {
    "ndc_products".to_string()
}

fn default_true() -> bool {
    true
}

fn default_deadline() -> u64 {
    DEFAULT_DEADLINE_MS
}

fn default_row_limit() -> usize {
    DEFAULT_ROW_LIMIT
}

fn default_result_limit() -> usize {
    DEFAULT_QUERY_LIMIT
}

fn default_min_digits() -> usize {
    4
}

fn default_min_chars() -> usize {
    3
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            http: HttpServerConfig::default(),
            backup_path: None,
            primary_path: None,
            primary_table: default_primary_table(),
            backup: BackupSchema::default(),
            include_substance: true,
            include_strength: true,
            assist_deadline_ms: default_deadline(),
            suggest_row_limit: default_row_limit(),
            suggest_result_limit: default_result_limit(),
            suggest_min_digits: default_min_digits(),
            suggest_min_chars: default_min_chars(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a JSON file. A missing file yields the
    /// defaults; an unreadable or malformed file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// The build-time settings for the suggestion index.
    pub fn suggest_config(&self) -> SuggestConfig {
        SuggestConfig {
            include_substance: self.include_substance,
            include_strength: self.include_strength,
            row_limit: self.suggest_row_limit,
        }
    }

    /// Whether a suggestion query string passes the gating thresholds.
    ///
    /// Digit-bearing queries need `suggest_min_digits` digits; pure text
    /// queries need `suggest_min_chars` characters.
    pub fn suggest_gate(&self, query: &str) -> bool {
        let trimmed = query.trim();
        let digits = crate::ndc::digits_only(trimmed);
        if !digits.is_empty() {
            digits.len() >= self.suggest_min_digits
        } else {
            trimmed.chars().count() >= self.suggest_min_chars
        }
    }
}
