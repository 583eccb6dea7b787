//! ndcserve - an assisted NDC lookup service
//!
//! Resolves National Drug Code identifiers with bounded latency by
//! racing a primary SQLite source against a deadline and falling back
//! to a backup source, and serves autocomplete from an in-memory
//! suggestion index bulk-loaded from the backup.

pub mod assist;
pub mod cli;
pub mod config;
pub mod http_server;
pub mod ndc;
pub mod observability;
pub mod record;
pub mod source;
pub mod suggest;
