//! Data sources for ndcserve
//!
//! Two read-only SQLite handles back the service:
//!
//! - `BackupSource` - fast synchronous lookups plus the bulk select that
//!   feeds the suggestion index. Opened wholesale at boot and re-opened
//!   on an administrative reload.
//! - `PrimarySource` - the richer (and potentially slower) source, exposed
//!   as an async lookup via `spawn_blocking` so the assisted resolver can
//!   race it against its deadline.
//!
//! Neither source owns a schema; they consume whatever the underlying
//! files expose, reading columns by name and treating absent columns as
//! unset fields.

pub mod backup;
pub mod errors;
pub mod primary;

pub use backup::{BackupSchema, BackupSource, SuggestColumns, SuggestRow};
pub use errors::{SourceError, SourceResult};
pub use primary::PrimarySource;

use rusqlite::types::ValueRef;
use rusqlite::Row;

/// Read a column as display text, tolerating NULL and non-text storage
/// classes. Absent columns are handled by the callers, which resolve
/// indices from the statement's column list first.
pub(crate) fn value_text(row: &Row<'_>, idx: usize) -> Option<String> {
    match row.get_ref(idx).ok()? {
        ValueRef::Null => None,
        ValueRef::Text(bytes) => std::str::from_utf8(bytes).ok().map(|s| s.to_string()),
        ValueRef::Integer(i) => Some(i.to_string()),
        // Display already drops a zero fraction, so "500.0 mg" renders
        // as "500 mg" without any narrowing cast.
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Blob(_) => None,
    }
}

/// Find a column's index in a captured column-name list.
pub(crate) fn column_index(columns: &[String], name: &str) -> Option<usize> {
    columns.iter().position(|c| c.eq_ignore_ascii_case(name))
}

/// Read a named column as optional text, yielding None when the column
/// does not exist in this deployment's schema.
pub(crate) fn named_text(row: &Row<'_>, columns: &[String], name: &str) -> Option<String> {
    let idx = column_index(columns, name)?;
    value_text(row, idx).filter(|s| !s.trim().is_empty())
}

/// Read a named column as an optional boolean (SQLite 0/1 integers).
pub(crate) fn named_bool(row: &Row<'_>, columns: &[String], name: &str) -> Option<bool> {
    let idx = column_index(columns, name)?;
    match row.get_ref(idx).ok()? {
        ValueRef::Integer(i) => Some(i != 0),
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes).ok()? {
            "1" | "true" | "TRUE" | "yes" | "Y" => Some(true),
            "0" | "false" | "FALSE" | "no" | "N" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
