//! Suggestion index for ndcserve
//!
//! A flat in-memory collection of autocomplete entries bulk-loaded from
//! the backup source. Queries scan RAM only; the collection is replaced
//! wholesale by `build` (startup and administrative reloads) and never
//! mutated in place. Readers always observe a complete collection -
//! either the previous one or the new one, never a partial load.
//!
//! # API
//!
//! - `SuggestIndex::build(source, config, metrics)` - Load/replace the index
//! - `SuggestIndex::query(text, limit)` - Three-pass priority matching
//! - `SuggestIndex::len()` - Published entry count for health reporting

pub mod entry;
pub mod index;

pub use entry::{SuggestEntry, SuggestItem};
pub use index::{SuggestConfig, SuggestIndex, DEFAULT_QUERY_LIMIT, DEFAULT_ROW_LIMIT};
