//! The in-memory suggestion index: bulk load with schema-tolerant
//! degradation, and the three-pass priority query.

use std::sync::{Arc, RwLock};

use crate::ndc::digits_only;
use crate::observability::{Logger, ServiceMetrics};
use crate::source::{BackupSource, SuggestColumns};

use super::entry::{SuggestEntry, SuggestItem};

/// Default maximum row count loaded into the index.
pub const DEFAULT_ROW_LIMIT: usize = 250_000;

/// Default maximum result count per query.
pub const DEFAULT_QUERY_LIMIT: usize = 20;

/// Build-time settings for the index.
#[derive(Debug, Clone, Copy)]
pub struct SuggestConfig {
    /// Request the substance column when loading
    pub include_substance: bool,
    /// Request the strength columns when loading
    pub include_strength: bool,
    /// Maximum rows to load
    pub row_limit: usize,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            include_substance: true,
            include_strength: true,
            row_limit: DEFAULT_ROW_LIMIT,
        }
    }
}

/// The process-wide autocomplete index.
///
/// `build` replaces the whole collection in a single swap; `query` scans
/// whichever complete collection is currently published. Reads never
/// block on a reload in progress.
pub struct SuggestIndex {
    entries: RwLock<Arc<Vec<SuggestEntry>>>,
}

impl Default for SuggestIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Current entry count.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Arc<Vec<SuggestEntry>> {
        Arc::clone(&self.entries.read().unwrap())
    }

    fn replace(&self, entries: Vec<SuggestEntry>) {
        *self.entries.write().unwrap() = Arc::new(entries);
    }

    /// Empty the index and publish the zero size ("no backup" mode).
    pub fn clear(&self, metrics: &ServiceMetrics) {
        self.replace(Vec::new());
        metrics.record_index_build(0);
    }

    /// Build (or rebuild) the index from the backup source.
    ///
    /// Never errors: a missing suggestion view or an exhausted retry
    /// sequence leaves the index empty. On a column-missing failure the
    /// load retries with progressively narrower column sets - drop
    /// strength, then substance, then both. The resulting size is
    /// published to the metrics registry for health reporting. Returns
    /// the new entry count.
    pub fn build(
        &self,
        source: &BackupSource,
        config: &SuggestConfig,
        metrics: &ServiceMetrics,
    ) -> usize {
        match source.table_exists() {
            Ok(true) => {}
            Ok(false) => {
                Logger::warn(
                    "SUGGEST_VIEW_MISSING",
                    &[("table", &source.schema().table)],
                );
                self.replace(Vec::new());
                metrics.record_index_build(0);
                return 0;
            }
            Err(e) => {
                Logger::warn("SUGGEST_VIEW_PROBE_FAILED", &[("error", &e.to_string())]);
                self.replace(Vec::new());
                metrics.record_index_build(0);
                return 0;
            }
        }

        for cols in column_attempts(config.include_substance, config.include_strength) {
            match source.bulk_select(cols, config.row_limit) {
                Ok(rows) => {
                    let mut entries: Vec<SuggestEntry> =
                        rows.into_iter().map(SuggestEntry::from_row).collect();
                    entries.truncate(config.row_limit);

                    let size = entries.len();
                    self.replace(entries);
                    metrics.record_index_build(size);
                    Logger::info(
                        "SUGGEST_INDEX_BUILT",
                        &[
                            ("rows", &size.to_string()),
                            ("substance", if cols.substance { "1" } else { "0" }),
                            ("strength", if cols.strength { "1" } else { "0" }),
                        ],
                    );
                    return size;
                }
                Err(e) => {
                    Logger::warn(
                        "SUGGEST_COLUMNS_DEGRADED",
                        &[
                            ("error", &e.to_string()),
                            ("substance", if cols.substance { "1" } else { "0" }),
                            ("strength", if cols.strength { "1" } else { "0" }),
                        ],
                    );
                }
            }
        }

        Logger::warn("SUGGEST_LOAD_EXHAUSTED", &[]);
        self.replace(Vec::new());
        metrics.record_index_build(0);
        0
    }

    /// Query the index with three cumulative passes in strict priority
    /// order, short-circuiting once `limit` entries are collected:
    ///
    /// 1. Key-prefix match on the lowercased key.
    /// 2. Digits-prefix match on the digits shadow, when the query
    ///    contains digits.
    /// 3. Substring match over brand, generic and substance shadows.
    ///
    /// Later passes never re-contribute an entry selected earlier, and
    /// there is no ranking within a pass (load order is preserved). An
    /// empty query returns an empty list immediately. No I/O, no await
    /// points.
    pub fn query(&self, text: &str, limit: usize) -> Vec<SuggestItem> {
        let trimmed = text.trim();
        if trimmed.is_empty() || limit == 0 {
            return Vec::new();
        }

        let entries = self.snapshot();
        let query_lower = trimmed.to_lowercase();
        let query_digits = digits_only(trimmed);

        let mut selected: Vec<usize> = Vec::new();
        let mut seen = vec![false; entries.len()];

        // Pass 1: identifier prefix.
        for (i, entry) in entries.iter().enumerate() {
            if selected.len() >= limit {
                break;
            }
            if entry.key_lower.starts_with(&query_lower) {
                seen[i] = true;
                selected.push(i);
            }
        }

        // Pass 2: digits prefix.
        if !query_digits.is_empty() && selected.len() < limit {
            for (i, entry) in entries.iter().enumerate() {
                if selected.len() >= limit {
                    break;
                }
                if !seen[i] && entry.digits.starts_with(&query_digits) {
                    seen[i] = true;
                    selected.push(i);
                }
            }
        }

        // Pass 3: free-text substring.
        if selected.len() < limit {
            for (i, entry) in entries.iter().enumerate() {
                if selected.len() >= limit {
                    break;
                }
                if seen[i] {
                    continue;
                }
                let hit = contains(&entry.brand_lower, &query_lower)
                    || contains(&entry.generic_lower, &query_lower)
                    || contains(&entry.substance_lower, &query_lower);
                if hit {
                    seen[i] = true;
                    selected.push(i);
                }
            }
        }

        selected.into_iter().map(|i| entries[i].item()).collect()
    }
}

fn contains(shadow: &Option<String>, needle: &str) -> bool {
    shadow.as_deref().is_some_and(|s| s.contains(needle))
}

/// Progressive column-set retry order: the requested set, then drop
/// strength, then drop substance, then drop both. Duplicates collapse
/// when the requested set already omits a column.
fn column_attempts(substance: bool, strength: bool) -> Vec<SuggestColumns> {
    let attempts = [
        SuggestColumns { substance, strength },
        SuggestColumns {
            substance,
            strength: false,
        },
        SuggestColumns {
            substance: false,
            strength,
        },
        SuggestColumns {
            substance: false,
            strength: false,
        },
    ];

    let mut out: Vec<SuggestColumns> = Vec::new();
    for cols in attempts {
        if !out.contains(&cols) {
            out.push(cols);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::BackupSchema;
    use crate::suggest::entry::entry;

    fn index_with(entries: Vec<SuggestEntry>) -> SuggestIndex {
        let index = SuggestIndex::new();
        index.replace(entries);
        index
    }

    fn sample_entries() -> Vec<SuggestEntry> {
        vec![
            entry("12345-6789", "12345-6789-01", Some("Foo"), Some("bar")),
            entry("99999-0001", "99999-0001-05", Some("Baz"), Some("fooquinone")),
        ]
    }

    #[test]
    fn test_empty_query_returns_empty() {
        let index = index_with(sample_entries());
        assert!(index.query("", 20).is_empty());
        assert!(index.query("   ", 20).is_empty());
    }

    #[test]
    fn test_key_prefix_pass() {
        let index = index_with(sample_entries());
        let results = index.query("12345", 20);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key, "12345-6789");
    }

    #[test]
    fn test_substring_pass_preserves_load_order() {
        let index = index_with(sample_entries());
        let results = index.query("foo", 20);
        // Brand "Foo" and generic "fooquinone" both match via substring;
        // load order is preserved within the pass.
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].brand.as_deref(), Some("Foo"));
        assert_eq!(results[1].brand.as_deref(), Some("Baz"));
    }

    #[test]
    fn test_digit_pass_outranks_substring() {
        let entries = vec![
            entry("55555-1234", "55555-1234-01", Some("Textonly 1234"), None),
            entry("77777-0001", "12340-0001-01", Some("Other"), None),
        ];
        let index = index_with(entries);

        // "1234" digit-prefix matches the second entry's digits shadow
        // (12340000101) and substring-matches the first entry's brand.
        let results = index.query("1234", 20);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].key, "77777-0001");
        assert_eq!(results[1].key, "55555-1234");
    }

    #[test]
    fn test_passes_never_duplicate_entries() {
        // Key prefix and digits prefix both match the same entry.
        let index = index_with(vec![entry("12345-6789", "12345-6789-01", None, None)]);
        let results = index.query("12345", 20);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_limit_short_circuits_across_passes() {
        let mut entries = Vec::new();
        for i in 0..30 {
            let key = format!("12345-{:04}", i);
            entries.push(entry(&key, &format!("{}-01", key), Some("Foo"), None));
        }
        let index = index_with(entries);

        let results = index.query("12345", 5);
        assert_eq!(results.len(), 5);
        // First pass alone fills the limit, in load order.
        assert_eq!(results[0].key, "12345-0000");
        assert_eq!(results[4].key, "12345-0004");
    }

    #[test]
    fn test_no_digit_pass_for_text_queries() {
        let index = index_with(sample_entries());
        let results = index.query("baz", 20);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key, "99999-0001");
    }

    #[test]
    fn test_column_attempts_orders_and_dedupes() {
        let all = column_attempts(true, true);
        assert_eq!(all.len(), 4);
        assert!(all[0].substance && all[0].strength);
        assert!(all[1].substance && !all[1].strength);
        assert!(!all[2].substance && all[2].strength);
        assert!(!all[3].substance && !all[3].strength);

        let minimal = column_attempts(false, false);
        assert_eq!(minimal.len(), 1);

        let substance_only = column_attempts(true, false);
        assert_eq!(substance_only.len(), 2);
    }

    #[test]
    fn test_build_missing_view_leaves_empty_index() {
        let source = BackupSource::open_in_memory(BackupSchema::default()).unwrap();
        let metrics = ServiceMetrics::new();
        let index = index_with(sample_entries());

        let size = index.build(&source, &SuggestConfig::default(), &metrics);
        assert_eq!(size, 0);
        assert!(index.is_empty());
        assert_eq!(metrics.suggest_index_size(), 0);
    }

    #[test]
    fn test_build_degrades_when_columns_missing() {
        let source = BackupSource::open_in_memory(BackupSchema::default()).unwrap();
        source
            .execute_batch(
                "CREATE TABLE ndc_suggest (
                    labeler_product TEXT, ndc10 TEXT,
                    proprietary_name TEXT, nonproprietary_name TEXT
                );
                INSERT INTO ndc_suggest VALUES
                    ('12345-6789', '12345-6789-01', 'Foo', 'bar');",
            )
            .unwrap();
        let metrics = ServiceMetrics::new();
        let index = SuggestIndex::new();

        let size = index.build(&source, &SuggestConfig::default(), &metrics);
        assert_eq!(size, 1);
        assert_eq!(metrics.suggest_index_size(), 1);

        let results = index.query("foo", 20);
        assert_eq!(results.len(), 1);
        assert!(results[0].substance.is_none());
        assert!(results[0].strength.is_none());
    }

    #[test]
    fn test_build_is_idempotent() {
        let source = BackupSource::open_in_memory(BackupSchema::default()).unwrap();
        source
            .execute_batch(
                "CREATE TABLE ndc_suggest (
                    labeler_product TEXT, ndc10 TEXT,
                    proprietary_name TEXT, nonproprietary_name TEXT
                );
                INSERT INTO ndc_suggest VALUES
                    ('1-1', '0001-0001-01', 'A', 'a'),
                    ('2-2', '0002-0002-01', 'B', 'b');",
            )
            .unwrap();
        let metrics = ServiceMetrics::new();
        let index = SuggestIndex::new();

        let first = index.build(&source, &SuggestConfig::default(), &metrics);
        let first_items = index.query("000", 20);
        let second = index.build(&source, &SuggestConfig::default(), &metrics);
        let second_items = index.query("000", 20);

        assert_eq!(first, second);
        assert_eq!(first_items, second_items);
    }

    #[test]
    fn test_build_caps_rows_at_limit() {
        let source = BackupSource::open_in_memory(BackupSchema::default()).unwrap();
        source
            .execute_batch(
                "CREATE TABLE ndc_suggest (
                    labeler_product TEXT, ndc10 TEXT,
                    proprietary_name TEXT, nonproprietary_name TEXT
                );
                INSERT INTO ndc_suggest VALUES
                    ('1-1', '0001-0001-01', 'A', 'a'),
                    ('2-2', '0002-0002-01', 'B', 'b'),
                    ('3-3', '0003-0003-01', 'C', 'c');",
            )
            .unwrap();
        let metrics = ServiceMetrics::new();
        let index = SuggestIndex::new();

        let config = SuggestConfig {
            row_limit: 2,
            ..SuggestConfig::default()
        };
        assert_eq!(index.build(&source, &config, &metrics), 2);
    }
}
