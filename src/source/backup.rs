//! Backup SQLite source
//!
//! The backup file carries a flat suggestion view (one row per
//! labeler-product) that serves two jobs: fast single-key fallback
//! lookups for the assisted resolver, and the bulk select that feeds the
//! in-memory suggestion index. Deployments vary in which optional
//! columns the view carries, so bulk selects name their columns
//! explicitly and fail when one is absent - the index builder reacts by
//! retrying with a narrower set.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OpenFlags};
use serde::Deserialize;

use crate::ndc::{digits_only, LookupKey};
use crate::record::{strength_display, DrugRecord, Provenance};

use super::errors::{SourceError, SourceResult};
use super::{named_text, value_text};

/// Names of the backup suggestion view and its identifying columns.
#[derive(Debug, Clone, Deserialize)]
pub struct BackupSchema {
    /// Suggestion view/table name
    #[serde(default = "default_table")]
    pub table: String,
    /// Normalized labeler-product key column
    #[serde(default = "default_key_column")]
    pub key_column: String,
    /// Dashed display-identifier column
    #[serde(default = "default_id_column")]
    pub id_column: String,
    /// Optional digits-only identifier column, preferred over deriving
    /// digits from the dashed identifier when present
    #[serde(default)]
    pub digits_column: Option<String>,
}

fn default_table() -> String {
    "ndc_suggest".to_string()
}

fn default_key_column() -> String {
    "labeler_product".to_string()
}

fn default_id_column() -> String {
    "ndc10".to_string()
}

impl Default for BackupSchema {
    fn default() -> Self {
        Self {
            table: default_table(),
            key_column: default_key_column(),
            id_column: default_id_column(),
            digits_column: None,
        }
    }
}

/// Which optional columns a bulk select should request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestColumns {
    pub substance: bool,
    pub strength: bool,
}

/// One row loaded by `bulk_select`, already projected to suggest fields.
#[derive(Debug, Clone)]
pub struct SuggestRow {
    pub key: String,
    pub ndc10: String,
    /// Digits-only identifier from the configured digits column, if any.
    pub digits: Option<String>,
    pub brand: Option<String>,
    pub generic: Option<String>,
    pub substance: Option<String>,
    pub strength: Option<String>,
}

/// Read-only handle on the backup SQLite file.
pub struct BackupSource {
    conn: Mutex<Connection>,
    schema: BackupSchema,
}

impl BackupSource {
    /// Open the backup file read-only.
    pub fn open(path: &Path, schema: BackupSchema) -> SourceResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| SourceError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            conn: Mutex::new(conn),
            schema,
        })
    }

    /// Open an in-memory backup (tests and fixtures).
    pub fn open_in_memory(schema: BackupSchema) -> SourceResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| SourceError::Open {
            path: ":memory:".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            conn: Mutex::new(conn),
            schema,
        })
    }

    /// The configured schema names.
    pub fn schema(&self) -> &BackupSchema {
        &self.schema
    }

    /// Run arbitrary DDL/DML against the handle (fixture setup only).
    pub fn execute_batch(&self, sql: &str) -> SourceResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(sql)?;
        Ok(())
    }

    /// Whether the suggestion view exists in this file.
    pub fn table_exists(&self) -> SourceResult<bool> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1",
        )?;
        let found = stmt.exists(params![self.schema.table])?;
        Ok(found)
    }

    /// Fast single-key lookup, mapped into the common record shape.
    ///
    /// Selects `*` and reads columns by name so that schema-variant
    /// deployments simply yield records with fewer fields set.
    pub fn get(&self, key: &LookupKey) -> SourceResult<Option<DrugRecord>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?1 LIMIT 1",
            self.schema.table, self.schema.key_column
        );
        let mut stmt = conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let result = stmt.query_row(params![key.to_string()], |row| {
            let mut record = DrugRecord::new(key.to_string(), Provenance::Backup);
            record.ndc10 = named_text(row, &columns, &self.schema.id_column);
            record.proprietary_name = named_text(row, &columns, "proprietary_name");
            record.nonproprietary_name = named_text(row, &columns, "nonproprietary_name");
            record.substance_name = named_text(row, &columns, "substance_name");
            record.dosage_form = named_text(row, &columns, "dosage_form");
            record.route = named_text(row, &columns, "route");
            record.dea_schedule = named_text(row, &columns, "dea_schedule");
            record.strength = strength_display(
                named_text(row, &columns, "active_numerator_strength").as_deref(),
                named_text(row, &columns, "active_ingred_unit").as_deref(),
            );
            Ok(record)
        });

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Bulk load suggestion rows with an explicit column set.
    ///
    /// Fails when a requested column does not exist; the caller retries
    /// with a narrower `SuggestColumns`.
    pub fn bulk_select(&self, cols: SuggestColumns, limit: usize) -> SourceResult<Vec<SuggestRow>> {
        let conn = self.conn.lock().unwrap();

        let mut select = vec![
            self.schema.key_column.clone(),
            self.schema.id_column.clone(),
        ];
        let digits_idx = self.schema.digits_column.as_ref().map(|c| {
            select.push(c.clone());
            select.len() - 1
        });
        select.push("proprietary_name".to_string());
        let brand_idx = select.len() - 1;
        select.push("nonproprietary_name".to_string());
        let generic_idx = select.len() - 1;
        let substance_idx = cols.substance.then(|| {
            select.push("substance_name".to_string());
            select.len() - 1
        });
        let strength_idx = cols.strength.then(|| {
            select.push("active_numerator_strength".to_string());
            select.push("active_ingred_unit".to_string());
            select.len() - 2
        });

        let sql = format!(
            "SELECT {} FROM {} LIMIT ?1",
            select.join(", "),
            self.schema.table
        );
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            let key = value_text(row, 0).unwrap_or_default();
            let ndc10 = value_text(row, 1).unwrap_or_default();
            let strength = strength_idx.and_then(|i| {
                strength_display(value_text(row, i).as_deref(), value_text(row, i + 1).as_deref())
            });
            Ok(SuggestRow {
                key,
                ndc10,
                digits: digits_idx.and_then(|i| value_text(row, i)),
                brand: value_text(row, brand_idx),
                generic: value_text(row, generic_idx),
                substance: substance_idx.and_then(|i| value_text(row, i)),
                strength,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

impl SuggestRow {
    /// Digits shadow for identifier matching: prefer the provided digits
    /// column, else strip the dashed identifier.
    pub fn digit_shadow(&self) -> String {
        match &self.digits {
            Some(d) if !d.is_empty() => d.clone(),
            _ => digits_only(&self.ndc10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ndc::candidate_keys;

    fn fixture() -> BackupSource {
        let source = BackupSource::open_in_memory(BackupSchema::default()).unwrap();
        source
            .execute_batch(
                "CREATE TABLE ndc_suggest (
                    labeler_product TEXT,
                    ndc10 TEXT,
                    proprietary_name TEXT,
                    nonproprietary_name TEXT,
                    substance_name TEXT,
                    dosage_form TEXT,
                    route TEXT,
                    dea_schedule TEXT,
                    active_numerator_strength TEXT,
                    active_ingred_unit TEXT
                );
                INSERT INTO ndc_suggest VALUES
                    ('12345-6789', '12345-6789-01', 'Foo', 'bar', 'barium',
                     'TABLET', 'ORAL', NULL, '500', 'mg'),
                    ('456-12', '0456-0012-01', 'FastBackup', 'fastgen', NULL,
                     NULL, NULL, NULL, NULL, NULL);",
            )
            .unwrap();
        source
    }

    #[test]
    fn test_table_exists() {
        let source = fixture();
        assert!(source.table_exists().unwrap());

        let empty = BackupSource::open_in_memory(BackupSchema::default()).unwrap();
        assert!(!empty.table_exists().unwrap());
    }

    #[test]
    fn test_get_maps_common_shape() {
        let source = fixture();
        let key = &candidate_keys("12345678901")[0];
        let record = source.get(key).unwrap().unwrap();

        assert_eq!(record.source, Provenance::Backup);
        assert_eq!(record.key, "12345-6789");
        assert_eq!(record.proprietary_name.as_deref(), Some("Foo"));
        assert_eq!(record.strength.as_deref(), Some("500 mg"));
        // Backup can never populate enrichment fields.
        assert!(record.discontinued.is_none());
        assert!(record.shortage.is_none());
    }

    #[test]
    fn test_get_miss_is_none() {
        let source = fixture();
        let key = &candidate_keys("99999000105")[0];
        assert!(source.get(key).unwrap().is_none());
    }

    #[test]
    fn test_bulk_select_full_columns() {
        let source = fixture();
        let rows = source
            .bulk_select(
                SuggestColumns {
                    substance: true,
                    strength: true,
                },
                100,
            )
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].substance.as_deref(), Some("barium"));
        assert_eq!(rows[0].strength.as_deref(), Some("500 mg"));
        assert_eq!(rows[0].digit_shadow(), "12345678901");
    }

    #[test]
    fn test_bulk_select_missing_column_fails() {
        let source = BackupSource::open_in_memory(BackupSchema::default()).unwrap();
        source
            .execute_batch(
                "CREATE TABLE ndc_suggest (
                    labeler_product TEXT, ndc10 TEXT,
                    proprietary_name TEXT, nonproprietary_name TEXT
                );",
            )
            .unwrap();

        let full = source.bulk_select(
            SuggestColumns {
                substance: true,
                strength: true,
            },
            10,
        );
        assert!(full.is_err());

        let minimal = source.bulk_select(
            SuggestColumns {
                substance: false,
                strength: false,
            },
            10,
        );
        assert!(minimal.is_ok());
    }

    #[test]
    fn test_bulk_select_respects_limit() {
        let source = fixture();
        let rows = source
            .bulk_select(
                SuggestColumns {
                    substance: false,
                    strength: false,
                },
                1,
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
    }
}
