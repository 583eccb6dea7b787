//! Primary SQLite source
//!
//! The primary file is the richer source: it carries the enrichment
//! fields (discontinuation, shortage, refrigeration, institutional code)
//! the backup view cannot populate. Its latency is not trusted, which is
//! the whole reason the assisted resolver exists, so lookups run on the
//! blocking pool and surface as futures the resolver can race against a
//! deadline.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, OpenFlags};

use crate::ndc::LookupKey;
use crate::record::{strength_display, DrugRecord, Provenance};

use super::errors::{SourceError, SourceResult};
use super::{named_bool, named_text};

/// Read-only handle on the primary SQLite file.
pub struct PrimarySource {
    conn: Arc<Mutex<Connection>>,
    table: String,
}

impl PrimarySource {
    /// Open the primary file read-only.
    pub fn open(path: &Path, table: impl Into<String>) -> SourceResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| SourceError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            table: table.into(),
        })
    }

    /// Open an in-memory primary (tests and fixtures).
    pub fn open_in_memory(table: impl Into<String>) -> SourceResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| SourceError::Open {
            path: ":memory:".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            table: table.into(),
        })
    }

    /// Run arbitrary DDL/DML against the handle (fixture setup only).
    pub fn execute_batch(&self, sql: &str) -> SourceResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(sql)?;
        Ok(())
    }

    /// Asynchronous single-key lookup on the blocking pool.
    ///
    /// The underlying query is never aborted by the resolver's deadline;
    /// a late result is still consumed on the late-primary path.
    pub async fn get(&self, key: &LookupKey) -> SourceResult<Option<DrugRecord>> {
        let conn = Arc::clone(&self.conn);
        let table = self.table.clone();
        let key = key.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();
            fetch(&conn, &table, &key)
        })
        .await
        .map_err(|e| SourceError::Task(e.to_string()))?
    }
}

fn fetch(conn: &Connection, table: &str, key: &LookupKey) -> SourceResult<Option<DrugRecord>> {
    let sql = format!("SELECT * FROM {} WHERE labeler_product = ?1 LIMIT 1", table);
    let mut stmt = conn.prepare(&sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

    let result = stmt.query_row(params![key.to_string()], |row| {
        let mut record = DrugRecord::new(key.to_string(), Provenance::Primary);
        record.ndc10 = named_text(row, &columns, "ndc10");
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
        record.discontinued = named_bool(row, &columns, "discontinued");
        record.shortage = named_bool(row, &columns, "shortage");
        record.refrigerated = named_bool(row, &columns, "refrigerated");
        record.institutional_code = named_text(row, &columns, "institutional_code");
        Ok(record)
    });

    match result {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ndc::candidate_keys;

    fn fixture() -> PrimarySource {
        let source = PrimarySource::open_in_memory("ndc_products").unwrap();
        source
            .execute_batch(
                "CREATE TABLE ndc_products (
                    labeler_product TEXT,
                    ndc10 TEXT,
                    proprietary_name TEXT,
                    nonproprietary_name TEXT,
                    substance_name TEXT,
                    active_numerator_strength TEXT,
                    active_ingred_unit TEXT,
                    discontinued INTEGER,
                    shortage INTEGER,
                    refrigerated INTEGER,
                    institutional_code TEXT
                );
                INSERT INTO ndc_products VALUES
                    ('12345-6789', '12345-6789-01', 'Foo', 'bar', 'barium',
                     '500', 'mg', 0, 1, NULL, 'INST-9');",
            )
            .unwrap();
        source
    }

    #[tokio::test]
    async fn test_get_includes_enrichment_fields() {
        let source = fixture();
        let key = &candidate_keys("12345678901")[0];
        let record = source.get(key).await.unwrap().unwrap();

        assert_eq!(record.source, Provenance::Primary);
        assert_eq!(record.discontinued, Some(false));
        assert_eq!(record.shortage, Some(true));
        assert_eq!(record.refrigerated, None);
        assert_eq!(record.institutional_code.as_deref(), Some("INST-9"));
        assert_eq!(record.strength.as_deref(), Some("500 mg"));
    }

    #[tokio::test]
    async fn test_get_miss_is_none() {
        let source = fixture();
        let key = &candidate_keys("99999000105")[0];
        assert!(source.get(key).await.unwrap().is_none());
    }
}
