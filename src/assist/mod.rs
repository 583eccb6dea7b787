//! Assisted lookup for ndcserve
//!
//! Resolves a lookup key with bounded worst-case latency by racing a
//! caller-supplied primary lookup against a deadline timer. When the
//! timer wins (or the primary settles empty), the backup source answers
//! instead. When the backup also has nothing after a timeout, the
//! resolver waits out the primary with no further deadline, so a
//! slow-but-successful primary answer is never silently lost.
//!
//! The deadline is not a cancellation: the primary's underlying query is
//! never aborted, only no longer waited on.
//!
//! # API
//!
//! - `resolve(key, primary, fallback)` - Race one key
//! - `resolve_raw(raw, primary, fallback)` - Derive candidates, try each

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

use crate::ndc::{candidate_keys, LookupKey};
use crate::record::DrugRecord;
use crate::source::{BackupSource, SourceResult};

/// Default deadline before the backup source is consulted.
pub const DEFAULT_DEADLINE_MS: u64 = 200;

/// Fast synchronous fallback lookup seam.
///
/// Failures are swallowed at the call site; a failing fallback behaves
/// like one with no matching record.
pub trait FallbackLookup: Send + Sync {
    /// Look up a single key.
    fn get(&self, key: &LookupKey) -> SourceResult<Option<DrugRecord>>;
}

impl FallbackLookup for BackupSource {
    fn get(&self, key: &LookupKey) -> SourceResult<Option<DrugRecord>> {
        BackupSource::get(self, key)
    }
}

/// Outcome of one assisted resolution, in fixed preference order:
/// fast-primary > backup > late-primary > not-found. Exactly one of
/// these is ever produced per call.
#[derive(Debug)]
pub enum Resolution {
    /// Primary answered non-empty before the deadline
    Primary(DrugRecord),
    /// Deadline fired (or primary settled empty) and backup had a record
    Backup(DrugRecord),
    /// Backup had nothing; the primary eventually answered after the deadline
    LatePrimary(DrugRecord),
    /// No source produced a record
    NotFound,
}

impl Resolution {
    /// The resolved record, if any source answered.
    pub fn into_record(self) -> Option<DrugRecord> {
        match self {
            Resolution::Primary(r) | Resolution::Backup(r) | Resolution::LatePrimary(r) => Some(r),
            Resolution::NotFound => None,
        }
    }

    /// Whether any source answered.
    pub fn is_found(&self) -> bool {
        !matches!(self, Resolution::NotFound)
    }
}

/// Races a primary lookup against a deadline with a backup fallback.
#[derive(Debug, Clone, Copy)]
pub struct AssistedResolver {
    deadline: Duration,
}

impl Default for AssistedResolver {
    fn default() -> Self {
        Self::new(DEFAULT_DEADLINE_MS)
    }
}

impl AssistedResolver {
    /// Create a resolver with the given deadline in milliseconds.
    pub fn new(deadline_ms: u64) -> Self {
        Self {
            deadline: Duration::from_millis(deadline_ms),
        }
    }

    /// The configured deadline.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Resolve a single key.
    ///
    /// The primary future is spawned immediately and keeps running even
    /// if the deadline fires. A primary failure resolves like an empty
    /// primary; a fallback failure resolves like a fallback miss. This
    /// method never errors.
    pub async fn resolve<F, Fut>(
        &self,
        key: &LookupKey,
        primary: F,
        fallback: Option<&dyn FallbackLookup>,
    ) -> Resolution
    where
        F: FnOnce(LookupKey) -> Fut,
        Fut: Future<Output = SourceResult<Option<DrugRecord>>> + Send + 'static,
    {
        let mut task = tokio::spawn(primary(key.clone()));

        match timeout(self.deadline, &mut task).await {
            // Primary settled within the deadline.
            Ok(joined) => match settle(joined) {
                Some(record) => Resolution::Primary(record),
                // Empty or failed primary: the backup is all that is
                // left, the late path cannot add anything.
                None => match fallback_get(fallback, key) {
                    Some(record) => Resolution::Backup(record),
                    None => Resolution::NotFound,
                },
            },
            // Deadline fired first.
            Err(_) => {
                if let Some(record) = fallback_get(fallback, key) {
                    return Resolution::Backup(record);
                }
                // Backup had nothing: wait out the primary, no further
                // deadline.
                match settle(task.await) {
                    Some(record) => Resolution::LatePrimary(record),
                    None => Resolution::NotFound,
                }
            }
        }
    }

    /// Resolve a raw drug-code string by deriving candidate keys and
    /// trying each in order until one source hits.
    ///
    /// A raw string that derives no candidates resolves to `NotFound`.
    pub async fn resolve_raw<F, Fut>(
        &self,
        raw: &str,
        primary: &F,
        fallback: Option<&dyn FallbackLookup>,
    ) -> Resolution
    where
        F: Fn(LookupKey) -> Fut,
        Fut: Future<Output = SourceResult<Option<DrugRecord>>> + Send + 'static,
    {
        for key in candidate_keys(raw) {
            let resolution = self.resolve(&key, |k| primary(k), fallback).await;
            if resolution.is_found() {
                return resolution;
            }
        }
        Resolution::NotFound
    }
}

/// Collapse a joined primary outcome to its record. Task panics, source
/// errors and empty results are all "no result".
fn settle(joined: Result<SourceResult<Option<DrugRecord>>, tokio::task::JoinError>) -> Option<DrugRecord> {
    match joined {
        Ok(Ok(record)) => record,
        _ => None,
    }
}

fn fallback_get(fallback: Option<&dyn FallbackLookup>, key: &LookupKey) -> Option<DrugRecord> {
    fallback.and_then(|f| f.get(key).ok().flatten())
}
