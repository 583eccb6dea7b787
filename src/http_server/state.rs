//! Shared service state
//!
//! Owns the process-wide singletons: the two source handles, the
//! suggestion index, the resolver and the metrics registry. The backup
//! handle sits behind a lock because an administrative reload replaces
//! it wholesale; everything else is opened once at boot.

use std::sync::{Arc, RwLock};

use crate::assist::AssistedResolver;
use crate::config::ServiceConfig;
use crate::observability::{Logger, ServiceMetrics};
use crate::source::{BackupSource, PrimarySource};
use crate::suggest::SuggestIndex;

/// State shared by all lookup/suggest/health/admin handlers
pub struct LookupState {
    pub config: ServiceConfig,
    pub resolver: AssistedResolver,
    pub primary: Option<Arc<PrimarySource>>,
    backup: RwLock<Option<Arc<BackupSource>>>,
    pub index: Arc<SuggestIndex>,
    pub metrics: Arc<ServiceMetrics>,
}

impl LookupState {
    /// Open sources per the config and build the initial index.
    ///
    /// A source that fails to open degrades the service rather than
    /// failing the boot: no primary means backup-only resolution, no
    /// backup means primary-only resolution and an empty index.
    pub fn from_config(config: ServiceConfig) -> Self {
        let metrics = Arc::new(ServiceMetrics::new());
        let index = Arc::new(SuggestIndex::new());

        let primary = config.primary_path.as_ref().and_then(|path| {
            match PrimarySource::open(path, config.primary_table.clone()) {
                Ok(source) => {
                    Logger::info("PRIMARY_OPENED", &[("path", &path.display().to_string())]);
                    Some(Arc::new(source))
                }
                Err(e) => {
                    Logger::warn("PRIMARY_OPEN_FAILED", &[("error", &e.to_string())]);
                    None
                }
            }
        });

        let backup = open_backup(&config);
        match &backup {
            Some(source) => {
                index.build(source, &config.suggest_config(), &metrics);
            }
            None => index.clear(&metrics),
        }

        Self {
            resolver: AssistedResolver::new(config.assist_deadline_ms),
            primary,
            backup: RwLock::new(backup),
            index,
            metrics,
            config,
        }
    }

    /// The currently published backup handle.
    pub fn backup(&self) -> Option<Arc<BackupSource>> {
        self.backup.read().unwrap().clone()
    }

    /// Reopen the backup file wholesale and rebuild the suggestion
    /// index from it. The previous index keeps serving until the swap.
    /// Returns the new index size.
    pub fn reload(&self) -> usize {
        let reopened = open_backup(&self.config);
        *self.backup.write().unwrap() = reopened.clone();

        match reopened {
            Some(source) => self
                .index
                .build(&source, &self.config.suggest_config(), &self.metrics),
            None => {
                self.index.clear(&self.metrics);
                0
            }
        }
    }
}

fn open_backup(config: &ServiceConfig) -> Option<Arc<BackupSource>> {
    let path = match &config.backup_path {
        Some(path) => path,
        None => {
            Logger::warn("BACKUP_NOT_CONFIGURED", &[]);
            return None;
        }
    };

    match BackupSource::open(path, config.backup.clone()) {
        Ok(source) => {
            Logger::info("BACKUP_OPENED", &[("path", &path.display().to_string())]);
            Some(Arc::new(source))
        }
        Err(e) => {
            Logger::warn("BACKUP_OPEN_FAILED", &[("error", &e.to_string())]);
            None
        }
    }
}
