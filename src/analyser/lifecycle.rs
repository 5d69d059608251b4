//! Session-scoped dataset lifecycle.
//!
//! A [`SessionStore`] holds at most one current [`DatasetVersion`]. Every
//! change (a new upload, a cleaning request, a transformation) produces a new
//! immutable version that replaces the current one atomically.
//!
//! ## Key Principles
//!
//! - **Immutability**: versions are never modified; readers get an `Arc` to a
//!   fully-profiled version and keep it as long as they need
//! - **Serialized writers**: uploads and mutations queue on one async mutex
//!   and run in arrival order, each observing the previous commit
//! - **All or nothing**: a failed mutation leaves the previous version current
//! - **Monotonic ids**: version ids are never reused, even across uploads
//!
//! ## Example Usage
//!
//! ```no_run
//! use sifter::analyser::lifecycle::{Mutation, SessionStore};
//! use sifter::analyser::logic::CleanRequest;
//! use sifter::config::EngineSettings;
//!
//! # async fn example() -> sifter::error::Result<()> {
//! let store = SessionStore::new(EngineSettings::default());
//! store.load(b"a,b\n1,2\n1,2\n".to_vec()).await?;
//!
//! let request = CleanRequest { remove_duplicates: true, ..CleanRequest::default() };
//! let outcome = store.mutate(Mutation::Clean(request)).await?;
//! assert_eq!(outcome.rows, 1);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod version;

pub use audit::{AuditEntry, AuditLog};
pub use version::{DatasetVersion, VersionOrigin, VersionSummary};

use crate::analyser::logic::{CleanRequest, Dataset, TransformRequest, parse_csv};
use crate::config::EngineSettings;
use crate::error::{Result, SifterError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// A change that derives a new version from the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Clean(CleanRequest),
    Transform(TransformRequest),
}

impl Mutation {
    fn action(&self) -> &'static str {
        match self {
            Self::Clean(_) => "clean",
            Self::Transform(_) => "transform",
        }
    }

    fn origin(&self) -> VersionOrigin {
        match self {
            Self::Clean(_) => VersionOrigin::Clean,
            Self::Transform(_) => VersionOrigin::Transform,
        }
    }

    fn validate(&self, dataset: &Dataset) -> Result<()> {
        match self {
            Self::Clean(_) => Ok(()),
            Self::Transform(request) => request.validate(dataset),
        }
    }

    fn apply(&self, dataset: &Dataset) -> Result<(Dataset, Vec<String>)> {
        match self {
            Self::Clean(request) => request.plan().apply(dataset),
            Self::Transform(request) => request.apply(dataset),
        }
    }
}

/// Result of a committed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationOutcome {
    pub version: u64,
    pub previous_version: u64,
    pub log: Vec<String>,
    pub rows: usize,
    pub columns: usize,
}

pub struct SessionStore {
    current: RwLock<Option<Arc<DatasetVersion>>>,
    /// Serializes uploads and mutations; tokio's mutex is fair (FIFO).
    writer: tokio::sync::Mutex<()>,
    next_id: AtomicU64,
    audit: Mutex<AuditLog>,
    settings: EngineSettings,
}

impl SessionStore {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            current: RwLock::new(None),
            writer: tokio::sync::Mutex::new(()),
            next_id: AtomicU64::new(0),
            audit: Mutex::new(AuditLog::new()),
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// The current version.
    ///
    /// # Errors
    ///
    /// Returns a state error when nothing has been uploaded yet.
    pub fn current(&self) -> Result<Arc<DatasetVersion>> {
        self.try_current()?.ok_or_else(SifterError::no_dataset)
    }

    /// # Errors
    ///
    /// Fails only if the version lock was poisoned.
    pub fn try_current(&self) -> Result<Option<Arc<DatasetVersion>>> {
        let current = self
            .current
            .read()
            .map_err(|e| SifterError::Other(format!("Lock poisoned: {e}")))?;
        Ok(current.clone())
    }

    /// Parses an upload and makes it the current version, discarding the
    /// previous dataset and its lineage.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed CSV; the previous version, if
    /// any, stays current.
    pub async fn load(&self, bytes: Vec<u8>) -> Result<Arc<DatasetVersion>> {
        let _writer = self.writer.lock().await;

        let id = self.next_id.load(Ordering::SeqCst);
        let ratio = self.settings.categorical_ratio;
        let version = tokio::task::spawn_blocking(move || -> Result<DatasetVersion> {
            let dataset = parse_csv(&bytes, ratio)?;
            let log = vec![format!(
                "Loaded {} rows x {} columns",
                dataset.row_count(),
                dataset.column_count()
            )];
            Ok(DatasetVersion::new(id, None, VersionOrigin::Upload, dataset, log))
        })
        .await??;

        let version = Arc::new(version);
        self.commit(Arc::clone(&version))?;
        let shape = format!("{} rows x {} columns", version.stats.rows, version.stats.columns);
        self.record("upload", shape, id);

        tracing::info!(
            version = id,
            rows = version.stats.rows,
            columns = version.stats.columns,
            "Dataset loaded"
        );
        Ok(version)
    }

    /// Applies a mutation to the current version and commits the result as
    /// a new version.
    ///
    /// # Errors
    ///
    /// Returns a state error without a dataset and a validation error for a
    /// malformed mutation. Nothing is committed on error.
    pub async fn mutate(&self, mutation: Mutation) -> Result<MutationOutcome> {
        let _writer = self.writer.lock().await;

        let parent = self.current()?;
        mutation.validate(&parent.dataset)?;

        let id = self.next_id.load(Ordering::SeqCst);
        let action = mutation.action();
        let base = Arc::clone(&parent);
        let version = tokio::task::spawn_blocking(move || -> Result<DatasetVersion> {
            let (dataset, log) = mutation.apply(&base.dataset)?;
            Ok(DatasetVersion::new(id, Some(base.id), mutation.origin(), dataset, log))
        })
        .await??;

        let version = Arc::new(version);
        self.commit(Arc::clone(&version))?;
        self.record(action, version.log.join("; "), id);

        tracing::info!(
            version = id,
            previous = parent.id,
            rows = version.stats.rows,
            columns = version.stats.columns,
            "Committed {action}"
        );

        Ok(MutationOutcome {
            version: id,
            previous_version: parent.id,
            log: version.log.clone(),
            rows: version.stats.rows,
            columns: version.stats.columns,
        })
    }

    /// Audit trail of this session, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the audit lock is poisoned.
    pub fn history(&self) -> Result<Vec<AuditEntry>> {
        let log = self
            .audit
            .lock()
            .map_err(|e| SifterError::Other(format!("Lock poisoned: {e}")))?;
        Ok(log.entries().to_vec())
    }

    fn commit(&self, version: Arc<DatasetVersion>) -> Result<()> {
        let mut current = self
            .current
            .write()
            .map_err(|e| SifterError::Other(format!("Lock poisoned: {e}")))?;
        *current = Some(version);
        self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// The version is already committed, so a poisoned audit lock only
    /// loses the entry.
    fn record(&self, action: &str, details: String, version: u64) {
        match self.audit.lock() {
            Ok(mut log) => log.push(action, details, Some(version)),
            Err(e) => tracing::warn!(action, version, "Audit entry dropped: {e}"),
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_store_has_no_version() {
        let store = SessionStore::default();
        assert!(matches!(store.current(), Err(SifterError::State(_))));
        assert!(store.history().unwrap().is_empty());
    }

    #[test]
    fn test_poisoned_audit_lock_is_reported() {
        let store = Arc::new(SessionStore::default());
        let holder = Arc::clone(&store);
        let crashed = std::thread::spawn(move || {
            let _log = holder.audit.lock();
            panic!("writer crashed while holding the audit log");
        })
        .join();
        assert!(crashed.is_err());

        let err = store.history().unwrap_err();
        assert_eq!(err.kind(), "internal_error");
        assert!(err.message().starts_with("Lock poisoned"));

        // Recording after the poison only drops the entry.
        store.record("upload", "1 rows x 1 columns".to_owned(), 0);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_version() {
        let store = SessionStore::default();
        store.load(b"a\n1\n".to_vec()).await.unwrap();

        let err = store.load(vec![0xff, 0xfe, b'\n']).await.unwrap_err();
        assert_eq!(err.kind(), "parse_error");
        assert_eq!(store.current().unwrap().id, 0);

        let next = store.load(b"b\n2\n".to_vec()).await.unwrap();
        assert_eq!(next.id, 1, "failed loads do not consume ids");
    }
}
