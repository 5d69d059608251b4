//! Version records for the session store

use crate::analyser::logic::{Dataset, Stats, profile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What produced a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionOrigin {
    Upload,
    Clean,
    Transform,
}

/// An immutable, fully-profiled dataset version.
///
/// Versions are shared behind `Arc` and never modified after construction,
/// so readers holding one always see a consistent dataset and profile.
#[derive(Debug, Clone)]
pub struct DatasetVersion {
    pub id: u64,
    /// The version this one was derived from; `None` for uploads.
    pub parent_id: Option<u64>,
    pub origin: VersionOrigin,
    pub dataset: Dataset,
    pub stats: Stats,
    /// Operation log lines that produced this version.
    pub log: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl DatasetVersion {
    /// Builds a version, profiling the dataset.
    pub fn new(
        id: u64,
        parent_id: Option<u64>,
        origin: VersionOrigin,
        dataset: Dataset,
        log: Vec<String>,
    ) -> Self {
        let stats = profile(&dataset);
        Self {
            id,
            parent_id,
            origin,
            dataset,
            stats,
            log,
            created_at: Utc::now(),
        }
    }

    pub fn summary(&self) -> VersionSummary {
        VersionSummary {
            id: self.id,
            parent_id: self.parent_id,
            origin: self.origin,
            rows: self.dataset.row_count(),
            columns: self.dataset.column_count(),
            quality_score: self.stats.quality_score,
            created_at: self.created_at,
        }
    }
}

/// Serializable view of a version without its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionSummary {
    pub id: u64,
    pub parent_id: Option<u64>,
    pub origin: VersionOrigin,
    pub rows: usize,
    pub columns: usize,
    pub quality_score: f64,
    pub created_at: DateTime<Utc>,
}
