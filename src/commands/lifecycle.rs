use crate::analyser::lifecycle::{AuditEntry, Mutation, MutationOutcome, VersionSummary};
use crate::analyser::logic::{CleanRequest, TransformRequest};
use crate::error::Result;
use serde::Serialize;

use super::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shape {
    pub rows: usize,
    pub columns: usize,
}

/// Response to a committed cleaning or transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationResponse {
    pub message: String,
    pub version: u64,
    pub previous_version: u64,
    pub operations: Vec<String>,
    pub new_shape: Shape,
}

impl MutationResponse {
    fn new(message: &str, outcome: MutationOutcome) -> Self {
        Self {
            message: message.to_owned(),
            version: outcome.version,
            previous_version: outcome.previous_version,
            operations: outcome.log,
            new_shape: Shape {
                rows: outcome.rows,
                columns: outcome.columns,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    /// The version requests currently run against, if any.
    pub current: Option<VersionSummary>,
    pub entries: Vec<AuditEntry>,
}

/// # Errors
///
/// State error when nothing has been uploaded.
pub async fn clean(state: &AppState, request: CleanRequest) -> Result<MutationResponse> {
    tracing::info!(?request, "clean command called");
    let outcome = state.store.mutate(Mutation::Clean(request)).await?;
    Ok(MutationResponse::new("Data cleaning completed", outcome))
}

/// # Errors
///
/// State error without a dataset, validation error for an unknown log column.
pub async fn transform(state: &AppState, request: TransformRequest) -> Result<MutationResponse> {
    tracing::info!(?request, "transform command called");
    let outcome = state.store.mutate(Mutation::Transform(request)).await?;
    Ok(MutationResponse::new("Data transformation completed", outcome))
}

/// # Errors
///
/// Fails only if a session lock was poisoned.
pub fn history(state: &AppState) -> Result<HistoryResponse> {
    let current = state.store.try_current()?.map(|version| version.summary());
    Ok(HistoryResponse {
        current,
        entries: state.store.history()?,
    })
}
