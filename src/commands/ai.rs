use crate::ai::client::dataset_context;
use crate::error::Result;
use serde::{Deserialize, Serialize};

use super::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryParams {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsightResponse {
    pub insight: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResponse {
    pub result: String,
}

/// Narrative insights for the current profile. Narrator failures are
/// reported inside the response text rather than as errors.
///
/// # Errors
///
/// State error when nothing has been uploaded.
pub async fn insights(state: &AppState) -> Result<InsightResponse> {
    let version = state.store.current()?;
    let insight = match state.narrator.narrate(&version.stats).await {
        Ok(text) => text,
        Err(e) => {
            tracing::error!("AI insight generation failed: {e:#}");
            format!("Error generating insights: {e}")
        }
    };
    Ok(InsightResponse { insight })
}

/// Answers a free-form question about the current dataset.
///
/// # Errors
///
/// State error when nothing has been uploaded.
pub async fn natural_query(state: &AppState, params: QueryParams) -> Result<QueryResponse> {
    let version = state.store.current()?;
    let context = dataset_context(&version.dataset);
    let result = match state.narrator.answer(&params.query, &context).await {
        Ok(text) => text,
        Err(e) => {
            tracing::error!("AI query failed: {e:#}");
            format!("Error processing query: {e}")
        }
    };
    Ok(QueryResponse { result })
}
