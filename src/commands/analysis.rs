use crate::analyser::logic::charts::overview_charts;
use crate::analyser::logic::filter::evaluate;
use crate::analyser::logic::{
    Chart, FilterRequest, FilterResult, Insight, Stats, Visualization,
    predictive_insights as insights_for, visuals,
};
use crate::error::{Result, ResultExt as _, SifterError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

use super::AppState;
use super::system::run_on_worker_thread;

/// Source of an upload: inline CSV text or a file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadParams {
    pub content: Option<String>,
    pub path: Option<PathBuf>,
}

impl UploadParams {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            content: None,
            path: Some(path.into()),
        }
    }

    fn into_bytes(self) -> Result<Vec<u8>> {
        match (self.content, self.path) {
            (Some(content), None) => Ok(content.into_bytes()),
            (None, Some(path)) => {
                std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))
            }
            _ => Err(SifterError::Validation(
                "Upload needs exactly one of 'content' or 'path'".to_owned(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub version: u64,
    pub stats: Stats,
    pub charts: Vec<Chart>,
    pub sample_data: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightsResponse {
    pub insights: Vec<Insight>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisualizationsResponse {
    pub visualizations: Vec<Visualization>,
}

/// Replaces the session dataset with a new upload.
///
/// # Errors
///
/// Validation error for ambiguous params, I/O error for an unreadable path,
/// parse error for malformed CSV.
pub async fn upload(state: &AppState, params: UploadParams) -> Result<UploadResponse> {
    let bytes = params.into_bytes()?;
    tracing::info!(bytes = bytes.len(), "upload command called");

    let version = state.store.load(bytes).await?;
    let sample_rows = state.store.settings().sample_rows;

    let snapshot = Arc::clone(&version);
    let (charts, sample_data) = run_on_worker_thread("upload_charts", move || {
        let dataset = &snapshot.dataset;
        Ok((
            overview_charts(dataset),
            dataset.rows_as_json(0..dataset.row_count(), sample_rows),
        ))
    })
    .await?;

    Ok(UploadResponse {
        version: version.id,
        stats: version.stats.clone(),
        charts,
        sample_data,
    })
}

/// Profile of the current version.
///
/// # Errors
///
/// State error when nothing has been uploaded.
pub fn profile(state: &AppState) -> Result<Stats> {
    Ok(state.store.current()?.stats.clone())
}

/// Previews the rows matching every rule. The session is not modified.
///
/// # Errors
///
/// State error without a dataset, validation error for unknown columns.
pub async fn filter(state: &AppState, request: FilterRequest) -> Result<FilterResult> {
    let version = state.store.current()?;
    let sample_rows = state.store.settings().sample_rows;
    run_on_worker_thread("filter", move || {
        evaluate(&version.dataset, &request.filters, sample_rows)
    })
    .await
}

/// Correlation and clustering insights for the current version.
///
/// # Errors
///
/// State error when nothing has been uploaded.
pub async fn predictive_insights(state: &AppState) -> Result<InsightsResponse> {
    let version = state.store.current()?;
    let settings = state.store.settings().clone();
    let insights = run_on_worker_thread("predictive_insights", move || {
        Ok(insights_for(&version.dataset, &settings))
    })
    .await?;
    for insight in &insights {
        tracing::debug!("{}", insight.message());
    }
    Ok(InsightsResponse { insights })
}

/// 3D scatter and surface plots for the current version.
///
/// # Errors
///
/// State error when nothing has been uploaded.
pub async fn visualizations(state: &AppState) -> Result<VisualizationsResponse> {
    let version = state.store.current()?;
    let settings = state.store.settings().clone();
    let visualizations = run_on_worker_thread("visualizations", move || {
        Ok(visuals::extract(&version.dataset, &settings))
    })
    .await?;
    Ok(VisualizationsResponse { visualizations })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::OfflineNarrator;
    use crate::analyser::logic::{FilterOperator, FilterRule};
    use crate::config::AppConfig;

    fn state() -> AppState {
        AppState::with_narrator(AppConfig::default(), Box::new(OfflineNarrator))
    }

    fn inline(content: &str) -> UploadParams {
        UploadParams {
            content: Some(content.to_owned()),
            path: None,
        }
    }

    #[tokio::test]
    async fn test_upload_returns_sample_and_charts() {
        let state = state();
        let response = upload(&state, inline("a,b,c\n1,2,x\n2,4,y\n3,7,x\n")).await.unwrap();
        assert_eq!(response.version, 0);
        assert_eq!(response.stats.rows, 3);
        assert_eq!(response.sample_data.len(), 3);
        assert!(response.charts.iter().any(|c| matches!(c, Chart::Heatmap { .. })));
    }

    #[tokio::test]
    async fn test_upload_needs_one_source() {
        let err = upload(&state(), UploadParams::default()).await.unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[tokio::test]
    async fn test_filter_is_a_preview() {
        let state = state();
        upload(&state, inline("a\n1\n5\n9\n")).await.unwrap();
        let request = FilterRequest {
            filters: vec![FilterRule {
                column: "a".to_owned(),
                operator: FilterOperator::GreaterThan,
                value: "4".to_owned(),
            }],
        };
        let result = filter(&state, request).await.unwrap();
        assert_eq!(result.rows, 2);
        assert_eq!(profile(&state).unwrap().rows, 3);
    }

    #[tokio::test]
    async fn test_insights_need_a_dataset() {
        let err = predictive_insights(&state()).await.unwrap_err();
        assert_eq!(err.kind(), "state_error");
    }
}
