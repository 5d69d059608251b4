use crate::error::{Result, ResultExt as _};
use crate::export::{ExportArtifact, ExportFormat, export_version};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::AppState;
use super::system::run_on_worker_thread;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportParams {
    pub format: ExportFormat,
    /// Write the file here instead of returning its content inline.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Export metadata; the bytes are either written to `path` or returned
/// base64-encoded in `content_base64`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportResponse {
    pub version: u64,
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_base64: Option<String>,
}

/// Renders the current version without modifying the session.
///
/// # Errors
///
/// State error without a dataset, export error if rendering fails, I/O
/// error if the output file cannot be written.
pub async fn render(state: &AppState, format: ExportFormat) -> Result<(u64, ExportArtifact)> {
    let version = state.store.current()?;
    let id = version.id;
    let artifact = run_on_worker_thread("export", move || export_version(&version, format)).await?;
    Ok((id, artifact))
}

/// # Errors
///
/// See [`render`].
pub async fn export(state: &AppState, params: ExportParams) -> Result<ExportResponse> {
    let (version, artifact) = render(state, params.format).await?;

    let content_base64 = match &params.path {
        Some(path) => {
            std::fs::write(path, &artifact.bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Export written");
            None
        }
        None => Some(STANDARD.encode(&artifact.bytes)),
    };

    Ok(ExportResponse {
        version,
        file_name: artifact.file_name.to_owned(),
        content_type: artifact.content_type.to_owned(),
        size: artifact.bytes.len(),
        path: params.path,
        content_base64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::OfflineNarrator;
    use crate::commands::analysis::{UploadParams, upload};
    use crate::config::AppConfig;

    async fn loaded() -> AppState {
        let state = AppState::with_narrator(AppConfig::default(), Box::new(OfflineNarrator));
        let params = UploadParams {
            content: Some("a,b\n1,x\n2,y\n".to_owned()),
            path: None,
        };
        upload(&state, params).await.unwrap();
        state
    }

    #[tokio::test]
    async fn test_inline_csv_export() {
        let state = loaded().await;
        let params = ExportParams {
            format: ExportFormat::Csv,
            path: None,
        };
        let response = export(&state, params).await.unwrap();

        assert_eq!(response.file_name, "data_export.csv");
        let bytes = STANDARD.decode(response.content_base64.unwrap()).unwrap();
        assert_eq!(bytes, b"a,b\n1,x\n2,y\n");
    }

    #[tokio::test]
    async fn test_export_to_path() {
        let state = loaded().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        let params = ExportParams {
            format: ExportFormat::Pdf,
            path: Some(path.clone()),
        };
        let response = export(&state, params).await.unwrap();

        assert!(response.content_base64.is_none());
        let written = std::fs::read(path).unwrap();
        assert_eq!(written.len(), response.size);
        assert!(written.starts_with(b"%PDF"));
    }
}
