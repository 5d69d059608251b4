//! Rendering of dataset versions into downloadable files.
//!
//! Exports are read-only and deterministic: the same version always renders
//! to the same bytes. Nothing time-dependent is written into any format.

pub mod excel;
pub mod pdf;

use crate::analyser::lifecycle::DatasetVersion;
use crate::analyser::logic::{Dataset, Stats, write_csv};
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    Csv,
    Excel,
    Pdf,
    PdfEnhanced,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "excel",
            Self::Pdf => "pdf",
            Self::PdfEnhanced => "pdf-enhanced",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Csv => "data_export.csv",
            Self::Excel => "data_analysis.xlsx",
            Self::Pdf => "data_analysis_report.pdf",
            Self::PdfEnhanced => "enhanced_data_report.pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Pdf | Self::PdfEnhanced => "application/pdf",
        }
    }
}

/// A rendered export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Renders a dataset and its profile in the requested format.
///
/// # Errors
///
/// Returns an export error if the format's writer fails.
pub fn render(
    dataset: &Dataset,
    stats: &Stats,
    version: u64,
    format: ExportFormat,
) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Csv => write_csv(dataset),
        ExportFormat::Excel => excel::render_workbook(dataset, stats),
        ExportFormat::Pdf => pdf::render_basic_report(dataset, stats, version),
        ExportFormat::PdfEnhanced => pdf::render_enhanced_report(dataset, stats, version),
    }
}

/// # Errors
///
/// See [`render`].
pub fn export_version(version: &DatasetVersion, format: ExportFormat) -> Result<ExportArtifact> {
    let bytes = render(&version.dataset, &version.stats, version.id, format)?;
    tracing::info!(
        version = version.id,
        format = format.as_str(),
        bytes = bytes.len(),
        "Rendered export"
    );
    Ok(ExportArtifact {
        format,
        file_name: format.file_name(),
        content_type: format.content_type(),
        bytes,
    })
}
