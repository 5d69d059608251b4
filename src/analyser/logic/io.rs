use super::dataset::{Dataset, text_series};
use crate::error::{Result, SifterError};
use polars::prelude::*;
use std::collections::HashSet;
use std::io::Cursor;

/// Parses UTF-8 CSV bytes with a header row into a [`Dataset`].
///
/// Blank header names become `Unnamed: <index>`; repeated names get `.1`,
/// `.2`, ... suffixes. A header with no data rows yields an empty dataset.
///
/// # Errors
///
/// Returns a parse error for non-UTF-8 input, a missing header or rows whose
/// field count differs from the header.
pub fn parse_csv(bytes: &[u8], categorical_ratio: f64) -> Result<Dataset> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        SifterError::Parse(format!(
            "Upload is not valid UTF-8 (invalid byte at offset {})",
            e.valid_up_to()
        ))
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    if text.trim().is_empty() {
        return Err(SifterError::Parse("Upload is empty; a header row is required".to_owned()));
    }

    // The header is read as data so that its names stay untouched, and every
    // column stays text. Empty fields read as "" while fields absent from a
    // short row read as null.
    let raw = CsvReadOptions::default()
        .with_has_header(false)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|options| options.with_missing_is_null(false))
        .into_reader_with_file_handle(Cursor::new(text.as_bytes().to_vec()))
        .finish()
        .map_err(|err| SifterError::Parse(err.to_string()))?;

    if raw.width() == 0 || raw.height() == 0 {
        return Err(SifterError::Parse("Header row has no columns".to_owned()));
    }

    let mut headers = Vec::with_capacity(raw.width());
    let mut series = Vec::with_capacity(raw.width());
    for column in raw.get_columns() {
        let cells = column
            .as_materialized_series()
            .str()
            .map_err(|err| SifterError::Parse(err.to_string()))?;
        if let Some(row) = cells.into_iter().position(|cell| cell.is_none()) {
            return Err(SifterError::Parse(format!(
                "Line {} has fewer fields than the header",
                row + 1
            )));
        }
        headers.push(cells.get(0).unwrap_or_default().to_owned());
        series.push(cells.clone());
    }

    let columns = dedupe_headers(headers.iter().map(String::as_str))
        .into_iter()
        .zip(series)
        .map(|(name, cells)| text_series(&name, cells.into_iter().skip(1)).into_column())
        .collect();
    let frame = DataFrame::new(columns).map_err(|err| SifterError::Parse(err.to_string()))?;
    let dataset = Dataset::from_frame(frame, categorical_ratio)?;

    tracing::debug!(
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        "Parsed CSV upload"
    );
    Ok(dataset)
}

/// Writes the dataset as CSV with a header row. Missing cells are empty fields.
///
/// # Errors
///
/// Returns an export error if the writer fails.
pub fn write_csv(dataset: &Dataset) -> Result<Vec<u8>> {
    let mut frame = dataset.frame().clone();
    let mut bytes = Vec::new();
    CsvWriter::new(&mut bytes)
        .include_header(true)
        .finish(&mut frame)
        .map_err(|e| SifterError::Export(format!("CSV: {e}")))?;
    Ok(bytes)
}

fn dedupe_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let raw: Vec<String> = headers
        .enumerate()
        .map(|(i, h)| {
            let trimmed = h.trim();
            if trimmed.is_empty() {
                format!("Unnamed: {i}")
            } else {
                trimmed.to_owned()
            }
        })
        .collect();

    let mut taken: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(raw.len());
    for name in raw {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while taken.contains(&candidate) {
            candidate = format!("{name}.{suffix}");
            suffix += 1;
        }
        taken.insert(candidate.clone());
        names.push(candidate);
    }
    names
}
