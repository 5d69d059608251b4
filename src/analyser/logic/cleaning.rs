//! Row- and cell-level cleaning operations.
//!
//! Every operation maps a dataset to a new dataset plus a log line; an
//! operation with nothing to do still succeeds and says so.
//! A [`CleanRequest`] expands to a [`CleaningPlan`] whose steps always run in
//! the order missing values, outliers, duplicates.

use super::dataset::{Column, Dataset};
use super::profiling;
use crate::error::Result;
use crate::utils::format_number;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningOp {
    DropMissing,
    FillMean,
    FillMedian,
    RemoveOutliers,
    RemoveDuplicates,
}

impl CleaningOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DropMissing => "drop_missing",
            Self::FillMean => "fill_mean",
            Self::FillMedian => "fill_median",
            Self::RemoveOutliers => "remove_outliers",
            Self::RemoveDuplicates => "remove_duplicates",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingMethod {
    #[default]
    Drop,
    FillMean,
    FillMedian,
}

/// Cleaning options as sent by a client. Unknown fields are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanRequest {
    pub handle_missing: bool,
    pub missing_method: MissingMethod,
    pub remove_outliers: bool,
    pub remove_duplicates: bool,
}

impl CleanRequest {
    pub fn plan(&self) -> CleaningPlan {
        let mut ops = Vec::new();
        if self.handle_missing {
            ops.push(match self.missing_method {
                MissingMethod::Drop => CleaningOp::DropMissing,
                MissingMethod::FillMean => CleaningOp::FillMean,
                MissingMethod::FillMedian => CleaningOp::FillMedian,
            });
        }
        if self.remove_outliers {
            ops.push(CleaningOp::RemoveOutliers);
        }
        if self.remove_duplicates {
            ops.push(CleaningOp::RemoveDuplicates);
        }
        CleaningPlan { ops }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CleaningPlan {
    ops: Vec<CleaningOp>,
}

impl CleaningPlan {
    /// Runs every step and appends the resulting shape to the log.
    ///
    /// # Errors
    ///
    /// Propagates frame errors from any step; no partial result is returned.
    pub fn apply(&self, dataset: &Dataset) -> Result<(Dataset, Vec<String>)> {
        let mut current = dataset.clone();
        let mut log = Vec::with_capacity(self.ops.len() + 1);

        if self.ops.is_empty() {
            log.push("No cleaning operations requested".to_owned());
        }
        for &op in &self.ops {
            let (next, line) = apply(&current, op)?;
            tracing::debug!(op = op.as_str(), "{line}");
            log.push(line);
            current = next;
        }

        log.push(format!(
            "Resulting shape: {} rows x {} columns",
            current.row_count(),
            current.column_count()
        ));
        Ok((current, log))
    }
}

/// # Errors
///
/// Propagates frame errors.
pub fn apply(dataset: &Dataset, op: CleaningOp) -> Result<(Dataset, String)> {
    match op {
        CleaningOp::DropMissing => drop_missing(dataset),
        CleaningOp::FillMean => fill_missing(dataset, Statistic::Mean),
        CleaningOp::FillMedian => fill_missing(dataset, Statistic::Median),
        CleaningOp::RemoveOutliers => remove_outliers(dataset),
        CleaningOp::RemoveDuplicates => remove_duplicates(dataset),
    }
}

fn drop_missing(dataset: &Dataset) -> Result<(Dataset, String)> {
    let cleaned = dataset.drop_nulls()?;
    let dropped = dataset.row_count() - cleaned.row_count();
    let line = if dropped == 0 {
        "No rows with missing values; nothing dropped".to_owned()
    } else {
        format!("Dropped {dropped} rows with missing values")
    };
    Ok((cleaned, line))
}

#[derive(Clone, Copy)]
enum Statistic {
    Mean,
    Median,
}

impl Statistic {
    fn label(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
        }
    }

    fn compute(self, values: &Float64Chunked) -> Option<f64> {
        match self {
            Self::Mean => values.mean(),
            Self::Median => values.median(),
        }
    }
}

fn fill_missing(dataset: &Dataset, statistic: Statistic) -> Result<(Dataset, String)> {
    // Fill values come from the input, before any column is touched.
    let mut fills = Vec::new();
    let mut notes = Vec::new();
    for column in dataset.columns() {
        let missing = column.missing_count();
        let Some(values) = column.values().filter(|_| missing > 0) else {
            continue;
        };
        let Some(value) = statistic.compute(values) else {
            notes.push(format!(
                "'{}' has no values to compute a {} from; left unchanged",
                column.name(),
                statistic.label()
            ));
            continue;
        };
        fills.push(col(column.name()).fill_null(lit(format_number(value))));
        notes.push(format!(
            "filled {missing} in '{}' with {} {value:.4}",
            column.name(),
            statistic.label()
        ));
    }

    if notes.is_empty() {
        return Ok((dataset.clone(), "No missing numeric values to fill".to_owned()));
    }
    let filled = if fills.is_empty() {
        dataset.clone()
    } else {
        dataset.with_columns(fills)?
    };

    Ok((
        filled,
        format!(
            "Filled missing numeric values by {}: {}",
            statistic.label(),
            notes.join("; ")
        ),
    ))
}

fn remove_outliers(dataset: &Dataset) -> Result<(Dataset, String)> {
    let mut flagged = BooleanChunked::full("outlier".into(), false, dataset.row_count());
    for values in dataset.columns().iter().filter_map(Column::values) {
        if let Some(fences) = profiling::iqr_fences(values) {
            flagged = &flagged | &fences.outlier_mask(values)?;
        }
    }

    let cleaned = dataset.filter(&!&flagged)?;
    let removed = dataset.row_count() - cleaned.row_count();
    let line = if removed == 0 {
        "No outliers detected by the IQR method".to_owned()
    } else {
        format!("Removed {removed} outlier rows using the IQR method")
    };
    Ok((cleaned, line))
}

fn remove_duplicates(dataset: &Dataset) -> Result<(Dataset, String)> {
    let kept = profiling::first_occurrences(dataset)?;
    let cleaned = dataset.take(&kept)?;
    let removed = dataset.row_count() - cleaned.row_count();
    let line = if removed == 0 {
        "No duplicate rows found".to_owned()
    } else {
        format!("Removed {removed} duplicate rows")
    };
    Ok((cleaned, line))
}
