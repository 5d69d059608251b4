//! Statistical primitives used by the profiler and the cleaning engine.
//!
//! - Quantiles use linear interpolation between closest ranks.
//! - Outliers use Tukey fences: below `Q1 - 1.5 * IQR` or above `Q3 + 1.5 * IQR`.
//! - Duplicate detection compares whole rows with missing values equal to
//!   each other and numbers compared by value.

use super::dataset::{Column, Dataset};
use super::types::NumericSummary;
use crate::error::Result;
use polars::prelude::*;

/// Multiplier applied to the interquartile range for outlier fences.
pub const IQR_MULTIPLIER: f64 = 1.5;

const ROW_INDEX: &str = "__sifter_row";

/// Linear-interpolated quantile of the non-missing values.
pub fn quantile(values: &Float64Chunked, q: f64) -> Option<f64> {
    values
        .quantile(q.clamp(0.0, 1.0), QuantileMethod::Linear)
        .ok()
        .flatten()
}

pub fn summarize_numeric(values: &Float64Chunked) -> NumericSummary {
    let count = values.len() - values.null_count();
    NumericSummary {
        count,
        mean: values.mean(),
        // Sample standard deviation is undefined below two values.
        std: if count < 2 { None } else { values.std(1) },
        min: values.min(),
        q1: quantile(values, 0.25),
        median: quantile(values, 0.5),
        q3: quantile(values, 0.75),
        max: values.max(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fences {
    pub lower: f64,
    pub upper: f64,
}

impl Fences {
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }

    /// True where a value falls outside the fences; false where it is missing.
    pub fn outlier_mask(&self, values: &Float64Chunked) -> Result<BooleanChunked> {
        let outside = &values.lt(self.lower) | &values.gt(self.upper);
        Ok(outside.fill_null_with_values(false)?)
    }
}

/// IQR fences for a set of values; `None` when there are no values.
pub fn iqr_fences(values: &Float64Chunked) -> Option<Fences> {
    let q1 = quantile(values, 0.25)?;
    let q3 = quantile(values, 0.75)?;
    let iqr = q3 - q1;
    Some(Fences {
        lower: q1 - IQR_MULTIPLIER * iqr,
        upper: q3 + IQR_MULTIPLIER * iqr,
    })
}

/// Number of non-missing values outside the IQR fences. Zero for
/// non-numeric columns.
pub fn outlier_count(column: &Column) -> usize {
    let Some(values) = column.values() else {
        return 0;
    };
    iqr_fences(values)
        .and_then(|fences| fences.outlier_mask(values).ok())
        .map_or(0, |mask| mask.into_iter().filter(|m| *m == Some(true)).count())
}

/// The dataset with numeric columns as `Float64`, so "1" and "1.0" compare
/// equal, and every other column as text.
fn comparison_frame(dataset: &Dataset) -> Result<DataFrame> {
    let columns = dataset
        .columns()
        .iter()
        .map(|column| match column.values() {
            Some(values) => values.clone().into_series().into_column(),
            None => column.text().clone().into_series().into_column(),
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// Row indices of the first occurrence of every distinct row, in row order.
///
/// # Errors
///
/// Propagates frame errors.
pub fn first_occurrences(dataset: &Dataset) -> Result<IdxCa> {
    let subset = dataset.column_names();
    let kept = comparison_frame(dataset)?
        .with_row_index(ROW_INDEX.into(), None)?
        .unique_stable(Some(subset.as_slice()), UniqueKeepStrategy::First, None)?;
    Ok(kept.column(ROW_INDEX)?.as_materialized_series().idx()?.clone())
}

/// Rows identical to an earlier row.
pub fn duplicate_count(dataset: &Dataset) -> usize {
    first_occurrences(dataset).map_or(0, |kept| dataset.row_count() - kept.len())
}
