//! Numeric column transformations.
//!
//! Steps run in a fixed order: standardize, normalize, log. Missing cells
//! stay missing and non-numeric columns are never touched.

use super::dataset::{Column, Dataset, text_series};
use crate::error::{Result, SifterError};
use crate::utils::format_number;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformRequest {
    /// Z-score every numeric column (population standard deviation).
    pub standardize: bool,
    /// Min-max scale every numeric column onto `[0, 1]`.
    pub normalize: bool,
    /// Apply `ln(1 + max(x, 0))` to `log_columns`.
    pub log_transform: bool,
    pub log_columns: Vec<String>,
}

impl TransformRequest {
    /// # Errors
    ///
    /// Returns a validation error when a log column does not exist.
    pub fn validate(&self, dataset: &Dataset) -> Result<()> {
        if !self.log_transform {
            return Ok(());
        }
        match self.log_columns.iter().find(|name| dataset.column(name).is_none()) {
            Some(unknown) => Err(SifterError::Validation(format!(
                "Unknown column '{unknown}' in log_columns"
            ))),
            None => Ok(()),
        }
    }

    /// # Errors
    ///
    /// Propagates frame errors; no partial result is returned.
    pub fn apply(&self, dataset: &Dataset) -> Result<(Dataset, Vec<String>)> {
        let mut current = dataset.clone();
        let mut log = Vec::new();

        if self.standardize {
            let (next, count) = map_numeric_columns(&current, |_| true, standardize)?;
            log.push(format!("Standardized {count} numeric columns"));
            current = next;
        }
        if self.normalize {
            let (next, count) = map_numeric_columns(&current, |_| true, normalize)?;
            log.push(format!("Normalized {count} numeric columns to [0, 1]"));
            current = next;
        }
        if self.log_transform {
            for name in &self.log_columns {
                if current.column(name).is_some_and(Column::is_numeric) {
                    let (next, _) =
                        map_numeric_columns(&current, |c| c.name() == name.as_str(), log1p)?;
                    log.push(format!("Applied log transform to '{name}'"));
                    current = next;
                } else {
                    log.push(format!("Skipped log transform of non-numeric column '{name}'"));
                }
            }
        }
        if log.is_empty() {
            log.push("No transformations requested".to_owned());
        }

        log.push(format!(
            "Resulting shape: {} rows x {} columns",
            current.row_count(),
            current.column_count()
        ));
        Ok((current, log))
    }
}

fn map_numeric_columns(
    dataset: &Dataset,
    select: impl Fn(&Column) -> bool,
    transform: fn(&Float64Chunked) -> Box<dyn Fn(f64) -> f64>,
) -> Result<(Dataset, usize)> {
    let mut current = dataset.clone();
    let mut count = 0;
    for column in dataset.columns() {
        let Some(values) = column.values().filter(|_| select(column)) else {
            continue;
        };
        let f = transform(values);
        let cells: Vec<Option<String>> = values
            .into_iter()
            .map(|value| value.map(|v| format_number(f(v))))
            .collect();
        let series = text_series(column.name(), cells.iter().map(Option::as_deref));
        current = current.with_column(series)?;
        count += 1;
    }
    Ok((current, count))
}

fn standardize(values: &Float64Chunked) -> Box<dyn Fn(f64) -> f64> {
    // Population standard deviation.
    let mean = values.mean().unwrap_or(0.0);
    let std = values.std(0).unwrap_or(0.0);
    if std > 0.0 {
        Box::new(move |v| (v - mean) / std)
    } else {
        Box::new(|_| 0.0)
    }
}

fn normalize(values: &Float64Chunked) -> Box<dyn Fn(f64) -> f64> {
    let (Some(min), Some(max)) = (values.min(), values.max()) else {
        return Box::new(|_| 0.0);
    };
    let range = max - min;
    if range > 0.0 && range.is_finite() {
        Box::new(move |v| (v - min) / range)
    } else {
        Box::new(|_| 0.0)
    }
}

fn log1p(_: &Float64Chunked) -> Box<dyn Fn(f64) -> f64> {
    Box::new(|v| v.max(0.0).ln_1p())
}
