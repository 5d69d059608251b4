//! In-memory tabular dataset backed by a polars [`DataFrame`].
//!
//! The frame holds every column as text so that exports reproduce what was
//! uploaded; nulls are missing cells. Each column carries its inferred
//! [`ColumnKind`] and, for numeric columns, a `Float64` series parsed from
//! the text. Datasets are immutable once built; operations that change data
//! build a new frame, which re-runs inference.

use super::inference::{infer_kind, is_missing_token, parse_boolean, parse_number};
use super::types::ColumnKind;
use crate::error::{Result, SifterError};
use polars::prelude::*;
use serde_json::{Map, Value};

#[derive(Clone, Debug)]
pub struct Column {
    kind: ColumnKind,
    text: StringChunked,
    values: Option<Float64Chunked>,
}

impl Column {
    /// Builds a column from a text series where nulls are missing values.
    pub fn new(text: StringChunked, categorical_ratio: f64) -> Self {
        let kind = infer_kind(&text, categorical_ratio);
        let values = (kind == ColumnKind::Numeric).then(|| {
            Float64Chunked::from_iter_options(
                text.name().clone(),
                text.into_iter().map(|cell| cell.and_then(parse_number)),
            )
        });
        Self { kind, text, values }
    }

    pub fn name(&self) -> &str {
        self.text.name().as_str()
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnKind::Numeric
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Cell text in row order.
    pub fn cells(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.text.into_iter()
    }

    pub fn text(&self) -> &StringChunked {
        &self.text
    }

    /// Parsed values; `None` unless the column is numeric.
    pub fn values(&self) -> Option<&Float64Chunked> {
        self.values.as_ref()
    }

    pub fn cell(&self, row: usize) -> Option<&str> {
        if row < self.len() {
            self.text.get(row)
        } else {
            None
        }
    }

    /// Parsed value of a numeric column's cell; always `None` otherwise.
    pub fn number(&self, row: usize) -> Option<f64> {
        self.values
            .as_ref()
            .filter(|values| row < values.len())
            .and_then(|values| values.get(row))
    }

    /// Non-missing numeric values in row order.
    pub fn present_numbers(&self) -> Vec<f64> {
        self.values
            .iter()
            .flat_map(|values| values.into_iter().flatten())
            .collect()
    }

    pub fn missing_count(&self) -> usize {
        self.text.null_count()
    }

    /// Distinct non-missing cell texts.
    pub fn distinct_count(&self) -> usize {
        let present = self.text.clone().into_series().drop_nulls();
        present.n_unique().unwrap_or(present.len())
    }

    /// JSON rendering of a cell for previews.
    pub fn json_value(&self, row: usize) -> Value {
        let Some(text) = self.cell(row) else {
            return Value::Null;
        };
        match self.kind {
            ColumnKind::Numeric => self
                .number(row)
                .and_then(serde_json::Number::from_f64)
                .map_or_else(|| Value::String(text.to_owned()), Value::Number),
            ColumnKind::Boolean => parse_boolean(text).map_or(Value::Null, Value::Bool),
            ColumnKind::Datetime | ColumnKind::Categorical | ColumnKind::Text => {
                Value::String(text.to_owned())
            }
        }
    }
}

/// Builds a text series, mapping missing-value tokens to nulls.
pub fn text_series<'a>(name: &str, raw: impl Iterator<Item = Option<&'a str>>) -> Series {
    StringChunked::from_iter_options(
        name.into(),
        raw.map(|cell| cell.filter(|text| !is_missing_token(text))),
    )
    .into_series()
}

#[derive(Clone, Debug)]
pub struct Dataset {
    frame: DataFrame,
    columns: Vec<Column>,
    categorical_ratio: f64,
}

impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        self.frame.equals_missing(&other.frame)
    }
}

impl Dataset {
    /// Wraps a frame of text columns, inferring each column's kind.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a column does not hold text.
    pub fn from_frame(frame: DataFrame, categorical_ratio: f64) -> Result<Self> {
        let columns = frame
            .get_columns()
            .iter()
            .map(|column| {
                let text = column.as_materialized_series().str().map_err(|err| {
                    SifterError::Validation(format!(
                        "Column '{}' does not hold text: {err}",
                        column.name()
                    ))
                })?;
                Ok(Column::new(text.clone(), categorical_ratio))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            frame,
            columns,
            categorical_ratio,
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn row_count(&self) -> usize {
        self.frame.height()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_owned()).collect()
    }

    pub fn numeric_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_numeric()).collect()
    }

    pub fn total_cells(&self) -> usize {
        self.row_count() * self.column_count()
    }

    /// Keeps the rows where `mask` is true; null mask entries drop the row.
    ///
    /// # Errors
    ///
    /// Fails if the mask length differs from the row count.
    pub fn filter(&self, mask: &BooleanChunked) -> Result<Self> {
        Self::from_frame(self.frame.filter(mask)?, self.categorical_ratio)
    }

    /// Keeps the given rows, in the given order.
    ///
    /// # Errors
    ///
    /// Fails if an index is out of bounds.
    pub fn take(&self, rows: &IdxCa) -> Result<Self> {
        Self::from_frame(self.frame.take(rows)?, self.categorical_ratio)
    }

    /// Drops every row with a missing cell in any column.
    ///
    /// # Errors
    ///
    /// Propagates frame errors.
    pub fn drop_nulls(&self) -> Result<Self> {
        Self::from_frame(self.frame.drop_nulls::<String>(None)?, self.categorical_ratio)
    }

    /// Applies text expressions to the frame and re-infers every column.
    ///
    /// # Errors
    ///
    /// Propagates errors from evaluating the expressions.
    pub fn with_columns(&self, exprs: Vec<Expr>) -> Result<Self> {
        let frame = self.frame.clone().lazy().with_columns(exprs).collect()?;
        Self::from_frame(frame, self.categorical_ratio)
    }

    /// Replaces one column with a text series of the same name and length.
    ///
    /// # Errors
    ///
    /// Fails if the series length differs from the row count.
    pub fn with_column(&self, series: Series) -> Result<Self> {
        let mut frame = self.frame.clone();
        frame.with_column(series)?;
        Self::from_frame(frame, self.categorical_ratio)
    }

    /// JSON objects for the first `limit` of the given rows.
    pub fn rows_as_json(
        &self,
        rows: impl IntoIterator<Item = usize>,
        limit: usize,
    ) -> Vec<Map<String, Value>> {
        rows.into_iter()
            .take(limit)
            .map(|row| {
                self.columns
                    .iter()
                    .map(|column| (column.name().to_owned(), column.json_value(row)))
                    .collect()
            })
            .collect()
    }

    /// Bytes of cell text held by the dataset.
    pub fn memory_usage(&self) -> usize {
        self.columns
            .iter()
            .flat_map(Column::cells)
            .flatten()
            .map(str::len)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ds() -> Dataset {
        let frame = df!(
            "id" => &["1", "2", "3"],
            "flag" => &[Some("yes"), None, Some("no")],
        )
        .unwrap();
        Dataset::from_frame(frame, 0.5).unwrap()
    }

    #[test]
    fn test_shape_and_kinds() {
        let dataset = ds();
        assert_eq!(dataset.shape(), (3, 2));
        assert_eq!(dataset.column("id").unwrap().kind(), ColumnKind::Numeric);
        assert_eq!(dataset.column("flag").unwrap().kind(), ColumnKind::Boolean);
        assert_eq!(dataset.column("flag").unwrap().missing_count(), 1);
    }

    #[test]
    fn test_non_text_frame_rejected() {
        let frame = df!("n" => &[1_i64, 2]).unwrap();
        let result = Dataset::from_frame(frame, 0.5);
        assert!(matches!(result, Err(SifterError::Validation(_))));
    }

    #[test]
    fn test_text_series_maps_missing_tokens() {
        let series = text_series("a", [Some("1"), Some(" NA "), None, Some("x")].into_iter());
        assert_eq!(series.null_count(), 2);
        assert_eq!(series.name().as_str(), "a");
    }

    #[test]
    fn test_filter_reinfers() {
        let frame = df!("mixed" => &["x", "1", "2"]).unwrap();
        let dataset = Dataset::from_frame(frame, 0.5).unwrap();
        assert_eq!(dataset.columns()[0].kind(), ColumnKind::Text);

        let mask = BooleanChunked::from_slice("keep".into(), &[false, true, true]);
        let numeric_only = dataset.filter(&mask).unwrap();
        assert_eq!(numeric_only.columns()[0].kind(), ColumnKind::Numeric);
        assert_eq!(numeric_only.columns()[0].present_numbers(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_drop_nulls_removes_incomplete_rows() {
        let cleaned = ds().drop_nulls().unwrap();
        assert_eq!(cleaned.shape(), (2, 2));
        assert_eq!(cleaned.column("id").unwrap().present_numbers(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_rows_as_json() {
        let rows = ds().rows_as_json(0..3, 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], serde_json::json!(1.0));
        assert_eq!(rows[0]["flag"], Value::Bool(true));
        assert_eq!(rows[1]["flag"], Value::Null);
    }

    #[test]
    fn test_out_of_range_cells_are_missing() {
        let dataset = ds();
        let id = dataset.column("id").unwrap();
        assert_eq!(id.cell(3), None);
        assert_eq!(id.number(3), None);
    }

    #[test]
    fn test_memory_usage_counts_text_bytes() {
        // "1","2","3","yes","no"
        assert_eq!(ds().memory_usage(), 8);
    }
}
