//! Column type inference from raw cell text.
//!
//! Rules are tried in order and the first that holds for every non-missing
//! cell wins: numeric, boolean, datetime. Otherwise the column is categorical
//! when its distinct/non-missing ratio is below the configured threshold, and
//! text when it is not. A column with no values at all is numeric.

use super::types::ColumnKind;
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::StringChunked;
use std::collections::HashSet;

pub const DEFAULT_CATEGORICAL_RATIO: f64 = 0.5;

/// Cell text treated as a missing value, compared after trimming.
pub const MISSING_TOKENS: [&str; 8] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

pub fn is_missing_token(raw: &str) -> bool {
    MISSING_TOKENS.contains(&raw.trim())
}

/// Parses a finite or infinite number. `NaN` spellings are not numbers.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

pub fn parse_boolean(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return date.and_hms_opt(0, 0, 0);
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
}

/// Infers the kind of a column from its non-missing cells.
pub fn infer_kind(cells: &StringChunked, categorical_ratio: f64) -> ColumnKind {
    let present: Vec<&str> = cells.into_iter().flatten().collect();

    if present.iter().all(|s| parse_number(s).is_some()) {
        return ColumnKind::Numeric;
    }
    if present.iter().all(|s| parse_boolean(s).is_some()) {
        return ColumnKind::Boolean;
    }
    if present.iter().all(|s| parse_datetime(s).is_some()) {
        return ColumnKind::Datetime;
    }

    let distinct: HashSet<&str> = present.iter().copied().collect();
    let ratio = distinct.len() as f64 / present.len() as f64;
    if ratio < categorical_ratio {
        ColumnKind::Categorical
    } else {
        ColumnKind::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::NewChunkedArray as _;

    fn cells(values: &[&str]) -> StringChunked {
        StringChunked::from_iter_options(
            "cells".into(),
            values.iter().map(|v| (!is_missing_token(v)).then_some(*v)),
        )
    }

    #[test]
    fn test_numeric_with_missing_tokens() {
        let column = cells(&["1", "NA", "2.5", "", "-3e2", "null"]);
        assert_eq!(infer_kind(&column, DEFAULT_CATEGORICAL_RATIO), ColumnKind::Numeric);
    }

    #[test]
    fn test_all_missing_is_numeric() {
        let column = cells(&["", "NA", "None"]);
        assert_eq!(infer_kind(&column, DEFAULT_CATEGORICAL_RATIO), ColumnKind::Numeric);
    }

    #[test]
    fn test_boolean_tokens_case_insensitive() {
        let column = cells(&["Yes", "no", "TRUE", "false"]);
        assert_eq!(infer_kind(&column, DEFAULT_CATEGORICAL_RATIO), ColumnKind::Boolean);
    }

    #[test]
    fn test_numeric_takes_precedence_over_boolean() {
        // 0/1 are numbers, not booleans
        let column = cells(&["0", "1", "1"]);
        assert_eq!(infer_kind(&column, DEFAULT_CATEGORICAL_RATIO), ColumnKind::Numeric);
    }

    #[test]
    fn test_datetime_formats() {
        let column = cells(&["2024-01-02", "2024-01-03 10:00:00", "2024-02-01T08:30:00"]);
        assert_eq!(infer_kind(&column, DEFAULT_CATEGORICAL_RATIO), ColumnKind::Datetime);
        assert!(parse_datetime("2024-13-01").is_none());
    }

    #[test]
    fn test_categorical_threshold() {
        let repeated = cells(&["a", "b", "a", "b", "a"]);
        assert_eq!(infer_kind(&repeated, 0.5), ColumnKind::Categorical);

        // 2 distinct of 4 is exactly 0.5, which is not below the threshold
        let half = cells(&["a", "b", "a", "b"]);
        assert_eq!(infer_kind(&half, 0.5), ColumnKind::Text);
    }

    #[test]
    fn test_nan_spellings_are_not_numbers() {
        assert!(parse_number("NaN").is_none());
        assert!(parse_number("-nan").is_none());
        assert_eq!(parse_number(" 4 "), Some(4.0));
    }
}
