//! Read-only row filtering.
//!
//! Rules are compiled against the dataset before any row is visited, so an
//! invalid rule fails the whole request without partial output. Each compiled
//! rule becomes a boolean mask over its column and the masks are ANDed.

use super::dataset::{Column, Dataset};
use super::inference::{parse_boolean, parse_datetime, parse_number};
use super::types::ColumnKind;
use crate::error::{Result, SifterError};
use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    GreaterThan,
    LessThan,
    Contains,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::Contains => "contains",
        }
    }

    /// Parses the wire name or a symbolic shorthand (`=`, `>`, `<`, `~`).
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "equals" | "=" | "==" => Some(Self::Equals),
            "greater_than" | ">" => Some(Self::GreaterThan),
            "less_than" | "<" => Some(Self::LessThan),
            "contains" | "~" => Some(Self::Contains),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRule {
    pub column: String,
    pub operator: FilterOperator,
    /// Accepts JSON strings, numbers and booleans; kept as text.
    #[serde(deserialize_with = "literal_text")]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRequest {
    pub filters: Vec<FilterRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterResult {
    pub rows: usize,
    pub columns: usize,
    pub sample_data: Vec<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

fn literal_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLiteral {
        Text(String),
        Number(serde_json::Number),
        Bool(bool),
    }

    Ok(match RawLiteral::deserialize(deserializer)? {
        RawLiteral::Text(s) => s,
        RawLiteral::Number(n) => n.to_string(),
        RawLiteral::Bool(b) => b.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    NumberEquals(f64),
    GreaterThan(f64),
    LessThan(f64),
    BooleanEquals(bool),
    TimestampEquals(NaiveDateTime),
    TextEquals(String),
    /// Lowercased needle for substring matching.
    Contains(String),
    /// Matches nothing; the reason was recorded as a warning.
    Never,
}

impl Predicate {
    /// Row mask over one column; missing cells are null and never match.
    fn mask(&self, column: &Column) -> BooleanChunked {
        let cells = column.text();
        match self {
            Self::NumberEquals(v) => numeric_mask(column, |values| values.equal(*v)),
            Self::GreaterThan(v) => numeric_mask(column, |values| values.gt(*v)),
            Self::LessThan(v) => numeric_mask(column, |values| values.lt(*v)),
            Self::BooleanEquals(b) => cells
                .into_iter()
                .map(|cell| cell.map(|text| parse_boolean(text) == Some(*b)))
                .collect(),
            Self::TimestampEquals(t) => cells
                .into_iter()
                .map(|cell| cell.map(|text| parse_datetime(text) == Some(*t)))
                .collect(),
            Self::TextEquals(s) => cells.equal(s.as_str()),
            Self::Contains(needle) => cells
                .into_iter()
                .map(|cell| cell.map(|text| text.to_lowercase().contains(needle.as_str())))
                .collect(),
            Self::Never => no_rows(column),
        }
    }
}

fn numeric_mask(
    column: &Column,
    compare: impl Fn(&Float64Chunked) -> BooleanChunked,
) -> BooleanChunked {
    column.values().map_or_else(|| no_rows(column), compare)
}

fn no_rows(column: &Column) -> BooleanChunked {
    BooleanChunked::full(column.text().name().clone(), false, column.len())
}

struct CompiledRule {
    column: usize,
    predicate: Predicate,
}

fn compile_rule(
    dataset: &Dataset,
    rule: &FilterRule,
    warnings: &mut Vec<String>,
) -> Result<CompiledRule> {
    let index = dataset.column_index(&rule.column).ok_or_else(|| {
        SifterError::Validation(format!("Unknown column '{}' in filter", rule.column))
    })?;
    let kind = dataset
        .columns()
        .get(index)
        .map_or(ColumnKind::Text, Column::kind);

    let predicate = match rule.operator {
        FilterOperator::GreaterThan | FilterOperator::LessThan => {
            let value = parse_number(&rule.value).ok_or_else(|| {
                SifterError::Validation(format!(
                    "Filter value '{}' for {} on '{}' is not a number",
                    rule.value,
                    rule.operator.as_str(),
                    rule.column
                ))
            })?;
            if kind != ColumnKind::Numeric {
                warnings.push(format!(
                    "'{}' is {kind}, so {} matches no rows",
                    rule.column,
                    rule.operator.as_str()
                ));
                Predicate::Never
            } else if rule.operator == FilterOperator::GreaterThan {
                Predicate::GreaterThan(value)
            } else {
                Predicate::LessThan(value)
            }
        }
        FilterOperator::Contains => Predicate::Contains(rule.value.to_lowercase()),
        FilterOperator::Equals => {
            let coerced = match kind {
                ColumnKind::Numeric => parse_number(&rule.value).map(Predicate::NumberEquals),
                ColumnKind::Boolean => parse_boolean(&rule.value).map(Predicate::BooleanEquals),
                ColumnKind::Datetime => parse_datetime(&rule.value).map(Predicate::TimestampEquals),
                ColumnKind::Categorical | ColumnKind::Text => {
                    Some(Predicate::TextEquals(rule.value.clone()))
                }
            };
            coerced.unwrap_or_else(|| {
                warnings.push(format!(
                    "'{}' cannot be compared with {kind} column '{}', so equals matches no rows",
                    rule.value, rule.column
                ));
                Predicate::Never
            })
        }
    };

    Ok(CompiledRule {
        column: index,
        predicate,
    })
}

/// Evaluates the rules and returns the matching shape with a row sample.
///
/// # Errors
///
/// Returns a validation error for unknown columns or non-numeric literals
/// given to `greater_than`/`less_than`.
pub fn evaluate(
    dataset: &Dataset,
    rules: &[FilterRule],
    sample_rows: usize,
) -> Result<FilterResult> {
    let mut warnings = Vec::new();
    let compiled = rules
        .iter()
        .map(|rule| compile_rule(dataset, rule, &mut warnings))
        .collect::<Result<Vec<_>>>()?;

    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    let mut mask = BooleanChunked::full("filter".into(), true, dataset.row_count());
    for rule in &compiled {
        if let Some(column) = dataset.columns().get(rule.column) {
            mask = &mask & &rule.predicate.mask(column);
        }
    }
    let matching: Vec<usize> = mask
        .into_iter()
        .enumerate()
        .filter_map(|(row, hit)| (hit == Some(true)).then_some(row))
        .collect();

    Ok(FilterResult {
        rows: matching.len(),
        columns: dataset.column_count(),
        sample_data: dataset.rows_as_json(matching.iter().copied(), sample_rows),
        warnings,
    })
}

/// Parses a `"column operator value"` rule as typed on the command line.
///
/// # Errors
///
/// Returns a validation error if the rule has fewer than three parts or an
/// unknown operator.
pub fn parse_rule(text: &str) -> Result<FilterRule> {
    let mut parts = text.trim().splitn(3, char::is_whitespace);
    let (Some(column), Some(op), Some(value)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(SifterError::Validation(format!(
            "Filter rule '{text}' must look like \"column operator value\""
        )));
    };
    let operator = FilterOperator::parse(op)
        .ok_or_else(|| SifterError::Validation(format!("Unknown filter operator '{op}'")))?;
    Ok(FilterRule {
        column: column.to_owned(),
        operator,
        value: value.trim().to_owned(),
    })
}
