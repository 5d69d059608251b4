use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Inferred semantic type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Boolean,
    Datetime,
    Categorical,
    Text,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Boolean => "boolean",
            Self::Datetime => "datetime",
            Self::Categorical => "categorical",
            Self::Text => "text",
        }
    }

    /// Kinds whose values are free-form strings rather than parsed scalars.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Categorical | Self::Text)
    }
}

/// Describe-style summary of one numeric column. Quantiles use linear
/// interpolation; `std` is the sample (n - 1) deviation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q1: Option<f64>,
    #[serde(rename = "50%")]
    pub median: Option<f64>,
    #[serde(rename = "75%")]
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

/// How the quality score was derived.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualityBreakdown {
    pub total_cells: usize,
    pub missing_cells: usize,
    pub duplicate_rows: usize,
    pub outlier_cells: usize,
    pub missing_pct: f64,
    pub duplicate_pct: f64,
    pub outlier_pct: f64,
    pub missing_penalty: f64,
    pub duplicate_penalty: f64,
    pub outlier_penalty: f64,
}

/// Full profile of a dataset version. Maps keep column order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub data_types: IndexMap<String, ColumnKind>,
    pub missing_values: IndexMap<String, usize>,
    pub numeric_summary: IndexMap<String, NumericSummary>,
    pub quality_score: f64,
    pub quality_breakdown: QualityBreakdown,
    pub outliers: IndexMap<String, usize>,
    pub duplicate_rows: usize,
    /// Bytes of cell text held by the dataset.
    pub memory_usage: usize,
}

impl Stats {
    pub fn total_missing(&self) -> usize {
        self.missing_values.values().sum()
    }

    pub fn total_outliers(&self) -> usize {
        self.outliers.values().sum()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Insight {
    Correlation {
        column_a: String,
        column_b: String,
        coefficient: f64,
        message: String,
    },
    Clustering {
        cluster_sizes: Vec<usize>,
        rows_used: usize,
        features: Vec<String>,
        message: String,
    },
}

impl Insight {
    pub fn message(&self) -> &str {
        match self {
            Self::Correlation { message, .. } | Self::Clustering { message, .. } => message,
        }
    }
}

/// Parallel coordinate arrays with axis labels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlotData {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub x_label: String,
    pub y_label: String,
    pub z_label: String,
}

impl PlotData {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Visualization {
    #[serde(rename = "scatter_3d")]
    Scatter3D { title: String, data: PlotData },
    #[serde(rename = "surface_3d")]
    Surface3D { title: String, data: PlotData },
}

impl Visualization {
    pub fn data(&self) -> &PlotData {
        match self {
            Self::Scatter3D { data, .. } | Self::Surface3D { data, .. } => data,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeatmapData {
    pub labels: Vec<String>,
    /// `None` where a coefficient is undefined.
    pub values: Vec<Vec<Option<f64>>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesData {
    pub labels: Vec<String>,
    pub values: Vec<usize>,
}

/// Overview charts returned with an upload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Chart {
    Heatmap { title: String, data: HeatmapData },
    Histogram { title: String, data: SeriesData },
    Bar { title: String, data: SeriesData },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_kind_tags() {
        assert_eq!(serde_json::to_string(&ColumnKind::Datetime).unwrap(), "\"datetime\"");
        assert_eq!(ColumnKind::Categorical.to_string(), "categorical");
        assert!(ColumnKind::Text.is_textual());
        assert!(!ColumnKind::Boolean.is_textual());
    }

    #[test]
    fn test_numeric_summary_keys() {
        let summary = NumericSummary {
            count: 1,
            mean: Some(1.0),
            std: None,
            min: Some(1.0),
            q1: Some(1.0),
            median: Some(1.0),
            q3: Some(1.0),
            max: Some(1.0),
        };
        let json = serde_json::to_value(&summary).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["count", "mean", "std", "min", "25%", "50%", "75%", "max"]);
    }

    #[test]
    fn test_visualization_type_tags() {
        let viz = Visualization::Surface3D {
            title: "t".to_owned(),
            data: PlotData {
                x: vec![],
                y: vec![],
                z: vec![],
                x_label: "a".to_owned(),
                y_label: "b".to_owned(),
                z_label: "c".to_owned(),
            },
        };
        let json = serde_json::to_value(&viz).unwrap();
        assert_eq!(json["type"], "surface_3d");
    }
}
