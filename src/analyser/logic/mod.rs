//! Pure analytics over in-memory datasets.
//!
//! Nothing in this module touches shared state: every function takes a
//! [`Dataset`] by reference and returns new values. Session handling and
//! versioning live in [`crate::analyser::lifecycle`].

pub mod analysis;
pub mod charts;
pub mod cleaning;
pub mod dataset;
pub mod filter;
pub mod health;
pub mod inference;
pub mod io;
pub mod ml;
pub mod profiling;
pub mod transforms;
pub mod types;
pub mod visuals;

pub use analysis::profile;
pub use cleaning::{CleanRequest, CleaningOp, CleaningPlan, MissingMethod};
pub use dataset::{Column, Dataset};
pub use filter::{FilterOperator, FilterRequest, FilterResult, FilterRule};
pub use io::{parse_csv, write_csv};
pub use ml::predictive_insights;
pub use transforms::TransformRequest;
pub use types::{
    Chart, ColumnKind, HeatmapData, Insight, NumericSummary, PlotData, QualityBreakdown,
    SeriesData, Stats, Visualization,
};
