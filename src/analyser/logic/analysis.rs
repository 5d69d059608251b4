use super::dataset::Dataset;
use super::health;
use super::profiling;
use super::types::Stats;
use indexmap::IndexMap;

/// Computes the full [`Stats`] profile of a dataset.
///
/// Pure: the same dataset always yields an identical profile.
pub fn profile(dataset: &Dataset) -> Stats {
    let mut data_types = IndexMap::with_capacity(dataset.column_count());
    let mut missing_values = IndexMap::with_capacity(dataset.column_count());
    let mut numeric_summary = IndexMap::new();
    let mut outliers = IndexMap::new();

    for column in dataset.columns() {
        let name = column.name().to_owned();
        data_types.insert(name.clone(), column.kind());
        missing_values.insert(name.clone(), column.missing_count());

        if let Some(values) = column.values() {
            numeric_summary.insert(name.clone(), profiling::summarize_numeric(values));
            outliers.insert(name, profiling::outlier_count(column));
        }
    }

    let duplicate_rows = profiling::duplicate_count(dataset);
    let missing_cells: usize = missing_values.values().sum();
    let outlier_cells: usize = outliers.values().sum();
    let (quality_score, quality_breakdown) = health::quality_score(
        missing_cells,
        duplicate_rows,
        outlier_cells,
        dataset.row_count(),
        dataset.column_count(),
    );

    Stats {
        rows: dataset.row_count(),
        columns: dataset.column_count(),
        column_names: dataset.column_names(),
        data_types,
        missing_values,
        numeric_summary,
        quality_score,
        quality_breakdown,
        outliers,
        duplicate_rows,
        memory_usage: dataset.memory_usage(),
    }
}
