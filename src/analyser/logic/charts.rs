//! Overview charts returned with an upload: a correlation heatmap, value
//! histograms for numeric columns and frequency bars for text columns.

use super::dataset::{Column, Dataset};
use super::ml;
use super::types::{Chart, HeatmapData, SeriesData};
use std::collections::HashMap;

const HISTOGRAM_BINS: usize = 10;
const MAX_HISTOGRAMS: usize = 3;
const MAX_BAR_CHARTS: usize = 2;
const TOP_CATEGORIES: usize = 10;

/// Equal-width histogram over `[min, max]`; the last bin is closed. A
/// constant column spans `[v - 0.5, v + 0.5]`.
pub fn histogram(values: &[f64], bins: usize) -> SeriesData {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return SeriesData {
            labels: Vec::new(),
            values: Vec::new(),
        };
    }

    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0_usize; bins];
    for v in finite {
        let index = (((v - lo) / width).floor() as usize).min(bins - 1);
        if let Some(count) = counts.get_mut(index) {
            *count += 1;
        }
    }

    let labels = (0..bins)
        .map(|i| {
            let start = lo + width * i as f64;
            format!("{start:.1}-{:.1}", start + width)
        })
        .collect();
    SeriesData {
        labels,
        values: counts,
    }
}

/// Most frequent values, ties broken by first appearance.
pub fn value_counts(column: &Column, top: usize) -> SeriesData {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (row, cell) in column.cells().enumerate() {
        if let Some(text) = cell {
            counts.entry(text).or_insert((0, row)).0 += 1;
        }
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(value, (count, first))| (value, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.truncate(top);

    SeriesData {
        labels: ranked.iter().map(|r| r.0.to_owned()).collect(),
        values: ranked.iter().map(|r| r.1).collect(),
    }
}

pub fn overview_charts(dataset: &Dataset) -> Vec<Chart> {
    let mut charts = Vec::new();
    let numeric = dataset.numeric_columns();

    if numeric.len() > 1 {
        let (labels, values) = ml::correlation_matrix(dataset);
        charts.push(Chart::Heatmap {
            title: "Correlation Matrix".to_owned(),
            data: HeatmapData { labels, values },
        });
    }

    for column in numeric.iter().take(MAX_HISTOGRAMS) {
        charts.push(Chart::Histogram {
            title: format!("Distribution of {}", column.name()),
            data: histogram(&column.present_numbers(), HISTOGRAM_BINS),
        });
    }

    for column in dataset
        .columns()
        .iter()
        .filter(|c| c.kind().is_textual())
        .take(MAX_BAR_CHARTS)
    {
        charts.push(Chart::Bar {
            title: format!("Top Values in {}", column.name()),
            data: value_counts(column, TOP_CATEGORIES),
        });
    }

    charts
}
