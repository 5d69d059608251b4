//! Predictive insights over numeric columns: pairwise correlations and a
//! k-means segmentation.
//!
//! Nothing here fails. Degenerate input (too few columns, too few complete
//! rows, zero variance) simply produces fewer insights.

use super::dataset::{Column, Dataset};
use super::types::Insight;
use crate::config::EngineSettings;
use ndarray::{Array2, ArrayView1};
use polars::prelude::*;

/// Pearson correlation over rows where both columns have a value.
///
/// `None` with fewer than two complete rows or when either side has zero
/// variance.
pub fn pearson(a: &Column, b: &Column) -> Option<f64> {
    let (x, y) = (a.values()?, b.values()?);
    let complete = &x.is_not_null() & &y.is_not_null();
    let x = x.filter(&complete).ok()?;
    let y = y.filter(&complete).ok()?;
    if x.len() < 2 {
        return None;
    }
    let degenerate = |values: &Float64Chunked| {
        values
            .var(1)
            .is_none_or(|variance| variance <= 0.0 || !variance.is_finite())
    };
    if degenerate(&x) || degenerate(&y) {
        return None;
    }

    polars::prelude::cov::pearson_corr(&x, &y)
        .filter(|r| r.is_finite())
        .map(|r| r.clamp(-1.0, 1.0))
}

fn describe_correlation(a: &str, b: &str, r: f64) -> String {
    let strength = if r.abs() > 0.7 { "Strong" } else { "Moderate" };
    let direction = if r > 0.0 { "positive" } else { "negative" };
    format!("{strength} {direction} correlation ({r:.3}) between '{a}' and '{b}'")
}

/// Correlations with `|r| > threshold`, strongest first, ties by column names.
pub fn correlation_insights(dataset: &Dataset, threshold: f64) -> Vec<Insight> {
    let numeric = dataset.numeric_columns();
    let mut found: Vec<(String, String, f64)> = Vec::new();

    for (i, a) in numeric.iter().enumerate() {
        for b in numeric.iter().skip(i + 1) {
            if let Some(r) = pearson(a, b)
                && r.abs() > threshold
            {
                found.push((a.name().to_owned(), b.name().to_owned(), r));
            }
        }
    }

    found.sort_by(|x, y| {
        y.2.abs()
            .total_cmp(&x.2.abs())
            .then_with(|| x.0.cmp(&y.0))
            .then_with(|| x.1.cmp(&y.1))
    });

    found
        .into_iter()
        .map(|(column_a, column_b, coefficient)| Insight::Correlation {
            message: describe_correlation(&column_a, &column_b, coefficient),
            column_a,
            column_b,
            coefficient,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansConfig {
    pub k: usize,
    pub max_iter: usize,
    pub tol: f64,
    pub seed: u64,
}

impl KMeansConfig {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 300,
            tol: 1e-6,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansResult {
    pub labels: Vec<usize>,
    pub cluster_sizes: Vec<usize>,
    pub centroids: Array2<f64>,
    pub iterations: usize,
    /// Within-cluster sum of squared distances.
    pub inertia: f64,
}

/// Deterministic linear congruential generator yielding values in `[0, 1)`.
struct Lcg(u64);

impl Lcg {
    fn next_unit(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 33) as f64 / (1_u64 << 31) as f64
    }

    fn next_index(&mut self, n: usize) -> usize {
        (self.next_unit() * n as f64) as usize % n
    }
}

fn squared_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn nearest(centroids: &Array2<f64>, point: ArrayView1<'_, f64>) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (c, centroid) in centroids.rows().into_iter().enumerate() {
        let dist = squared_distance(point, centroid);
        if dist < best.1 {
            best = (c, dist);
        }
    }
    best
}

/// k-means++ seeding: each further centroid is drawn with probability
/// proportional to its squared distance from the nearest chosen one.
fn seed_centroids(data: &Array2<f64>, k: usize, rng: &mut Lcg) -> Array2<f64> {
    let (n, d) = data.dim();
    let mut centroids = Array2::<f64>::zeros((k, d));
    centroids.row_mut(0).assign(&data.row(rng.next_index(n)));

    let mut min_dists = vec![f64::INFINITY; n];
    for c in 1..k {
        let last = centroids.row(c - 1);
        for (dist, point) in min_dists.iter_mut().zip(data.rows()) {
            *dist = dist.min(squared_distance(point, last));
        }

        let total: f64 = min_dists.iter().sum();
        let chosen = if total < 1e-15 {
            rng.next_index(n)
        } else {
            let target = rng.next_unit() * total;
            let mut cumulative = 0.0;
            min_dists
                .iter()
                .position(|&dist| {
                    cumulative += dist;
                    cumulative >= target
                })
                .unwrap_or(n - 1)
        };
        centroids.row_mut(c).assign(&data.row(chosen));
    }
    centroids
}

/// Lloyd's algorithm from k-means++ seeds. `None` when there are fewer rows
/// than clusters.
pub fn kmeans(data: &Array2<f64>, config: &KMeansConfig) -> Option<KMeansResult> {
    let (n, d) = data.dim();
    let k = config.k;
    if k == 0 || n < k {
        return None;
    }

    let mut rng = Lcg(config.seed);
    let mut centroids = seed_centroids(data, k, &mut rng);
    let mut labels = vec![0_usize; n];
    let mut iterations = 0;

    for iter in 0..config.max_iter {
        iterations = iter + 1;

        for (label, point) in labels.iter_mut().zip(data.rows()) {
            *label = nearest(&centroids, point).0;
        }

        let mut sums = Array2::<f64>::zeros((k, d));
        let mut counts = vec![0_usize; k];
        for (&label, point) in labels.iter().zip(data.rows()) {
            let mut target = sums.row_mut(label);
            target += &point;
            if let Some(count) = counts.get_mut(label) {
                *count += 1;
            }
        }

        let mut max_shift: f64 = 0.0;
        for (c, &count) in counts.iter().enumerate() {
            // Empty clusters keep their previous centroid
            if count == 0 {
                continue;
            }
            let updated = sums.row(c).mapv(|v| v / count as f64);
            max_shift = max_shift.max(squared_distance(centroids.row(c), updated.view()).sqrt());
            centroids.row_mut(c).assign(&updated);
        }

        if max_shift < config.tol {
            break;
        }
    }

    let mut cluster_sizes = vec![0_usize; k];
    let mut inertia = 0.0;
    for (label, point) in labels.iter_mut().zip(data.rows()) {
        let (c, dist) = nearest(&centroids, point);
        *label = c;
        inertia += dist;
        if let Some(size) = cluster_sizes.get_mut(c) {
            *size += 1;
        }
    }

    Some(KMeansResult {
        labels,
        cluster_sizes,
        centroids,
        iterations,
        inertia,
    })
}

/// Z-scores each column in place using the population standard deviation.
/// Constant columns become all zeros.
pub fn standardize_columns(data: &mut Array2<f64>) {
    for mut column in data.columns_mut() {
        let n = column.len() as f64;
        if n == 0.0 {
            continue;
        }
        let mean = column.sum() / n;
        let std = (column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        if std > 0.0 && std.is_finite() {
            column.mapv_inplace(|v| (v - mean) / std);
        } else {
            column.fill(0.0);
        }
    }
}

/// Feature matrix of complete rows across all numeric columns, capped at
/// `max_rows`.
fn feature_matrix(columns: &[&Column], rows: usize, max_rows: usize) -> Array2<f64> {
    let complete: Vec<Vec<f64>> = (0..rows)
        .filter_map(|row| columns.iter().map(|c| c.number(row)).collect::<Option<Vec<f64>>>())
        .filter(|values| values.iter().all(|v| v.is_finite()))
        .take(max_rows)
        .collect();

    let mut matrix = Array2::<f64>::zeros((complete.len(), columns.len()));
    for (mut target, values) in matrix.rows_mut().into_iter().zip(&complete) {
        for (cell, &v) in target.iter_mut().zip(values) {
            *cell = v;
        }
    }
    matrix
}

pub fn clustering_insight(dataset: &Dataset, settings: &EngineSettings) -> Option<Insight> {
    let columns = dataset.numeric_columns();
    if columns.is_empty() {
        return None;
    }

    let mut data = feature_matrix(&columns, dataset.row_count(), settings.cluster_max_rows);
    standardize_columns(&mut data);

    let config = KMeansConfig {
        k: settings.cluster_k,
        max_iter: settings.kmeans_max_iter,
        seed: settings.cluster_seed,
        ..KMeansConfig::new(settings.cluster_k)
    };
    let result = kmeans(&data, &config)?;
    let rows_used = data.nrows();

    tracing::debug!(
        rows_used,
        iterations = result.iterations,
        inertia = result.inertia,
        "k-means finished"
    );

    Some(Insight::Clustering {
        message: format!(
            "Identified {} distinct clusters across {rows_used} rows using {} numeric features",
            config.k,
            columns.len()
        ),
        cluster_sizes: result.cluster_sizes,
        rows_used,
        features: columns.iter().map(|c| c.name().to_owned()).collect(),
    })
}

/// Correlations first, then the clustering insight if one could be formed.
pub fn predictive_insights(dataset: &Dataset, settings: &EngineSettings) -> Vec<Insight> {
    let mut insights = correlation_insights(dataset, settings.correlation_threshold);
    insights.extend(clustering_insight(dataset, settings));
    insights
}

/// Full pairwise correlation matrix of the numeric columns, by name.
pub fn correlation_matrix(dataset: &Dataset) -> (Vec<String>, Vec<Vec<Option<f64>>>) {
    let numeric = dataset.numeric_columns();
    let labels = numeric.iter().map(|c| c.name().to_owned()).collect();
    let values = numeric
        .iter()
        .map(|a| numeric.iter().map(|b| pearson(a, b)).collect())
        .collect();
    (labels, values)
}

