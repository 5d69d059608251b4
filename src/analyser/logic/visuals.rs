//! 3-D projections of numeric column triples.

use super::dataset::{Column, Dataset};
use super::types::{PlotData, Visualization};
use crate::config::EngineSettings;

/// First `limit` index triples `(i, j, k)` with `i < j < k`, lexicographic.
pub fn column_triples(count: usize, limit: usize) -> Vec<(usize, usize, usize)> {
    let mut triples = Vec::new();
    'outer: for i in 0..count {
        for j in i + 1..count {
            for k in j + 1..count {
                if triples.len() == limit {
                    break 'outer;
                }
                triples.push((i, j, k));
            }
        }
    }
    triples
}

/// Rows where all three columns hold finite numbers.
fn complete_points(columns: [&Column; 3], rows: usize) -> Vec<[f64; 3]> {
    (0..rows)
        .filter_map(|row| {
            let [a, b, c] = columns;
            let point = [a.number(row)?, b.number(row)?, c.number(row)?];
            point.iter().all(|v| v.is_finite()).then_some(point)
        })
        .collect()
}

fn plot_data(columns: [&Column; 3], points: impl Iterator<Item = [f64; 3]>) -> PlotData {
    let [a, b, c] = columns;
    let mut data = PlotData {
        x: Vec::new(),
        y: Vec::new(),
        z: Vec::new(),
        x_label: a.name().to_owned(),
        y_label: b.name().to_owned(),
        z_label: c.name().to_owned(),
    };
    for [x, y, z] in points {
        data.x.push(x);
        data.y.push(y);
        data.z.push(z);
    }
    data
}

struct Axis {
    min: f64,
    width: f64,
}

impl Axis {
    fn spanning(values: impl Iterator<Item = f64>, resolution: usize) -> Self {
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        Self {
            min,
            width: (max - min) / resolution as f64,
        }
    }

    fn cell(&self, value: f64, resolution: usize) -> usize {
        if self.width > 0.0 {
            (((value - self.min) / self.width).floor() as usize).min(resolution - 1)
        } else {
            0
        }
    }

    fn centre(&self, index: usize) -> f64 {
        self.min + (index as f64 + 0.5) * self.width
    }
}

/// Mean of z over a `resolution` x `resolution` grid of (x, y). Empty cells
/// take the mean of the non-empty cells.
pub fn surface_grid(points: &[[f64; 3]], resolution: usize) -> Vec<[f64; 3]> {
    if points.is_empty() || resolution == 0 {
        return Vec::new();
    }
    let x_axis = Axis::spanning(points.iter().map(|p| p[0]), resolution);
    let y_axis = Axis::spanning(points.iter().map(|p| p[1]), resolution);

    let mut sums = vec![0.0; resolution * resolution];
    let mut counts = vec![0_usize; resolution * resolution];
    for &[x, y, z] in points {
        let slot = y_axis.cell(y, resolution) * resolution + x_axis.cell(x, resolution);
        if let (Some(sum), Some(count)) = (sums.get_mut(slot), counts.get_mut(slot)) {
            *sum += z;
            *count += 1;
        }
    }

    let cell_means: Vec<Option<f64>> = sums
        .iter()
        .zip(&counts)
        .map(|(&sum, &count)| (count > 0).then(|| sum / count as f64))
        .collect();
    let filled: Vec<f64> = cell_means.iter().flatten().copied().collect();
    let fallback = filled.iter().sum::<f64>() / filled.len().max(1) as f64;

    let mut grid = Vec::with_capacity(resolution * resolution);
    for j in 0..resolution {
        for i in 0..resolution {
            let z = cell_means
                .get(j * resolution + i)
                .copied()
                .flatten()
                .unwrap_or(fallback);
            grid.push([x_axis.centre(i), y_axis.centre(j), z]);
        }
    }
    grid
}

/// Scatter and surface projections for the leading numeric triples.
pub fn extract(dataset: &Dataset, settings: &EngineSettings) -> Vec<Visualization> {
    let numeric = dataset.numeric_columns();
    let mut visualizations = Vec::new();

    for (i, j, k) in column_triples(numeric.len(), settings.max_triples) {
        let (Some(&a), Some(&b), Some(&c)) = (numeric.get(i), numeric.get(j), numeric.get(k)) else {
            continue;
        };
        let columns = [a, b, c];
        let points = complete_points(columns, dataset.row_count());

        visualizations.push(Visualization::Scatter3D {
            title: format!("3D Scatter: {} vs {} vs {}", a.name(), b.name(), c.name()),
            data: plot_data(columns, points.iter().copied().take(settings.scatter_row_cap)),
        });

        if points.len() >= settings.surface_min_points {
            let grid = surface_grid(&points, settings.surface_resolution);
            visualizations.push(Visualization::Surface3D {
                title: format!("3D Surface: {} over {} and {}", c.name(), a.name(), b.name()),
                data: plot_data(columns, grid.into_iter()),
            });
        }
    }

    visualizations
}
