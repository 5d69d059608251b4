use super::types::{QualityBreakdown, Stats};
use crate::utils::percentage;

const MISSING_WEIGHT: f64 = 0.5;
const DUPLICATE_WEIGHT: f64 = 0.3;
const OUTLIER_WEIGHT: f64 = 0.2;

/// Quality score in `[0, 100]`:
/// `100 - (missing% * 0.5 + duplicate% * 0.3 + outlier% * 0.2)`.
///
/// Missing and outlier percentages are relative to all cells, duplicates to
/// rows. An empty dataset scores 100.
pub fn quality_score(
    missing_cells: usize,
    duplicate_rows: usize,
    outlier_cells: usize,
    rows: usize,
    columns: usize,
) -> (f64, QualityBreakdown) {
    let total_cells = rows * columns;
    let missing_pct = percentage(missing_cells, total_cells);
    let duplicate_pct = percentage(duplicate_rows, rows);
    let outlier_pct = percentage(outlier_cells, total_cells);

    let missing_penalty = missing_pct * MISSING_WEIGHT;
    let duplicate_penalty = duplicate_pct * DUPLICATE_WEIGHT;
    let outlier_penalty = outlier_pct * OUTLIER_WEIGHT;

    let score = (100.0 - (missing_penalty + duplicate_penalty + outlier_penalty)).clamp(0.0, 100.0);

    (
        score,
        QualityBreakdown {
            total_cells,
            missing_cells,
            duplicate_rows,
            outlier_cells,
            missing_pct,
            duplicate_pct,
            outlier_pct,
            missing_penalty,
            duplicate_penalty,
            outlier_penalty,
        },
    )
}

/// Human-readable risks for reports, most severe first within each category.
pub fn describe_risks(stats: &Stats) -> Vec<String> {
    let mut risks = Vec::new();

    for (name, &missing) in &stats.missing_values {
        let pct = percentage(missing, stats.rows);
        if pct > 15.0 {
            risks.push(format!("Column '{name}' has significant missing data ({pct:.1}%)."));
        } else if pct > 5.0 {
            risks.push(format!("Column '{name}' has some missing data ({pct:.1}%)."));
        }
    }

    if stats.duplicate_rows > 0 {
        risks.push(format!(
            "{} duplicate rows ({:.1}% of the dataset).",
            stats.duplicate_rows, stats.quality_breakdown.duplicate_pct
        ));
    }

    for (name, &count) in &stats.outliers {
        if count > 0 {
            risks.push(format!("Column '{name}' has {count} outliers by the IQR rule."));
        }
    }

    for (name, summary) in &stats.numeric_summary {
        if let (Some(mean), Some(median), Some(min), Some(max)) =
            (summary.mean, summary.median, summary.min, summary.max)
        {
            let range = max - min;
            if range > 0.0 && (mean - median).abs() / range > 0.1 {
                risks.push(format!(
                    "Column '{name}' is heavily skewed; averages may be misleading."
                ));
            }
        }
    }

    risks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_dataset_scores_100() {
        let (score, breakdown) = quality_score(0, 0, 0, 10, 3);
        assert!((score - 100.0).abs() < f64::EPSILON);
        assert_eq!(breakdown.total_cells, 30);
    }

    #[test]
    fn test_empty_dataset_scores_100() {
        let (score, _) = quality_score(0, 0, 0, 0, 4);
        assert!((score - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weights() {
        // 10% missing, 20% duplicates, 5% outliers
        let (score, breakdown) = quality_score(10, 2, 5, 10, 10);
        assert!((breakdown.missing_penalty - 5.0).abs() < 1e-9);
        assert!((breakdown.duplicate_penalty - 6.0).abs() < 1e-9);
        assert!((breakdown.outlier_penalty - 1.0).abs() < 1e-9);
        assert!((score - 88.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_is_clamped() {
        let (score, _) = quality_score(100, 10, 100, 10, 10);
        assert!(score >= 0.0);
    }
}
