use super::*;

#[test]
fn test_missing_values_per_column() {
    let data = dataset("a,b\n1,10\n2,20\n3,30\n,40\n");
    let stats = profile(&data);
    assert_eq!(stats.missing_values["a"], 1);
    assert_eq!(stats.missing_values["b"], 0);
    assert_eq!(stats.data_types["a"], ColumnKind::Numeric);
}

#[test]
fn test_numeric_summary_quartiles() {
    let data = dataset("v\n1\n2\n3\n4\n5\n");
    let summary = &profile(&data).numeric_summary["v"];
    assert_eq!(summary.count, 5);
    assert_eq!(summary.mean, Some(3.0));
    assert_eq!(summary.q1, Some(2.0));
    assert_eq!(summary.median, Some(3.0));
    assert_eq!(summary.q3, Some(4.0));
    assert!((summary.std.unwrap() - 2.5_f64.sqrt()).abs() < 1e-12);
}

#[test]
fn test_summary_of_all_missing_column() {
    let data = dataset("a,b\n,1\nNA,2\n");
    let stats = profile(&data);
    let summary = &stats.numeric_summary["a"];
    assert_eq!(summary.count, 0);
    assert!(summary.mean.is_none());
    assert_eq!(stats.outliers["a"], 0);
}

#[test]
fn test_quality_score_is_100_for_clean_data() {
    let data = dataset("a,b\n1,x\n2,y\n3,z\n");
    let stats = profile(&data);
    assert!((stats.quality_score - 100.0).abs() < f64::EPSILON);
    assert_eq!(stats.total_missing(), 0);
}

#[test]
fn test_quality_score_drops_with_defects() {
    let data = dataset("a,b\n1,x\n1,x\n,y\n");
    let stats = profile(&data);
    assert!(stats.quality_score < 100.0);
    assert!(stats.quality_score >= 0.0);
    assert_eq!(stats.duplicate_rows, 1);
    assert_eq!(stats.quality_breakdown.missing_cells, 1);
}

#[test]
fn test_outliers_by_iqr() {
    let data = dataset("v\n10\n11\n12\n13\n14\n1000\n");
    let stats = profile(&data);
    assert_eq!(stats.outliers["v"], 1);
}

#[test]
fn test_duplicates_ignore_first_occurrence() {
    let mut csv = String::from("a,b\n");
    for _ in 0..5 {
        csv.push_str("1,x\n");
    }
    for i in 0..5 {
        csv.push_str(&format!("{},y\n", i + 10));
    }
    assert_eq!(profile(&dataset(&csv)).duplicate_rows, 4);
}

#[test]
fn test_empty_dataset_profile() {
    let data = dataset("a,b\n");
    let stats = profile(&data);
    assert_eq!(stats.rows, 0);
    assert_eq!(stats.columns, 2);
    assert_eq!(stats.duplicate_rows, 0);
    assert!((stats.quality_score - 100.0).abs() < f64::EPSILON);
}

#[test]
fn test_memory_usage_counts_cell_text() {
    let data = dataset("a,b\n12,xyz\n");
    assert_eq!(profile(&data).memory_usage, 5);
}
