use super::*;
use crate::analyser::logic::cleaning::apply;

fn run(data: &Dataset, op: CleaningOp) -> Dataset {
    apply(data, op).unwrap().0
}

#[test]
fn test_drop_missing_removes_incomplete_rows() {
    let data = dataset("a,b\n1,10\n2,20\n3,30\n,40\n");
    let (cleaned, line) = apply(&data, CleaningOp::DropMissing).unwrap();
    assert_eq!(cleaned.row_count(), 3);
    assert_eq!(line, "Dropped 1 rows with missing values");
}

#[test]
fn test_drop_missing_is_idempotent() {
    let data = dataset("a,b,c\n1,,x\n2,5,\n3,6,z\n,7,w\n4,8,v\n");
    let once = run(&data, CleaningOp::DropMissing);
    let (twice, line) = apply(&once, CleaningOp::DropMissing).unwrap();
    assert_eq!(once, twice);
    assert_eq!(line, "No rows with missing values; nothing dropped");
}

#[test]
fn test_fill_mean_fills_with_column_mean() {
    let data = dataset("a,b\n1,10\n2,20\n3,30\n,40\n");
    let filled = run(&data, CleaningOp::FillMean);
    assert_eq!(numbers(&filled, "a"), [Some(1.0), Some(2.0), Some(3.0), Some(2.0)]);
    assert_eq!(cells(&filled, "b"), cells(&data, "b"));
}

#[test]
fn test_fill_mean_preserves_mean() {
    let data = dataset("a,b\n1.5,x\n,y\n7.25,z\n,w\n-3,v\n");
    let before = profile(&data).numeric_summary["a"].mean.unwrap();
    let filled = run(&data, CleaningOp::FillMean);
    let after = profile(&filled).numeric_summary["a"].mean.unwrap();
    assert!((before - after).abs() < 1e-9);
    assert_eq!(filled.column("a").unwrap().missing_count(), 0);
}

#[test]
fn test_fill_leaves_text_columns_missing() {
    let data = dataset("a,b\n1,x\n,\n3,z\n");
    let filled = run(&data, CleaningOp::FillMedian);
    assert_eq!(numbers(&filled, "a")[1], Some(2.0));
    assert_eq!(cells(&filled, "b")[1], None);
}

#[test]
fn test_fill_median() {
    let data = dataset("a\n1\n2\n100\nNA\n");
    let (filled, line) = apply(&data, CleaningOp::FillMedian).unwrap();
    assert_eq!(numbers(&filled, "a")[3], Some(2.0));
    assert!(line.starts_with("Filled missing numeric values by median"));
}

#[test]
fn test_remove_outliers() {
    let data = dataset("v,label\n10,a\n11,b\n12,c\n13,d\n14,e\n1000,f\n");
    let (cleaned, line) = apply(&data, CleaningOp::RemoveOutliers).unwrap();
    assert_eq!(cleaned.row_count(), 5);
    assert_eq!(line, "Removed 1 outlier rows using the IQR method");
    assert!(!cells(&cleaned, "label").contains(&Some("f".to_owned())));
}

#[test]
fn test_remove_outliers_keeps_missing_cells() {
    let data = dataset("v\n1\n2\nNA\n3\n");
    let (cleaned, line) = apply(&data, CleaningOp::RemoveOutliers).unwrap();
    assert_eq!(cleaned.row_count(), 4);
    assert_eq!(line, "No outliers detected by the IQR method");
}

#[test]
fn test_remove_duplicates_keeps_first_occurrence() {
    let mut csv = String::from("a,b\n");
    for _ in 0..5 {
        csv.push_str("1,same\n");
    }
    for i in 0..5 {
        csv.push_str(&format!("{i},other\n"));
    }
    let data = dataset(&csv);
    let (cleaned, line) = apply(&data, CleaningOp::RemoveDuplicates).unwrap();
    assert_eq!(cleaned.row_count(), 6);
    assert_eq!(line, "Removed 4 duplicate rows");
    assert_eq!(profile(&cleaned).duplicate_rows, 0);
}

#[test]
fn test_plan_follows_request_order() {
    let data = dataset("a,b\n1,x\nNA,y\n1,x\n2,z\n");
    let request = CleanRequest {
        handle_missing: true,
        missing_method: MissingMethod::FillMean,
        remove_outliers: true,
        remove_duplicates: true,
    };
    let (cleaned, log) = request.plan().apply(&data).unwrap();
    assert_eq!(log.len(), 4);
    assert!(log[0].starts_with("Filled missing numeric values by mean"));
    assert_eq!(log[1], "No outliers detected by the IQR method");
    assert_eq!(log[2], "Removed 1 duplicate rows");
    assert_eq!(log[3], "Resulting shape: 3 rows x 2 columns");
    assert_eq!(cleaned.row_count(), 3);
}

#[test]
fn test_empty_plan_logs_and_keeps_data() {
    let data = dataset("a\n1\n1\n");
    let (cleaned, log) = CleanRequest::default().plan().apply(&data).unwrap();
    assert_eq!(cleaned, data);
    assert_eq!(
        log,
        ["No cleaning operations requested", "Resulting shape: 2 rows x 1 columns"]
    );
}

#[test]
fn test_clean_request_rejects_unknown_fields() {
    let parsed = serde_json::from_str::<CleanRequest>(r#"{"handle_missing": true, "bogus": 1}"#);
    assert!(parsed.is_err());

    let parsed: CleanRequest =
        serde_json::from_str(r#"{"handle_missing": true, "missing_method": "fill_median"}"#)
            .unwrap();
    assert_eq!(parsed.missing_method, MissingMethod::FillMedian);
}
