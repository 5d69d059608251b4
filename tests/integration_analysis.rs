//! Integration tests for the full analysis workflow
//!
//! These tests upload the fixture files through the request handlers and
//! verify the end-to-end results.

use sifter::ai::OfflineNarrator;
use sifter::analyser::logic::{
    CleanRequest, ColumnKind, FilterOperator, FilterRequest, FilterRule, Insight,
};
use sifter::commands::analysis::{
    UploadParams, filter, predictive_insights, profile, upload, visualizations,
};
use sifter::commands::lifecycle::clean;
use sifter::commands::{AppState, dispatch_line};
use sifter::config::AppConfig;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata").join(name)
}

fn state() -> AppState {
    AppState::with_narrator(AppConfig::default(), Box::new(OfflineNarrator))
}

async fn loaded(name: &str) -> AppState {
    let state = state();
    upload(&state, UploadParams::from_path(fixture(name)))
        .await
        .expect("fixture uploads");
    state
}

#[tokio::test]
async fn test_analyze_clean_csv() {
    let state = state();
    let response = upload(&state, UploadParams::from_path(fixture("clean.csv"))).await.unwrap();

    assert_eq!(response.stats.rows, 10, "Should have 10 rows");
    assert_eq!(response.stats.columns, 6, "Should have 6 columns");
    assert_eq!(response.sample_data.len(), 10);
    assert_eq!(response.stats.data_types["age"], ColumnKind::Numeric);
    assert_eq!(response.stats.data_types["department"], ColumnKind::Categorical);
    assert_eq!(response.stats.data_types["email"], ColumnKind::Text);
    assert!(
        (response.stats.quality_score - 100.0).abs() < f64::EPSILON,
        "Clean file should score 100 ({})",
        response.stats.quality_score
    );
}

#[tokio::test]
async fn test_analyze_missing_values_csv() {
    let state = loaded("missing_values.csv").await;
    let stats = profile(&state).unwrap();

    assert_eq!(stats.missing_values["age"], 3);
    assert_eq!(stats.missing_values["salary"], 2);
    assert_eq!(stats.missing_values["name"], 1);
    assert_eq!(stats.total_missing(), 7);
    assert!(stats.quality_score < 100.0);

    let request = CleanRequest {
        handle_missing: true,
        ..CleanRequest::default()
    };
    let response = clean(&state, request).await.unwrap();
    assert_eq!(response.new_shape.rows, 4);
    assert_eq!(profile(&state).unwrap().total_missing(), 0);
}

#[tokio::test]
async fn test_duplicates_are_removed() {
    let state = loaded("duplicates.csv").await;
    assert_eq!(profile(&state).unwrap().duplicate_rows, 4);

    let request = CleanRequest {
        remove_duplicates: true,
        ..CleanRequest::default()
    };
    let response = clean(&state, request).await.unwrap();
    assert_eq!(response.new_shape.rows, 6);
    assert_eq!(profile(&state).unwrap().duplicate_rows, 0);
}

#[tokio::test]
async fn test_filter_on_fixture() {
    let state = loaded("clean.csv").await;
    let request = FilterRequest {
        filters: vec![
            FilterRule {
                column: "department".to_owned(),
                operator: FilterOperator::Equals,
                value: "Engineering".to_owned(),
            },
            FilterRule {
                column: "salary".to_owned(),
                operator: FilterOperator::GreaterThan,
                value: "60000".to_owned(),
            },
        ],
    };
    let result = filter(&state, request).await.unwrap();
    assert_eq!(result.rows, 2);
    assert_eq!(result.columns, 6);
}

#[tokio::test]
async fn test_insights_and_visualizations_on_fixture() {
    let state = loaded("clean.csv").await;

    let insights = predictive_insights(&state).await.unwrap().insights;
    let clusters = insights.iter().find_map(|i| match i {
        Insight::Clustering {
            cluster_sizes,
            rows_used,
            ..
        } => Some((cluster_sizes, *rows_used)),
        Insight::Correlation { .. } => None,
    });
    let (sizes, rows_used) = clusters.expect("clean.csv has enough rows to cluster");
    assert_eq!(sizes.iter().sum::<usize>(), rows_used);

    // id, age, salary
    let plots = visualizations(&state).await.unwrap().visualizations;
    assert_eq!(plots.len(), 2);
}

#[tokio::test]
async fn test_serve_protocol_round_trip() {
    let state = state();
    let path = fixture("missing_values.csv");
    let upload = serde_json::json!({"id": "u1", "op": "upload", "params": {"path": path}});
    let response = dispatch_line(&state, &upload.to_string()).await;
    assert!(response.ok);

    let clean = concat!(
        r#"{"id": "c1", "op": "clean", "#,
        r#""params": {"handle_missing": true, "missing_method": "fill_mean"}}"#,
    );
    let response = dispatch_line(&state, clean).await;
    let result = response.result.unwrap();
    assert_eq!(result["version"], 1);
    assert_eq!(result["new_shape"]["rows"], 10);

    let bad = concat!(
        r#"{"id": "f1", "op": "filter", "params": {"filters": "#,
        r#"[{"column": "nope", "operator": "equals", "value": 1}]}}"#,
    );
    let response = dispatch_line(&state, bad).await;
    assert!(!response.ok);
    assert_eq!(response.error.unwrap().kind, "validation_error");

    let response = dispatch_line(&state, r#"{"op": "history"}"#).await;
    let entries = response.result.unwrap()["entries"].as_array().unwrap().len();
    assert_eq!(entries, 2);
}
