//! Shared test utilities and fixture generators

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a small audit dataset with known characteristics
///
/// This DataFrame includes:
/// - `diagnosis`: yes/no target with one inconclusive row
/// - `score`: numeric feature the fixture models threshold on
/// - `sex`: two balanced groups (m/f)
/// - `age`: numeric ages spanning several bands
pub fn create_audit_dataframe() -> DataFrame {
    df! {
        "diagnosis" => ["yes", "no", "yes", "no", "yes", "no", "yes", "inconclusive"],
        "score" => [0.9f64, 0.2, 0.8, 0.1, 0.7, 0.3, 0.9, 0.5],
        "sex" => ["m", "m", "m", "f", "f", "f", "f", "m"],
        "age" => [22i64, 24, 31, 44, 52, 61, 70, 33],
    }
    .unwrap()
}

/// Create a dataset where one group is always selected and the other never
pub fn create_biased_dataframe() -> DataFrame {
    df! {
        "diagnosis" => ["yes", "no", "yes", "no", "yes", "no"],
        "score" => [0.9f64, 0.8, 0.9, 0.1, 0.2, 0.1],
        "sex" => ["m", "m", "m", "f", "f", "f"],
    }
    .unwrap()
}

/// JSON for a plain estimator thresholding on `score` at 0.5
pub fn plain_model_json() -> String {
    serde_json::json!({
        "kind": "estimator",
        "features": ["score"],
        "weights": [20.0],
        "intercept": -10.0,
        "threshold": 0.5,
    })
    .to_string()
}

/// JSON for a post-mitigation model that must be rejected
pub fn mitigated_model_json() -> String {
    serde_json::json!({
        "kind": "threshold_mitigated",
        "estimator": {
            "features": ["score"],
            "weights": [20.0],
            "intercept": -10.0,
        },
        "sensitive_column": "sex",
        "group_thresholds": {"m": 0.6, "f": 0.4},
    })
    .to_string()
}

/// Write a DataFrame to a temp CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Write a model artifact JSON string to a temp file
pub fn create_temp_model(json: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let model_path = temp_dir.path().join("model.json");
    std::fs::write(&model_path, json).unwrap();
    (temp_dir, model_path)
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}
