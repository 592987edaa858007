//! Integration tests for model loading, resolution, and prediction

mod common;

use biaslens::audit::{
    load_model, predict_labels, predict_proba_positive, AuditError,
};
use polars::prelude::*;

#[test]
fn test_load_plain_model_from_file() {
    let (_dir, path) = common::create_temp_model(&common::plain_model_json());

    let model = load_model(&path).unwrap();
    assert_eq!(model.model_type, "LinearEstimator");
    assert!(!model.requires_group_membership);
    assert!(!model.owns_encoding());
}

#[test]
fn test_load_mitigated_model_resolves_with_flag() {
    let (_dir, path) = common::create_temp_model(&common::mitigated_model_json());

    let model = load_model(&path).unwrap();
    assert!(model.requires_group_membership);
    assert_eq!(model.model_type, "ThresholdMitigated");
}

#[test]
fn test_bundle_model_from_file() {
    let json = serde_json::json!({
        "kind": "bundle",
        "threshold": 0.6,
        "estimator": {
            "kind": "estimator",
            "features": ["score"],
            "weights": [20.0],
            "intercept": -10.0,
        },
    })
    .to_string();
    let (_dir, path) = common::create_temp_model(&json);

    let model = load_model(&path).unwrap();
    assert_eq!(model.model_type, "DictBundle(LinearEstimator)");
}

#[test]
fn test_transformer_model_rejected_at_load() {
    let json = serde_json::json!({
        "kind": "transformer",
        "features": ["score"],
    })
    .to_string();
    let (_dir, path) = common::create_temp_model(&json);

    let result = load_model(&path);
    assert!(matches!(result, Err(AuditError::ModelNotPredictive { .. })));
}

#[test]
fn test_prediction_over_mixed_features() {
    let (_dir, path) = common::create_temp_model(&common::plain_model_json());
    let model = load_model(&path).unwrap();

    // Extra categorical columns must not disturb prediction
    let df = df! {
        "score" => [0.9f64, 0.1, 0.7],
        "sex" => ["m", "f", "m"],
        "note" => [Some("ok"), None, Some("ok")],
    }
    .unwrap();

    let labels = predict_labels(&model, &df).unwrap();
    assert_eq!(labels, vec![1, 0, 1]);
}

#[test]
fn test_predict_proba_positive_available() {
    let (_dir, path) = common::create_temp_model(&common::plain_model_json());
    let model = load_model(&path).unwrap();

    let df = df! {
        "score" => [0.9f64, 0.1],
    }
    .unwrap();

    let proba = predict_proba_positive(&model, &df).unwrap().unwrap();
    assert_eq!(proba.len(), 2);
    assert!(proba[0] > 0.5);
    assert!(proba[1] < 0.5);
}

#[test]
fn test_null_scores_coerce_to_zero_label() {
    let (_dir, path) = common::create_temp_model(&common::plain_model_json());
    let model = load_model(&path).unwrap();

    // Null feature values coerce to 0 -> z = -10 -> label 0
    let df = df! {
        "score" => [Some(0.9f64), None],
    }
    .unwrap();

    let labels = predict_labels(&model, &df).unwrap();
    assert_eq!(labels, vec![1, 0]);
}
