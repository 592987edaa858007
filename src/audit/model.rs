//! Predictive model artifacts and the prediction adapter
//!
//! Model files are JSON artifacts in one of a closed set of shapes.
//! Every shape is resolved once at load time into a normalized
//! capability record, so the rest of the pipeline never probes for
//! capabilities at call sites.

use std::collections::HashMap;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::AuditError;
use super::features::encode_features_for_inference;

/// Keys probed for the inner model of a bundle artifact.
const BUNDLE_KEYS: [&str; 4] = ["model", "estimator", "base_model", "clf"];

/// Attributes probed for the inner model of a wrapper artifact.
const WRAPPER_ATTRS: [&str; 5] = ["model", "base_model", "estimator", "clf", "inner_model"];

fn default_threshold() -> f64 {
    0.5
}

/// A linear (logistic) classifier over named feature columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearEstimator {
    /// Feature column names, matched against the inference frame.
    pub features: Vec<String>,
    /// One weight per feature.
    pub weights: Vec<f64>,
    pub intercept: f64,
    /// Positive-class decision threshold on the predicted probability.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl LinearEstimator {
    fn validate(&self) -> Result<(), AuditError> {
        if self.features.is_empty() {
            return Err(AuditError::ModelNotPredictive {
                reason: "estimator declares no feature columns".to_string(),
            });
        }
        if self.features.len() != self.weights.len() {
            return Err(AuditError::ModelNotPredictive {
                reason: format!(
                    "estimator has {} features but {} weights",
                    self.features.len(),
                    self.weights.len()
                ),
            });
        }
        Ok(())
    }

    fn decision_scores(&self, df: &DataFrame) -> Result<Vec<f64>, AuditError> {
        let missing: Vec<String> = self
            .features
            .iter()
            .filter(|f| df.column(f).is_err())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(AuditError::ColumnNotFound { columns: missing });
        }

        let mut scores = vec![self.intercept; df.height()];
        for (feature, weight) in self.features.iter().zip(self.weights.iter()) {
            let float_col = df.column(feature)?.cast(&DataType::Float64)?;
            for (score, value) in scores.iter_mut().zip(float_col.f64()?.into_iter()) {
                *score += weight * value.unwrap_or(0.0);
            }
        }
        Ok(scores)
    }

    /// Predict discrete labels. Non-finite scores coerce to label 0.
    pub fn predict(&self, df: &DataFrame) -> Result<Vec<i32>, AuditError> {
        let scores = self.decision_scores(df)?;
        Ok(scores
            .into_iter()
            .map(|z| {
                if !z.is_finite() {
                    return 0;
                }
                (sigmoid(z) >= self.threshold) as i32
            })
            .collect())
    }

    /// Positive-class probabilities. Non-finite scores coerce to 0.0.
    pub fn predict_proba(&self, df: &DataFrame) -> Result<Vec<f64>, AuditError> {
        let scores = self.decision_scores(df)?;
        Ok(scores
            .into_iter()
            .map(|z| if z.is_finite() { sigmoid(z) } else { 0.0 })
            .collect())
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// The feature-preprocessing stage of a pipeline artifact.
///
/// Columns listed in `categories` map values to their index in the
/// recorded category list; unseen values and nulls code to -1. Unlisted
/// columns are coerced to numeric with nulls as 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEncoder {
    pub categories: HashMap<String, Vec<String>>,
}

impl PipelineEncoder {
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame, AuditError> {
        let mut columns: Vec<Column> = Vec::with_capacity(df.width());

        for col in df.get_columns() {
            let name = col.name().to_string();
            let column = match self.categories.get(&name) {
                Some(known) => {
                    let values = super::target::column_to_string_vec(col)?;
                    let codes: Vec<i64> = values
                        .iter()
                        .map(|v| match v {
                            Some(s) => known
                                .iter()
                                .position(|c| c == s)
                                .map(|i| i as i64)
                                .unwrap_or(-1),
                            None => -1,
                        })
                        .collect();
                    Column::new(col.name().clone(), codes)
                }
                None => match col.cast(&DataType::Float64) {
                    Ok(float_col) => {
                        let values: Vec<f64> = float_col
                            .f64()?
                            .into_iter()
                            .map(|v| v.filter(|x| x.is_finite()).unwrap_or(0.0))
                            .collect();
                        Column::new(col.name().clone(), values)
                    }
                    Err(_) => col.clone(),
                },
            };
            columns.push(column);
        }

        Ok(DataFrame::new(columns)?)
    }
}

/// Closed set of model-artifact shapes accepted by the audit.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    /// A bare estimator; the adapter applies fallback feature encoding.
    Estimator(LinearEstimator),
    /// An estimator composed with its own preprocessing stage; the
    /// feature matrix is passed through unmodified.
    Pipeline {
        encoder: PipelineEncoder,
        estimator: LinearEstimator,
    },
    /// A dictionary bundle wrapping an inner artifact under a known key.
    Bundle {
        #[serde(flatten)]
        entries: HashMap<String, Value>,
    },
    /// A generic wrapper holding an inner artifact under a known attribute.
    Wrapper {
        #[serde(flatten)]
        attrs: HashMap<String, Value>,
    },
    /// A post-processing model with group-conditional thresholds; requires
    /// group membership at prediction time and is rejected for auditing.
    ThresholdMitigated {
        estimator: LinearEstimator,
        sensitive_column: String,
        group_thresholds: HashMap<String, f64>,
    },
    /// A feature transformer with no prediction capability.
    Transformer { features: Vec<String> },
}

/// Normalized capability record produced by [`resolve_model`].
#[derive(Debug, Clone)]
pub struct ResolvedModel {
    pub estimator: LinearEstimator,
    /// `Some` when the model owns its preprocessing stage.
    pub encoder: Option<PipelineEncoder>,
    /// Human-readable shape description, e.g. `DictBundle(LinearEstimator)`.
    pub model_type: String,
    pub supports_proba: bool,
    /// Post-mitigation models need group membership to predict and are
    /// inappropriate for pre-mitigation auditing.
    pub requires_group_membership: bool,
}

impl ResolvedModel {
    pub fn owns_encoding(&self) -> bool {
        self.encoder.is_some()
    }
}

/// Resolve an artifact into its capability record, unwrapping bundle and
/// wrapper shapes.
pub fn resolve_model(artifact: ModelArtifact) -> Result<ResolvedModel, AuditError> {
    match artifact {
        ModelArtifact::Estimator(estimator) => {
            estimator.validate()?;
            Ok(ResolvedModel {
                estimator,
                encoder: None,
                model_type: "LinearEstimator".to_string(),
                supports_proba: true,
                requires_group_membership: false,
            })
        }
        ModelArtifact::Pipeline { encoder, estimator } => {
            estimator.validate()?;
            Ok(ResolvedModel {
                estimator,
                encoder: Some(encoder),
                model_type: "Pipeline(LinearEstimator)".to_string(),
                supports_proba: true,
                requires_group_membership: false,
            })
        }
        ModelArtifact::Bundle { entries } => {
            let inner = extract_inner(&entries, &BUNDLE_KEYS).ok_or_else(|| {
                AuditError::ModelNotPredictive {
                    reason: "bundle does not contain an underlying model under a known key"
                        .to_string(),
                }
            })?;
            let resolved = resolve_model(inner)?;
            Ok(ResolvedModel {
                model_type: format!("DictBundle({})", resolved.model_type),
                ..resolved
            })
        }
        ModelArtifact::Wrapper { attrs } => {
            let inner = extract_inner(&attrs, &WRAPPER_ATTRS).ok_or_else(|| {
                AuditError::ModelNotPredictive {
                    reason: "wrapper does not hold an underlying model under a known attribute"
                        .to_string(),
                }
            })?;
            let resolved = resolve_model(inner)?;
            Ok(ResolvedModel {
                model_type: format!("Wrapper({})", resolved.model_type),
                ..resolved
            })
        }
        ModelArtifact::ThresholdMitigated { estimator, .. } => {
            estimator.validate()?;
            Ok(ResolvedModel {
                estimator,
                encoder: None,
                model_type: "ThresholdMitigated".to_string(),
                supports_proba: true,
                requires_group_membership: true,
            })
        }
        ModelArtifact::Transformer { .. } => Err(AuditError::ModelNotPredictive {
            reason: "artifact is a feature transformer with no prediction capability".to_string(),
        }),
    }
}

fn extract_inner(entries: &HashMap<String, Value>, keys: &[&str]) -> Option<ModelArtifact> {
    for key in keys {
        if let Some(value) = entries.get(*key) {
            if let Ok(artifact) = serde_json::from_value(value.clone()) {
                return Some(artifact);
            }
        }
    }
    None
}

/// Produce discrete predicted labels for the full feature matrix.
///
/// Pipeline models receive the raw frame (they own their encoding);
/// everything else goes through the fallback feature encoder.
pub fn predict_labels(model: &ResolvedModel, features: &DataFrame) -> Result<Vec<i32>, AuditError> {
    if model.requires_group_membership {
        return Err(AuditError::InappropriateModel);
    }

    let encoded = match &model.encoder {
        Some(encoder) => encoder.transform(features)?,
        None => encode_features_for_inference(features)?,
    };
    model.estimator.predict(&encoded)
}

/// Positive-class probabilities, when the model supports them.
pub fn predict_proba_positive(
    model: &ResolvedModel,
    features: &DataFrame,
) -> Result<Option<Vec<f64>>, AuditError> {
    if model.requires_group_membership {
        return Err(AuditError::InappropriateModel);
    }
    if !model.supports_proba {
        return Ok(None);
    }

    let encoded = match &model.encoder {
        Some(encoder) => encoder.transform(features)?,
        None => encode_features_for_inference(features)?,
    };
    model.estimator.predict_proba(&encoded).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_estimator() -> LinearEstimator {
        LinearEstimator {
            features: vec!["x".to_string()],
            weights: vec![2.0],
            intercept: -1.0,
            threshold: 0.5,
        }
    }

    #[test]
    fn test_plain_estimator_predicts_labels() {
        let df = df! {
            "x" => [0.0f64, 1.0, 2.0],
        }
        .unwrap();

        let model = resolve_model(ModelArtifact::Estimator(simple_estimator())).unwrap();
        let labels = predict_labels(&model, &df).unwrap();
        // z = 2x - 1: -1 -> 0, 1 -> 1, 3 -> 1
        assert_eq!(labels, vec![0, 1, 1]);
    }

    #[test]
    fn test_predict_proba_monotone_in_score() {
        let df = df! {
            "x" => [0.0f64, 1.0, 2.0],
        }
        .unwrap();

        let model = resolve_model(ModelArtifact::Estimator(simple_estimator())).unwrap();
        let proba = predict_proba_positive(&model, &df).unwrap().unwrap();
        assert!(proba[0] < proba[1]);
        assert!(proba[1] < proba[2]);
        assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_bundle_resolves_inner_estimator() {
        let json = serde_json::json!({
            "kind": "bundle",
            "threshold_note": 0.6,
            "model": {
                "kind": "estimator",
                "features": ["x"],
                "weights": [2.0],
                "intercept": -1.0,
            },
        });

        let artifact: ModelArtifact = serde_json::from_value(json).unwrap();
        let model = resolve_model(artifact).unwrap();
        assert_eq!(model.model_type, "DictBundle(LinearEstimator)");
        assert!(!model.requires_group_membership);
    }

    #[test]
    fn test_wrapper_resolves_inner_estimator() {
        let json = serde_json::json!({
            "kind": "wrapper",
            "inner_model": {
                "kind": "estimator",
                "features": ["x"],
                "weights": [1.0],
                "intercept": 0.0,
            },
        });

        let artifact: ModelArtifact = serde_json::from_value(json).unwrap();
        let model = resolve_model(artifact).unwrap();
        assert_eq!(model.model_type, "Wrapper(LinearEstimator)");
    }

    #[test]
    fn test_bundle_without_known_key_is_not_predictive() {
        let json = serde_json::json!({
            "kind": "bundle",
            "notes": "nothing useful here",
        });

        let artifact: ModelArtifact = serde_json::from_value(json).unwrap();
        let result = resolve_model(artifact);
        assert!(matches!(
            result,
            Err(AuditError::ModelNotPredictive { .. })
        ));
    }

    #[test]
    fn test_transformer_is_not_predictive() {
        let artifact = ModelArtifact::Transformer {
            features: vec!["x".to_string()],
        };
        assert!(matches!(
            resolve_model(artifact),
            Err(AuditError::ModelNotPredictive { .. })
        ));
    }

    #[test]
    fn test_mitigated_model_resolves_but_cannot_predict() {
        let artifact = ModelArtifact::ThresholdMitigated {
            estimator: simple_estimator(),
            sensitive_column: "sex".to_string(),
            group_thresholds: HashMap::new(),
        };
        let model = resolve_model(artifact).unwrap();
        assert!(model.requires_group_membership);

        let df = df! { "x" => [1.0f64] }.unwrap();
        assert!(matches!(
            predict_labels(&model, &df),
            Err(AuditError::InappropriateModel)
        ));
    }

    #[test]
    fn test_weight_arity_mismatch_rejected() {
        let artifact = ModelArtifact::Estimator(LinearEstimator {
            features: vec!["x".to_string(), "y".to_string()],
            weights: vec![1.0],
            intercept: 0.0,
            threshold: 0.5,
        });
        assert!(matches!(
            resolve_model(artifact),
            Err(AuditError::ModelNotPredictive { .. })
        ));
    }

    #[test]
    fn test_pipeline_owns_encoding() {
        let mut categories = HashMap::new();
        categories.insert(
            "color".to_string(),
            vec!["blue".to_string(), "red".to_string()],
        );

        let artifact = ModelArtifact::Pipeline {
            encoder: PipelineEncoder { categories },
            estimator: LinearEstimator {
                features: vec!["color".to_string()],
                weights: vec![10.0],
                intercept: -5.0,
                threshold: 0.5,
            },
        };
        let model = resolve_model(artifact).unwrap();
        assert!(model.owns_encoding());

        // red codes to 1 -> z = 5 -> positive; blue codes to 0 -> z = -5
        let df = df! {
            "color" => ["red", "blue", "red"],
        }
        .unwrap();
        let labels = predict_labels(&model, &df).unwrap();
        assert_eq!(labels, vec![1, 0, 1]);
    }

    #[test]
    fn test_missing_feature_column_reported() {
        let df = df! {
            "other" => [1.0f64],
        }
        .unwrap();

        let model = resolve_model(ModelArtifact::Estimator(simple_estimator())).unwrap();
        let result = predict_labels(&model, &df);
        match result {
            Err(AuditError::ColumnNotFound { columns }) => {
                assert_eq!(columns, vec!["x".to_string()]);
            }
            _ => panic!("Expected ColumnNotFound"),
        }
    }
}
