//! Audit orchestration
//!
//! Sequences the pipeline once per request: health check, target
//! encoding, sensitive validation, a single shared prediction pass, then
//! an independent per-attribute fold into the final report.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use super::bootstrap::bootstrap_ci;
use super::config::AuditConfig;
use super::decision::evaluate_bias;
use super::error::AuditError;
use super::health::validate_dataset_health;
use super::metrics::{
    compute_group_metrics, demographic_parity_difference, disparate_impact_ratio,
    equal_opportunity_difference, group_warnings, selection_rate,
};
use super::model::{predict_labels, ResolvedModel};
use super::sensitive::{group_labels, prepare_sensitive_columns, validate_sensitive_columns};
use super::target::encode_target_column;
use crate::report::audit_report::{AttributeAudit, AuditReport, NextStep};

/// Run a complete fairness audit over an in-memory dataset and a resolved
/// model.
///
/// Predictions are computed once and shared across all sensitive
/// attributes. Attributes are processed in the user-supplied
/// (post-substitution) order; with a fixed seed each attribute derives
/// its own RNG so the parallel fan-out stays deterministic.
pub fn run_audit(
    df: &DataFrame,
    model: &ResolvedModel,
    target_column: &str,
    sensitive_columns: &[String],
    config: &AuditConfig,
) -> Result<AuditReport, AuditError> {
    // Post-mitigation models are rejected before any computation
    if model.requires_group_membership {
        return Err(AuditError::InappropriateModel);
    }

    let dataset_health = validate_dataset_health(df)?;

    let (df, target_encoding) = encode_target_column(df, target_column)?;

    let sensitive_attributes = validate_sensitive_columns(&df, sensitive_columns)?;
    let (df, resolved_columns) = prepare_sensitive_columns(&df, sensitive_columns)?;

    let y_true: Vec<i32> = df
        .column(target_column)?
        .cast(&DataType::Int32)?
        .i32()?
        .into_iter()
        .map(|v| v.unwrap_or(0))
        .collect();

    let features = df.drop(target_column)?;
    let y_pred = predict_labels(model, &features)?;

    let mut warnings: Vec<String> = Vec::new();
    let positive_rate = selection_rate(&y_pred);
    if positive_rate < 1.0 - config.skew_threshold || positive_rate > config.skew_threshold {
        warnings.push(
            "Model predictions are highly skewed towards a single class. \
             Fairness metrics may be misleading."
                .to_string(),
        );
    }

    let total_rows = df.height();

    // Attributes are independent; collect preserves input order so the
    // tie-breaking fold below sees them as the user supplied them.
    let per_attribute: Vec<Result<(String, AttributeAudit, Vec<String>), AuditError>> =
        resolved_columns
            .par_iter()
            .enumerate()
            .map(|(index, attribute)| {
                audit_attribute(
                    &df, attribute, index, &y_true, &y_pred, total_rows, config,
                )
            })
            .collect();

    let mut sensitive_audit: BTreeMap<String, AttributeAudit> = BTreeMap::new();
    let mut max_severity = 0.0f64;
    let mut bias_driver: Option<String> = None;

    for entry in per_attribute {
        let (attribute, audit, attribute_warnings) = entry?;
        warnings.extend(attribute_warnings);
        if audit.severity_score > max_severity {
            max_severity = audit.severity_score;
            bias_driver = Some(attribute.clone());
        }
        sensitive_audit.insert(attribute, audit);
    }

    // Set semantics for warnings; sorted output keeps the report stable
    let warnings: Vec<String> = warnings
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let bias_present = max_severity > 0.0;

    Ok(AuditReport {
        dataset_health,
        target_encoding,
        sensitive_attributes,
        bias_present,
        bias_driver,
        bias_severity_score: max_severity,
        sensitive_audit,
        warnings,
        next_step: if bias_present {
            NextStep::BiasMitigation
        } else {
            NextStep::ModelOptimization
        },
    })
}

fn audit_attribute(
    df: &DataFrame,
    attribute: &str,
    index: usize,
    y_true: &[i32],
    y_pred: &[i32],
    total_rows: usize,
    config: &AuditConfig,
) -> Result<(String, AttributeAudit, Vec<String>), AuditError> {
    let labels = group_labels(df, attribute)?;
    let groups = compute_group_metrics(&labels, y_true, y_pred);
    let attribute_warnings = group_warnings(attribute, &groups, total_rows, config);

    let rates: Vec<f64> = groups.iter().map(|(_, m)| m.selection_rate).collect();
    let tprs: Vec<f64> = groups.iter().map(|(_, m)| m.true_positive_rate).collect();

    let dpd = demographic_parity_difference(&rates);
    let eod = equal_opportunity_difference(&tprs);
    let dir = disparate_impact_ratio(&rates);
    let decision = evaluate_bias(dpd, eod, dir);

    let (dpd_ci, eod_ci) = if config.enable_bootstrap {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => StdRng::from_entropy(),
        };
        (
            bootstrap_ci(&rates, config.bootstrap_samples, config.ci_level, &mut rng),
            bootstrap_ci(&tprs, config.bootstrap_samples, config.ci_level, &mut rng),
        )
    } else {
        (None, None)
    };

    let audit = AttributeAudit {
        selection_rate: groups
            .iter()
            .map(|(g, m)| (g.clone(), m.selection_rate))
            .collect(),
        true_positive_rate: groups
            .iter()
            .map(|(g, m)| (g.clone(), m.true_positive_rate))
            .collect(),
        dpd: round4(dpd),
        eod: round4(eod),
        dir: round4(dir),
        dpd_ci,
        eod_ci,
        bias_present: decision.bias_present,
        severity_score: decision.severity_score,
        violations: decision.violations,
    };

    Ok((attribute.to_string(), audit, attribute_warnings))
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}
