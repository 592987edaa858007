//! Fairness metric calculation
//!
//! Per-group selection rates and true-positive rates, reduced to the
//! three summary disparity metrics: demographic parity difference,
//! equal opportunity difference, and disparate impact ratio.

use serde::Serialize;

use super::config::AuditConfig;

/// Per-group rates and sample count.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GroupMetrics {
    pub selection_rate: f64,
    pub true_positive_rate: f64,
    pub sample_count: usize,
}

/// Fraction of predictions that are positive.
pub fn selection_rate(y_pred: &[i32]) -> f64 {
    if y_pred.is_empty() {
        return 0.0;
    }
    y_pred.iter().filter(|&&p| p == 1).count() as f64 / y_pred.len() as f64
}

/// Fraction of truly-positive instances predicted positive.
///
/// Returns 0.0 when there are no positive ground-truth instances. That is
/// an approximation chosen for compatibility, not a mathematical
/// necessity; the quantity is strictly undefined there.
pub fn true_positive_rate(y_true: &[i32], y_pred: &[i32]) -> f64 {
    let positives = y_true.iter().filter(|&&t| t == 1).count();
    if positives == 0 {
        return 0.0;
    }
    let true_positives = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(&t, &p)| t == 1 && p == 1)
        .count();
    true_positives as f64 / positives as f64
}

/// Max-minus-min selection rate across groups.
pub fn demographic_parity_difference(group_rates: &[f64]) -> f64 {
    spread(group_rates)
}

/// Max-minus-min true-positive rate across groups.
pub fn equal_opportunity_difference(group_tprs: &[f64]) -> f64 {
    spread(group_tprs)
}

/// Min-over-max selection rate across groups.
///
/// Returns 0.0 when the maximum rate is 0 (nothing is ever selected);
/// like the TPR fallback this is a documented convention, not a theorem.
pub fn disparate_impact_ratio(group_rates: &[f64]) -> f64 {
    let max = fold_max(group_rates);
    if max == 0.0 {
        return 0.0;
    }
    fold_min(group_rates) / max
}

fn spread(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    fold_max(values) - fold_min(values)
}

fn fold_max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn fold_min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Compute per-group metrics in first-appearance group order.
///
/// The order never affects the max/min reductions, but it keeps warning
/// text stable and reproducible.
pub fn compute_group_metrics(
    groups: &[String],
    y_true: &[i32],
    y_pred: &[i32],
) -> Vec<(String, GroupMetrics)> {
    let mut order: Vec<String> = Vec::new();
    for g in groups {
        if !order.contains(g) {
            order.push(g.clone());
        }
    }

    order
        .into_iter()
        .map(|group| {
            let mut y_g: Vec<i32> = Vec::new();
            let mut y_p: Vec<i32> = Vec::new();
            for ((label, &t), &p) in groups.iter().zip(y_true.iter()).zip(y_pred.iter()) {
                if *label == group {
                    y_g.push(t);
                    y_p.push(p);
                }
            }
            let metrics = GroupMetrics {
                selection_rate: selection_rate(&y_p),
                true_positive_rate: true_positive_rate(&y_g, &y_p),
                sample_count: y_g.len(),
            };
            (group, metrics)
        })
        .collect()
}

/// Advisory warnings for small or under-represented groups, in group
/// discovery order. Never aborts computation.
pub fn group_warnings(
    attribute: &str,
    groups: &[(String, GroupMetrics)],
    total_rows: usize,
    config: &AuditConfig,
) -> Vec<String> {
    let mut warnings = Vec::new();

    for (group, metrics) in groups {
        if metrics.sample_count < config.min_group_size {
            warnings.push(format!(
                "Group '{}' in sensitive attribute '{}' has low sample size ({} samples). \
                 Fairness metrics may be unstable.",
                group, attribute, metrics.sample_count
            ));
        }

        if total_rows > 0 {
            let proportion = metrics.sample_count as f64 / total_rows as f64;
            if proportion < config.min_group_proportion {
                warnings.push(format!(
                    "Group '{}' in sensitive attribute '{}' represents only {:.2}% of the dataset.",
                    group,
                    attribute,
                    proportion * 100.0
                ));
            }
        }
    }

    warnings
}
