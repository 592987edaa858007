//! Audit configuration
//!
//! All thresholds live in one immutable object passed into the runner,
//! so the pipeline is testable with alternate values and carries no
//! ambient global state.

use serde::Serialize;

/// Configuration for a fairness audit run.
#[derive(Debug, Clone, Serialize)]
pub struct AuditConfig {
    /// Groups with fewer samples than this trigger a low-sample warning.
    pub min_group_size: usize,
    /// Groups representing a smaller share of the dataset than this
    /// trigger an under-representation warning.
    pub min_group_proportion: f64,
    /// Overall positive-prediction rates outside
    /// `[1 - skew_threshold, skew_threshold]` trigger a skew warning.
    pub skew_threshold: f64,
    /// Whether to compute bootstrap confidence intervals.
    pub enable_bootstrap: bool,
    /// Number of bootstrap resamples per interval.
    pub bootstrap_samples: usize,
    /// Confidence level of the bootstrap interval, in percent.
    pub ci_level: f64,
    /// Fixed RNG seed for reproducible bootstrap intervals.
    /// `None` draws fresh entropy per run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            min_group_size: 30,
            min_group_proportion: 0.05,
            skew_threshold: 0.95,
            enable_bootstrap: true,
            bootstrap_samples: 100,
            ci_level: 95.0,
            seed: None,
        }
    }
}
