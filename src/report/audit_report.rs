//! Audit report structures and JSON export
//!
//! The field names here are the public contract: layers forwarding the
//! report (HTTP handlers, persistence) must not rename them.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::audit::config::AuditConfig;
use crate::audit::decision::Violations;
use crate::audit::health::DatasetHealth;
use crate::audit::sensitive::SensitiveColumnAudit;
use crate::audit::target::TargetEncoding;

/// Recommended follow-up after the audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    BiasMitigation,
    ModelOptimization,
}

impl std::fmt::Display for NextStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NextStep::BiasMitigation => write!(f, "bias_mitigation"),
            NextStep::ModelOptimization => write!(f, "model_optimization"),
        }
    }
}

/// Fairness result and decision for one sensitive attribute.
#[derive(Debug, Clone, Serialize)]
pub struct AttributeAudit {
    /// Per-group selection rates.
    pub selection_rate: BTreeMap<String, f64>,
    /// Per-group true-positive rates.
    pub true_positive_rate: BTreeMap<String, f64>,
    pub dpd: f64,
    pub eod: f64,
    pub dir: f64,
    /// Bootstrap interval around the mean group selection rate.
    pub dpd_ci: Option<(f64, f64)>,
    /// Bootstrap interval around the mean group true-positive rate.
    pub eod_ci: Option<(f64, f64)>,
    pub bias_present: bool,
    pub severity_score: f64,
    pub violations: Violations,
}

/// Complete output of one audit request.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub dataset_health: DatasetHealth,
    pub target_encoding: TargetEncoding,
    /// Cardinality audits keyed by the requested column names.
    pub sensitive_attributes: BTreeMap<String, SensitiveColumnAudit>,
    pub bias_present: bool,
    /// Attribute with the highest severity; first encountered wins ties.
    pub bias_driver: Option<String>,
    pub bias_severity_score: f64,
    /// Per-attribute results keyed by post-substitution column names.
    pub sensitive_audit: BTreeMap<String, AttributeAudit>,
    /// Deduplicated advisory warnings.
    pub warnings: Vec<String>,
    pub next_step: NextStep,
}

/// Provenance attached to an exported report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub timestamp: String,
    pub biaslens_version: String,
    pub dataset_file: String,
    pub model_file: String,
    pub model_type: String,
    pub target_column: String,
    pub config: AuditConfig,
}

/// Full exported document: metadata plus the audit report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    pub metadata: ReportMetadata,
    pub audit: AuditReport,
}

impl ReportDocument {
    pub fn new(
        audit: AuditReport,
        dataset_file: &Path,
        model_file: &Path,
        model_type: &str,
        target_column: &str,
        config: &AuditConfig,
    ) -> Self {
        Self {
            metadata: ReportMetadata {
                timestamp: Utc::now().to_rfc3339(),
                biaslens_version: env!("CARGO_PKG_VERSION").to_string(),
                dataset_file: dataset_file.display().to_string(),
                model_file: model_file.display().to_string(),
                model_type: model_type.to_string(),
                target_column: target_column.to_string(),
                config: config.clone(),
            },
            audit,
        }
    }
}

/// Write the report document as pretty-printed JSON.
pub fn save_json_report(document: &ReportDocument, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(document)
        .context("Failed to serialize audit report to JSON")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_step_serializes_snake_case() {
        let json = serde_json::to_string(&NextStep::BiasMitigation).unwrap();
        assert_eq!(json, "\"bias_mitigation\"");
        let json = serde_json::to_string(&NextStep::ModelOptimization).unwrap();
        assert_eq!(json, "\"model_optimization\"");
    }

    #[test]
    fn test_ci_serializes_as_pair_or_null() {
        let mut audit = AttributeAudit {
            selection_rate: BTreeMap::new(),
            true_positive_rate: BTreeMap::new(),
            dpd: 0.1,
            eod: 0.0,
            dir: 0.9,
            dpd_ci: Some((0.2, 0.8)),
            eod_ci: None,
            bias_present: false,
            severity_score: 0.0,
            violations: Violations {
                dpd: false,
                eod: false,
                dir: false,
            },
        };

        let value = serde_json::to_value(&audit).unwrap();
        assert_eq!(value["dpd_ci"], serde_json::json!([0.2, 0.8]));
        assert!(value["eod_ci"].is_null());

        audit.dpd_ci = None;
        let value = serde_json::to_value(&audit).unwrap();
        assert!(value["dpd_ci"].is_null());
    }
}
