//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

use crate::audit::AuditConfig;

/// Biaslens - Audit a trained classifier for group-level outcome disparities
#[derive(Parser, Debug)]
#[command(name = "biaslens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Dataset file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Model artifact file path (JSON)
    #[arg(short, long)]
    pub model: PathBuf,

    /// Target label column name
    #[arg(short, long)]
    pub target: String,

    /// Sensitive attribute columns to audit (comma-separated).
    /// A numeric column named "age" is automatically banded into age groups.
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub sensitive: Vec<String>,

    /// Write the full audit report as JSON to this path
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Groups smaller than this trigger a low-sample warning
    #[arg(long, default_value = "30")]
    pub min_group_size: usize,

    /// Groups representing a smaller share of rows than this trigger an
    /// under-representation warning
    #[arg(long, default_value = "0.05")]
    pub min_group_proportion: f64,

    /// Positive-prediction rates outside [1-threshold, threshold] trigger
    /// a skew warning
    #[arg(long, default_value = "0.95")]
    pub skew_threshold: f64,

    /// Number of bootstrap resamples per confidence interval
    #[arg(long, default_value = "100")]
    pub bootstrap_samples: usize,

    /// Confidence level of bootstrap intervals, in percent
    #[arg(long, default_value = "95")]
    pub ci_level: f64,

    /// Skip bootstrap confidence intervals entirely
    #[arg(long, default_value = "false")]
    pub no_bootstrap: bool,

    /// Fixed RNG seed for reproducible bootstrap intervals
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of rows to use for CSV schema inference.
    /// Use 0 for a full table scan (slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

impl Cli {
    /// Build the audit configuration from the parsed arguments.
    pub fn audit_config(&self) -> AuditConfig {
        AuditConfig {
            min_group_size: self.min_group_size,
            min_group_proportion: self.min_group_proportion,
            skew_threshold: self.skew_threshold,
            enable_bootstrap: !self.no_bootstrap,
            bootstrap_samples: self.bootstrap_samples,
            ci_level: self.ci_level,
            seed: self.seed,
        }
    }
}
