//! Input loading for datasets (CSV/Parquet) and model artifacts (JSON)

use std::path::Path;

use polars::prelude::*;

use super::error::AuditError;
use super::model::{resolve_model, ModelArtifact, ResolvedModel};

/// Load a dataset from a file (CSV or Parquet based on extension).
///
/// `infer_schema_length` of 0 requests a full-table scan for CSV schema
/// inference.
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<DataFrame, AuditError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let load_err = |reason: String| AuditError::DatasetLoad {
        path: path.display().to_string(),
        reason,
    };

    let lf = match extension.as_str() {
        "csv" => {
            let infer = if infer_schema_length == 0 {
                None
            } else {
                Some(infer_schema_length)
            };
            LazyCsvReader::new(path)
                .with_infer_schema_length(infer)
                .finish()
                .map_err(|e| load_err(e.to_string()))?
        }
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .map_err(|e| load_err(e.to_string()))?,
        _ => {
            return Err(load_err(format!(
                "Unsupported file format: {}. Supported formats: csv, parquet",
                extension
            )))
        }
    };

    lf.collect().map_err(|e| load_err(e.to_string()))
}

/// Load and resolve a model artifact from a JSON file.
pub fn load_model(path: &Path) -> Result<ResolvedModel, AuditError> {
    let load_err = |reason: String| AuditError::ModelLoad {
        path: path.display().to_string(),
        reason,
    };

    let raw = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
    let artifact: ModelArtifact = serde_json::from_str(&raw)
        .map_err(|e| load_err(format!("not a valid model artifact: {}", e)))?;

    resolve_model(artifact)
}
