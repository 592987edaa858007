//! Error types for the fairness audit pipeline.
//!
//! Validation errors mean the caller can fix the request (re-select columns,
//! supply the base model); `Internal` wraps unexpected computation failures
//! so the two are distinguishable downstream.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that can occur while running a fairness audit.
#[derive(Debug, Error)]
pub enum AuditError {
    /// One or more requested columns are absent from the dataset.
    /// All missing names are reported at once.
    #[error("Column(s) not found in dataset: {}", columns.join(", "))]
    ColumnNotFound { columns: Vec<String> },

    /// The target column has more than 3 distinct classes after cleaning.
    #[error(
        "Target column has {classes} unique values; \
         fairness audit supports binary to small multiclass targets only"
    )]
    UnsupportedTargetCardinality { classes: usize },

    /// A sensitive column cannot form at least two comparison groups.
    #[error("Sensitive column '{column}' has fewer than 2 unique values")]
    InsufficientGroupCardinality { column: String },

    /// The model is a post-mitigation model (requires group membership at
    /// prediction time). Auditing it would not diagnose the base model.
    #[error(
        "Model is a post-mitigation model. \
         Bias detection should be performed on the original base model"
    )]
    InappropriateModel,

    /// The model exposes no usable prediction capability.
    #[error("Model does not support prediction: {reason}")]
    ModelNotPredictive { reason: String },

    /// The dataset has zero rows.
    #[error("Dataset contains no rows")]
    EmptyDataset,

    /// The dataset file could not be read or parsed.
    #[error("Failed to load dataset '{path}': {reason}")]
    DatasetLoad { path: String, reason: String },

    /// The model artifact could not be read or parsed.
    #[error("Failed to load model '{path}': {reason}")]
    ModelLoad { path: String, reason: String },

    /// Unexpected computation failure; a system fault, not an input problem.
    #[error("Internal computation error: {0}")]
    Internal(#[from] PolarsError),
}

impl AuditError {
    /// Whether the error is recoverable by fixing the request inputs.
    pub fn is_validation(&self) -> bool {
        !matches!(self, AuditError::Internal(_))
    }
}
