//! Sensitive attribute validation and preprocessing
//!
//! Checks that every requested sensitive column exists and can form at
//! least two comparison groups, derives banded age groups from numeric
//! age columns, and extracts stable string group labels for grouping.

use std::collections::{BTreeMap, HashSet};

use polars::prelude::*;
use serde::Serialize;

use super::error::AuditError;
use super::target::column_to_string_vec;

/// Bin edges for numeric age columns, right-inclusive with the lowest
/// edge inclusive.
pub const AGE_BIN_EDGES: [f64; 7] = [0.0, 25.0, 35.0, 45.0, 55.0, 65.0, 120.0];

/// Band labels matching `AGE_BIN_EDGES` intervals.
pub const AGE_BIN_LABELS: [&str; 6] = ["18-25", "26-35", "36-45", "46-55", "56-65", "65+"];

/// Group label substituted for null sensitive values.
pub const NULL_GROUP_LABEL: &str = "null";

/// Cardinality audit of a single sensitive column.
#[derive(Debug, Clone, Serialize)]
pub struct SensitiveColumnAudit {
    pub unique_group_count: usize,
    /// Distinct group labels in first-appearance order.
    pub group_labels: Vec<String>,
}

/// Validate the requested sensitive columns against the dataset.
///
/// Missing columns are reported in a single batch error. Each present
/// column must have at least 2 distinct non-null values.
pub fn validate_sensitive_columns(
    df: &DataFrame,
    sensitive_columns: &[String],
) -> Result<BTreeMap<String, SensitiveColumnAudit>, AuditError> {
    let column_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let missing: Vec<String> = sensitive_columns
        .iter()
        .filter(|c| !column_names.contains(c))
        .cloned()
        .collect();

    if !missing.is_empty() {
        return Err(AuditError::ColumnNotFound { columns: missing });
    }

    let mut audits = BTreeMap::new();

    for col_name in sensitive_columns {
        let col = df.column(col_name)?;
        let values = column_to_string_vec(col)?;

        let mut seen = HashSet::new();
        let mut group_labels = Vec::new();
        for value in values.into_iter().flatten() {
            if seen.insert(value.clone()) {
                group_labels.push(value);
            }
        }

        if group_labels.len() < 2 {
            return Err(AuditError::InsufficientGroupCardinality {
                column: col_name.clone(),
            });
        }

        audits.insert(
            col_name.clone(),
            SensitiveColumnAudit {
                unique_group_count: group_labels.len(),
                group_labels,
            },
        );
    }

    Ok(audits)
}

fn age_band(age: f64) -> Option<&'static str> {
    if age.is_nan() || age < AGE_BIN_EDGES[0] || age > AGE_BIN_EDGES[6] {
        return None;
    }
    for (i, label) in AGE_BIN_LABELS.iter().enumerate() {
        if age <= AGE_BIN_EDGES[i + 1] {
            return Some(label);
        }
    }
    None
}

/// Derive a banded `<col>_group` column from a numeric age column.
///
/// Non-numeric columns are returned untouched. Values outside the bin
/// range become null.
pub fn bin_age_column(df: &DataFrame, col_name: &str) -> Result<DataFrame, AuditError> {
    let col = match df.column(col_name) {
        Ok(c) => c,
        Err(_) => return Ok(df.clone()),
    };

    if !col.dtype().is_primitive_numeric() {
        return Ok(df.clone());
    }

    let float_col = col.cast(&DataType::Float64)?;
    let bands: Vec<Option<&str>> = float_col
        .f64()?
        .into_iter()
        .map(|v| v.and_then(age_band))
        .collect();

    let mut binned = df.clone();
    binned.with_column(Column::new(format!("{}_group", col_name).into(), bands))?;
    Ok(binned)
}

/// Apply the age special case across the sensitive column list.
///
/// The first column whose trimmed name equals "age" case-insensitively and
/// whose values are numeric is replaced by its derived `<name>_group`
/// column for all downstream steps.
pub fn prepare_sensitive_columns(
    df: &DataFrame,
    sensitive_columns: &[String],
) -> Result<(DataFrame, Vec<String>), AuditError> {
    let mut resolved: Vec<String> = sensitive_columns.to_vec();
    let mut prepared = df.clone();

    for col_name in sensitive_columns {
        if !col_name.trim().eq_ignore_ascii_case("age") {
            continue;
        }
        let is_numeric = df
            .column(col_name)
            .map(|c| c.dtype().is_primitive_numeric())
            .unwrap_or(false);
        if !is_numeric {
            continue;
        }

        prepared = bin_age_column(&prepared, col_name)?;
        let derived = format!("{}_group", col_name);
        resolved = resolved
            .iter()
            .map(|c| if c == col_name { derived.clone() } else { c.clone() })
            .collect();
        break;
    }

    Ok((prepared, resolved))
}

/// Extract per-row group labels for a sensitive column as strings.
///
/// String typing keeps grouping semantics stable across numeric and
/// categorical columns; nulls become the `NULL_GROUP_LABEL` group.
pub fn group_labels(df: &DataFrame, col_name: &str) -> Result<Vec<String>, AuditError> {
    let col = df.column(col_name).map_err(|_| AuditError::ColumnNotFound {
        columns: vec![col_name.to_string()],
    })?;
    let values = column_to_string_vec(col)?;
    Ok(values
        .into_iter()
        .map(|v| v.unwrap_or_else(|| NULL_GROUP_LABEL.to_string()))
        .collect())
}
