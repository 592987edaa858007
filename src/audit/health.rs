//! Dataset health summary
//!
//! An informational block computed before the fairness pipeline runs.
//! Only a zero-row dataset is fatal; duplicates and nulls are reported,
//! not enforced.

use std::collections::HashSet;

use polars::prelude::*;
use serde::Serialize;

use super::error::AuditError;
use super::target::column_to_string_vec;

/// Structural summary of the dataset under audit.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetHealth {
    pub rows: usize,
    pub columns: usize,
    pub duplicate_rows: usize,
    pub missing_values: usize,
    pub column_names: Vec<String>,
}

/// Compute the health summary, failing only on an empty dataset.
pub fn validate_dataset_health(df: &DataFrame) -> Result<DatasetHealth, AuditError> {
    if df.height() == 0 {
        return Err(AuditError::EmptyDataset);
    }

    let missing_values = df.get_columns().iter().map(|c| c.null_count()).sum();

    let column_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    Ok(DatasetHealth {
        rows: df.height(),
        columns: df.width(),
        duplicate_rows: count_duplicate_rows(df)?,
        missing_values,
        column_names,
    })
}

/// Count rows that are exact duplicates of an earlier row.
fn count_duplicate_rows(df: &DataFrame) -> Result<usize, AuditError> {
    let column_values: Vec<Vec<Option<String>>> = df
        .get_columns()
        .iter()
        .map(column_to_string_vec)
        .collect::<Result<_, _>>()?;

    let mut seen = HashSet::with_capacity(df.height());
    let mut duplicates = 0usize;

    for row in 0..df.height() {
        let mut key = String::new();
        for values in &column_values {
            match &values[row] {
                Some(v) => key.push_str(v),
                None => key.push('\u{1}'),
            }
            key.push('\u{1f}');
        }
        if !seen.insert(key) {
            duplicates += 1;
        }
    }

    Ok(duplicates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_counts() {
        let df = df! {
            "a" => [1i64, 2, 1, 1],
            "b" => [Some("x"), None, Some("x"), Some("y")],
        }
        .unwrap();

        let health = validate_dataset_health(&df).unwrap();
        assert_eq!(health.rows, 4);
        assert_eq!(health.columns, 2);
        // row 2 repeats row 0
        assert_eq!(health.duplicate_rows, 1);
        assert_eq!(health.missing_values, 1);
        assert_eq!(health.column_names, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let df = df! {
            "a" => Vec::<i64>::new(),
        }
        .unwrap();

        assert!(matches!(
            validate_dataset_health(&df),
            Err(AuditError::EmptyDataset)
        ));
    }

    #[test]
    fn test_null_rows_distinguished_from_literal_values() {
        let df = df! {
            "a" => [Some("x"), None],
        }
        .unwrap();

        let health = validate_dataset_health(&df).unwrap();
        assert_eq!(health.duplicate_rows, 0);
    }
}
