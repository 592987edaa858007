//! Target column normalization and encoding
//!
//! This module cleans the ground-truth label column and encodes it to
//! integer codes: binary targets through a fixed equivalence table,
//! small multiclass targets through sorted lexical codes.

use std::collections::BTreeSet;

use polars::prelude::*;
use serde::Serialize;

use super::error::AuditError;

/// Normalized values treated as inconclusive; rows carrying them are dropped
/// before cardinality checks.
pub const DROP_VALUES: [&str; 5] = ["inconclusive", "unknown", "na", "n/a", ""];

/// Equivalence table for boolean-like and normal/abnormal-like targets.
const BINARY_MAP: [(&str, i32); 8] = [
    ("normal", 0),
    ("abnormal", 1),
    ("no", 0),
    ("yes", 1),
    ("false", 0),
    ("true", 1),
    ("0", 0),
    ("1", 1),
];

/// How the target column was encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditMode {
    Binary,
    Multiclass,
}

impl std::fmt::Display for AuditMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditMode::Binary => write!(f, "binary"),
            AuditMode::Multiclass => write!(f, "multiclass"),
        }
    }
}

/// Result of encoding the target column.
#[derive(Debug, Clone, Serialize)]
pub struct TargetEncoding {
    pub mode: AuditMode,
    /// Rows removed because their target value was inconclusive or null.
    pub dropped_rows: usize,
    /// Distinct classes remaining after cleaning.
    pub unique_classes: usize,
}

fn binary_code(value: &str) -> Option<i32> {
    BINARY_MAP
        .iter()
        .find(|(k, _)| *k == value)
        .map(|(_, code)| *code)
}

/// Encode the target column of `df` to integer codes.
///
/// Ordering matters: normalize, then drop inconclusive rows, then classify.
/// Classifying before dropping would corrupt the cardinality check.
/// Returns a new DataFrame; the caller's frame is never mutated.
pub fn encode_target_column(
    df: &DataFrame,
    target: &str,
) -> Result<(DataFrame, TargetEncoding), AuditError> {
    let target_col = df.column(target).map_err(|_| AuditError::ColumnNotFound {
        columns: vec![target.to_string()],
    })?;

    let normalized = normalize_target_values(target_col)?;

    // Rows with a droppable or null target are filtered out
    let keep: Vec<bool> = normalized
        .iter()
        .map(|v| match v {
            Some(s) => !DROP_VALUES.contains(&s.as_str()),
            None => false,
        })
        .collect();

    let kept_values: Vec<&String> = normalized
        .iter()
        .zip(keep.iter())
        .filter(|(_, &k)| k)
        .map(|(v, _)| v.as_ref().expect("kept rows have non-null targets"))
        .collect();

    let before_rows = df.height();
    let dropped_rows = before_rows - kept_values.len();

    let unique_values: BTreeSet<&str> = kept_values.iter().map(|s| s.as_str()).collect();
    let unique_classes = unique_values.len();

    let (codes, mode): (Vec<i32>, AuditMode) = if unique_values
        .iter()
        .all(|v| binary_code(v).is_some())
        && !unique_values.is_empty()
    {
        let codes = kept_values
            .iter()
            .map(|v| binary_code(v.as_str()).expect("value checked against binary table"))
            .collect();
        (codes, AuditMode::Binary)
    } else if unique_classes <= 3 {
        // Deterministic codes: sorted lexical order, not insertion order
        let class_codes: Vec<&str> = unique_values.iter().copied().collect();
        let codes = kept_values
            .iter()
            .map(|v| {
                class_codes
                    .iter()
                    .position(|c| c == &v.as_str())
                    .expect("value drawn from the unique set") as i32
            })
            .collect();
        (codes, AuditMode::Multiclass)
    } else {
        return Err(AuditError::UnsupportedTargetCardinality {
            classes: unique_classes,
        });
    };

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    let mut encoded = df.filter(&mask)?;
    encoded.with_column(Column::new(target.into(), codes))?;

    Ok((
        encoded,
        TargetEncoding {
            mode,
            dropped_rows,
            unique_classes,
        },
    ))
}

/// Normalize a target column to comparable string keys: strings are trimmed
/// and lower-cased, other types pass through a canonical string form.
fn normalize_target_values(col: &Column) -> Result<Vec<Option<String>>, AuditError> {
    let values = column_to_string_vec(col)?;
    if matches!(col.dtype(), DataType::String) {
        Ok(values
            .into_iter()
            .map(|v| v.map(|s| s.trim().to_lowercase()))
            .collect())
    } else {
        Ok(values)
    }
}

/// Convert a column to a Vec of Option<String> for comparison and grouping.
pub(crate) fn column_to_string_vec(col: &Column) -> Result<Vec<Option<String>>, AuditError> {
    let values: Vec<Option<String>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => {
            let cast = col.cast(&DataType::Int64)?;
            cast.i64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
            let cast = col.cast(&DataType::UInt64)?;
            cast.u64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::Float32 | DataType::Float64 => {
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.map(|n| format!("{}", n)))
                .collect()
        }
        DataType::Boolean => col
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| b.to_string()))
            .collect(),
        _ => {
            // For other types, try to cast to string
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_yes_no_with_inconclusive() {
        let df = df! {
            "result" => ["yes", "no", "yes", "inconclusive"],
            "feature" => [1.0f64, 2.0, 3.0, 4.0],
        }
        .unwrap();

        let (encoded, info) = encode_target_column(&df, "result").unwrap();

        assert_eq!(info.dropped_rows, 1);
        assert_eq!(encoded.height(), 3);
        assert_eq!(info.mode, AuditMode::Binary);
        assert_eq!(info.unique_classes, 2);

        let codes: Vec<i32> = encoded
            .column("result")
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(codes, vec![1, 0, 1]);
    }

    #[test]
    fn test_encode_is_idempotent_on_binary_codes() {
        let df = df! {
            "target" => [0i32, 1, 0, 1],
            "feature" => [1.0f64, 2.0, 3.0, 4.0],
        }
        .unwrap();

        let (encoded, info) = encode_target_column(&df, "target").unwrap();
        assert_eq!(info.mode, AuditMode::Binary);
        assert_eq!(info.dropped_rows, 0);

        let codes: Vec<i32> = encoded
            .column("target")
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(codes, vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_encode_normalizes_case_and_whitespace() {
        let df = df! {
            "result" => [" Normal", "ABNORMAL ", "normal"],
        }
        .unwrap();

        let (encoded, info) = encode_target_column(&df, "result").unwrap();
        assert_eq!(info.mode, AuditMode::Binary);

        let codes: Vec<i32> = encoded
            .column("result")
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(codes, vec![0, 1, 0]);
    }

    #[test]
    fn test_encode_multiclass_sorted_lexical_codes() {
        let df = df! {
            "severity" => ["mild", "severe", "moderate", "mild"],
        }
        .unwrap();

        let (encoded, info) = encode_target_column(&df, "severity").unwrap();
        assert_eq!(info.mode, AuditMode::Multiclass);
        assert_eq!(info.unique_classes, 3);

        // mild < moderate < severe in lexical order
        let codes: Vec<i32> = encoded
            .column("severity")
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(codes, vec![0, 2, 1, 0]);
    }

    #[test]
    fn test_encode_rejects_high_cardinality() {
        let df = df! {
            "target" => ["a", "b", "c", "d", "e"],
        }
        .unwrap();

        let result = encode_target_column(&df, "target");
        assert!(matches!(
            result,
            Err(AuditError::UnsupportedTargetCardinality { classes: 5 })
        ));
    }

    #[test]
    fn test_encode_missing_column() {
        let df = df! {
            "other" => [0i32, 1],
        }
        .unwrap();

        let result = encode_target_column(&df, "target");
        match result {
            Err(AuditError::ColumnNotFound { columns }) => {
                assert_eq!(columns, vec!["target".to_string()]);
            }
            _ => panic!("Expected ColumnNotFound"),
        }
    }

    #[test]
    fn test_encode_drops_null_targets() {
        let df = df! {
            "target" => [Some("yes"), None, Some("no"), Some("na")],
        }
        .unwrap();

        let (encoded, info) = encode_target_column(&df, "target").unwrap();
        assert_eq!(info.dropped_rows, 2);
        assert_eq!(encoded.height(), 2);
    }

    #[test]
    fn test_encode_does_not_mutate_input() {
        let df = df! {
            "target" => ["yes", "inconclusive", "no"],
        }
        .unwrap();

        let _ = encode_target_column(&df, "target").unwrap();
        assert_eq!(df.height(), 3);
        assert!(matches!(
            df.column("target").unwrap().dtype(),
            DataType::String
        ));
    }
}
