//! Fallback feature encoding for inference
//!
//! Models that do not own a preprocessing stage receive a numerically
//! encoded copy of the feature matrix: categorical/text columns become
//! integer category codes, numeric columns are coerced with nulls as 0.

use std::collections::BTreeSet;

use polars::prelude::*;

use super::error::AuditError;
use super::target::column_to_string_vec;

/// Sentinel category substituted for missing categorical values before
/// code assignment.
pub const MISSING_CATEGORY: &str = "UNKNOWN";

/// Encode every column of `df` to a numeric representation.
///
/// Categorical codes are assigned in sorted category order, so the same
/// data always yields the same codes. Returns a new DataFrame.
pub fn encode_features_for_inference(df: &DataFrame) -> Result<DataFrame, AuditError> {
    let mut encoded: Vec<Column> = Vec::with_capacity(df.width());

    for col in df.get_columns() {
        let column = match col.dtype() {
            DataType::String | DataType::Categorical(_, _) => encode_categorical(col)?,
            _ => match col.cast(&DataType::Float64) {
                Ok(float_col) => {
                    let values: Vec<f64> = float_col
                        .f64()?
                        .into_iter()
                        .map(|v| match v {
                            Some(x) if x.is_finite() => x,
                            _ => 0.0,
                        })
                        .collect();
                    Column::new(col.name().clone(), values)
                }
                // Unparsable as numeric: treat like a categorical column
                Err(_) => encode_categorical(col)?,
            },
        };
        encoded.push(column);
    }

    Ok(DataFrame::new(encoded)?)
}

fn encode_categorical(col: &Column) -> Result<Column, AuditError> {
    let values: Vec<String> = column_to_string_vec(col)?
        .into_iter()
        .map(|v| v.unwrap_or_else(|| MISSING_CATEGORY.to_string()))
        .collect();

    let categories: BTreeSet<&str> = values.iter().map(|s| s.as_str()).collect();
    let ordered: Vec<&str> = categories.into_iter().collect();

    let codes: Vec<i64> = values
        .iter()
        .map(|v| {
            ordered
                .iter()
                .position(|c| c == &v.as_str())
                .expect("value drawn from the category set") as i64
        })
        .collect();

    Ok(Column::new(col.name().clone(), codes))
}
