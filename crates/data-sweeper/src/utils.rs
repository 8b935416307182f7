//! Shared utilities for the cleaning and conversion pipeline.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::types::TablePreview;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Integer or floating point numbers
    Numeric,
    /// Boolean type
    Boolean,
    /// Text and anything else
    Text,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Get the semantic kind of a DataType.
pub fn column_kind(dtype: &DataType) -> ColumnKind {
    if is_numeric_dtype(dtype) {
        ColumnKind::Numeric
    } else if matches!(dtype, DataType::Boolean) {
        ColumnKind::Boolean
    } else {
        ColumnKind::Text
    }
}

/// Names of the numeric columns, in table order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

/// All column names, in table order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

// =============================================================================
// Value Extraction
// =============================================================================

/// Cells of a numeric series as `f64`, with `None` for missing cells.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let casted = series.cast(&DataType::Float64)?;
    Ok(casted.f64()?.into_iter().collect())
}

/// Non-missing cells of a numeric series as `f64`.
pub fn observed_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let casted = series.cast(&DataType::Float64)?;
    Ok(casted.f64()?.into_iter().flatten().collect())
}

/// Cells of any series rendered as text, with `None` for missing cells.
pub fn text_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let casted = series.cast(&DataType::String)?;
    Ok(casted
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Build a text preview of the first `rows` rows.
pub fn table_preview(df: &DataFrame, rows: usize) -> PolarsResult<TablePreview> {
    let head = df.head(Some(rows));
    let columns = head
        .get_columns()
        .iter()
        .map(|col| text_values(col.as_materialized_series()))
        .collect::<PolarsResult<Vec<_>>>()?;

    let rows = (0..head.height())
        .map(|row| columns.iter().map(|col| col[row].clone()).collect())
        .collect();

    Ok(TablePreview {
        columns: column_names(&head),
        rows,
    })
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Linear-interpolated quantile of an ascending slice.
pub fn quantile_sorted(values: &[f64], quantile: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let pos = quantile.clamp(0.0, 1.0) * (values.len() as f64 - 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return Some(values[lower]);
    }
    let weight = pos - lower as f64;
    Some(values[lower] + (values[upper] - values[lower]) * weight)
}

/// Sort a slice of floats ascending.
pub fn sort_floats(values: &mut [f64]) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_column_kind() {
        assert_eq!(column_kind(&DataType::UInt8), ColumnKind::Numeric);
        assert_eq!(column_kind(&DataType::Boolean), ColumnKind::Boolean);
        assert_eq!(column_kind(&DataType::String), ColumnKind::Text);
    }

    #[test]
    fn test_numeric_column_names() {
        let df = df! {
            "name" => ["a", "b"],
            "age" => [1i64, 2],
            "flag" => [true, false],
            "score" => [0.5f64, 1.5],
        }
        .unwrap();
        assert_eq!(numeric_column_names(&df), vec!["age", "score"]);
        assert_eq!(column_names(&df), vec!["name", "age", "flag", "score"]);
    }

    #[test]
    fn test_numeric_values_keeps_missing() {
        let series = Series::new("v".into(), &[Some(1i64), None, Some(3)]);
        assert_eq!(numeric_values(&series).unwrap(), vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(observed_values(&series).unwrap(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_text_values() {
        let series = Series::new("v".into(), &[Some("x"), None]);
        assert_eq!(
            text_values(&series).unwrap(),
            vec![Some("x".to_string()), None]
        );
    }

    #[test]
    fn test_quantile_sorted_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&values, 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&values, 0.5), Some(2.5));
        assert_eq!(quantile_sorted(&values, 0.25), Some(1.75));
        assert_eq!(quantile_sorted(&values, 1.0), Some(4.0));
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    #[test]
    fn test_table_preview() {
        let df = df! {
            "a" => [Some(1i64), None, Some(3)],
            "b" => ["x", "y", "z"],
        }
        .unwrap();
        let preview = table_preview(&df, 2).unwrap();
        assert_eq!(preview.columns, vec!["a", "b"]);
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.rows[0], vec![Some("1".to_string()), Some("x".to_string())]);
        assert_eq!(preview.rows[1], vec![None, Some("y".to_string())]);
    }
}
