//! Descriptive statistics for numeric columns.
//!
//! Two read-only computations feed the presentation layer:
//! - [`DataProfiler::summary`]: count, mean, std, min, quartiles and max
//!   per numeric column
//! - [`DataProfiler::correlation`]: pairwise-complete Pearson matrix over
//!   numeric columns

pub(crate) mod statistics;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SweepError};
use crate::utils::{is_numeric_dtype, numeric_values, observed_values, quantile_sorted, sort_floats};

/// Descriptive statistics of one numeric column.
///
/// Every field except `count` is `None` when the column has no values;
/// `std` also needs at least two values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnStatistics {
    fn from_values(column: impl Into<String>, mut values: Vec<f64>) -> Self {
        sort_floats(&mut values);
        Self {
            column: column.into(),
            count: values.len(),
            mean: statistics::mean(&values),
            std: statistics::sample_std(&values),
            min: values.first().copied(),
            p25: quantile_sorted(&values, 0.25),
            p50: quantile_sorted(&values, 0.5),
            p75: quantile_sorted(&values, 0.75),
            max: values.last().copied(),
        }
    }
}

/// Symmetric Pearson correlation matrix; `values[i][j]` pairs
/// `columns[i]` with `columns[j]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Coefficient for a pair of columns, if both are in the matrix.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }
}

/// Computes statistics over a table without modifying it.
pub struct DataProfiler;

impl DataProfiler {
    /// Statistics for every numeric column, in table order.
    ///
    /// Non-numeric columns are skipped; a table without numeric columns
    /// yields an empty list.
    pub fn summary(df: &DataFrame) -> Result<Vec<ColumnStatistics>> {
        df.get_columns()
            .iter()
            .filter(|col| is_numeric_dtype(col.dtype()))
            .map(|col| -> Result<ColumnStatistics> {
                let values = observed_values(col.as_materialized_series())?;
                Ok(ColumnStatistics::from_values(col.name().as_str(), values))
            })
            .collect()
    }

    /// Pearson correlation for every pair of numeric columns.
    ///
    /// Each pair uses only rows where both cells are present. The diagonal
    /// is always 1.0. Pairs without enough data or with a constant column
    /// are `NaN`.
    ///
    /// # Errors
    ///
    /// [`SweepError::InsufficientColumns`] when fewer than two numeric
    /// columns exist.
    pub fn correlation(df: &DataFrame) -> Result<CorrelationMatrix> {
        let numeric: Vec<(String, Vec<Option<f64>>)> = df
            .get_columns()
            .iter()
            .filter(|col| is_numeric_dtype(col.dtype()))
            .map(|col| -> Result<(String, Vec<Option<f64>>)> {
                Ok((
                    col.name().to_string(),
                    numeric_values(col.as_materialized_series())?,
                ))
            })
            .collect::<Result<_>>()?;

        if numeric.len() < 2 {
            return Err(SweepError::InsufficientColumns {
                found: numeric.len(),
            });
        }

        let size = numeric.len();
        let mut values = vec![vec![1.0; size]; size];
        for i in 0..size {
            for j in (i + 1)..size {
                let r = statistics::pearson_pairwise(&numeric[i].1, &numeric[j].1);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        debug!("Computed {}x{} correlation matrix", size, size);
        Ok(CorrelationMatrix {
            columns: numeric.into_iter().map(|(name, _)| name).collect(),
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_single_column() {
        let df = df! { "v" => [10i64, 20, 30] }.unwrap();
        let summary = DataProfiler::summary(&df).unwrap();

        assert_eq!(summary.len(), 1);
        let stats = &summary[0];
        assert_eq!(stats.column, "v");
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean, Some(20.0));
        assert_eq!(stats.min, Some(10.0));
        assert_eq!(stats.max, Some(30.0));
        assert_eq!(stats.std, Some(10.0));
        assert_eq!(stats.p25, Some(15.0));
        assert_eq!(stats.p50, Some(20.0));
        assert_eq!(stats.p75, Some(25.0));
    }

    #[test]
    fn test_summary_skips_text_and_missing() {
        let df = df! {
            "name" => ["a", "b", "c"],
            "score" => [Some(1.0f64), None, Some(3.0)],
            "flag" => [true, false, true],
        }
        .unwrap();
        let summary = DataProfiler::summary(&df).unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].count, 2);
        assert_eq!(summary[0].mean, Some(2.0));
    }

    #[test]
    fn test_summary_no_numeric_columns() {
        let df = df! { "name" => ["a", "b"] }.unwrap();
        assert!(DataProfiler::summary(&df).unwrap().is_empty());
    }

    #[test]
    fn test_summary_empty_column() {
        let df = DataFrame::new(vec![
            Series::full_null("e".into(), 2, &DataType::Float64).into_column(),
        ])
        .unwrap();
        let stats = &DataProfiler::summary(&df).unwrap()[0];
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.std, None);
    }

    #[test]
    fn test_correlation_diagonal_and_symmetry() {
        let df = df! {
            "a" => [1.0f64, 2.0, 3.0, 4.0],
            "b" => [2.0f64, 1.0, 4.0, 3.0],
            "label" => ["w", "x", "y", "z"],
            "c" => [4i64, 3, 2, 1],
        }
        .unwrap();

        let matrix = DataProfiler::correlation(&df).unwrap();
        assert_eq!(matrix.columns, vec!["a", "b", "c"]);
        for c in &matrix.columns {
            assert_eq!(matrix.get(c, c), Some(1.0));
        }
        for c1 in &matrix.columns {
            for c2 in &matrix.columns {
                assert_eq!(matrix.get(c1, c2), matrix.get(c2, c1));
            }
        }
        assert!((matrix.get("a", "c").unwrap() + 1.0).abs() < 1e-12);
        assert!((matrix.get("a", "b").unwrap() - 0.6).abs() < 1e-12);
        assert_eq!(matrix.get("a", "label"), None);
    }

    #[test]
    fn test_correlation_insufficient_columns() {
        let df = df! {
            "a" => [1.0f64, 2.0],
            "name" => ["x", "y"],
        }
        .unwrap();
        let err = DataProfiler::correlation(&df).unwrap_err();
        assert!(matches!(err, SweepError::InsufficientColumns { found: 1 }));
        assert!(err.is_per_operation());
    }
}
