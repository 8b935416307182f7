//! Statistical imputation methods.

use polars::prelude::*;
use tracing::debug;

use crate::error::{Result, SweepError};
use crate::utils::{is_numeric_dtype, numeric_values};

/// What mean imputation did to one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeanImputation {
    /// No cell was missing.
    Complete,
    /// Missing cells were replaced by `mean`.
    Filled { cells: usize, mean: f64 },
    /// Every cell is missing, so there is no mean to fill with.
    NoObservedValues { missing: usize },
}

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Replace missing cells of a numeric column with the column mean.
    ///
    /// The mean is taken over the observed cells before any replacement.
    /// A filled column becomes `Float64`; columns without missing cells keep
    /// their type.
    pub fn apply_numeric_mean(df: &mut DataFrame, col_name: &str) -> Result<MeanImputation> {
        let column = df
            .column(col_name)
            .map_err(|_| SweepError::InvalidColumn(col_name.to_string()))?;

        if !is_numeric_dtype(column.dtype()) {
            return Err(SweepError::InvalidColumn(format!(
                "{} (not numeric)",
                col_name
            )));
        }

        let missing = column.null_count();
        if missing == 0 {
            return Ok(MeanImputation::Complete);
        }

        let series = column.as_materialized_series();
        let Some(mean) = series.mean() else {
            debug!("'{}' has no observed values; left unchanged", col_name);
            return Ok(MeanImputation::NoObservedValues { missing });
        };

        let filled: Vec<f64> = numeric_values(series)?
            .into_iter()
            .map(|v| v.unwrap_or(mean))
            .collect();
        let filled = Series::new(series.name().clone(), filled);
        df.replace(col_name, filled)?;

        debug!("Filled {} missing values in '{}' with mean {:.4}", missing, col_name, mean);
        Ok(MeanImputation::Filled {
            cells: missing,
            mean,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_numeric_mean() {
        let mut df = df! {
            "value" => [Some(1i64), None, Some(3)],
        }
        .unwrap();

        let result = StatisticalImputer::apply_numeric_mean(&mut df, "value").unwrap();
        assert_eq!(result, MeanImputation::Filled { cells: 1, mean: 2.0 });

        let col = df.column("value").unwrap().f64().unwrap();
        assert_eq!(col.get(0), Some(1.0));
        assert_eq!(col.get(1), Some(2.0));
        assert_eq!(col.get(2), Some(3.0));
    }

    #[test]
    fn test_apply_numeric_mean_fractional() {
        let mut df = df! {
            "value" => [Some(1.0f64), Some(2.0), None, None],
        }
        .unwrap();

        StatisticalImputer::apply_numeric_mean(&mut df, "value").unwrap();
        let col = df.column("value").unwrap().f64().unwrap();
        assert_eq!(col.get(2), Some(1.5));
        assert_eq!(col.get(3), Some(1.5));
    }

    #[test]
    fn test_apply_numeric_mean_all_missing() {
        let mut df = DataFrame::new(vec![
            Series::full_null("empty".into(), 3, &DataType::Float64).into_column(),
        ])
        .unwrap();

        let result = StatisticalImputer::apply_numeric_mean(&mut df, "empty").unwrap();
        assert_eq!(result, MeanImputation::NoObservedValues { missing: 3 });
        assert_eq!(df.column("empty").unwrap().null_count(), 3);
    }

    #[test]
    fn test_apply_numeric_mean_complete_column_keeps_type() {
        let mut df = df! { "n" => [1i64, 2, 3] }.unwrap();
        let result = StatisticalImputer::apply_numeric_mean(&mut df, "n").unwrap();
        assert_eq!(result, MeanImputation::Complete);
        assert_eq!(df.column("n").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_apply_numeric_mean_rejects_text() {
        let mut df = df! { "s" => [Some("a"), None] }.unwrap();
        assert!(StatisticalImputer::apply_numeric_mean(&mut df, "s").is_err());
    }
}
