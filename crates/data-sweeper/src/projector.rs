//! Column projection.

use polars::prelude::*;
use tracing::debug;

use crate::error::{Result, SweepError};

/// Narrows a table to a chosen, ordered subset of its columns.
pub struct ColumnProjector;

impl ColumnProjector {
    /// Keep only `columns`, in the given order, with every row.
    ///
    /// Every requested name must exist; the first unknown name is reported
    /// as [`SweepError::InvalidColumn`]. A name listed twice is kept once.
    pub fn project<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<DataFrame> {
        let mut selected: Vec<&str> = Vec::with_capacity(columns.len());
        for name in columns {
            let name = name.as_ref();
            if df.column(name).is_err() {
                return Err(SweepError::InvalidColumn(name.to_string()));
            }
            if !selected.contains(&name) {
                selected.push(name);
            }
        }

        debug!("Projecting {} of {} columns", selected.len(), df.width());
        Ok(df.select(selected)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::column_names;

    fn sample() -> DataFrame {
        df! {
            "a" => [1i64, 2, 3],
            "b" => ["x", "y", "z"],
            "c" => [0.1f64, 0.2, 0.3],
        }
        .unwrap()
    }

    #[test]
    fn test_project_reorders_and_keeps_rows() {
        let df = sample();
        let projected = ColumnProjector::project(&df, &["b", "a"]).unwrap();

        assert_eq!(column_names(&projected), vec!["b", "a"]);
        assert_eq!(projected.height(), 3);
        for name in ["a", "b"] {
            let left = projected.column(name).unwrap().as_materialized_series();
            let right = df.column(name).unwrap().as_materialized_series();
            assert!(left.equals(right));
        }
    }

    #[test]
    fn test_project_unknown_column() {
        let err = ColumnProjector::project(&sample(), &["a", "missing"]).unwrap_err();
        assert!(matches!(err, SweepError::InvalidColumn(ref name) if name == "missing"));
    }

    #[test]
    fn test_project_duplicate_names_kept_once() {
        let projected = ColumnProjector::project(&sample(), &["c", "c"]).unwrap();
        assert_eq!(column_names(&projected), vec!["c"]);
    }

    #[test]
    fn test_project_owned_names() {
        let names = vec!["c".to_string(), "a".to_string()];
        let projected = ColumnProjector::project(&sample(), &names).unwrap();
        assert_eq!(column_names(&projected), vec!["c", "a"]);
    }
}
