//! Data cleaning module.
//!
//! This module provides three independent operations:
//! - Removing duplicate rows
//! - Filling missing numeric cells with the column mean
//! - Removing rows with any missing cell
//!
//! Every operation takes a table by reference and returns a new table, so a
//! table already handed to statistics or charts never changes underneath
//! them. Each operation depends only on the table it is given, which makes
//! any order of composition predictable, and each is idempotent.

use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::imputers::{MeanImputation, StatisticalImputer};
use crate::types::{CleaningOperation, OperationOutcome};
use crate::utils::numeric_column_names;

/// Data cleaner for user-selected cleaning operations.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataCleaner;

impl DataCleaner {
    /// Run one operation.
    pub fn apply(
        &self,
        df: &DataFrame,
        operation: CleaningOperation,
    ) -> Result<(DataFrame, OperationOutcome)> {
        match operation {
            CleaningOperation::RemoveDuplicates => self.remove_duplicates(df),
            CleaningOperation::FillMissingNumeric => self.fill_missing_numeric(df),
            CleaningOperation::DropIncompleteRows => self.drop_incomplete_rows(df),
        }
    }

    /// Run several operations in the given order.
    pub fn apply_all(
        &self,
        df: &DataFrame,
        operations: &[CleaningOperation],
    ) -> Result<(DataFrame, Vec<OperationOutcome>)> {
        let mut current = df.clone();
        let mut outcomes = Vec::with_capacity(operations.len());
        for &operation in operations {
            let (next, outcome) = self.apply(&current, operation)?;
            info!("{}", outcome.describe());
            current = next;
            outcomes.push(outcome);
        }
        Ok((current, outcomes))
    }

    /// Remove rows equal to an earlier row across all columns.
    ///
    /// The first occurrence is kept and survivors keep their order.
    pub fn remove_duplicates(&self, df: &DataFrame) -> Result<(DataFrame, OperationOutcome)> {
        let mut outcome = OperationOutcome::new(CleaningOperation::RemoveDuplicates);
        if df.width() == 0 || df.height() < 2 {
            return Ok((df.clone(), outcome));
        }

        let before = df.height();
        let deduplicated = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        outcome.rows_removed = before - deduplicated.height();

        debug!("Removed {} duplicate rows", outcome.rows_removed);
        Ok((deduplicated, outcome))
    }

    /// Replace missing cells of every numeric column with that column's mean.
    ///
    /// Columns with no observed values are left unchanged and listed in
    /// [`OperationOutcome::untouched_columns`].
    pub fn fill_missing_numeric(&self, df: &DataFrame) -> Result<(DataFrame, OperationOutcome)> {
        let mut outcome = OperationOutcome::new(CleaningOperation::FillMissingNumeric);
        let mut filled = df.clone();

        for col_name in numeric_column_names(df) {
            match StatisticalImputer::apply_numeric_mean(&mut filled, &col_name)? {
                MeanImputation::Complete => {}
                MeanImputation::Filled { cells, .. } => outcome.cells_filled += cells,
                MeanImputation::NoObservedValues { missing } => {
                    warn!(
                        "Column '{}' has no values to average; {} missing cells left unchanged",
                        col_name, missing
                    );
                    outcome.untouched_columns.push(col_name);
                }
            }
        }

        Ok((filled, outcome))
    }

    /// Remove every row holding at least one missing cell, in any column.
    pub fn drop_incomplete_rows(&self, df: &DataFrame) -> Result<(DataFrame, OperationOutcome)> {
        let mut outcome = OperationOutcome::new(CleaningOperation::DropIncompleteRows);
        if df.width() == 0 || df.get_columns().iter().all(|col| col.null_count() == 0) {
            return Ok((df.clone(), outcome));
        }

        let mut mask = BooleanChunked::full("complete".into(), true, df.height());
        for col in df.get_columns() {
            let present = col.as_materialized_series().is_not_null();
            mask = &mask & &present;
        }

        let before = df.height();
        let complete = df.filter(&mask)?;
        outcome.rows_removed = before - complete.height();

        debug!("Removed {} rows with missing values", outcome.rows_removed);
        Ok((complete, outcome))
    }
}
