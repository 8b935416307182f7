//! Imputation module for handling missing values.
//!
//! Numeric columns are filled with the arithmetic mean of their observed
//! values.

mod statistical;

pub use statistical::{MeanImputation, StatisticalImputer};
