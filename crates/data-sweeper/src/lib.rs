//! Data Sweeper Library
//!
//! A tabular cleaning and conversion pipeline built with Rust and Polars.
//!
//! # Overview
//!
//! Each uploaded file runs through the same independent pipeline:
//!
//! - **Loading**: `.csv` and `.xlsx` bytes parsed into a [`polars::frame::DataFrame`]
//! - **Cleaning**: duplicate removal, mean imputation of numeric cells,
//!   removal of incomplete rows, applied in the order requested
//! - **Column Projection**: keep a chosen subset of columns, in the order requested
//! - **Statistics**: per-column summaries and a Pearson correlation matrix
//! - **Charts**: render-ready specifications for bar, line, histogram,
//!   scatter, pie and box charts
//! - **Encoding**: the final table as CSV or Excel bytes with a MIME type
//!   and output file name
//!
//! A file that cannot be loaded is reported as failed without affecting the
//! other files. Every later failure (unknown projection column, invalid
//! chart axis, too few numeric columns to correlate) is kept next to the
//! stage's output in the [`FileReport`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use data_sweeper::{
//!     ChartKind, ChartRequest, CleaningOperation, FileRequest, Pipeline, TableFormat,
//!     UploadedFile,
//! };
//!
//! let file = UploadedFile::new("sales.csv", std::fs::read("sales.csv")?);
//!
//! let request = FileRequest::new()
//!     .operation(CleaningOperation::RemoveDuplicates)
//!     .operation(CleaningOperation::FillMissingNumeric)
//!     .columns(["region", "units", "price"])
//!     .chart(ChartRequest::new(ChartKind::Scatter).with_x("units").with_y("price"))
//!     .convert_to(TableFormat::Excel);
//!
//! let report = Pipeline::builder().build()?.process_file(&file, &request)?;
//! println!("{} -> {} rows", report.rows_before, report.rows_after);
//!
//! if let Some(Ok(export)) = &report.export {
//!     std::fs::write(&export.file_name, &export.bytes)?;
//! }
//! ```
//!
//! # Configuration
//!
//! Use [`SweepConfig`] to customize loading and encoding:
//!
//! ```rust,ignore
//! use data_sweeper::SweepConfig;
//!
//! let config = SweepConfig::builder()
//!     .null_markers(["", "NA", "-"])
//!     .preview_rows(10)
//!     .sheet_name("Cleaned")
//!     .build()?;
//! ```
//!
//! # Progress Reporting
//!
//! ```rust,ignore
//! let pipeline = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{}] {:?}: {}", update.file_name, update.stage, update.message);
//!     })
//!     .build()?;
//!
//! let batch = pipeline.process_batch(&files, &request);
//! ```
//!
//! The individual stages ([`TableLoader`], [`DataCleaner`], [`ColumnProjector`],
//! [`DataProfiler`], [`ChartBuilder`], [`TableEncoder`]) are public and can be
//! used on their own.

pub mod charts;
pub mod cleaner;
pub mod config;
pub mod encoder;
pub mod error;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod projector;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use charts::{BoxPlotSummary, ChartBuilder, ChartKind, ChartSeries, ChartSpec};
pub use cleaner::DataCleaner;
pub use config::{ConfigValidationError, DEFAULT_NULL_MARKERS, SweepConfig, SweepConfigBuilder};
pub use encoder::{EncodedTable, TableEncoder, output_file_name};
pub use error::{Result as SweepResult, ResultExt, SweepError};
pub use imputers::{MeanImputation, StatisticalImputer};
pub use loader::TableLoader;
pub use pipeline::{
    ClosureProgressReporter, Pipeline, PipelineBuilder, PipelineStage, ProgressReporter,
    ProgressUpdate,
};
pub use profiler::{ColumnStatistics, CorrelationMatrix, DataProfiler};
pub use projector::ColumnProjector;
pub use types::{
    BatchReport, CSV_MIME_TYPE, ChartRequest, CleaningOperation, EXCEL_MIME_TYPE, FileOutcome,
    FileReport, FileRequest, OperationOutcome, TableFormat, TablePreview, UploadedFile,
};
pub use utils::{ColumnKind, column_kind, is_numeric_dtype};
