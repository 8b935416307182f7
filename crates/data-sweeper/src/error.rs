//! Error types for the cleaning and conversion pipeline.
//!
//! Errors fall into two tiers. Per-file errors ([`SweepError::UnsupportedFormat`],
//! [`SweepError::ParseFailure`]) stop the pipeline for one upload only; the batch
//! boundary records them and moves on. Per-operation errors
//! ([`SweepError::InvalidColumn`], [`SweepError::InvalidAxis`],
//! [`SweepError::InsufficientColumns`]) are attached to the output of the
//! operation that raised them while earlier stages keep their results.
//!
//! Errors are serializable so a presentation layer can display them.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

use crate::config::ConfigValidationError;

/// The main error type for the pipeline.
#[derive(Error, Debug)]
pub enum SweepError {
    /// The file extension is not one of the accepted tabular formats.
    #[error("Unsupported file type: '{0}' (expected .csv or .xlsx)")]
    UnsupportedFormat(String),

    /// The bytes are not a well-formed instance of the declared format.
    #[error("Failed to parse '{file}': {reason}")]
    ParseFailure { file: String, reason: String },

    /// A projection or chart referenced a column the table does not have.
    #[error("Column '{0}' not found in table")]
    InvalidColumn(String),

    /// A chart axis is missing or refers to a column of the wrong type.
    #[error("Invalid {axis} axis '{column}': {reason}")]
    InvalidAxis {
        axis: String,
        column: String,
        reason: String,
    },

    /// Correlation needs at least two numeric columns.
    #[error("Correlation requires at least 2 numeric columns, found {found}")]
    InsufficientColumns { found: usize },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serializing a table into the target format failed.
    #[error("Failed to encode table as {format}: {reason}")]
    EncodingFailed { format: String, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Workbook reader error.
    #[error("Excel reader error: {0}")]
    Calamine(#[from] calamine::XlsxError),

    /// Workbook writer error.
    #[error("Excel writer error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<SweepError>,
    },
}

impl SweepError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        SweepError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Build a parse failure for `file`.
    pub fn parse_failure(file: impl Into<String>, reason: impl ToString) -> Self {
        SweepError::ParseFailure {
            file: file.into(),
            reason: reason.to_string(),
        }
    }

    /// Build an axis error.
    pub fn invalid_axis(
        axis: impl Into<String>,
        column: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SweepError::InvalidAxis {
            axis: axis.into(),
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::ParseFailure { .. } => "PARSE_FAILURE",
            Self::InvalidColumn(_) => "INVALID_COLUMN",
            Self::InvalidAxis { .. } => "INVALID_AXIS",
            Self::InsufficientColumns { .. } => "INSUFFICIENT_COLUMNS",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::EncodingFailed { .. } => "ENCODING_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Calamine(_) => "EXCEL_READ_ERROR",
            Self::Xlsx(_) => "XLSX_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Errors that end processing of a single uploaded file.
    pub fn is_per_file(&self) -> bool {
        match self {
            Self::UnsupportedFormat(_) | Self::ParseFailure { .. } => true,
            Self::WithContext { source, .. } => source.is_per_file(),
            _ => false,
        }
    }

    /// Errors reported alongside one operation's output.
    pub fn is_per_operation(&self) -> bool {
        match self {
            Self::InvalidColumn(_) | Self::InvalidAxis { .. } | Self::InsufficientColumns { .. } => {
                true
            }
            Self::WithContext { source, .. } => source.is_per_operation(),
            _ => false,
        }
    }
}

impl From<ConfigValidationError> for SweepError {
    fn from(err: ConfigValidationError) -> Self {
        SweepError::InvalidConfig(err.to_string())
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for SweepError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("SweepError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, SweepError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| SweepError::Polars(e).with_context(context))
    }
}
