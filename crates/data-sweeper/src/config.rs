//! Configuration types for the cleaning and conversion pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};

/// Textual cells the CSV loader reads as missing.
pub const DEFAULT_NULL_MARKERS: [&str; 11] = [
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Longest worksheet name Excel accepts.
pub const MAX_SHEET_NAME_LEN: usize = 31;

const INVALID_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Configuration for the pipeline.
///
/// Use [`SweepConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use data_sweeper::config::SweepConfig;
///
/// let config = SweepConfig::builder()
///     .preview_rows(10)
///     .sheet_name("Cleaned")
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Cell texts treated as missing when reading CSV.
    /// Empty fields are always missing.
    pub null_markers: Vec<String>,

    /// Number of rows sampled for CSV type inference.
    /// `None` scans the whole file.
    /// Default: Some(1000)
    pub infer_schema_length: Option<usize>,

    /// Number of rows kept in each file report's preview.
    /// Default: 5
    pub preview_rows: usize,

    /// Worksheet name used for Excel output.
    /// Default: "Sheet1"
    pub sheet_name: String,

    /// Optional upper bound on the size of a single upload, in bytes.
    /// Larger files fail to load without affecting the rest of the batch.
    /// Default: None
    pub max_upload_bytes: Option<usize>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            null_markers: DEFAULT_NULL_MARKERS.iter().map(|m| m.to_string()).collect(),
            infer_schema_length: Some(1000),
            preview_rows: 5,
            sheet_name: "Sheet1".to_string(),
            max_upload_bytes: None,
        }
    }
}

impl SweepConfig {
    /// Create a new configuration builder.
    pub fn builder() -> SweepConfigBuilder {
        SweepConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.infer_schema_length == Some(0) {
            return Err(ConfigValidationError::InvalidInferSchemaLength);
        }

        let name = &self.sheet_name;
        if name.is_empty() || name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(ConfigValidationError::InvalidSheetName {
                name: name.clone(),
                reason: format!("must be 1 to {} characters", MAX_SHEET_NAME_LEN),
            });
        }
        if let Some(c) = name.chars().find(|c| INVALID_SHEET_CHARS.contains(c)) {
            return Err(ConfigValidationError::InvalidSheetName {
                name: name.clone(),
                reason: format!("contains forbidden character '{}'", c),
            });
        }

        if self.max_upload_bytes == Some(0) {
            return Err(ConfigValidationError::InvalidUploadLimit);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid infer_schema_length: 0 (must be at least 1, or unset to scan all rows)")]
    InvalidInferSchemaLength,

    #[error("Invalid sheet name '{name}': {reason}")]
    InvalidSheetName { name: String, reason: String },

    #[error("Invalid max_upload_bytes: 0 (must be at least 1, or unset for no limit)")]
    InvalidUploadLimit,
}

/// Builder for [`SweepConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct SweepConfigBuilder {
    null_markers: Option<Vec<String>>,
    infer_schema_length: Option<Option<usize>>,
    preview_rows: Option<usize>,
    sheet_name: Option<String>,
    max_upload_bytes: Option<usize>,
}

impl SweepConfigBuilder {
    /// Replace the set of cell texts read as missing.
    pub fn null_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_markers = Some(markers.into_iter().map(Into::into).collect());
        self
    }

    /// Set the number of rows sampled for CSV type inference.
    ///
    /// Pass `None` to scan every row.
    pub fn infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    /// Set the number of preview rows kept per file.
    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    /// Set the worksheet name used for Excel output.
    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    /// Reject uploads larger than `bytes`.
    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = Some(bytes);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `SweepConfig` or an error if validation fails.
    pub fn build(self) -> Result<SweepConfig, ConfigValidationError> {
        let defaults = SweepConfig::default();
        let config = SweepConfig {
            null_markers: self.null_markers.unwrap_or(defaults.null_markers),
            infer_schema_length: self
                .infer_schema_length
                .unwrap_or(defaults.infer_schema_length),
            preview_rows: self.preview_rows.unwrap_or(defaults.preview_rows),
            sheet_name: self.sheet_name.unwrap_or(defaults.sheet_name),
            max_upload_bytes: self.max_upload_bytes,
        };

        config.validate()?;
        Ok(config)
    }
}
