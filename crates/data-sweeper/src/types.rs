use std::path::Path;

use chrono::{DateTime, Utc};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use crate::charts::{ChartKind, ChartSpec};
use crate::encoder::EncodedTable;
use crate::error::{Result, SweepError};
use crate::profiler::{ColumnStatistics, CorrelationMatrix};

// ============================================================================
// Formats
// ============================================================================

/// MIME type of an `.xlsx` workbook.
pub const EXCEL_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// MIME type of comma-separated text.
pub const CSV_MIME_TYPE: &str = "text/csv";

/// Tabular formats the pipeline reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    Csv,
    Excel,
}

impl TableFormat {
    /// Resolve a format from a file extension, with or without the leading dot.
    ///
    /// Matching is case-insensitive; anything other than `csv` or `xlsx`
    /// is [`SweepError::UnsupportedFormat`].
    pub fn from_extension(extension: &str) -> Result<Self> {
        let normalized = extension.trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Excel),
            _ => Err(SweepError::UnsupportedFormat(format!(".{}", normalized))),
        }
    }

    /// Canonical extension including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => ".csv",
            Self::Excel => ".xlsx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Csv => CSV_MIME_TYPE,
            Self::Excel => EXCEL_MIME_TYPE,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Excel => "Excel",
        }
    }
}

impl std::fmt::Display for TableFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// A single uploaded file: its name and full contents.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Lowercased extension with its leading dot, or an empty string.
    pub fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_default()
    }

    /// Size in kilobytes.
    pub fn size_kb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0
    }
}

/// A cleaning step a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningOperation {
    /// Remove rows identical to an earlier row.
    RemoveDuplicates,
    /// Replace missing numeric cells with their column mean.
    FillMissingNumeric,
    /// Remove rows holding any missing cell.
    DropIncompleteRows,
}

impl CleaningOperation {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::RemoveDuplicates => "Remove duplicates",
            Self::FillMissingNumeric => "Fill missing numeric values",
            Self::DropIncompleteRows => "Remove rows with missing values",
        }
    }
}

/// Chart parameters chosen by the caller.
///
/// Omitted axes are filled in from the table's numeric columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub kind: ChartKind,
    #[serde(default)]
    pub x: Option<String>,
    #[serde(default)]
    pub y: Option<String>,
}

impl ChartRequest {
    pub fn new(kind: ChartKind) -> Self {
        Self { kind, x: None, y: None }
    }

    pub fn with_x(mut self, column: impl Into<String>) -> Self {
        self.x = Some(column.into());
        self
    }

    pub fn with_y(mut self, column: impl Into<String>) -> Self {
        self.y = Some(column.into());
        self
    }
}

/// Everything the caller selected for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRequest {
    /// Cleaning steps, applied in order.
    #[serde(default)]
    pub operations: Vec<CleaningOperation>,
    /// Columns to keep, in output order. `None` keeps every column.
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default)]
    pub chart: Option<ChartRequest>,
    #[serde(default)]
    pub convert_to: Option<TableFormat>,
}

impl FileRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operation(mut self, operation: CleaningOperation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn chart(mut self, chart: ChartRequest) -> Self {
        self.chart = Some(chart);
        self
    }

    pub fn convert_to(mut self, format: TableFormat) -> Self {
        self.convert_to = Some(format);
        self
    }
}

// ============================================================================
// Outputs
// ============================================================================

/// What a single cleaning step changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationOutcome {
    pub operation: CleaningOperation,
    pub rows_removed: usize,
    pub cells_filled: usize,
    /// Numeric columns left as-is because they had no values to average.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub untouched_columns: Vec<String>,
}

impl OperationOutcome {
    pub fn new(operation: CleaningOperation) -> Self {
        Self {
            operation,
            rows_removed: 0,
            cells_filled: 0,
            untouched_columns: Vec::new(),
        }
    }

    /// One-line description for display.
    pub fn describe(&self) -> String {
        match self.operation {
            CleaningOperation::RemoveDuplicates if self.rows_removed == 0 => {
                "No duplicate rows found".to_string()
            }
            CleaningOperation::RemoveDuplicates => {
                format!("Removed {} duplicate rows", self.rows_removed)
            }
            CleaningOperation::FillMissingNumeric => {
                format!("Filled {} missing numeric cells with column means", self.cells_filled)
            }
            CleaningOperation::DropIncompleteRows => {
                format!("Removed {} rows with missing values", self.rows_removed)
            }
        }
    }
}

/// First rows of a table, rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Result of running one uploaded file through the pipeline.
///
/// Stage failures after loading are stored next to the stage's output so
/// earlier results stay available.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file_name: String,
    pub size_kb: f64,
    pub format: TableFormat,

    pub rows_before: usize,
    pub columns_before: usize,
    pub rows_after: usize,
    pub columns_after: usize,

    /// Cleaning steps in the order they ran.
    pub operations: Vec<OperationOutcome>,

    /// Set when the requested projection named an unknown column.
    /// The table then keeps every column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_error: Option<SweepError>,

    /// Final table after cleaning and projection.
    #[serde(skip)]
    pub table: DataFrame,

    pub preview: TablePreview,
    pub summary: Vec<ColumnStatistics>,
    pub correlation: Result<CorrelationMatrix>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<Result<ChartSpec>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<Result<EncodedTable>>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    pub duration_ms: u64,
}

impl FileReport {
    /// Rows removed by cleaning.
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

/// Per-file outcome inside a batch.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Processed(Box<FileReport>),
    Failed { file_name: String, error: SweepError },
}

impl FileOutcome {
    pub fn file_name(&self) -> &str {
        match self {
            Self::Processed(report) => &report.file_name,
            Self::Failed { file_name, .. } => file_name,
        }
    }

    pub fn report(&self) -> Option<&FileReport> {
        match self {
            Self::Processed(report) => Some(report),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&SweepError> {
        match self {
            Self::Processed(_) => None,
            Self::Failed { error, .. } => Some(error),
        }
    }

    pub fn is_processed(&self) -> bool {
        matches!(self, Self::Processed(_))
    }
}

/// Outcomes for every file of one submission, in upload order.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn processed_count(&self) -> usize {
        self.files.iter().filter(|f| f.is_processed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.files.len() - self.processed_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(TableFormat::from_extension(".csv").unwrap(), TableFormat::Csv);
        assert_eq!(TableFormat::from_extension("CSV").unwrap(), TableFormat::Csv);
        assert_eq!(TableFormat::from_extension(".XLSX").unwrap(), TableFormat::Excel);

        let err = TableFormat::from_extension(".txt").unwrap_err();
        assert!(matches!(err, SweepError::UnsupportedFormat(ref ext) if ext == ".txt"));
        assert!(TableFormat::from_extension("").is_err());
        assert!(TableFormat::from_extension(".xls").is_err());
    }

    #[test]
    fn test_format_metadata() {
        assert_eq!(TableFormat::Csv.mime_type(), "text/csv");
        assert_eq!(TableFormat::Excel.mime_type(), EXCEL_MIME_TYPE);
        assert_eq!(TableFormat::Excel.extension(), ".xlsx");
        assert_eq!(TableFormat::Csv.to_string(), "CSV");
    }

    #[test]
    fn test_uploaded_file_extension() {
        assert_eq!(UploadedFile::new("Data.CSV", Vec::new()).extension(), ".csv");
        assert_eq!(UploadedFile::new("report.v2.xlsx", Vec::new()).extension(), ".xlsx");
        assert_eq!(UploadedFile::new("README", Vec::new()).extension(), "");
    }

    #[test]
    fn test_uploaded_file_size_kb() {
        let file = UploadedFile::new("a.csv", vec![0u8; 2048]);
        assert_eq!(file.size_kb(), 2.0);
    }

    #[test]
    fn test_file_request_from_json() {
        let json = r#"{
            "operations": ["remove_duplicates", "fill_missing_numeric"],
            "columns": ["b", "a"],
            "chart": {"kind": "scatter", "x": "a"},
            "convert_to": "excel"
        }"#;

        let request: FileRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            request.operations,
            vec![
                CleaningOperation::RemoveDuplicates,
                CleaningOperation::FillMissingNumeric
            ]
        );
        assert_eq!(request.columns, Some(vec!["b".to_string(), "a".to_string()]));
        assert_eq!(
            request.chart,
            Some(ChartRequest::new(ChartKind::Scatter).with_x("a"))
        );
        assert_eq!(request.convert_to, Some(TableFormat::Excel));
    }

    #[test]
    fn test_outcome_description() {
        let mut outcome = OperationOutcome::new(CleaningOperation::RemoveDuplicates);
        assert_eq!(outcome.describe(), "No duplicate rows found");
        outcome.rows_removed = 2;
        assert_eq!(outcome.describe(), "Removed 2 duplicate rows");
    }
}
