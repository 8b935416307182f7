//! Table encoding for download.
//!
//! Encoders never write a row-index column. Output produced here loads back
//! through [`crate::loader::TableLoader`] with the same columns, in the same
//! order, holding the same values.

mod csv;
mod excel;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SweepConfig;
use crate::error::{Result, SweepError};
use crate::types::TableFormat;

/// An encoded table ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedTable {
    pub format: TableFormat,
    pub file_name: String,
    pub mime_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub size_bytes: usize,
}

/// Serializes tables to CSV or Excel bytes.
pub struct TableEncoder {
    config: SweepConfig,
}

impl TableEncoder {
    pub fn new(config: SweepConfig) -> Self {
        Self { config }
    }

    /// Encode `df` as `format`.
    ///
    /// The output name is `original_name` with `original_extension` swapped
    /// for the format's canonical extension.
    pub fn encode(
        &self,
        df: &DataFrame,
        format: TableFormat,
        original_name: &str,
        original_extension: &str,
    ) -> Result<EncodedTable> {
        let bytes = match format {
            TableFormat::Csv => csv::write_csv(df),
            TableFormat::Excel => excel::write_xlsx(df, &self.config.sheet_name),
        }
        .map_err(|e| match e {
            e @ SweepError::EncodingFailed { .. } => e,
            other => SweepError::EncodingFailed {
                format: format.display_name().to_string(),
                reason: other.to_string(),
            },
        })?;

        let file_name = output_file_name(original_name, original_extension, format);
        info!("Encoded {} as {} ({} bytes)", file_name, format, bytes.len());

        Ok(EncodedTable {
            format,
            file_name,
            mime_type: format.mime_type().to_string(),
            size_bytes: bytes.len(),
            bytes,
        })
    }
}

/// Replace a trailing `extension` (case-insensitive) with the format's
/// canonical extension, or append it when `name` does not end that way.
pub fn output_file_name(name: &str, extension: &str, format: TableFormat) -> String {
    let stem = name
        .len()
        .checked_sub(extension.len())
        .filter(|&idx| !extension.is_empty() && name.is_char_boundary(idx))
        .filter(|&idx| name[idx..].eq_ignore_ascii_case(extension))
        .map_or(name, |idx| &name[..idx]);

    format!("{}{}", stem, format.extension())
}
