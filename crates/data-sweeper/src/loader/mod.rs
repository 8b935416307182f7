//! Table loading from uploaded bytes.
//!
//! The declared file extension selects the reader:
//! - `.csv` is parsed by the polars CSV reader
//! - `.xlsx` is read from the first worksheet with calamine
//!
//! Both readers take the first record as the header row and infer one type
//! per column. Columns holding no values at all are typed as numeric
//! (all-missing floats), so every reader yields the same table for an empty
//! column.

mod csv;
mod excel;

use std::collections::HashSet;

use polars::prelude::*;
use tracing::{debug, info};

use crate::config::SweepConfig;
use crate::error::{Result, SweepError};
use crate::types::{TableFormat, UploadedFile};

/// Parses uploaded files into tables.
pub struct TableLoader {
    config: SweepConfig,
}

impl TableLoader {
    pub fn new(config: SweepConfig) -> Self {
        Self { config }
    }

    /// Load an uploaded file, choosing the reader from its extension.
    pub fn load(&self, file: &UploadedFile) -> Result<DataFrame> {
        self.load_bytes(&file.name, &file.extension(), &file.bytes)
    }

    /// Load `bytes` declared as `extension` (case-insensitive `.csv` or `.xlsx`).
    ///
    /// # Errors
    ///
    /// - [`SweepError::UnsupportedFormat`] for any other extension
    /// - [`SweepError::ParseFailure`] when the bytes are malformed
    pub fn load_bytes(&self, name: &str, extension: &str, bytes: &[u8]) -> Result<DataFrame> {
        let format = TableFormat::from_extension(extension)?;

        if let Some(limit) = self.config.max_upload_bytes
            && bytes.len() > limit
        {
            return Err(SweepError::parse_failure(
                name,
                format!("file is {} bytes, limit is {}", bytes.len(), limit),
            ));
        }

        info!("Loading {} as {} ({} bytes)", name, format, bytes.len());

        let df = match format {
            TableFormat::Csv => csv::read_csv(bytes, &self.config),
            TableFormat::Excel => excel::read_xlsx(bytes),
        }
        .map_err(|e| match e {
            SweepError::ParseFailure { reason, .. } => SweepError::parse_failure(name, reason),
            other => SweepError::parse_failure(name, other),
        })?;

        let df = type_empty_columns(df)?;
        debug!("Loaded {}: {:?}", name, df.shape());
        Ok(df)
    }
}

/// Make header names unique.
///
/// A repeated name gets a `.<n>` suffix, counting up until the name is free,
/// so `a, a, a.1` becomes `a, a.1, a.1.1`.
pub(super) fn unique_names<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|base| {
            let mut name = base.clone();
            let mut suffix = 1;
            while !seen.insert(name.clone()) {
                name = format!("{}.{}", base, suffix);
                suffix += 1;
            }
            name
        })
        .collect()
}

/// Retype columns without a single value as all-missing floats.
fn type_empty_columns(mut df: DataFrame) -> Result<DataFrame> {
    let height = df.height();
    if height == 0 {
        return Ok(df);
    }

    let empty: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|col| col.null_count() == height && col.dtype() != &DataType::Float64)
        .map(|col| col.name().to_string())
        .collect();

    for name in empty {
        let series = Series::full_null(name.as_str().into(), height, &DataType::Float64);
        df.replace(&name, series)?;
    }
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader() -> TableLoader {
        TableLoader::new(SweepConfig::default())
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let file = UploadedFile::new("data.txt", b"a,b\n1,2\n".to_vec());
        let err = loader().load(&file).unwrap_err();
        assert!(matches!(err, SweepError::UnsupportedFormat(ref ext) if ext == ".txt"));
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let file = UploadedFile::new("DATA.CSV", b"a,b\n1,2\n".to_vec());
        let df = loader().load(&file).unwrap();
        assert_eq!(df.shape(), (1, 2));
    }

    #[test]
    fn test_upload_limit_is_a_parse_failure() {
        let config = SweepConfig::builder().max_upload_bytes(4).build().unwrap();
        let file = UploadedFile::new("big.csv", b"a,b\n1,2\n".to_vec());
        let err = TableLoader::new(config).load(&file).unwrap_err();
        assert!(matches!(err, SweepError::ParseFailure { ref file, .. } if file == "big.csv"));
    }

    #[test]
    fn test_parse_failure_names_the_file() {
        let file = UploadedFile::new("broken.xlsx", b"not a zip archive".to_vec());
        let err = loader().load(&file).unwrap_err();
        assert!(err.is_per_file());
        assert!(matches!(err, SweepError::ParseFailure { ref file, .. } if file == "broken.xlsx"));
    }

    #[test]
    fn test_unique_names() {
        let names = ["a", "a", "a.1", "b", "a"].map(String::from);
        assert_eq!(unique_names(names), vec!["a", "a.1", "a.1.1", "b", "a.2"]);
    }

    #[test]
    fn test_duplicate_headers_match_across_formats() {
        let csv = loader()
            .load(&UploadedFile::new("dup.csv", b"a,a,b\n1,2,3\n".to_vec()))
            .unwrap();
        let names = crate::utils::column_names(&csv);
        assert_eq!(names, vec!["a", "a.1", "b"]);

        let encoded = crate::encoder::TableEncoder::new(SweepConfig::default())
            .encode(&csv, TableFormat::Excel, "dup.csv", ".csv")
            .unwrap();
        let xlsx = loader()
            .load_bytes("dup.xlsx", ".xlsx", &encoded.bytes)
            .unwrap();
        assert_eq!(crate::utils::column_names(&xlsx), names);
    }

    #[test]
    fn test_empty_column_becomes_numeric() {
        let file = UploadedFile::new("gaps.csv", b"a,b\n1,\n2,\n".to_vec());
        let df = loader().load(&file).unwrap();
        assert_eq!(df.column("b").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("b").unwrap().null_count(), 2);
    }
}
