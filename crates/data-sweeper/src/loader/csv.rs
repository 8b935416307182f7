//! Delimited text reader.

use std::io::Cursor;

use polars::prelude::*;
use tracing::{debug, warn};

use super::unique_names;
use crate::config::SweepConfig;
use crate::error::{Result, SweepError};
use crate::utils::column_names;

const DUPLICATE_MARKER: &str = "_duplicated_";

/// Parse comma-separated bytes with a header row.
///
/// Quoted fields follow the usual double-quote rules. Empty fields and the
/// configured null markers become missing cells.
pub(super) fn read_csv(bytes: &[u8], config: &SweepConfig) -> Result<DataFrame> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(SweepError::parse_failure("", "file is empty"));
    }

    let df = match parse(bytes, config, config.infer_schema_length) {
        Ok(df) => df,
        Err(e) if config.infer_schema_length.is_some() => {
            warn!("Sampled type inference failed ({}), retrying on the full file", e);
            parse(bytes, config, None).map_err(|e| SweepError::parse_failure("", e))?
        }
        Err(e) => return Err(SweepError::parse_failure("", e)),
    };

    restore_duplicate_headers(df)
}

fn parse(bytes: &[u8], config: &SweepConfig, infer_len: Option<usize>) -> PolarsResult<DataFrame> {
    let null_values = (!config.null_markers.is_empty()).then(|| {
        NullValues::AllColumns(
            config
                .null_markers
                .iter()
                .map(|marker| marker.as_str().into())
                .collect(),
        )
    });

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(infer_len)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(b',')
                .with_quote_char(Some(b'"'))
                .with_null_values(null_values),
        )
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
}

/// Rename polars' `<name>_duplicated_<n>` headers to the `<name>.<n>` scheme
/// the spreadsheet reader uses.
fn restore_duplicate_headers(mut df: DataFrame) -> Result<DataFrame> {
    let names = column_names(&df);
    let bases = names.iter().map(|name| {
        name.rsplit_once(DUPLICATE_MARKER)
            .filter(|(base, n)| {
                !n.is_empty()
                    && n.bytes().all(|b| b.is_ascii_digit())
                    && names.iter().any(|other| other.as_str() == *base)
            })
            .map_or_else(|| name.clone(), |(base, _)| base.to_string())
    });

    let renamed = unique_names(bases);
    if renamed != names {
        debug!("Renamed duplicate headers: {:?}", renamed);
        df.set_column_names(renamed)?;
    }
    Ok(df)
}
