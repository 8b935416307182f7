//! Spreadsheet reader for `.xlsx` workbooks.
//!
//! Only the first worksheet is read. Column types are inferred from the
//! non-empty cells below the header:
//! - all numbers → `Int64` when every value is integral, else `Float64`
//! - all booleans → `Boolean`
//! - anything else → `String`, with numbers and booleans rendered as text
//!
//! Date cells are rendered as ISO text (`2024-01-15`, or
//! `2024-01-15T09:30:00` when a time of day is set).

use std::io::Cursor;

use calamine::{Data, DataType as _, Reader, Xlsx};
use chrono::NaiveTime;
use polars::prelude::*;
use tracing::debug;

use super::unique_names;
use crate::error::{Result, SweepError};

/// Largest magnitude an `f64` holds as an exact integer.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

static EMPTY: Data = Data::Empty;

pub(super) fn read_xlsx(bytes: &[u8]) -> Result<DataFrame> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SweepError::parse_failure("", "workbook has no worksheets"))??;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };

    let names = header_names(header);
    let mut cells: Vec<Vec<&Data>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(row.get(idx).unwrap_or(&EMPTY));
        }
    }

    let columns = names
        .iter()
        .zip(&cells)
        .map(|(name, values)| build_column(name, values))
        .collect::<Vec<_>>();

    debug!("Read worksheet with {} columns", columns.len());
    Ok(DataFrame::new(columns)?)
}

/// Header cells as unique column names.
///
/// Blank headers become `Unnamed: <index>`; repeated names get a `.<n>` suffix.
fn header_names(header: &[Data]) -> Vec<String> {
    unique_names(header.iter().enumerate().map(|(idx, cell)| match cell {
        Data::Empty => format!("Unnamed: {}", idx),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT_INT => {
            format!("{}", *f as i64)
        }
        other => other.to_string(),
    }))
}

fn is_missing(cell: &Data) -> bool {
    match cell {
        Data::Empty | Data::Error(_) => true,
        Data::String(s) => s.is_empty(),
        _ => false,
    }
}

fn as_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) => Some(*f),
        _ => None,
    }
}

fn as_text(cell: &Data) -> String {
    match cell {
        Data::Float(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT_INT => format!("{}", *f as i64),
        Data::Bool(b) => (if *b { "True" } else { "False" }).to_string(),
        Data::DateTime(_) => match cell.as_datetime() {
            Some(dt) if dt.time() == NaiveTime::MIN => dt.format("%Y-%m-%d").to_string(),
            Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            None => cell.to_string(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        other => other.to_string(),
    }
}

fn build_column(name: &str, cells: &[&Data]) -> Column {
    let present: Vec<&Data> = cells.iter().copied().filter(|c| !is_missing(c)).collect();

    if present.is_empty() {
        return Series::full_null(name.into(), cells.len(), &DataType::Float64).into_column();
    }

    if present.iter().all(|c| as_number(c).is_some()) {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| if is_missing(c) { None } else { as_number(c) })
            .collect();
        let integral = values
            .iter()
            .flatten()
            .all(|v| v.fract() == 0.0 && v.abs() < MAX_EXACT_INT);
        if integral {
            let ints: Vec<Option<i64>> = values.iter().map(|v| v.map(|f| f as i64)).collect();
            return Column::new(name.into(), ints);
        }
        return Column::new(name.into(), values);
    }

    if present.iter().all(|c| matches!(c, Data::Bool(_))) {
        let values: Vec<Option<bool>> = cells
            .iter()
            .map(|c| match c {
                Data::Bool(b) => Some(*b),
                _ => None,
            })
            .collect();
        return Column::new(name.into(), values);
    }

    let values: Vec<Option<String>> = cells
        .iter()
        .map(|c| (!is_missing(c)).then(|| as_text(c)))
        .collect();
    Column::new(name.into(), values)
}
