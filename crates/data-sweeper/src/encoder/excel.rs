//! Spreadsheet writer for `.xlsx` workbooks.

use polars::prelude::*;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::error::{Result, SweepError};
use crate::utils::{ColumnKind, column_kind, numeric_values, text_values};

/// Data rows available below the header in one worksheet.
const MAX_DATA_ROWS: usize = 1_048_575;
const MAX_COLUMNS: usize = 16_384;

/// Write `df` to a single worksheet named `sheet_name`.
///
/// The first row holds the column names. Numbers and booleans keep their
/// cell types, everything else is written as text, and missing cells are
/// left blank.
pub(super) fn write_xlsx(df: &DataFrame, sheet_name: &str) -> Result<Vec<u8>> {
    let (height, width) = df.shape();
    if height > MAX_DATA_ROWS || width > MAX_COLUMNS {
        return Err(SweepError::EncodingFailed {
            format: "Excel".to_string(),
            reason: format!(
                "{} rows x {} columns exceeds the worksheet limit of {} x {}",
                height, width, MAX_DATA_ROWS, MAX_COLUMNS
            ),
        });
    }

    let mut workbook = Workbook::new();
    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name)?;

        for (col_idx, column) in df.get_columns().iter().enumerate() {
            let col_idx = col_idx as u16;
            worksheet.write_string(0, col_idx, column.name().as_str())?;
            write_column(worksheet, col_idx, column.as_materialized_series())?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_column(worksheet: &mut Worksheet, col: u16, series: &Series) -> Result<()> {
    match column_kind(series.dtype()) {
        ColumnKind::Numeric => {
            for (row, value) in numeric_values(series)?.into_iter().enumerate() {
                match value {
                    Some(v) if v.is_finite() => {
                        worksheet.write_number(data_row(row), col, v)?;
                    }
                    Some(v) if v.is_infinite() => {
                        worksheet.write_string(data_row(row), col, v.to_string())?;
                    }
                    _ => {}
                }
            }
        }
        ColumnKind::Boolean => {
            for (row, value) in series.bool()?.into_iter().enumerate() {
                if let Some(v) = value {
                    worksheet.write_boolean(data_row(row), col, v)?;
                }
            }
        }
        ColumnKind::Text => {
            for (row, value) in text_values(series)?.into_iter().enumerate() {
                if let Some(v) = value.filter(|v| !v.is_empty()) {
                    worksheet.write_string(data_row(row), col, v)?;
                }
            }
        }
    }
    Ok(())
}

/// Worksheet row for a table row, below the header.
fn data_row(row: usize) -> u32 {
    row as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx};
    use std::io::Cursor;

    #[test]
    fn test_cells_and_sheet_name() {
        let df = df! {
            "name" => [Some("ann"), None],
            "score" => [Some(1.5f64), None],
            "ok" => [true, false],
        }
        .unwrap();

        let bytes = write_xlsx(&df, "Cleaned").unwrap();
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Cleaned".to_string()]);

        let range = workbook.worksheet_range("Cleaned").unwrap();
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("name".into())));
        assert_eq!(range.get_value((1, 1)), Some(&Data::Float(1.5)));
        assert_eq!(range.get_value((1, 2)), Some(&Data::Bool(true)));
        assert!(matches!(range.get_value((2, 0)), None | Some(Data::Empty)));
    }

    #[test]
    fn test_invalid_sheet_name() {
        let df = df! { "a" => [1i64] }.unwrap();
        assert!(write_xlsx(&df, "bad/name").is_err());
    }
}
