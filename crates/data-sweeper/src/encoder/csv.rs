//! Comma-separated writer.

use polars::prelude::*;

use crate::error::Result;

/// Write `df` as CSV with a header row. Missing cells are written empty.
pub(super) fn write_csv(df: &DataFrame) -> Result<Vec<u8>> {
    let mut df = df.clone();
    let mut buffer = Vec::new();

    CsvWriter::new(&mut buffer)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(&mut df)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_and_rows() {
        let df = df! {
            "name" => ["ann", "bob"],
            "age" => [Some(30i64), None],
        }
        .unwrap();

        let text = String::from_utf8(write_csv(&df).unwrap()).unwrap();
        assert_eq!(text, "name,age\nann,30\nbob,\n");
    }

    #[test]
    fn test_quotes_separators() {
        let df = df! { "city" => ["Paris, FR"] }.unwrap();
        let text = String::from_utf8(write_csv(&df).unwrap()).unwrap();
        assert_eq!(text, "city\n\"Paris, FR\"\n");
    }
}
