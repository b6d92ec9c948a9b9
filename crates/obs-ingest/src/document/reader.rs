//! Permissive CSV reading.
//!
//! The first row is the header. Rows with more fields than the header are
//! skipped, shorter rows are padded with missing cells, and rows the reader
//! cannot parse are skipped. A single bad row never aborts the document.

use csv::ReaderBuilder;
use obs_model::RawTable;

use crate::error::Result;

use super::decode::decode_bytes;
use super::options::CsvOptions;

/// A parsed document and the number of rows dropped while reading it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTable {
    pub table: RawTable,
    pub skipped_rows: usize,
}

/// Decodes and parses one document.
pub fn parse_bytes(bytes: &[u8], options: &CsvOptions) -> Result<ParsedTable> {
    let encoding = options.resolve_encoding()?;
    let delimiter = options.delimiter_byte()?;
    let text = decode_bytes(bytes, encoding);
    Ok(parse_text(&text, delimiter))
}

/// Parses already decoded text.
pub fn parse_text(text: &str, delimiter: u8) -> ParsedTable {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(record) => record.iter().map(str::to_string).collect(),
        Err(_) => return ParsedTable::default(),
    };
    let width = headers.len();
    let mut parsed = ParsedTable {
        table: RawTable::new(headers),
        skipped_rows: 0,
    };

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(_) => {
                parsed.skipped_rows += 1;
                continue;
            }
        };
        if record.len() > width {
            parsed.skipped_rows += 1;
            continue;
        }
        let row = record.iter().map(to_cell).collect();
        parsed.table.push_row(row);
    }

    parsed
}

fn to_cell(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
