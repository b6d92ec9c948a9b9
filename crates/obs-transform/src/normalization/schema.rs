//! Raw table to typed record set.

use std::collections::BTreeSet;
use std::time::Instant;

use obs_model::{AgeBand, ColumnMap, Field, RawTable, Record, RecordSet, Schema};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::datetime::{DateOrder, parse_datetime};
use super::numeric::parse_f64;

/// How column names and values are interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    pub columns: ColumnMap,
    pub date_order: DateOrder,
}

/// Trims surrounding whitespace from a column name.
pub fn normalize_header(name: &str) -> String {
    name.trim().to_string()
}

/// Positions of every raw column that trims to `name`.
fn positions(headers: &[String], name: &str) -> Vec<usize> {
    let name = name.trim();
    headers
        .iter()
        .enumerate()
        .filter(|(_, header)| header.as_str() == name)
        .map(|(idx, _)| idx)
        .collect()
}

/// First non-null cell among duplicate columns.
fn first_cell<'a>(row: &'a [Option<String>], columns: &[usize]) -> Option<&'a str> {
    columns
        .iter()
        .find_map(|&idx| row.get(idx).and_then(|cell| cell.as_deref()))
}

fn text_cell(row: &[Option<String>], columns: &[usize]) -> Option<String> {
    first_cell(row, columns)
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
}

/// Builds the typed record set.
///
/// Column names are trimmed; case and inner spacing are kept. Date and age
/// cells that do not parse become null and the age band follows the age.
/// A field whose column is missing is left out of the schema.
pub fn normalize(table: &RawTable, options: &NormalizeOptions) -> RecordSet {
    let start = Instant::now();
    let headers: Vec<String> = table.headers.iter().map(|h| normalize_header(h)).collect();

    let mut fields = BTreeSet::new();
    let mut claimed = vec![false; headers.len()];
    let mut located: Vec<(Field, Vec<usize>)> = Vec::new();
    for field in Field::SOURCE {
        let columns = positions(&headers, options.columns.column(field));
        if columns.is_empty() {
            continue;
        }
        for &idx in &columns {
            claimed[idx] = true;
        }
        fields.insert(field);
        located.push((field, columns));
    }
    if fields.contains(&Field::Age) {
        fields.insert(Field::AgeBand);
    }

    let extra_positions: Vec<usize> = (0..headers.len()).filter(|&idx| !claimed[idx]).collect();
    let extra_columns: Vec<String> = extra_positions
        .iter()
        .map(|&idx| headers[idx].clone())
        .collect();

    let mut unparsed_dates = 0usize;
    let mut unparsed_ages = 0usize;
    let mut records = Vec::with_capacity(table.height());

    for row in &table.rows {
        let mut record = Record {
            extra: extra_positions
                .iter()
                .map(|&idx| row.get(idx).cloned().flatten())
                .collect(),
            ..Record::default()
        };

        for (field, columns) in &located {
            match field {
                Field::Date => {
                    if let Some(raw) = first_cell(row, columns) {
                        record.date = parse_datetime(raw, options.date_order);
                        if record.date.is_none() {
                            unparsed_dates += 1;
                        }
                    }
                }
                Field::Age => {
                    if let Some(raw) = first_cell(row, columns) {
                        record.age = parse_f64(raw);
                        if record.age.is_none() && !raw.trim().is_empty() {
                            unparsed_ages += 1;
                        }
                    }
                    record.age_band = record.age.and_then(AgeBand::from_age);
                }
                Field::Unit => record.unit = text_cell(row, columns),
                Field::Sex => record.sex = text_cell(row, columns),
                Field::Procedure => record.procedure = text_cell(row, columns),
                Field::Professional => record.professional = text_cell(row, columns),
                Field::AgeBand => {}
            }
        }
        records.push(record);
    }

    if unparsed_dates > 0 || unparsed_ages > 0 {
        debug!(unparsed_dates, unparsed_ages, "unparseable values set to null");
    }

    let missing: Vec<&str> = Field::SOURCE
        .into_iter()
        .filter(|field| !fields.contains(field))
        .map(Field::key)
        .collect();
    if !missing.is_empty() {
        debug!(missing = ?missing, "expected columns not found");
    }

    info!(
        rows = records.len(),
        fields = fields.len(),
        extra_columns = extra_columns.len(),
        duration_ms = start.elapsed().as_millis(),
        "normalize complete"
    );

    let schema = Schema {
        columns: headers,
        fields,
        extra_columns,
    };
    RecordSet::new(schema, records)
}
