//! Polars frames for display and CSV export.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use chrono::{NaiveDateTime, NaiveTime};
use obs_model::{ColumnMap, Field, RawTable, Record, RecordSet};
use polars::prelude::*;
use tracing::info;

use crate::error::{Result, TransformError};

fn format_date(date: NaiveDateTime) -> String {
    if date.time() == NaiveTime::MIN {
        date.format("%Y-%m-%d").to_string()
    } else {
        date.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

fn text_column(name: &str, values: Vec<Option<String>>) -> Column {
    Series::new(name.into(), values).into_column()
}

/// Builds a frame of the records.
///
/// Field columns come first under their configured names, then the derived
/// age band, then the remaining source columns. Dates are ISO formatted and
/// ages are `f64`.
pub fn to_frame(records: &RecordSet, columns: &ColumnMap) -> Result<DataFrame> {
    let schema = records.schema();
    let rows = records.records();
    let mut used: HashSet<String> = HashSet::new();
    let mut out: Vec<Column> = Vec::new();

    for field in Field::ALL {
        if !schema.has(field) {
            continue;
        }
        let name = columns.column(field).trim().to_string();
        let column = match field {
            Field::Date => text_column(
                &name,
                rows.iter().map(|r| r.date.map(format_date)).collect(),
            ),
            Field::Age => {
                let ages: Vec<Option<f64>> = rows.iter().map(|r| r.age).collect();
                Series::new(name.as_str().into(), ages).into_column()
            }
            _ => text_column(
                &name,
                rows.iter()
                    .map(|r: &Record| r.text(field).map(str::to_string))
                    .collect(),
            ),
        };
        used.insert(name);
        out.push(column);
    }

    for (idx, name) in schema.extra_columns.iter().enumerate() {
        if !used.insert(name.clone()) {
            continue;
        }
        out.push(text_column(
            name,
            rows.iter()
                .map(|r| r.extra.get(idx).cloned().flatten())
                .collect(),
        ));
    }

    Ok(DataFrame::new(out)?)
}

/// Builds a frame of the first `limit` raw rows, all columns as text.
///
/// Repeated header names get a `.1`, `.2`, ... suffix.
pub fn raw_frame(table: &RawTable, limit: usize) -> Result<DataFrame> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(table.width());

    for (idx, header) in table.headers.iter().enumerate() {
        let mut name = header.clone();
        let mut n = 0;
        while !seen.insert(name.clone()) {
            n += 1;
            name = format!("{header}.{n}");
        }
        let values: Vec<Option<String>> = table
            .rows
            .iter()
            .take(limit)
            .map(|row| row.get(idx).cloned().flatten())
            .collect();
        out.push(text_column(&name, values));
    }

    Ok(DataFrame::new(out)?)
}

/// Writes the records to a CSV file with a header row.
pub fn write_csv(records: &RecordSet, columns: &ColumnMap, path: &Path) -> Result<()> {
    let mut df = to_frame(records, columns)?;
    let mut file = File::create(path).map_err(|source| TransformError::Export {
        path: path.to_path_buf(),
        source,
    })?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    info!(path = %path.display(), rows = df.height(), "exported records");
    Ok(())
}
