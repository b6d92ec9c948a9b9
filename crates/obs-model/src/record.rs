//! Typed attendance records and record sets.

use std::borrow::Cow;
use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::age_band::AgeBand;
use crate::error::{ModelError, Result};
use crate::field::Field;

/// One attendance event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: Option<NaiveDateTime>,
    pub age: Option<f64>,
    pub unit: Option<String>,
    pub sex: Option<String>,
    pub procedure: Option<String>,
    pub professional: Option<String>,
    pub age_band: Option<AgeBand>,
    /// Values of the non-field columns, aligned with [`Schema::extra_columns`].
    #[serde(default)]
    pub extra: Vec<Option<String>>,
}

impl Record {
    /// Calendar day of the attendance.
    pub fn day(&self) -> Option<NaiveDate> {
        self.date.map(|dt| dt.date())
    }

    /// Text value of a categorical field. `None` for date and age.
    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Unit => self.unit.as_deref(),
            Field::Sex => self.sex.as_deref(),
            Field::Procedure => self.procedure.as_deref(),
            Field::Professional => self.professional.as_deref(),
            Field::AgeBand => self.age_band.map(AgeBand::label),
            Field::Date | Field::Age => None,
        }
    }

    /// Grouping key of any field; `None` when the value is null.
    pub fn key(&self, field: Field) -> Option<Cow<'_, str>> {
        match field {
            Field::Date => self
                .day()
                .map(|day| Cow::Owned(day.format("%Y-%m-%d").to_string())),
            Field::Age => self.age.map(|age| Cow::Owned(format_age(age))),
            _ => self.text(field).map(Cow::Borrowed),
        }
    }
}

/// Formats an age without trailing zeros (`42.0` -> `42`, `1.50` -> `1.5`).
pub fn format_age(age: f64) -> String {
    let s = format!("{age}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Columns and fields available in a record set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Trimmed column names in source order.
    pub columns: Vec<String>,
    /// Fields whose source column was found.
    pub fields: BTreeSet<Field>,
    /// Columns not mapped to a field, in source order.
    pub extra_columns: Vec<String>,
}

impl Schema {
    pub fn has(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    /// Fails with `UnknownField` when the field is absent.
    pub fn require(&self, field: Field) -> Result<()> {
        if self.has(field) {
            Ok(())
        } else {
            Err(ModelError::unknown_field(field.key()))
        }
    }
}

/// An ordered, immutable sequence of records with their schema.
///
/// Views derived from a record set (filters, drill-downs) share its schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    schema: Schema,
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(schema: Schema, records: Vec<Record>) -> Self {
        Self { schema, records }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.schema.has(field)
    }

    pub fn require_field(&self, field: Field) -> Result<()> {
        self.schema.require(field)
    }

    /// Builds a new view with the same schema.
    pub fn with_records(&self, records: Vec<Record>) -> Self {
        Self {
            schema: self.schema.clone(),
            records,
        }
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(42.0), "42");
        assert_eq!(format_age(1.5), "1.5");
        assert_eq!(format_age(-3.0), "-3");
    }

    #[test]
    fn test_record_key() {
        let record = Record {
            date: NaiveDate::from_ymd_opt(2024, 3, 9).and_then(|d| d.and_hms_opt(10, 30, 0)),
            age: Some(7.0),
            unit: Some("UBS Centro".to_string()),
            age_band: AgeBand::from_age(7.0),
            ..Record::default()
        };

        assert_eq!(record.key(Field::Date).as_deref(), Some("2024-03-09"));
        assert_eq!(record.key(Field::Age).as_deref(), Some("7"));
        assert_eq!(record.key(Field::Unit).as_deref(), Some("UBS Centro"));
        assert_eq!(record.key(Field::AgeBand).as_deref(), Some("6-12"));
        assert_eq!(record.key(Field::Sex), None);
    }

    #[test]
    fn test_schema_require() {
        let schema = Schema {
            fields: [Field::Unit].into_iter().collect(),
            ..Schema::default()
        };
        assert!(schema.require(Field::Unit).is_ok());
        assert_eq!(
            schema.require(Field::Sex),
            Err(ModelError::unknown_field("sex"))
        );
    }
}
