//! Narrowing a record set with filter criteria.

use obs_model::{DateRange, Field, FilterCriteria, Record, RecordSet, Selection};
use tracing::debug;

use crate::error::Result;

/// A single condition a record must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Day of the attendance within an inclusive range. Null dates never match.
    DateWithin(DateRange),
    /// Exact equality with the field's grouping key (ISO day for dates,
    /// trimmed number for ages). Null values never match.
    Equals { field: Field, value: String },
}

impl Predicate {
    pub fn field(&self) -> Field {
        match self {
            Predicate::DateWithin(_) => Field::Date,
            Predicate::Equals { field, .. } => *field,
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::DateWithin(range) => record.day().is_some_and(|day| range.contains(day)),
            Predicate::Equals { field, value } => record
                .key(*field)
                .is_some_and(|key| key == value.as_str()),
        }
    }
}

fn push_equals(out: &mut Vec<Predicate>, field: Field, selection: &Selection<String>) {
    if let Some(value) = selection.as_only() {
        out.push(Predicate::Equals {
            field,
            value: value.clone(),
        });
    }
}

/// Decomposes criteria into predicates. "Match all" selections yield none.
pub fn predicates(criteria: &FilterCriteria) -> Vec<Predicate> {
    let mut out = Vec::new();
    if let Some(range) = criteria.date_range.as_only() {
        out.push(Predicate::DateWithin(*range));
    }
    push_equals(&mut out, Field::Unit, &criteria.unit);
    push_equals(&mut out, Field::Sex, &criteria.sex);
    if let Some(band) = criteria.age_band.as_only() {
        out.push(Predicate::Equals {
            field: Field::AgeBand,
            value: band.label().to_string(),
        });
    }
    push_equals(&mut out, Field::Procedure, &criteria.procedure);
    push_equals(&mut out, Field::Professional, &criteria.professional);
    out
}

/// Keeps the records matching every predicate, in their original order.
///
/// Fails with `UnknownField` when a predicate targets a field absent from
/// the schema.
pub fn apply_predicates(records: &RecordSet, predicates: &[Predicate]) -> Result<RecordSet> {
    for predicate in predicates {
        records.require_field(predicate.field())?;
    }
    if predicates.is_empty() {
        return Ok(records.clone());
    }

    let kept: Vec<Record> = records
        .iter()
        .filter(|record| predicates.iter().all(|p| p.matches(record)))
        .cloned()
        .collect();

    debug!(
        input = records.len(),
        output = kept.len(),
        predicates = predicates.len(),
        "filter applied"
    );
    Ok(records.with_records(kept))
}

/// Applies operator criteria to a record set.
pub fn apply_filter(records: &RecordSet, criteria: &FilterCriteria) -> Result<RecordSet> {
    apply_predicates(records, &predicates(criteria))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use obs_model::{AgeBand, Schema};

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sample() -> RecordSet {
        let schema = Schema {
            fields: [Field::Date, Field::Unit, Field::Age, Field::AgeBand]
                .into_iter()
                .collect(),
            ..Schema::default()
        };
        let records = vec![
            Record {
                date: day(1).and_hms_opt(9, 0, 0),
                unit: Some("A".into()),
                age: Some(4.0),
                age_band: AgeBand::from_age(4.0),
                ..Record::default()
            },
            Record {
                date: day(5).and_hms_opt(23, 59, 0),
                unit: Some("B".into()),
                ..Record::default()
            },
            Record {
                unit: Some("A".into()),
                ..Record::default()
            },
        ];
        RecordSet::new(schema, records)
    }

    #[test]
    fn test_date_range_inclusive_excludes_null() {
        let set = sample();
        let criteria = FilterCriteria::match_all().with_date_range(DateRange::new(day(1), day(5)));
        let out = apply_filter(&set, &criteria).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_single_day() {
        let set = sample();
        let criteria = FilterCriteria::match_all().with_date_range(DateRange::single(day(5)));
        let out = apply_filter(&set, &criteria).unwrap();
        assert_eq!(out.records()[0].unit.as_deref(), Some("B"));
    }

    #[test]
    fn test_reversed_range_matches_nothing() {
        let set = sample();
        let criteria = FilterCriteria::match_all().with_date_range(DateRange::new(day(5), day(1)));
        assert!(apply_filter(&set, &criteria).unwrap().is_empty());
    }

    #[test]
    fn test_age_band_selection() {
        let set = sample();
        let criteria = FilterCriteria::match_all().with_age_band(AgeBand::Age0To5);
        assert_eq!(apply_filter(&set, &criteria).unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_field() {
        let set = sample();
        let err = apply_filter(&set, &FilterCriteria::match_all().with_sex("F")).unwrap_err();
        assert_eq!(err.to_string(), "unknown field 'sex'");

        // "match all" on an absent field is fine
        let mut criteria = FilterCriteria::match_all();
        criteria.sex = Selection::All;
        assert!(apply_filter(&set, &criteria).is_ok());
    }

    #[test]
    fn test_equals_on_date_and_age() {
        let set = sample();
        let on_day = [Predicate::Equals {
            field: Field::Date,
            value: "2024-01-05".into(),
        }];
        let out = apply_predicates(&set, &on_day).unwrap();
        assert_eq!(out.records()[0].unit.as_deref(), Some("B"));

        let aged = [Predicate::Equals {
            field: Field::Age,
            value: "4".into(),
        }];
        assert_eq!(apply_predicates(&set, &aged).unwrap().len(), 1);
    }

    #[test]
    fn test_match_all_is_identity() {
        let set = sample();
        assert_eq!(apply_filter(&set, &FilterCriteria::match_all()).unwrap(), set);
    }
}
