//! Filter criteria chosen by the operator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::age_band::AgeBand;
use crate::field::Field;

/// A predicate value, or the "match all" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T> Selection<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn as_only(&self) -> Option<&T> {
        match self {
            Selection::All => None,
            Selection::Only(value) => Some(value),
        }
    }
}

impl<T> From<Option<T>> for Selection<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Selection::All, Selection::Only)
    }
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Range covering a single day.
    pub fn single(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// A reversed range contains no day.
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Conjunctive set of optional predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub date_range: Selection<DateRange>,
    pub unit: Selection<String>,
    pub sex: Selection<String>,
    pub age_band: Selection<AgeBand>,
    pub procedure: Selection<String>,
    pub professional: Selection<String>,
}

impl FilterCriteria {
    /// Criteria where every predicate is "match all".
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn is_match_all(&self) -> bool {
        self.date_range.is_all()
            && self.unit.is_all()
            && self.sex.is_all()
            && self.age_band.is_all()
            && self.procedure.is_all()
            && self.professional.is_all()
    }

    /// Fields carrying a concrete selection, in [`Field::ALL`] order.
    pub fn selected_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| !self.is_all_for(*field))
            .collect()
    }

    fn is_all_for(&self, field: Field) -> bool {
        match field {
            Field::Date => self.date_range.is_all(),
            Field::Unit => self.unit.is_all(),
            Field::Sex => self.sex.is_all(),
            Field::AgeBand => self.age_band.is_all(),
            Field::Procedure => self.procedure.is_all(),
            Field::Professional => self.professional.is_all(),
            Field::Age => true,
        }
    }

    /// Resets the selection on `field` to "match all".
    pub fn clear(&mut self, field: Field) {
        match field {
            Field::Date => self.date_range = Selection::All,
            Field::Unit => self.unit = Selection::All,
            Field::Sex => self.sex = Selection::All,
            Field::AgeBand => self.age_band = Selection::All,
            Field::Procedure => self.procedure = Selection::All,
            Field::Professional => self.professional = Selection::All,
            Field::Age => {}
        }
    }

    #[must_use]
    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Selection::Only(range);
        self
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Selection::Only(unit.into());
        self
    }

    #[must_use]
    pub fn with_sex(mut self, sex: impl Into<String>) -> Self {
        self.sex = Selection::Only(sex.into());
        self
    }

    #[must_use]
    pub fn with_age_band(mut self, band: AgeBand) -> Self {
        self.age_band = Selection::Only(band);
        self
    }

    #[must_use]
    pub fn with_procedure(mut self, procedure: impl Into<String>) -> Self {
        self.procedure = Selection::Only(procedure.into());
        self
    }

    #[must_use]
    pub fn with_professional(mut self, professional: impl Into<String>) -> Self {
        self.professional = Selection::Only(professional.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_inclusive() {
        let range = DateRange::new(day(2024, 1, 1), day(2024, 1, 31));
        assert!(range.contains(day(2024, 1, 1)));
        assert!(range.contains(day(2024, 1, 31)));
        assert!(!range.contains(day(2024, 2, 1)));
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let range = DateRange::new(day(2024, 2, 1), day(2024, 1, 1));
        assert!(range.is_empty());
        assert!(!range.contains(day(2024, 1, 15)));
    }

    #[test]
    fn test_match_all_default() {
        assert!(FilterCriteria::match_all().is_match_all());
        assert!(!FilterCriteria::match_all().with_sex("F").is_match_all());
    }

    #[test]
    fn test_selected_fields_and_clear() {
        let mut criteria = FilterCriteria::match_all()
            .with_sex("F")
            .with_date_range(DateRange::single(day(2024, 1, 1)))
            .with_age_band(AgeBand::Over60);
        assert_eq!(
            criteria.selected_fields(),
            vec![Field::Date, Field::Sex, Field::AgeBand]
        );

        criteria.clear(Field::Sex);
        criteria.clear(Field::Age);
        assert_eq!(criteria.selected_fields(), vec![Field::Date, Field::AgeBand]);
        assert_eq!(criteria.sex, Selection::All);
    }

    #[test]
    fn test_selection_from_option() {
        assert_eq!(Selection::from(Some(3)), Selection::Only(3));
        assert_eq!(Selection::<i32>::from(None), Selection::All);
    }
}
