//! Filter choices, summary metrics and ranking sections for one view.

use std::collections::BTreeSet;
use std::time::Instant;

use chrono::NaiveDate;
use obs_model::{AgeBand, Field, Limit, ModelError, Ranking, RecordSet};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aggregate::{age_band_distribution, rank, universe};
use crate::filter::Predicate;

/// A report section. `Err` disables only that section.
pub type Section = Result<Ranking, ModelError>;

/// Values the operator can pick from, taken from the full record set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
    pub units: Vec<String>,
    pub sexes: Vec<String>,
    pub procedures: Vec<String>,
    pub professionals: Vec<String>,
    /// Bands present in the data, in taxonomy order.
    pub age_bands: Vec<AgeBand>,
}

fn distinct(records: &RecordSet, field: Field) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.text(field))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

impl FilterOptions {
    pub fn from_records(records: &RecordSet) -> Self {
        let (first_day, last_day) = day_span(records);
        let age_bands = records
            .iter()
            .filter_map(|record| record.age_band)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Self {
            first_day,
            last_day,
            units: distinct(records, Field::Unit),
            sexes: distinct(records, Field::Sex),
            procedures: distinct(records, Field::Procedure),
            professionals: distinct(records, Field::Professional),
            age_bands,
        }
    }
}

fn day_span(records: &RecordSet) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let mut days = records.iter().filter_map(|record| record.day());
    let Some(first) = days.next() else {
        return (None, None);
    };
    let (min, max) = days.fold((first, first), |(lo, hi), day| (lo.min(day), hi.max(day)));
    (Some(min), Some(max))
}

/// Scalar metrics of the filtered view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub total: usize,
    /// `None` when no record has an age.
    pub mean_age: Option<f64>,
    pub units: usize,
    pub procedures: usize,
    pub professionals: usize,
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
}

impl SummaryMetrics {
    pub fn from_records(records: &RecordSet) -> Self {
        let (sum, count) = records
            .iter()
            .filter_map(|record| record.age)
            .fold((0.0, 0usize), |(sum, count), age| (sum + age, count + 1));
        let (first_day, last_day) = day_span(records);
        Self {
            total: records.len(),
            mean_age: (count > 0).then(|| sum / count as f64),
            units: distinct(records, Field::Unit).len(),
            procedures: distinct(records, Field::Procedure).len(),
            professionals: distinct(records, Field::Professional).len(),
            first_day,
            last_day,
        }
    }
}

/// Limits and drill-down selection for [`Report::build`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    pub top_procedures: Limit,
    pub top_professionals: Limit,
    pub drill_down: Option<String>,
}

/// Professionals who performed one procedure.
#[derive(Debug, Clone, PartialEq)]
pub struct DrillDown {
    pub procedure: String,
    pub professionals: Section,
}

/// Everything shown for one filtered view.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub metrics: SummaryMetrics,
    pub by_unit: Section,
    pub by_sex: Section,
    /// Every band in taxonomy order, including empty ones.
    pub by_age_band: Section,
    pub by_procedure: Section,
    pub by_professional: Section,
    pub drill_down: Option<DrillDown>,
}

impl Report {
    /// Builds the report for `filtered`, padding top-N sections from `full`.
    pub fn build(full: &RecordSet, filtered: &RecordSet, options: &ReportOptions) -> Self {
        let start = Instant::now();

        let padded = |field: Field, limit: Limit| -> Section {
            let values = universe(full, field)?;
            rank(filtered, field, limit, Some(values.as_slice()))
        };

        let report = Self {
            metrics: SummaryMetrics::from_records(filtered),
            by_unit: rank(filtered, Field::Unit, Limit::All, None),
            by_sex: rank(filtered, Field::Sex, Limit::All, None),
            by_age_band: age_band_distribution(filtered)
                .map(|entries| Ranking::new(Field::AgeBand, entries)),
            by_procedure: padded(Field::Procedure, options.top_procedures),
            by_professional: padded(Field::Professional, options.top_professionals),
            drill_down: options
                .drill_down
                .as_deref()
                .map(|procedure| drill_down(filtered, procedure, options.top_professionals)),
        };

        for (name, section) in report.sections() {
            if let Err(err) = section {
                warn!(section = name, error = %err, "report section disabled");
            }
        }
        info!(
            records = filtered.len(),
            duration_ms = start.elapsed().as_millis(),
            "report built"
        );
        report
    }

    /// Named sections in display order.
    pub fn sections(&self) -> [(&'static str, &Section); 5] {
        [
            ("unit", &self.by_unit),
            ("sex", &self.by_sex),
            ("age_band", &self.by_age_band),
            ("procedure", &self.by_procedure),
            ("professional", &self.by_professional),
        ]
    }
}

/// Ranks the professionals who performed `procedure` within `records`.
pub fn drill_down(records: &RecordSet, procedure: &str, limit: Limit) -> DrillDown {
    let professionals = records.require_field(Field::Procedure).and_then(|()| {
        let predicate = Predicate::Equals {
            field: Field::Procedure,
            value: procedure.to_string(),
        };
        let matching = records.with_records(
            records
                .iter()
                .filter(|record| predicate.matches(record))
                .cloned()
                .collect(),
        );
        rank(&matching, Field::Professional, limit, None)
    });
    DrillDown {
        procedure: procedure.to_string(),
        professionals,
    }
}
