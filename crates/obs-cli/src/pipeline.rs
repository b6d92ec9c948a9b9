//! Load, filter and report stages shared by the commands.

use std::time::Instant;

use chrono::NaiveDate;
use obs_ingest::{Ingestor, Source};
use obs_model::{DateRange, Field, FilterCriteria, Limit, RawTable, RecordSet, Selection};
use obs_transform::{
    FilterOptions, NormalizeOptions, Report, ReportOptions, apply_filter, normalize,
};
use tracing::{info, info_span, warn};

use crate::session::SessionContext;

/// One load of the sources: the raw table and its normalized records.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub raw: RawTable,
    pub records: RecordSet,
    pub documents: usize,
    pub skipped_rows: usize,
}

/// Ingests and normalizes the sources.
pub fn load_dataset(
    ingestor: &Ingestor,
    sources: &[Source],
    options: &NormalizeOptions,
) -> obs_ingest::Result<Dataset> {
    let span = info_span!("load");
    let _guard = span.enter();
    let start = Instant::now();

    let ingested = ingestor.ingest(sources)?;
    let records = normalize(&ingested.table, options);

    info!(
        documents = ingested.documents,
        records = records.len(),
        duration_ms = start.elapsed().as_millis(),
        "dataset loaded"
    );
    Ok(Dataset {
        raw: ingested.table,
        records,
        documents: ingested.documents,
        skipped_rows: ingested.skipped_rows,
    })
}

/// Date selection from command-line bounds.
///
/// A single `date` wins over `from`/`to`. A missing bound falls back to the
/// data's first or last day. No bound at all selects every record.
pub fn date_selection(
    date: Option<NaiveDate>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    options: &FilterOptions,
) -> Selection<DateRange> {
    if let Some(day) = date {
        return Selection::Only(DateRange::single(day));
    }
    if from.is_none() && to.is_none() {
        return Selection::All;
    }
    match (from.or(options.first_day), to.or(options.last_day)) {
        (Some(start), Some(end)) => Selection::Only(DateRange::new(start, end)),
        (Some(day), None) | (None, Some(day)) => Selection::Only(DateRange::single(day)),
        (None, None) => Selection::All,
    }
}

/// Everything the operator sees for the current session.
#[derive(Debug, Clone)]
pub struct View {
    pub filtered: RecordSet,
    pub report: Report,
    /// Selections ignored because their column is missing from the data.
    pub disabled_filters: Vec<Field>,
}

/// Drops the selections on fields the record set does not have.
///
/// Returns the remaining criteria and the fields whose filter was dropped.
pub fn usable_criteria(
    records: &RecordSet,
    criteria: &FilterCriteria,
) -> (FilterCriteria, Vec<Field>) {
    let mut usable = criteria.clone();
    let mut disabled = Vec::new();
    for field in criteria.selected_fields() {
        if !records.has_field(field) {
            warn!(field = %field, "column missing, filter disabled");
            usable.clear(field);
            disabled.push(field);
        }
    }
    (usable, disabled)
}

/// Applies the session's criteria and builds the report.
///
/// A selection on a missing column disables that filter only; the rest of
/// the view is still built.
pub fn build_view(
    records: &RecordSet,
    session: &SessionContext,
    top_procedures: Limit,
    top_professionals: Limit,
) -> obs_transform::Result<View> {
    let (criteria, disabled_filters) = usable_criteria(records, session.criteria());
    let filtered = apply_filter(records, &criteria)?;
    let report = Report::build(
        records,
        &filtered,
        &ReportOptions {
            top_procedures,
            top_professionals,
            drill_down: session.drill_down().map(str::to_string),
        },
    );
    Ok(View {
        filtered,
        report,
        disabled_filters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    fn options() -> FilterOptions {
        FilterOptions {
            first_day: Some(day(1)),
            last_day: Some(day(31)),
            ..FilterOptions::default()
        }
    }

    #[test]
    fn test_date_selection() {
        let options = options();
        assert_eq!(date_selection(None, None, None, &options), Selection::All);
        assert_eq!(
            date_selection(Some(day(4)), Some(day(1)), None, &options),
            Selection::Only(DateRange::single(day(4)))
        );
        assert_eq!(
            date_selection(None, Some(day(10)), None, &options),
            Selection::Only(DateRange::new(day(10), day(31)))
        );
        assert_eq!(
            date_selection(None, None, Some(day(10)), &options),
            Selection::Only(DateRange::new(day(1), day(10)))
        );
    }

    #[test]
    fn test_date_selection_without_dates_in_data() {
        let options = FilterOptions::default();
        assert_eq!(
            date_selection(None, Some(day(2)), None, &options),
            Selection::Only(DateRange::single(day(2)))
        );
    }
}
