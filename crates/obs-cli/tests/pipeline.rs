//! End-to-end runs from CSV bytes to report.

use std::cell::Cell;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use obs_cli::cache::SnapshotCache;
use obs_cli::explore::{ExploreCommand, Explorer, Outcome};
use obs_cli::pipeline::{Dataset, View, build_view, load_dataset};
use obs_cli::session::SessionContext;
use obs_ingest::{CsvOptions, IngestError, Ingestor, Source};
use obs_model::{AgeBand, DateRange, Field, FilterCriteria, Limit};
use obs_transform::{NormalizeOptions, apply_filter};

const CSV: &str = "\
Data Atendimento , Idade,Unidade,Sexo,Procedimento,Profissional
01/03/2024,4,UBS Centro,F,Consulta,Ana
02/03/2024,9,UBS Centro,M,Vacina,Bruno
sem data,35,UBS Norte,F,Consulta,Ana
03/03/2024,-2,UBS Norte,M,Curativo,Carla
04/03/2024,61,UBS Centro,F,Consulta,Bruno
05/03/2024,,UBS Sul,F,Vacina,Ana
06/03/2024,29,UBS Norte,M,Consulta,Carla
31/02/2024,70,UBS Sul,F,Curativo,Bruno
07/03/2024,15,UBS Centro,F,Consulta,Ana
08/03/2024,46,UBS Sul,M,Vacina,Carla
";

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn load(bytes: &str) -> Result<Dataset, IngestError> {
    let ingestor = Ingestor::new(CsvOptions::default());
    load_dataset(
        &ingestor,
        &[Source::bytes("atendimentos.csv", bytes)],
        &NormalizeOptions::default(),
    )
}

#[test]
fn ten_rows_with_two_bad_dates() {
    let dataset = load(CSV).unwrap();
    let records = &dataset.records;

    assert_eq!(records.len(), 10);
    assert!(records.has_field(Field::Date));
    assert_eq!(records.iter().filter(|r| r.date.is_none()).count(), 2);

    // missing and negative ages have no band
    let unbanded: Vec<Option<f64>> = records
        .iter()
        .filter(|r| r.age_band.is_none())
        .map(|r| r.age)
        .collect();
    assert_eq!(unbanded, vec![Some(-2.0), None]);

    let mut session = SessionContext::new(None);
    session.set_criteria(FilterCriteria::match_all().with_date_range(DateRange::new(day(1), day(31))));
    let view = build_view(records, &session, Limit::default(), Limit::default()).unwrap();

    assert_eq!(view.filtered.len(), 8);
    assert!(view.filtered.iter().all(|r| r.date.is_some()));
    assert_eq!(view.report.metrics.total, view.filtered.len());
}

#[test]
fn report_sections_and_drill_down() {
    let dataset = load(CSV).unwrap();
    let mut session = SessionContext::new(Some("gestor".into()));
    session.set_criteria(FilterCriteria::match_all().with_unit("UBS Centro"));
    session.select_procedure("Consulta");

    let view = build_view(&dataset.records, &session, Limit::Top(3), Limit::Top(2)).unwrap();
    let report = &view.report;

    assert_eq!(report.metrics.total, 4);
    assert_eq!(report.metrics.units, 1);

    let procedures = report.by_procedure.as_ref().unwrap();
    assert_eq!(procedures.values(), vec!["Consulta", "Vacina", "Curativo"]);
    assert_eq!(procedures.count_of("Curativo"), Some(0));

    let bands = report.by_age_band.as_ref().unwrap();
    assert_eq!(bands.len(), AgeBand::ALL.len());
    assert_eq!(bands.count_of("0-5"), Some(1));

    let drill = report.drill_down.as_ref().unwrap();
    assert_eq!(drill.procedure, "Consulta");
    assert_eq!(
        drill.professionals.as_ref().unwrap().values(),
        vec!["Ana", "Bruno"]
    );
}

#[test]
fn header_only_source_signals_no_data() {
    let aggregated = Cell::new(false);
    let result = load("Data Atendimento,Idade\n").map(|dataset| {
        aggregated.set(true);
        dataset
    });

    assert!(matches!(result, Err(IngestError::EmptyResult { documents: 1 })));
    assert!(!aggregated.get());
}

#[test]
fn cached_dataset_survives_a_failed_refresh_attempt() {
    let cache = SnapshotCache::new(Duration::from_secs(3600));
    let start = Instant::now();

    let first = cache.get_or_try_load_at(start, || load(CSV)).unwrap();
    let shared = cache
        .get_or_try_load_at(start + Duration::from_secs(60), || load(""))
        .unwrap();
    assert!(Arc::ptr_eq(&first, &shared));

    let expired = start + Duration::from_secs(3600);
    assert!(cache.get_or_try_load_at(expired, || load("")).is_err());
    assert!(!cache.is_fresh_at(expired));
}

#[test]
fn filter_on_missing_column_degrades_only_that_filter() {
    let dataset = load("Unidade,Idade\nUBS A,30\nUBS B,8\n").unwrap();
    let mut session = SessionContext::new(None);
    session.set_criteria(FilterCriteria::match_all().with_sex("F").with_unit("UBS A"));

    let view = build_view(&dataset.records, &session, Limit::default(), Limit::default()).unwrap();

    assert_eq!(view.disabled_filters, vec![Field::Sex]);
    assert_eq!(view.filtered.len(), 1);
    assert_eq!(view.report.metrics.total, 1);
    assert!(view.report.by_unit.is_ok());
    assert!(view.report.by_sex.is_err());

    // the library filter stays strict
    assert!(apply_filter(&dataset.records, session.criteria()).is_err());
}

fn expect_view(outcome: Outcome) -> (Arc<Dataset>, View) {
    match outcome {
        Outcome::View { dataset, view } => (dataset, view),
        other => panic!("expected a view, got {other:?}"),
    }
}

#[test]
fn explorer_reuses_snapshot_within_window() {
    let loads = Cell::new(0);
    let loader = || {
        loads.set(loads.get() + 1);
        load(CSV)
    };
    let mut explorer = Explorer::new(
        SnapshotCache::new(Duration::from_secs(3600)),
        loader,
        SessionContext::new(None),
    );
    let start = Instant::now();

    let (first, all) = expect_view(explorer.apply_at(ExploreCommand::Show, start).unwrap());
    let command: ExploreCommand = "unit UBS Centro".parse().unwrap();
    let (second, centro) = expect_view(
        explorer
            .apply_at(command, start + Duration::from_secs(600))
            .unwrap(),
    );

    assert_eq!(loads.get(), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(all.filtered.len(), 10);
    assert_eq!(centro.filtered.len(), 4);

    // after the window the sources are read again, filters kept
    let (third, still_centro) = expect_view(
        explorer
            .apply_at(ExploreCommand::Show, start + Duration::from_secs(3600))
            .unwrap(),
    );
    assert_eq!(loads.get(), 2);
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(still_centro.filtered.len(), 4);
}

#[test]
fn explorer_reload_and_reset() {
    let loads = Cell::new(0);
    let loader = || {
        loads.set(loads.get() + 1);
        load(CSV)
    };
    let mut explorer = Explorer::new(
        SnapshotCache::new(Duration::from_secs(3600)),
        loader,
        SessionContext::new(None),
    );
    let now = Instant::now();

    explorer
        .apply_at("drill Consulta".parse().unwrap(), now)
        .unwrap();
    assert_eq!(explorer.session().drill_down(), Some("Consulta"));

    let (_, view) = expect_view(
        explorer
            .apply_at("dates 2024-03-01 2024-03-04".parse().unwrap(), now)
            .unwrap(),
    );
    assert_eq!(view.filtered.len(), 4);

    explorer.apply_at(ExploreCommand::Reload, now).unwrap();
    assert_eq!(loads.get(), 2);

    let (_, view) = expect_view(explorer.apply_at(ExploreCommand::Reset, now).unwrap());
    assert_eq!(view.filtered.len(), 10);
    assert!(view.report.drill_down.is_none());
    assert_eq!(explorer.session().drill_down(), None);

    match explorer
        .apply_at("rank Profissional 2".parse().unwrap(), now)
        .unwrap()
    {
        Outcome::Ranking { ranking, .. } => {
            let ranking = ranking.unwrap();
            assert_eq!(ranking.len(), 2);
            assert_eq!(ranking.count_of("Ana"), Some(4));
        }
        other => panic!("expected a ranking, got {other:?}"),
    }
}
