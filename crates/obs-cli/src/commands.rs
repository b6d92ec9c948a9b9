use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use obs_cli::auth::{PASSWORD_ENV, Sha256Store, authenticate};
use obs_cli::cache::SnapshotCache;
use obs_cli::config::{Layout, Settings, SourceKind};
use obs_cli::explore::{ExploreCommand, ExploreError, Explorer, HELP, Outcome};
use obs_cli::pipeline::{Dataset, build_view, date_selection, load_dataset};
use obs_cli::session::SessionContext;
use obs_ingest::{
    Ingestor, ReqwestClient, ServiceAccountToken, Source, StaticToken, TokenFile, TokenProvider,
};
use obs_model::{FilterCriteria, Selection};
use obs_transform::{FilterOptions, raw_frame, write_csv};
use tracing::{info, info_span};

use crate::cli::{ExploreArgs, LayoutArg, ReportArgs, SourceArgs};
use crate::summary::{print_bands, print_options, print_raw, print_report, print_section};

/// Environment variable holding a Drive bearer token.
const DRIVE_TOKEN_ENV: &str = "OBS_DRIVE_TOKEN";

pub fn run_bands() {
    print_bands();
}

pub fn run_options(settings: &Settings, args: &SourceArgs) -> Result<()> {
    let session = open_session(settings, args)?;
    let dataset = load(settings, args)?;
    info!(user = session.user().unwrap_or("-"), "listing filter options");
    print_options(&FilterOptions::from_records(&dataset.records));
    Ok(())
}

pub fn run_report(settings: &Settings, args: &ReportArgs) -> Result<()> {
    let span = info_span!("report");
    let _guard = span.enter();

    let mut session = open_session(settings, &args.source)?;
    let dataset = load(settings, &args.source)?;
    let records = &dataset.records;

    let options = FilterOptions::from_records(records);
    session.set_criteria(criteria_from_args(args, &options));
    if let Some(procedure) = &args.drill_down {
        session.select_procedure(procedure.clone());
    }

    let top_procedures = args
        .top_procedures
        .unwrap_or(settings.display.top_procedures);
    let top_professionals = args
        .top_professionals
        .unwrap_or(settings.display.top_professionals);
    let view = build_view(records, &session, top_procedures, top_professionals)
        .context("apply filters")?;

    print_report(&view, resolve_layout(settings, args.layout));

    if let Some(rows) = args.raw {
        let frame = raw_frame(&dataset.raw, rows).context("build raw table")?;
        print_raw(&frame, dataset.raw.height());
    }

    if let Some(path) = &args.export {
        write_csv(&view.filtered, &settings.columns, path)
            .with_context(|| format!("export {}", path.display()))?;
        println!("Exported {} records to {}", view.filtered.len(), path.display());
    }
    Ok(())
}

pub fn run_explore(settings: &Settings, args: &ExploreArgs) -> Result<()> {
    let session = open_session(settings, &args.source)?;
    let sources = resolve_sources(settings, &args.source)?;
    let ingestor = build_ingestor(settings, &args.source, &sources)?;
    let normalize_options = settings.normalize_options();
    let layout = resolve_layout(settings, args.layout);

    let loader = || -> obs_ingest::Result<Dataset> {
        let dataset = load_dataset(&ingestor, &sources, &normalize_options)?;
        warn_skipped(&dataset);
        Ok(dataset)
    };
    let mut explorer = Explorer::new(SnapshotCache::new(settings.cache.ttl()), loader, session)
        .with_columns(settings.columns.clone())
        .with_limits(
            args.top_procedures
                .unwrap_or(settings.display.top_procedures),
            args.top_professionals
                .unwrap_or(settings.display.top_professionals),
        );

    println!("Type 'help' for commands, 'quit' to leave.");
    let mut pending = Some(ExploreCommand::Show);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        let command = match pending.take() {
            Some(command) => command,
            None => {
                print!("> ");
                io::stdout().flush().context("flush prompt")?;
                let Some(line) = lines.next() else { break };
                match line.context("read command")?.parse::<ExploreCommand>() {
                    Ok(command) => command,
                    Err(err) => {
                        eprintln!("error: {err}");
                        continue;
                    }
                }
            }
        };

        match explorer.apply(command) {
            Ok(Outcome::View { view, .. }) => print_report(&view, layout),
            Ok(Outcome::Options(options)) => print_options(&options),
            Ok(Outcome::Ranking { field, ranking }) => {
                print_section(&format!("Attendances by {field}"), &ranking, layout);
            }
            Ok(Outcome::Help) => println!("{HELP}"),
            Ok(Outcome::Quit) => break,
            Err(ExploreError::Ingest(err)) if err.is_empty_result() => println!("No data: {err}"),
            Err(err) => eprintln!("error: {err}"),
        }
    }
    info!(user = explorer.session().user().unwrap_or("-"), "explore session ended");
    Ok(())
}

fn resolve_layout(settings: &Settings, arg: Option<LayoutArg>) -> Layout {
    match arg {
        Some(LayoutArg::Wide) => Layout::Wide,
        Some(LayoutArg::Compact) => Layout::Compact,
        None => settings.display.layout,
    }
}

fn criteria_from_args(args: &ReportArgs, options: &FilterOptions) -> FilterCriteria {
    FilterCriteria {
        date_range: date_selection(args.date, args.from, args.to, options),
        unit: Selection::from(args.unit.clone()),
        sex: Selection::from(args.sex.clone()),
        age_band: Selection::from(args.age_band),
        procedure: Selection::from(args.procedure.clone()),
        professional: Selection::from(args.professional.clone()),
    }
}

fn open_session(settings: &Settings, args: &SourceArgs) -> Result<SessionContext> {
    let store = Sha256Store::from_settings(&settings.auth);
    let password = env::var(PASSWORD_ENV).ok();
    let user = authenticate(&store, args.user.as_deref(), password.as_deref())?;
    Ok(SessionContext::new(user))
}

/// One-shot load for the non-interactive commands.
fn load(settings: &Settings, args: &SourceArgs) -> Result<Dataset> {
    let sources = resolve_sources(settings, args)?;
    let ingestor = build_ingestor(settings, args, &sources)?;
    let dataset = load_dataset(&ingestor, &sources, &settings.normalize_options())?;
    warn_skipped(&dataset);
    Ok(dataset)
}

fn warn_skipped(dataset: &Dataset) {
    if dataset.skipped_rows > 0 {
        eprintln!(
            "warning: skipped {} malformed row(s) across {} document(s)",
            dataset.skipped_rows, dataset.documents
        );
    }
}

/// Sources from the command line, or the configured default.
fn resolve_sources(settings: &Settings, args: &SourceArgs) -> Result<Vec<Source>> {
    let mut sources: Vec<Source> = args.paths.iter().map(|path| path_source(path)).collect();
    if let Some(url) = &args.url {
        sources.push(Source::Url(url.clone()));
    }
    if let Some(folder_id) = &args.drive_folder {
        sources.push(Source::DriveFolder {
            folder_id: folder_id.clone(),
        });
    }
    if !sources.is_empty() {
        return Ok(sources);
    }

    let configured = &settings.source;
    match configured.kind {
        SourceKind::Local if !configured.paths.is_empty() => Ok(configured
            .paths
            .iter()
            .map(|path| path_source(path))
            .collect()),
        SourceKind::Url => match &configured.url {
            Some(url) => Ok(vec![Source::Url(url.clone())]),
            None => bail!("source kind is 'url' but no url is configured"),
        },
        SourceKind::DriveFolder => match &configured.drive_folder {
            Some(folder_id) => Ok(vec![Source::DriveFolder {
                folder_id: folder_id.clone(),
            }]),
            None => bail!("source kind is 'drive_folder' but no folder is configured"),
        },
        SourceKind::Local => bail!("no source given: pass CSV paths, --url or --drive-folder"),
    }
}

fn path_source(path: &Path) -> Source {
    if path.is_dir() {
        Source::Directory(path.to_path_buf())
    } else {
        Source::File(path.to_path_buf())
    }
}

fn build_ingestor(settings: &Settings, args: &SourceArgs, sources: &[Source]) -> Result<Ingestor> {
    let mut ingestor = Ingestor::new(settings.csv.clone());

    let remote = sources
        .iter()
        .any(|source| matches!(source, Source::Url(_) | Source::DriveFolder { .. }));
    if remote {
        ingestor = ingestor.with_http(Box::new(ReqwestClient::new().context("create HTTP client")?));
    }

    if let Some(tokens) = token_provider(settings, args) {
        ingestor = ingestor.with_token_provider(tokens);
    }
    Ok(ingestor)
}

/// Drive credential: a token from the environment, then command-line files,
/// then the settings file.
fn token_provider(settings: &Settings, args: &SourceArgs) -> Option<Box<dyn TokenProvider>> {
    if let Ok(token) = env::var(DRIVE_TOKEN_ENV)
        && !token.trim().is_empty()
    {
        return Some(Box::new(StaticToken::new(token.trim())));
    }
    if let Some(path) = &args.token_file {
        return Some(Box::new(TokenFile::new(path)));
    }
    if let Some(path) = &args.service_account {
        return Some(Box::new(ServiceAccountToken::new(path)));
    }
    if let Some(path) = &settings.source.token_file {
        return Some(Box::new(TokenFile::new(path)));
    }
    settings
        .source
        .service_account
        .as_ref()
        .map(|path| Box::new(ServiceAccountToken::new(path)) as Box<dyn TokenProvider>)
}
