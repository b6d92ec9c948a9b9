//! Interactive exploration over one cached dataset.
//!
//! An [`Explorer`] owns the [`SnapshotCache`] for the whole session, so every
//! command inside the freshness window works on the same loaded records and
//! the sources are read again only after the window closes (or on `reload`).

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use obs_ingest::IngestError;
use obs_model::{AgeBand, ColumnMap, Field, FilterCriteria, Limit, Selection};
use obs_transform::{FilterOptions, Section, TransformError, rank_by_name};
use thiserror::Error;
use tracing::debug;

use crate::cache::SnapshotCache;
use crate::pipeline::{Dataset, View, build_view, date_selection};
use crate::session::SessionContext;

pub const HELP: &str = "\
commands:
  show                          print the report again
  unit|sex|procedure|professional [VALUE]
                                filter on a value; no value clears the filter
  band [LABEL]                  filter on an age band, e.g. 19-30 or 60+
  date DAY                      a single day (YYYY-MM-DD)
  dates [FROM] [TO]             a period; '-' leaves a bound open
  drill [PROCEDURE]             rank the professionals of a procedure
  top procedures|professionals N|all
  rank FIELD [N|all]            rank any field of the filtered records
  options                       list the values available for each filter
  reset                         clear every filter and the drill-down
  reload                        read the sources again
  quit";

#[derive(Debug, Error)]
pub enum ExploreError {
    #[error("unknown command '{0}' (type 'help')")]
    UnknownCommand(String),

    #[error("{command}: {reason}")]
    InvalidArgument { command: String, reason: String },

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

fn invalid(command: &str, reason: impl ToString) -> ExploreError {
    ExploreError::InvalidArgument {
        command: command.to_string(),
        reason: reason.to_string(),
    }
}

/// Which top-N limit a `top` command changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopTarget {
    Procedures,
    Professionals,
}

/// One line typed by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExploreCommand {
    Show,
    /// Text filter; `None` clears it.
    Filter { field: Field, value: Option<String> },
    Band(Option<AgeBand>),
    Dates {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
    Drill(Option<String>),
    Top { target: TopTarget, limit: Limit },
    Rank { field: String, limit: Limit },
    Options,
    Reset,
    Reload,
    Help,
    Quit,
}

fn parse_day(command: &str, value: &str) -> Result<Option<NaiveDate>, ExploreError> {
    if value == "-" {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| invalid(command, format!("'{value}': {e}")))
}

fn parse_limit(command: &str, value: Option<&str>) -> Result<Limit, ExploreError> {
    value.map_or(Ok(Limit::default()), |value| {
        value.parse::<Limit>().map_err(|e| invalid(command, e))
    })
}

impl FromStr for ExploreCommand {
    type Err = ExploreError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(verb, rest)| (verb, rest.trim()));
        let value = (!rest.is_empty()).then(|| rest.to_string());
        let mut words = rest.split_whitespace();

        let command = match verb.to_ascii_lowercase().as_str() {
            "" | "show" => ExploreCommand::Show,
            "unit" | "sex" | "procedure" | "professional" => ExploreCommand::Filter {
                field: verb.parse().map_err(|e| invalid(verb, e))?,
                value,
            },
            "band" => ExploreCommand::Band(
                value
                    .map(|label| label.parse::<AgeBand>())
                    .transpose()
                    .map_err(|e| invalid(verb, e))?,
            ),
            "date" => {
                let day = words
                    .next()
                    .ok_or_else(|| invalid(verb, "expected a day"))?;
                let day = parse_day(verb, day)?;
                ExploreCommand::Dates { from: day, to: day }
            }
            "dates" => ExploreCommand::Dates {
                from: words.next().map_or(Ok(None), |day| parse_day(verb, day))?,
                to: words.next().map_or(Ok(None), |day| parse_day(verb, day))?,
            },
            "drill" => ExploreCommand::Drill(value),
            "top" => {
                let target = match words.next().map(str::to_ascii_lowercase).as_deref() {
                    Some("procedures") => TopTarget::Procedures,
                    Some("professionals") => TopTarget::Professionals,
                    _ => return Err(invalid(verb, "expected 'procedures' or 'professionals'")),
                };
                let limit = parse_limit(verb, words.next())?;
                ExploreCommand::Top { target, limit }
            }
            "rank" => {
                if rest.is_empty() {
                    return Err(invalid(verb, "expected a field or column name"));
                }
                // column names may contain spaces; a trailing limit is optional
                let (field, limit) = match rest.rsplit_once(char::is_whitespace) {
                    Some((field, last)) if last.parse::<Limit>().is_ok() => {
                        (field.trim(), parse_limit(verb, Some(last))?)
                    }
                    _ => (rest, Limit::default()),
                };
                ExploreCommand::Rank {
                    field: field.to_string(),
                    limit,
                }
            }
            "options" => ExploreCommand::Options,
            "reset" => ExploreCommand::Reset,
            "reload" => ExploreCommand::Reload,
            "help" | "?" => ExploreCommand::Help,
            "quit" | "exit" => ExploreCommand::Quit,
            other => return Err(ExploreError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

/// What a command produced.
#[derive(Debug)]
pub enum Outcome {
    View { dataset: Arc<Dataset>, view: View },
    Options(FilterOptions),
    Ranking { field: String, ranking: Section },
    Help,
    Quit,
}

/// One operator's interactive session.
pub struct Explorer<L> {
    cache: SnapshotCache<Dataset>,
    loader: L,
    session: SessionContext,
    columns: ColumnMap,
    dates: (Option<NaiveDate>, Option<NaiveDate>),
    top_procedures: Limit,
    top_professionals: Limit,
}

impl<L> Explorer<L>
where
    L: Fn() -> obs_ingest::Result<Dataset>,
{
    pub fn new(cache: SnapshotCache<Dataset>, loader: L, session: SessionContext) -> Self {
        Self {
            cache,
            loader,
            session,
            columns: ColumnMap::default(),
            dates: (None, None),
            top_procedures: Limit::default(),
            top_professionals: Limit::default(),
        }
    }

    /// Column names used to resolve `rank` arguments.
    #[must_use]
    pub fn with_columns(mut self, columns: ColumnMap) -> Self {
        self.columns = columns;
        self
    }

    #[must_use]
    pub fn with_limits(mut self, top_procedures: Limit, top_professionals: Limit) -> Self {
        self.top_procedures = top_procedures;
        self.top_professionals = top_professionals;
        self
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn apply(&mut self, command: ExploreCommand) -> Result<Outcome, ExploreError> {
        self.apply_at(command, Instant::now())
    }

    /// Same as [`apply`](Self::apply) with an explicit clock.
    pub fn apply_at(
        &mut self,
        command: ExploreCommand,
        now: Instant,
    ) -> Result<Outcome, ExploreError> {
        debug!(?command, "explore command");
        match command {
            ExploreCommand::Show => {}
            ExploreCommand::Filter { field, value } => {
                let mut criteria = self.session.criteria().clone();
                match value {
                    Some(value) => select_text(&mut criteria, field, value),
                    None => criteria.clear(field),
                }
                self.session.set_criteria(criteria);
            }
            ExploreCommand::Band(band) => {
                let mut criteria = self.session.criteria().clone();
                criteria.age_band = Selection::from(band);
                self.session.set_criteria(criteria);
            }
            ExploreCommand::Dates { from, to } => self.dates = (from, to),
            ExploreCommand::Drill(Some(procedure)) => self.session.select_procedure(procedure),
            ExploreCommand::Drill(None) => self.session.clear_drill_down(),
            ExploreCommand::Top { target, limit } => match target {
                TopTarget::Procedures => self.top_procedures = limit,
                TopTarget::Professionals => self.top_professionals = limit,
            },
            ExploreCommand::Rank { field, limit } => {
                let (_, view) = self.render_at(now)?;
                let ranking = rank_by_name(&view.filtered, &field, &self.columns, limit, None);
                return Ok(Outcome::Ranking { field, ranking });
            }
            ExploreCommand::Options => {
                let dataset = self.cache.get_or_try_load_at(now, &self.loader)?;
                return Ok(Outcome::Options(FilterOptions::from_records(
                    &dataset.records,
                )));
            }
            ExploreCommand::Reset => {
                self.session.set_criteria(FilterCriteria::match_all());
                self.session.clear_drill_down();
                self.dates = (None, None);
            }
            ExploreCommand::Reload => self.cache.invalidate(),
            ExploreCommand::Help => return Ok(Outcome::Help),
            ExploreCommand::Quit => return Ok(Outcome::Quit),
        }

        let (dataset, view) = self.render_at(now)?;
        Ok(Outcome::View { dataset, view })
    }

    fn render_at(&mut self, now: Instant) -> Result<(Arc<Dataset>, View), ExploreError> {
        let dataset = self.cache.get_or_try_load_at(now, &self.loader)?;

        let (from, to) = self.dates;
        let options = FilterOptions::from_records(&dataset.records);
        let mut criteria = self.session.criteria().clone();
        criteria.date_range = date_selection(None, from, to, &options);
        self.session.set_criteria(criteria);

        let view = build_view(
            &dataset.records,
            &self.session,
            self.top_procedures,
            self.top_professionals,
        )?;
        Ok((dataset, view))
    }
}

fn select_text(criteria: &mut FilterCriteria, field: Field, value: String) {
    let selection = Selection::Only(value);
    match field {
        Field::Unit => criteria.unit = selection,
        Field::Sex => criteria.sex = selection,
        Field::Procedure => criteria.procedure = selection,
        Field::Professional => criteria.professional = selection,
        Field::Date | Field::Age | Field::AgeBand => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> ExploreCommand {
        line.parse().unwrap()
    }

    #[test]
    fn test_parse_filters() {
        assert_eq!(parse(""), ExploreCommand::Show);
        assert_eq!(
            parse("unit  UBS  Centro "),
            ExploreCommand::Filter {
                field: Field::Unit,
                value: Some("UBS  Centro".to_string()),
            }
        );
        assert_eq!(
            parse("SEX"),
            ExploreCommand::Filter {
                field: Field::Sex,
                value: None,
            }
        );
        assert_eq!(parse("band 60+"), ExploreCommand::Band(Some(AgeBand::Over60)));
        assert_eq!(parse("drill"), ExploreCommand::Drill(None));
    }

    #[test]
    fn test_parse_dates() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(
            parse("date 2024-03-05"),
            ExploreCommand::Dates {
                from: Some(day),
                to: Some(day),
            }
        );
        assert_eq!(
            parse("dates - 2024-03-05"),
            ExploreCommand::Dates {
                from: None,
                to: Some(day),
            }
        );
        assert!("date 05/03/2024".parse::<ExploreCommand>().is_err());
    }

    #[test]
    fn test_parse_limits() {
        assert_eq!(
            parse("top professionals all"),
            ExploreCommand::Top {
                target: TopTarget::Professionals,
                limit: Limit::All,
            }
        );
        assert_eq!(
            parse("rank Unidade 5"),
            ExploreCommand::Rank {
                field: "Unidade".to_string(),
                limit: Limit::Top(5),
            }
        );
        assert_eq!(
            parse("rank Data Atendimento"),
            ExploreCommand::Rank {
                field: "Data Atendimento".to_string(),
                limit: Limit::default(),
            }
        );
        assert!("top units 3".parse::<ExploreCommand>().is_err());
    }

    #[test]
    fn test_unknown_command() {
        let err = "plot".parse::<ExploreCommand>().unwrap_err();
        assert_eq!(err.to_string(), "unknown command 'plot' (type 'help')");
    }
}
