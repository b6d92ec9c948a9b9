//! CLI argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use obs_model::{AgeBand, Limit};

#[derive(Parser)]
#[command(
    name = "observatorio",
    version,
    about = "Attendance reports from health unit CSV exports",
    long_about = "Load attendance records from CSV files, a URL or a Drive folder,\n\
                  filter them and print counts by unit, sex, age band, procedure\n\
                  and professional."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Settings file (default: platform config folder).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Filter the records and print metrics and rankings.
    Report(ReportArgs),

    /// Load once and refine filters interactively, one command per line.
    Explore(ExploreArgs),

    /// List the values available for each filter.
    Options(SourceArgs),

    /// Print the age band taxonomy.
    Bands,
}

/// Where to read records from. Defaults to the settings file.
#[derive(Args)]
pub struct SourceArgs {
    /// CSV files or directories of CSV files.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Fixed CSV URL.
    #[arg(long = "url", value_name = "URL", conflicts_with = "drive_folder")]
    pub url: Option<String>,

    /// Drive folder id; every CSV inside is loaded.
    #[arg(long = "drive-folder", value_name = "ID")]
    pub drive_folder: Option<String>,

    /// File holding the Drive bearer token.
    #[arg(long = "token-file", value_name = "PATH", conflicts_with = "service_account")]
    pub token_file: Option<PathBuf>,

    /// Service-account JSON key used to obtain the Drive token.
    #[arg(long = "service-account", value_name = "PATH")]
    pub service_account: Option<PathBuf>,

    /// Operator user name (password from OBS_PASSWORD).
    #[arg(long = "user", value_name = "NAME")]
    pub user: Option<String>,
}

#[derive(Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// First day (YYYY-MM-DD); defaults to the earliest day in the data.
    #[arg(long = "from", value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last day (YYYY-MM-DD); defaults to the latest day in the data.
    #[arg(long = "to", value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// A single day (YYYY-MM-DD).
    #[arg(long = "date", value_name = "DATE", conflicts_with_all = ["from", "to"])]
    pub date: Option<NaiveDate>,

    #[arg(long = "unit", value_name = "UNIT")]
    pub unit: Option<String>,

    #[arg(long = "sex", value_name = "SEX")]
    pub sex: Option<String>,

    /// Age band label, e.g. 19-30 or 60+.
    #[arg(long = "age-band", value_name = "BAND")]
    pub age_band: Option<AgeBand>,

    #[arg(long = "procedure", value_name = "PROCEDURE")]
    pub procedure: Option<String>,

    #[arg(long = "professional", value_name = "NAME")]
    pub professional: Option<String>,

    /// Procedures to rank: a number or "all".
    #[arg(long = "top-procedures", value_name = "N")]
    pub top_procedures: Option<Limit>,

    /// Professionals to rank: a number or "all".
    #[arg(long = "top-professionals", value_name = "N")]
    pub top_professionals: Option<Limit>,

    /// Rank the professionals who performed this procedure.
    #[arg(long = "drill-down", value_name = "PROCEDURE")]
    pub drill_down: Option<String>,

    /// Also print the first N raw rows.
    #[arg(long = "raw", value_name = "N")]
    pub raw: Option<usize>,

    /// Write the filtered records to a CSV file.
    #[arg(long = "export", value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Table arrangement (overrides the settings file).
    #[arg(long = "layout", value_enum)]
    pub layout: Option<LayoutArg>,
}

#[derive(Args)]
pub struct ExploreArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Procedures to rank: a number or "all".
    #[arg(long = "top-procedures", value_name = "N")]
    pub top_procedures: Option<Limit>,

    /// Professionals to rank: a number or "all".
    #[arg(long = "top-professionals", value_name = "N")]
    pub top_professionals: Option<Limit>,

    /// Table arrangement (overrides the settings file).
    #[arg(long = "layout", value_enum)]
    pub layout: Option<LayoutArg>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LayoutArg {
    Wide,
    Compact,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
