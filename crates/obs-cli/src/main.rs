//! Observatório attendance report CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use obs_cli::auth::AuthError;
use obs_cli::config::load_settings;
use obs_cli::logging::{LogConfig, LogFormat, init_logging};
use obs_ingest::IngestError;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_bands, run_explore, run_options, run_report};

/// Exit code when the sources hold no data rows.
const EXIT_NO_DATA: i32 = 2;
/// Exit code when the login gate rejects the operator.
const EXIT_AUTH: i32 = 3;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let settings = load_settings(cli.config.as_deref());
    let result = match &cli.command {
        Command::Report(args) => run_report(&settings, args),
        Command::Explore(args) => run_explore(&settings, args),
        Command::Options(args) => run_options(&settings, args),
        Command::Bands => {
            run_bands();
            Ok(())
        }
    };
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => exit_code_for(&error),
    };
    std::process::exit(exit_code);
}

fn exit_code_for(error: &anyhow::Error) -> i32 {
    if let Some(ingest) = error.downcast_ref::<IngestError>()
        && ingest.is_empty_result()
    {
        println!("No data: {ingest}");
        return EXIT_NO_DATA;
    }
    eprintln!("error: {error:#}");
    if error.downcast_ref::<AuthError>().is_some() {
        EXIT_AUTH
    } else {
        1
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
