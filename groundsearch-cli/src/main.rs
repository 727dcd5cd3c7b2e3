// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! `GroundSearch` CLI - grounded product attribute extraction from CSV part lists.
//!
//! # Examples
//!
//! ```bash
//! # Weight and dimensions for every row
//! groundsearch specs -i data/parts.csv
//!
//! # Battery information, first row only
//! groundsearch battery -i parts.csv --test
//!
//! # Both, written into one directory
//! groundsearch both -i parts.csv -o results/
//!
//! # One free-form grounded search
//! groundsearch search "Fluke MS2-100 weight"
//!
//! # Check the source URLs of a specs run
//! groundsearch evaluate parts_specs_output.csv
//!
//! # Resolved configuration
//! groundsearch config show --pretty
//! ```

mod commands;
mod output;

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use groundsearch_extractors::{EvaluationError, ExtractionMode, ProcessError};
use groundsearch_store::{
    CliOverrides, ConfigError, LogLevel, LoggingSettings, Settings, StoreError, ensure_parent_dir,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{config, evaluate, extract, search};

/// Log file used by `battery` and `both` when `--log-file` is omitted.
const DEFAULT_LOG_FILE: &str = "processing.log";

// ============================================================================
// CLI Definition
// ============================================================================

/// `GroundSearch` CLI - grounded product attribute extraction.
#[derive(Parser)]
#[command(name = "groundsearch")]
#[command(about = "Grounded-search product attribute extraction from CSV part lists")]
#[command(long_about = r"
GroundSearch looks up product attributes with grounded web search and
writes them, with their source URLs, next to the original CSV columns.

The input CSV needs Manufacturer, Part Number and Description columns.
The API key is read from GEMINI_API_KEY (or GOOGLE_API_KEY).

Examples:
  groundsearch specs -i parts.csv          # Weight and dimensions
  groundsearch battery -i parts.csv        # Battery information
  groundsearch both -i parts.csv -o out/   # Both, into out/
  groundsearch search 'Fluke MS2-100'      # One grounded search
  groundsearch evaluate parts_specs_output.csv
")]
#[command(version)]
#[command(author = "GroundSearch Contributors")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (JSON). Defaults to the user config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log verbosity: trace, debug, info, warn or error.
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Append logs to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Extract weight and dimensions.
    Specs(extract::ExtractArgs),

    /// Extract battery information.
    Battery(extract::ExtractArgs),

    /// Extract specifications, then battery information.
    Both(extract::ExtractArgs),

    /// Run one free-form grounded search.
    #[command(visible_alias = "s")]
    Search(search::SearchArgs),

    /// Check the source URLs of a specifications output file.
    #[command(visible_alias = "e")]
    Evaluate(evaluate::EvaluateArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

impl Commands {
    /// Extraction mode, for the extraction commands.
    fn extraction_mode(&self) -> Option<ExtractionMode> {
        match self {
            Self::Specs(_) => Some(ExtractionMode::Specs),
            Self::Battery(_) => Some(ExtractionMode::Battery),
            Self::Both(_) => Some(ExtractionMode::Both),
            Self::Search(_) | Self::Evaluate(_) | Self::Config(_) => None,
        }
    }

    /// `--test`, when the command takes it.
    fn test_mode(&self) -> Option<bool> {
        let test = match self {
            Self::Specs(args) | Self::Battery(args) | Self::Both(args) => args.test,
            Self::Evaluate(args) => args.test,
            Self::Search(_) | Self::Config(_) => false,
        };
        test.then_some(true)
    }
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success, including runs with degraded rows.
    Success = 0,
    /// General error.
    Error = 1,
    /// Invalid configuration or missing credentials.
    Config = 2,
    /// Missing, unreadable or malformed input.
    Input = 3,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    fn for_error(err: &anyhow::Error) -> Self {
        if err.downcast_ref::<ConfigError>().is_some() {
            return Self::Config;
        }
        if matches!(
            err.downcast_ref::<EvaluationError>(),
            Some(EvaluationError::NoSourceColumns(_))
        ) {
            return Self::Input;
        }
        // Store errors also arrive wrapped by the processor and the evaluator.
        let store = err
            .downcast_ref::<StoreError>()
            .or_else(|| err.downcast_ref::<ProcessError>().map(|ProcessError::Store(e)| e))
            .or_else(|| match err.downcast_ref::<EvaluationError>() {
                Some(EvaluationError::Store(e)) => Some(e),
                _ => None,
            });
        match store {
            Some(
                StoreError::InputNotFound(_) | StoreError::NotCsv(_) | StoreError::MissingColumn { .. },
            ) => Self::Input,
            _ => Self::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

/// Log file for this invocation: `--log-file`, else `processing.log` for
/// the modes that always logged to a file.
fn log_file_for(command: &Commands, explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    match command.extraction_mode() {
        Some(ExtractionMode::Battery | ExtractionMode::Both) => Some(PathBuf::from(DEFAULT_LOG_FILE)),
        _ => None,
    }
}

fn setup_logging(settings: &LoggingSettings, log_file: Option<&Path>) -> Result<()> {
    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.level.as_str()));

    let console = settings.console_enabled.then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    let file = match log_file {
        Some(path) if settings.file_enabled => {
            ensure_parent_dir(path)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Could not open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        _ => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()?;

    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(ExitCode::for_error(&e) as i32);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let overrides = CliOverrides {
        log_level: cli.log_level,
        test_mode: cli.command.test_mode(),
    };
    let settings = Settings::load(cli.config.as_deref(), &overrides)?;

    let log_file = log_file_for(&cli.command, cli.log_file.as_deref());
    setup_logging(&settings.logging, log_file.as_deref())?;

    let use_colors = !cli.no_color && std::io::stdout().is_terminal();

    match &cli.command {
        Commands::Specs(args) => extract::run(ExtractionMode::Specs, args, &settings, use_colors).await,
        Commands::Battery(args) => {
            extract::run(ExtractionMode::Battery, args, &settings, use_colors).await
        }
        Commands::Both(args) => extract::run(ExtractionMode::Both, args, &settings, use_colors).await,
        Commands::Search(args) => search::run(args, &settings, use_colors).await,
        Commands::Evaluate(args) => evaluate::run(args, &settings, use_colors).await,
        Commands::Config(args) => config::run(args, &settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_extraction_commands_parse() {
        let cli = parse(&["groundsearch", "battery", "-i", "parts.csv", "--test", "--log-level", "debug"]);
        assert_eq!(cli.command.extraction_mode(), Some(ExtractionMode::Battery));
        assert_eq!(cli.command.test_mode(), Some(true));
        assert_eq!(cli.log_level, Some(LogLevel::Debug));

        let cli = parse(&["groundsearch", "specs", "--input", "parts.csv"]);
        assert_eq!(cli.command.extraction_mode(), Some(ExtractionMode::Specs));
        assert_eq!(cli.command.test_mode(), None);
    }

    #[test]
    fn test_input_is_required() {
        assert!(Cli::try_parse_from(["groundsearch", "specs"]).is_err());
        assert!(Cli::try_parse_from(["groundsearch", "specs", "-i", "x.csv", "--log-level", "loud"]).is_err());
    }

    #[test]
    fn test_default_log_file() {
        let battery = parse(&["groundsearch", "battery", "-i", "parts.csv"]);
        assert_eq!(log_file_for(&battery.command, None), Some(PathBuf::from("processing.log")));

        let both = parse(&["groundsearch", "both", "-i", "parts.csv"]);
        assert_eq!(log_file_for(&both.command, None), Some(PathBuf::from("processing.log")));

        let specs = parse(&["groundsearch", "specs", "-i", "parts.csv"]);
        assert_eq!(log_file_for(&specs.command, None), None);

        let explicit = Path::new("run.log");
        assert_eq!(log_file_for(&specs.command, Some(explicit)), Some(PathBuf::from("run.log")));
    }

    #[test]
    fn test_exit_codes() {
        let missing_key = anyhow::Error::new(ConfigError::MissingCredential);
        assert_eq!(ExitCode::for_error(&missing_key), ExitCode::Config);

        let not_csv = anyhow::Error::new(StoreError::NotCsv(PathBuf::from("parts.xlsx")))
            .context("Invalid input");
        assert_eq!(ExitCode::for_error(&not_csv), ExitCode::Input);

        let missing_column = anyhow::Error::new(ProcessError::Store(StoreError::MissingColumn {
            column: "Part Number".to_string(),
            path: PathBuf::from("parts.csv"),
        }))
        .context("Product specifications failed");
        assert_eq!(ExitCode::for_error(&missing_column), ExitCode::Input);

        let unreadable = anyhow::Error::new(EvaluationError::Store(StoreError::InputNotFound(
            PathBuf::from("missing.csv"),
        )));
        assert_eq!(ExitCode::for_error(&unreadable), ExitCode::Input);

        let no_sources = anyhow::Error::new(EvaluationError::NoSourceColumns(PathBuf::from("x.csv")));
        assert_eq!(ExitCode::for_error(&no_sources), ExitCode::Input);

        let other = anyhow::anyhow!("network down");
        assert_eq!(ExitCode::for_error(&other), ExitCode::Error);
        assert_eq!(ExitCode::Success as i32, 0);
    }
}
