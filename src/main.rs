// CaseAlert - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading (config.toml + CLI overrides)
// 3. Logging initialisation (debug mode support)
// 4. Evaluation and export of the flagged cases

use casealert::app::pipeline::{self, RunOverrides, RunSettings};
use casealert::core::export::ExportFormat;
use casealert::core::model::Language;
use casealert::platform::config::{self, ExpiryMode, PlatformPaths};
use casealert::util::{self, constants};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExpiryArg {
    /// Calendar months from the incident date.
    Calendar,
    /// Flat number of days from the incident date.
    Days,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LanguageArg {
    En,
    Es,
}

/// CaseAlert - business-rule alerts for judicial case records.
///
/// Reads a case table (comma or semicolon delimited), evaluates the expiry,
/// settlement, and inactivity rules for every row, and exports the rows that
/// raised at least one alert.
#[derive(Parser, Debug)]
#[command(name = "casealert", version, about)]
struct Cli {
    /// Input table (CSV).
    input: PathBuf,

    /// Write flagged rows here instead of stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Output format (overrides [export] format).
    #[arg(long = "format", value_enum)]
    format: Option<FormatArg>,

    /// Input delimiter: ",", ";" or "auto" (overrides [input] delimiter).
    #[arg(long = "delimiter")]
    delimiter: Option<String>,

    /// Evaluation date (YYYY-MM-DD, taken at midnight). Defaults to now.
    #[arg(long = "now")]
    now: Option<NaiveDate>,

    /// How the petition expiry window is measured (overrides [rules] expiry_mode).
    #[arg(long = "expiry-mode", value_enum)]
    expiry_mode: Option<ExpiryArg>,

    /// Label and header language (overrides [export] language).
    #[arg(long = "language", value_enum)]
    language: Option<LanguageArg>,

    /// Print the per-rule report to stderr.
    #[arg(short = 's', long = "summary")]
    summary: bool,

    /// Configuration file (defaults to the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PlatformPaths::resolve().config_file());
    let (app_config, config_warnings) = config::load_config(&config_path);

    util::logging::init(cli.debug, app_config.log_level.as_deref());

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "CaseAlert starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Configuration warning");
    }

    let now = cli
        .now
        .map(|d| d.and_time(NaiveTime::MIN))
        .unwrap_or_else(|| Local::now().naive_local());

    let settings = match build_settings(&cli, &app_config, now) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Layer CLI overrides on top of the validated config.
fn build_settings(
    cli: &Cli,
    app_config: &config::AppConfig,
    now: NaiveDateTime,
) -> casealert::util::error::Result<RunSettings> {
    let overrides = RunOverrides {
        delimiter: cli.delimiter.clone(),
        expiry_mode: cli.expiry_mode.map(|mode| match mode {
            ExpiryArg::Calendar => ExpiryMode::Calendar,
            ExpiryArg::Days => ExpiryMode::Days,
        }),
        format: cli.format.map(|format| match format {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Json => ExportFormat::Json,
        }),
        language: cli.language.map(|language| match language {
            LanguageArg::En => Language::English,
            LanguageArg::Es => Language::Spanish,
        }),
    };
    RunSettings::from_config(app_config, now).with_overrides(&overrides, app_config)
}

fn run(cli: &Cli, settings: &RunSettings) -> casealert::util::error::Result<()> {
    let evaluation = pipeline::evaluate(&cli.input, settings)?;

    if cli.summary {
        eprint!("{}", evaluation.report);
    }
    if evaluation.outcome.is_clear() {
        eprintln!("No cases to flag.");
    }

    match cli.output {
        Some(ref path) => {
            pipeline::export_to_path(&evaluation, settings, path)?;
        }
        None => {
            let stdout = std::io::stdout();
            pipeline::export_to_writer(&evaluation, settings, stdout.lock(), Path::new("<stdout>"))?;
        }
    }
    Ok(())
}
