// CaseAlert - app/pipeline.rs
//
// Run orchestration: load the table, evaluate every record, build the
// per-rule report, and export the flagged subset.
//
// Error policy:
//   - Input-shape errors (unreadable file, missing column) abort the run
//     before anything is written.
//   - Per-cell date failures are counted and logged, never escalated.
//   - "Nothing to flag" is a normal outcome, logged at info level.

use crate::core::batch::{self, BatchOutcome};
use crate::core::dates::DateParser;
use crate::core::export::{self, ExportFormat};
use crate::core::model::Language;
use crate::core::report::RuleReport;
use crate::core::rules::{ExpiryWindow, RuleSettings};
use crate::core::table::{self, LoadedTable, TableLayout, TableOptions};
use crate::platform::config::{self, AppConfig, ExpiryMode};
use crate::platform::fs;
use crate::util::constants;
use crate::util::error::{CaseAlertError, Result, TableError};
use chrono::NaiveDateTime;
use std::io::Write;
use std::path::Path;

/// Command-line overrides layered on top of the validated config.
///
/// `None` keeps the config value.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    /// Raw delimiter text (",", ";" or "auto").
    pub delimiter: Option<String>,
    pub expiry_mode: Option<ExpiryMode>,
    pub format: Option<ExportFormat>,
    pub language: Option<Language>,
}

/// Everything one run needs besides the input path.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub rules: RuleSettings,
    pub table: TableOptions,
    pub language: Language,
    pub format: ExportFormat,
    /// Fixed evaluation time shared by every record in the run.
    pub now: NaiveDateTime,
}

impl RunSettings {
    /// Build run settings from validated configuration.
    pub fn from_config(config: &AppConfig, now: NaiveDateTime) -> Self {
        let expiry_window = match config.expiry_mode {
            ExpiryMode::Calendar => ExpiryWindow::CalendarMonths(config.expiry_months),
            ExpiryMode::Days => ExpiryWindow::Days(config.expiry_days),
        };
        Self {
            rules: RuleSettings::default()
                .with_expiry_window(expiry_window)
                .with_inactivity_days(config.inactivity_days)
                .with_petition_notice_type(&config.petition_type),
            table: TableOptions {
                delimiter: config.delimiter,
                date_parser: DateParser::new(config.date_formats.clone()),
            },
            language: Language::from_code(&config.language).unwrap_or_default(),
            format: ExportFormat::from_name(&config.export_format).unwrap_or_default(),
            now,
        }
    }

    /// Apply CLI overrides. An expiry mode override keeps the window length
    /// configured for that mode.
    pub fn with_overrides(mut self, overrides: &RunOverrides, config: &AppConfig) -> Result<Self> {
        if let Some(ref raw) = overrides.delimiter {
            self.table.delimiter = config::parse_delimiter(raw)?;
        }
        if let Some(mode) = overrides.expiry_mode {
            self.rules.expiry_window = match mode {
                ExpiryMode::Calendar => ExpiryWindow::CalendarMonths(config.expiry_months),
                ExpiryMode::Days => ExpiryWindow::Days(config.expiry_days),
            };
        }
        if let Some(format) = overrides.format {
            self.format = format;
        }
        if let Some(language) = overrides.language {
            self.language = language;
        }
        Ok(self)
    }
}

/// Result of evaluating one input table.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub layout: TableLayout,
    pub outcome: BatchOutcome,
    pub report: RuleReport,
}

/// Read and parse the input table, enforcing the size limit.
pub fn load_input(path: &Path, options: &TableOptions) -> Result<LoadedTable> {
    load_input_with_limit(path, options, constants::MAX_INPUT_BYTES)
}

fn load_input_with_limit(path: &Path, options: &TableOptions, max_bytes: u64) -> Result<LoadedTable> {
    let size = fs::file_size(path).map_err(|e| CaseAlertError::Io {
        path: path.to_path_buf(),
        operation: "stat",
        source: e,
    })?;
    if size > max_bytes {
        return Err(TableError::TooLarge {
            size,
            max: max_bytes,
        }
        .into());
    }

    let content = fs::read_file_lossy(path).map_err(|e| CaseAlertError::Io {
        path: path.to_path_buf(),
        operation: "read",
        source: e,
    })?;

    Ok(table::load_table(&content, options)?)
}

/// Load `input` and evaluate every record.
pub fn evaluate(input: &Path, settings: &RunSettings) -> Result<Evaluation> {
    tracing::info!(
        input = %input.display(),
        now = %settings.now,
        "Evaluation started"
    );

    let loaded = load_input(input, &settings.table)?;
    let outcome = batch::run_batch(&loaded.records, settings.now, &settings.rules);
    let report = RuleReport::build(
        &loaded.records,
        &outcome,
        settings.now,
        &settings.rules,
        loaded.unparsed_dates,
    );

    if loaded.unparsed_dates > 0 {
        tracing::warn!(
            unparsed_dates = loaded.unparsed_dates,
            "Some date cells could not be parsed and were treated as missing"
        );
    }
    if outcome.is_clear() {
        tracing::info!(total = outcome.total, "Nothing to flag");
    } else {
        tracing::info!(
            total = outcome.total,
            flagged = outcome.flagged.len(),
            delimiter = %char::from(loaded.layout.delimiter),
            "Evaluation complete"
        );
    }

    Ok(Evaluation {
        layout: loaded.layout,
        outcome,
        report,
    })
}

/// Export the flagged subset to any writer. `label` names the destination
/// in error messages.
pub fn export_to_writer<W: Write>(
    evaluation: &Evaluation,
    settings: &RunSettings,
    writer: W,
    label: &Path,
) -> Result<usize> {
    let count = export::export(
        settings.format,
        &evaluation.outcome.flagged,
        &evaluation.layout,
        settings.language,
        writer,
        label,
    )?;
    tracing::info!(rows = count, destination = %label.display(), "Export written");
    Ok(count)
}

/// Export the flagged subset to a file.
///
/// Rows are rendered in memory first so a failed export never leaves a
/// half-written file behind.
pub fn export_to_path(evaluation: &Evaluation, settings: &RunSettings, path: &Path) -> Result<usize> {
    let mut buf = Vec::new();
    let count = export_to_writer(evaluation, settings, &mut buf, path)?;
    std::fs::write(path, &buf).map_err(|e| CaseAlertError::Io {
        path: path.to_path_buf(),
        operation: "write export",
        source: e,
    })?;
    Ok(count)
}
