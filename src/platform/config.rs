// CaseAlert - platform/config.rs
//
// Platform-specific configuration directory resolution, and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for CaseAlert configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/casealert/ or %APPDATA%\CaseAlert\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[rules]` section.
    pub rules: RulesSection,
    /// `[input]` section.
    pub input: InputSection,
    /// `[export]` section.
    pub export: ExportSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[rules]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RulesSection {
    /// "calendar" (N months) or "days" (flat N days).
    pub expiry_mode: Option<String>,
    /// Calendar expiry window in months.
    pub expiry_months: Option<u32>,
    /// Flat expiry window in days.
    pub expiry_days: Option<i64>,
    /// Inactivity window in days.
    pub inactivity_days: Option<i64>,
    /// Notice type subject to the expiry check.
    pub petition_type: Option<String>,
}

/// `[input]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// "," , ";" or "auto".
    pub delimiter: Option<String>,
    /// chrono format strings tried before the built-in date formats.
    pub date_formats: Option<Vec<String>>,
}

/// `[export]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// "en" or "es".
    pub language: Option<String>,
    /// "csv" or "json".
    pub format: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// How the petition expiry window is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryMode {
    #[default]
    Calendar,
    Days,
}

impl ExpiryMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "calendar" | "months" => Some(ExpiryMode::Calendar),
            "days" => Some(ExpiryMode::Days),
            _ => None,
        }
    }
}

/// Validated application configuration derived from `config.toml`.
///
/// All values are validated against named constants at load time.
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    // -- Rules --
    pub expiry_mode: ExpiryMode,
    pub expiry_months: u32,
    pub expiry_days: i64,
    pub inactivity_days: i64,
    pub petition_type: String,

    // -- Input --
    /// Fixed delimiter byte. `None` = auto-detect.
    pub delimiter: Option<u8>,
    pub date_formats: Vec<String>,

    // -- Export --
    /// Validated language code ("en" / "es").
    pub language: String,
    /// Validated format name ("csv" / "json").
    pub export_format: String,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            expiry_mode: ExpiryMode::Calendar,
            expiry_months: constants::DEFAULT_EXPIRY_MONTHS,
            expiry_days: constants::DEFAULT_EXPIRY_DAYS,
            inactivity_days: constants::DEFAULT_INACTIVITY_DAYS,
            petition_type: constants::DEFAULT_PETITION_NOTICE_TYPE.to_string(),
            delimiter: None,
            date_formats: Vec::new(),
            language: "en".to_string(),
            export_format: "csv".to_string(),
            log_level: None,
        }
    }
}

/// Parse a delimiter setting. `Ok(None)` means auto-detect.
pub fn parse_delimiter(raw: &str) -> Result<Option<u8>, ConfigError> {
    match raw.trim() {
        "auto" | "" => Ok(None),
        "," | "comma" => Ok(Some(b',')),
        ";" | "semicolon" => Ok(Some(b';')),
        other => Err(ConfigError::ValueOutOfRange {
            field: "delimiter".to_string(),
            value: other.to_string(),
            expected: "\",\", \";\" or \"auto\"".to_string(),
        }),
    }
}

/// Check that a user-supplied chrono format can render a known date.
fn is_usable_date_format(format: &str) -> bool {
    use std::fmt::Write;

    if format.trim().is_empty() {
        return false;
    }
    let Some(sample) = chrono::NaiveDate::from_ymd_opt(2024, 1, 31) else {
        return false;
    };
    let mut out = String::new();
    // chrono reports invalid specifiers as a fmt::Error on write.
    write!(out, "{}", sample.format(format)).is_ok()
}

/// Load and validate `config.toml` from the given path.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first-run).
/// If the file is unparseable, returns defaults with an error warning.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(source) => {
            let err = ConfigError::Io {
                path: config_path.to_path_buf(),
                source,
            };
            let msg = format!("{err}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(source) => {
            let err = ConfigError::TomlParse {
                path: config_path.to_path_buf(),
                source,
            };
            let msg = format!("{err}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let (config, mut validation_warnings) = validate(raw);
    warnings.append(&mut validation_warnings);

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}

/// Validate each field against named constants, accumulating all warnings.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut warnings = Vec::new();
    let mut config = AppConfig::default();

    // -- Rules: expiry_mode --
    if let Some(ref mode) = raw.rules.expiry_mode {
        match ExpiryMode::from_name(mode) {
            Some(m) => config.expiry_mode = m,
            None => warnings.push(format!(
                "[rules] expiry_mode = \"{mode}\" is not recognised. \
                 Expected \"calendar\" or \"days\". Using default (calendar).",
            )),
        }
    }

    // -- Rules: expiry_months --
    if let Some(months) = raw.rules.expiry_months {
        if (constants::MIN_EXPIRY_MONTHS..=constants::MAX_EXPIRY_MONTHS).contains(&months) {
            config.expiry_months = months;
        } else {
            warnings.push(format!(
                "[rules] expiry_months = {months} is out of range ({}-{}). Using default ({}).",
                constants::MIN_EXPIRY_MONTHS,
                constants::MAX_EXPIRY_MONTHS,
                constants::DEFAULT_EXPIRY_MONTHS,
            ));
        }
    }

    // -- Rules: expiry_days --
    if let Some(days) = raw.rules.expiry_days {
        if (constants::MIN_EXPIRY_DAYS..=constants::MAX_EXPIRY_DAYS).contains(&days) {
            config.expiry_days = days;
        } else {
            warnings.push(format!(
                "[rules] expiry_days = {days} is out of range ({}-{}). Using default ({}).",
                constants::MIN_EXPIRY_DAYS,
                constants::MAX_EXPIRY_DAYS,
                constants::DEFAULT_EXPIRY_DAYS,
            ));
        }
    }

    // -- Rules: inactivity_days --
    if let Some(days) = raw.rules.inactivity_days {
        if (constants::MIN_INACTIVITY_DAYS..=constants::MAX_INACTIVITY_DAYS).contains(&days) {
            config.inactivity_days = days;
        } else {
            warnings.push(format!(
                "[rules] inactivity_days = {days} is out of range ({}-{}). Using default ({}).",
                constants::MIN_INACTIVITY_DAYS,
                constants::MAX_INACTIVITY_DAYS,
                constants::DEFAULT_INACTIVITY_DAYS,
            ));
        }
    }

    // -- Rules: petition_type --
    if let Some(ref petition) = raw.rules.petition_type {
        if petition.trim().is_empty() {
            warnings.push(format!(
                "[rules] petition_type must not be empty. Using default (\"{}\").",
                constants::DEFAULT_PETITION_NOTICE_TYPE,
            ));
        } else {
            config.petition_type = petition.trim().to_string();
        }
    }

    // -- Input: delimiter --
    if let Some(ref delim) = raw.input.delimiter {
        match parse_delimiter(delim) {
            Ok(d) => config.delimiter = d,
            Err(_) => warnings.push(format!(
                "[input] delimiter = \"{delim}\" is not recognised. \
                 Expected \",\", \";\" or \"auto\". Using default (auto).",
            )),
        }
    }

    // -- Input: date_formats --
    if let Some(formats) = raw.input.date_formats {
        for format in formats {
            if config.date_formats.len() >= constants::MAX_USER_DATE_FORMATS {
                warnings.push(format!(
                    "[input] date_formats has more than {} entries; extra entries ignored.",
                    constants::MAX_USER_DATE_FORMATS,
                ));
                break;
            }
            if is_usable_date_format(&format) {
                config.date_formats.push(format);
            } else {
                warnings.push(format!(
                    "[input] date_formats entry \"{format}\" is not a valid chrono format. Ignored.",
                ));
            }
        }
    }

    // -- Export: language --
    if let Some(ref lang) = raw.export.language {
        match lang.trim().to_lowercase().as_str() {
            l @ ("en" | "es") => config.language = l.to_string(),
            other => warnings.push(format!(
                "[export] language = \"{other}\" is not recognised. Expected \"en\" or \"es\". Using default (en).",
            )),
        }
    }

    // -- Export: format --
    if let Some(ref format) = raw.export.format {
        match format.trim().to_lowercase().as_str() {
            f @ ("csv" | "json") => config.export_format = f.to_string(),
            other => warnings.push(format!(
                "[export] format = \"{other}\" is not recognised. Expected \"csv\" or \"json\". Using default (csv).",
            )),
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(toml_text: &str) -> (AppConfig, Vec<String>) {
        validate(toml::from_str(toml_text).unwrap())
    }

    #[test]
    fn test_missing_file_gives_defaults_without_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("config.toml"));
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unparseable_file_gives_defaults_with_warning() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[rules\nexpiry_mode = ").unwrap();
        let (config, warnings) = load_config(file.path());
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Config parse error"));
        assert!(warnings[0].ends_with("Using defaults."));
    }

    #[test]
    fn test_unreadable_file_gives_defaults_with_io_warning() {
        // A directory exists but cannot be read as a file.
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Config I/O error"));
    }

    #[test]
    fn test_valid_values_are_applied() {
        let (config, warnings) = parse(
            r#"
            [rules]
            expiry_mode = "days"
            expiry_days = 200
            inactivity_days = 30
            petition_type = "Querella"

            [input]
            delimiter = ";"
            date_formats = ["%m/%d/%Y"]

            [export]
            language = "ES"
            format = "json"

            [logging]
            level = "debug"
            "#,
        );
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(config.expiry_mode, ExpiryMode::Days);
        assert_eq!(config.expiry_days, 200);
        assert_eq!(config.inactivity_days, 30);
        assert_eq!(config.petition_type, "Querella");
        assert_eq!(config.delimiter, Some(b';'));
        assert_eq!(config.date_formats, vec!["%m/%d/%Y".to_string()]);
        assert_eq!(config.language, "es");
        assert_eq!(config.export_format, "json");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_out_of_range_values_warn_and_fall_back() {
        let (config, warnings) = parse(
            r#"
            [rules]
            expiry_mode = "weeks"
            expiry_months = 0
            inactivity_days = 99999
            petition_type = "  "

            [input]
            delimiter = "|"
            date_formats = ["%Q"]
            "#,
        );
        assert_eq!(warnings.len(), 6, "warnings: {warnings:?}");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let (config, warnings) = parse("[future]\nfeature = true\n");
        assert!(warnings.is_empty());
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter("auto").unwrap(), None);
        assert_eq!(parse_delimiter(",").unwrap(), Some(b','));
        assert_eq!(parse_delimiter("semicolon").unwrap(), Some(b';'));
        assert!(parse_delimiter("|").is_err());
    }
}
