// CaseAlert - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// The rule engine itself never fails; every error here belongs to an
// I/O boundary (table loading, export, configuration).

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all CaseAlert operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum CaseAlertError {
    /// The input table could not be read or has the wrong shape.
    Table(TableError),

    /// Export operation failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for CaseAlertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(e) => write!(f, "Input error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for CaseAlertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Table(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Table errors
// ---------------------------------------------------------------------------

/// Input-shape errors. Any of these aborts the run with no partial output.
#[derive(Debug)]
pub enum TableError {
    /// The CSV reader rejected the content.
    Csv { source: csv::Error },

    /// A required column is not present in the header row.
    MissingColumn { column: &'static str },

    /// The input has no header row at all.
    Empty,

    /// The input exceeds the maximum accepted size.
    TooLarge { size: u64, max: u64 },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv { source } => write!(f, "could not read table: {source}"),
            Self::MissingColumn { column } => write!(
                f,
                "required column '{column}' was not found in the header row"
            ),
            Self::Empty => write!(f, "the input table is empty (no header row)"),
            Self::TooLarge { size, max } => write!(
                f,
                "input is {size} bytes, exceeds maximum of {max} bytes"
            ),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Csv { source } => Some(source),
            _ => None,
        }
    }
}

impl From<TableError> for CaseAlertError {
    fn from(e: TableError) -> Self {
        Self::Table(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for CaseAlertError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
///
/// `load_config` downgrades these to warnings; they are surfaced as hard
/// errors only when a CLI override is itself invalid.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for CaseAlertError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for CaseAlert results.
pub type Result<T> = std::result::Result<T, CaseAlertError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_missing_column_message_names_column() {
        let err = CaseAlertError::from(TableError::MissingColumn {
            column: "incident_date",
        });
        let msg = err.to_string();
        assert!(msg.starts_with("Input error:"));
        assert!(msg.contains("'incident_date'"));
    }

    #[test]
    fn test_io_error_preserves_source_chain() {
        let err = CaseAlertError::Io {
            path: PathBuf::from("cases.csv"),
            operation: "read",
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("cases.csv"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_value_out_of_range_has_no_source() {
        let err = ConfigError::ValueOutOfRange {
            field: "--delimiter".to_string(),
            value: "|".to_string(),
            expected: "',' or ';'".to_string(),
        };
        assert!(err.source().is_none());
        assert!(err.to_string().contains("--delimiter"));
    }
}
