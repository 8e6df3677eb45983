// CaseAlert - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Rule thresholds, marker phrases, and config bounds all live here.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "CaseAlert";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "CaseAlert";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Rule thresholds
// =============================================================================

/// Default petition expiry window in calendar months.
pub const DEFAULT_EXPIRY_MONTHS: u32 = 6;

/// Flat-day alternative to the calendar expiry window.
pub const DEFAULT_EXPIRY_DAYS: i64 = 180;

/// Bounds for a user-configured calendar expiry window.
pub const MIN_EXPIRY_MONTHS: u32 = 1;
pub const MAX_EXPIRY_MONTHS: u32 = 24;

/// Bounds for a user-configured flat-day expiry window.
pub const MIN_EXPIRY_DAYS: i64 = 1;
pub const MAX_EXPIRY_DAYS: i64 = 730;

/// Days without a recorded action before a case counts as stalled (2 months).
pub const DEFAULT_INACTIVITY_DAYS: i64 = 60;

/// Bounds for a user-configured inactivity window.
pub const MIN_INACTIVITY_DAYS: i64 = 1;
pub const MAX_INACTIVITY_DAYS: i64 = 3_650;

/// Notice category whose filing deadline is checked against the incident date.
pub const DEFAULT_PETITION_NOTICE_TYPE: &str = "QUERELLA";

// =============================================================================
// Last-action text markers
// =============================================================================
//
// Matched after normalisation (trim, whitespace collapse, accent fold,
// uppercase), so the accented spelling here is equivalent to the bare one.

/// Mediation attempt failed: the case continues.
pub const FAILED_SETTLEMENT_MARKER: &str = "CONCILIACION FRACASADA";

/// Mediation reached an agreement: the case can be archived.
pub const SETTLEMENT_REACHED_MARKER: &str = "CONCILIACION CON ACUERDO";

/// Complainant was asked for more information.
pub const COMPLAINANT_REQUEST_MARKER: &str = "SOLICITUD A DENUNCIANTE DE INFORMACIÓN";

// =============================================================================
// Input limits
// =============================================================================

/// Largest input table accepted, in bytes.
pub const MAX_INPUT_BYTES: u64 = 256 * 1024 * 1024; // 256 MB

/// Cell values treated as an explicitly missing date.
pub const NULL_DATE_LITERALS: &[&str] = &["nat", "nan", "null", "none", "-"];

/// Date-only formats tried after any user-configured formats.
/// Two-digit years (`%y`) come last and are read day-first.
pub const BUILTIN_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d/%m/%y",
    "%d-%m-%y",
    "%d.%m.%y",
];

/// Parsed dates before this year are rejected. chrono's `%Y` accepts one- or
/// two-digit years, so "01/08/24" would otherwise read as year 1.
pub const MIN_PLAUSIBLE_YEAR: i32 = 1000;

/// Date-time formats whose time part is discarded.
pub const BUILTIN_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Maximum number of user-configured date formats.
pub const MAX_USER_DATE_FORMATS: usize = 16;

// =============================================================================
// Export
// =============================================================================

/// Separator placed between alert labels in the display string.
pub const ALERT_SEPARATOR: &str = "; ";

/// Output date format for exported date columns.
pub const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Logging
// =============================================================================

/// Default log level when neither RUST_LOG nor --debug is set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Name of the configuration file within the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
