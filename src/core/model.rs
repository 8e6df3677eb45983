// CaseAlert - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use chrono::NaiveDate;
use serde::Serialize;

// =============================================================================
// Case Record (normalised output of table loading)
// =============================================================================

/// One row of input data: a single legal proceeding.
///
/// Built once at the input boundary by `core::table`. Dates that failed to
/// parse are `None`; every rule treats `None` as "cannot evaluate".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseRecord {
    /// 1-based data row number in the source table (header excluded).
    pub row_number: usize,

    /// Opaque case identifier ("Caso Noticia").
    pub case_id: String,

    /// Article / offence reference, if the source table carries one.
    pub article_ref: Option<String>,

    /// Notice category ("Tipo de Noticia"), compared case-insensitively.
    pub notice_type: Option<String>,

    /// Date of the incident ("Fecha de los Hechos").
    pub incident_date: Option<NaiveDate>,

    /// Date the complaint was filed ("Fecha de la denuncia").
    pub complaint_date: Option<NaiveDate>,

    /// Date of the last recorded procedural action.
    pub last_action_date: Option<NaiveDate>,

    /// Free-text description of the last recorded procedural action.
    pub last_action_text: Option<String>,
}

// =============================================================================
// Alert kinds
// =============================================================================

/// Closed set of alerts the rule engine can raise, in rule order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Complaint filed after the petition deadline.
    PetitionExpired,
    /// Mediation failed: continue with the case.
    ProceedWithCase,
    /// Mediation reached agreement: archive the case.
    ProceedToArchive,
    /// No procedural action within the inactivity window.
    AdvanceProcess,
    /// Complainant did not answer a request for information.
    ComplainantInactivity,
}

impl AlertKind {
    /// Returns all variants in rule order.
    pub fn all() -> &'static [AlertKind] {
        &[
            AlertKind::PetitionExpired,
            AlertKind::ProceedWithCase,
            AlertKind::ProceedToArchive,
            AlertKind::AdvanceProcess,
            AlertKind::ComplainantInactivity,
        ]
    }

    /// Stable machine-readable code (matches the serde representation).
    pub fn code(&self) -> &'static str {
        match self {
            AlertKind::PetitionExpired => "petition_expired",
            AlertKind::ProceedWithCase => "proceed_with_case",
            AlertKind::ProceedToArchive => "proceed_to_archive",
            AlertKind::AdvanceProcess => "advance_process",
            AlertKind::ComplainantInactivity => "complainant_inactivity",
        }
    }

    /// Human-readable label in the requested language.
    pub fn label(&self, language: Language) -> &'static str {
        match (language, self) {
            (Language::English, AlertKind::PetitionExpired) => "petition expired",
            (Language::English, AlertKind::ProceedWithCase) => "proceed with case",
            (Language::English, AlertKind::ProceedToArchive) => "proceed to archive",
            (Language::English, AlertKind::AdvanceProcess) => "advance the process",
            (Language::English, AlertKind::ComplainantInactivity) => {
                "may proceed to archive (complainant inactivity)"
            }
            (Language::Spanish, AlertKind::PetitionExpired) => "Caducidad de la querella",
            (Language::Spanish, AlertKind::ProceedWithCase) => "Continuar con el proceso",
            (Language::Spanish, AlertKind::ProceedToArchive) => "Proceder con el archivo",
            (Language::Spanish, AlertKind::AdvanceProcess) => "Avanzar con el proceso",
            (Language::Spanish, AlertKind::ComplainantInactivity) => {
                "Se puede proceder con el archivo del caso (inactividad del denunciante)"
            }
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label(Language::English))
    }
}

// =============================================================================
// Alert result
// =============================================================================

/// Ordered alerts raised for one record. Empty means "no alerts".
///
/// Kept structured inside the engine; joined to text only by `display`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AlertResult {
    kinds: Vec<AlertKind>,
}

impl AlertResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an alert. Each rule calls this at most once per evaluation.
    pub fn push(&mut self, kind: AlertKind) {
        self.kinds.push(kind);
    }

    pub fn kinds(&self) -> &[AlertKind] {
        &self.kinds
    }

    pub fn contains(&self, kind: AlertKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// True for the "no alerts" sentinel.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Join labels in rule order, or return the sentinel label.
    pub fn display(&self, language: Language) -> String {
        if self.kinds.is_empty() {
            return language.no_alerts_label().to_string();
        }
        self.kinds
            .iter()
            .map(|k| k.label(language))
            .collect::<Vec<_>>()
            .join(crate::util::constants::ALERT_SEPARATOR)
    }
}

impl From<Vec<AlertKind>> for AlertResult {
    fn from(kinds: Vec<AlertKind>) -> Self {
        Self { kinds }
    }
}

// =============================================================================
// Language
// =============================================================================

/// Presentation language for labels and export headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Spanish,
}

impl Language {
    /// Parse a config/CLI language code ("en", "es", case-insensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Language::English),
            "es" | "spanish" | "espanol" | "español" => Some(Language::Spanish),
            _ => None,
        }
    }

    /// Sentinel shown when a record carries no alerts.
    pub fn no_alerts_label(&self) -> &'static str {
        match self {
            Language::English => "no alerts",
            Language::Spanish => "Sin alertas",
        }
    }
}
