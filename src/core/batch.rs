// CaseAlert - core/batch.rs
//
// Batch runner: applies the rule engine to every record, in input order,
// and keeps only the records that raised at least one alert.
// Core layer: pure logic, no I/O.

use crate::core::model::{AlertResult, CaseRecord, Language};
use crate::core::rules::{self, RuleSettings};
use chrono::NaiveDateTime;

/// A record that raised at least one alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedCase {
    pub record: CaseRecord,
    pub alerts: AlertResult,
}

impl FlaggedCase {
    pub fn alert_display(&self, language: Language) -> String {
        self.alerts.display(language)
    }
}

/// Output of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Flagged records, in the same relative order as the input.
    pub flagged: Vec<FlaggedCase>,
    /// Number of records evaluated.
    pub total: usize,
}

impl BatchOutcome {
    /// True when no record raised an alert ("nothing to flag").
    pub fn is_clear(&self) -> bool {
        self.flagged.is_empty()
    }
}

/// Evaluate all records against a single fixed `now`.
pub fn run_batch(records: &[CaseRecord], now: NaiveDateTime, settings: &RuleSettings) -> BatchOutcome {
    let flagged = records
        .iter()
        .filter_map(|record| {
            let alerts = rules::evaluate(record, now, settings);
            if alerts.is_empty() {
                None
            } else {
                tracing::debug!(
                    row = record.row_number,
                    case_id = %record.case_id,
                    alerts = %alerts.display(Language::English),
                    "Case flagged"
                );
                Some(FlaggedCase {
                    record: record.clone(),
                    alerts,
                })
            }
        })
        .collect();

    BatchOutcome {
        flagged,
        total: records.len(),
    }
}
