// CaseAlert - core/report.rs
//
// Per-rule breakdown of a run: for each rule, which records it looked at
// and what intermediate status they landed in (e.g. a petition still in
// time, a complainant request still pending). Complements the flat alert
// list with the figures a reviewer needs to check each decision.
// Core layer: pure logic, no I/O.

use crate::core::batch::BatchOutcome;
use crate::core::model::{AlertKind, CaseRecord};
use crate::core::rules::{self, RuleSettings, Settlement};
use crate::core::text;
use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Per-rule statuses
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ExpiryStatus {
    Expired { days_elapsed: i64 },
    Valid { days_elapsed: i64 },
    IncompleteDates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum InactivityStatus {
    Stale { days_since: i64 },
    Recent { days_since: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ComplainantStatus {
    ReadyToArchive { days_since: i64 },
    Pending { days_since: i64 },
    IncompleteDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SettlementStatus {
    Failed,
    Reached,
}

impl From<Settlement> for SettlementStatus {
    fn from(s: Settlement) -> Self {
        match s {
            Settlement::Failed => SettlementStatus::Failed,
            Settlement::Reached => SettlementStatus::Reached,
        }
    }
}

/// One record's status under one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleRow<S> {
    pub case_id: String,
    #[serde(flatten)]
    pub status: S,
}

// =============================================================================
// Report
// =============================================================================

/// Aggregate figures for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub flagged: usize,
    pub unparsed_dates: usize,
    pub per_alert: BTreeMap<AlertKind, usize>,
}

impl RunSummary {
    pub fn from_outcome(outcome: &BatchOutcome, unparsed_dates: usize) -> Self {
        let mut per_alert = BTreeMap::new();
        for case in &outcome.flagged {
            for kind in case.alerts.kinds() {
                *per_alert.entry(*kind).or_insert(0) += 1;
            }
        }
        Self {
            total: outcome.total,
            flagged: outcome.flagged.len(),
            unparsed_dates,
            per_alert,
        }
    }

    pub fn count(&self, kind: AlertKind) -> usize {
        self.per_alert.get(&kind).copied().unwrap_or(0)
    }
}

/// Per-rule breakdown of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuleReport {
    /// Records of the petition notice type.
    pub expiry: Vec<RuleRow<ExpiryStatus>>,
    /// Records whose last action matched a settlement marker.
    pub settlement: Vec<RuleRow<SettlementStatus>>,
    /// Records with a last-action date.
    pub inactivity: Vec<RuleRow<InactivityStatus>>,
    /// Records whose last action is a request to the complainant.
    pub complainant: Vec<RuleRow<ComplainantStatus>>,
    pub summary: RunSummary,
}

impl RuleReport {
    pub fn build(
        records: &[CaseRecord],
        outcome: &BatchOutcome,
        now: NaiveDateTime,
        settings: &RuleSettings,
        unparsed_dates: usize,
    ) -> Self {
        let mut report = RuleReport {
            summary: RunSummary::from_outcome(outcome, unparsed_dates),
            ..Default::default()
        };

        for record in records {
            let normalized_text = record.last_action_text.as_deref().map(text::normalize);
            let days_since = record
                .last_action_date
                .map(|d| (now - d.and_time(NaiveTime::MIN)).num_days());
            let stale = rules::is_stale(record.last_action_date, now, settings);

            if let Some(status) = expiry_status(record, settings) {
                report.expiry.push(RuleRow {
                    case_id: record.case_id.clone(),
                    status,
                });
            }

            if let Some(outcome) = normalized_text
                .as_deref()
                .and_then(|t| rules::settlement_outcome(t, settings))
            {
                report.settlement.push(RuleRow {
                    case_id: record.case_id.clone(),
                    status: SettlementStatus::from(outcome),
                });
            }

            if let Some(days) = days_since {
                report.inactivity.push(RuleRow {
                    case_id: record.case_id.clone(),
                    status: if stale {
                        InactivityStatus::Stale { days_since: days }
                    } else {
                        InactivityStatus::Recent { days_since: days }
                    },
                });
            }

            let awaiting = normalized_text
                .as_deref()
                .is_some_and(|t| settings.complainant_request().found_in(t));
            if awaiting {
                let status = match days_since {
                    None => ComplainantStatus::IncompleteDate,
                    Some(days) if stale => ComplainantStatus::ReadyToArchive { days_since: days },
                    Some(days) => ComplainantStatus::Pending { days_since: days },
                };
                report.complainant.push(RuleRow {
                    case_id: record.case_id.clone(),
                    status,
                });
            }
        }

        report
    }
}

fn expiry_status(record: &CaseRecord, settings: &RuleSettings) -> Option<ExpiryStatus> {
    if !record
        .notice_type
        .as_deref()
        .is_some_and(|t| settings.is_petition(t))
    {
        return None;
    }
    let status = match (record.incident_date, record.complaint_date) {
        (Some(incident), Some(complaint)) => {
            let days_elapsed = (complaint - incident).num_days();
            if rules::petition_expired(record, settings) {
                ExpiryStatus::Expired { days_elapsed }
            } else {
                ExpiryStatus::Valid { days_elapsed }
            }
        }
        _ => ExpiryStatus::IncompleteDates,
    };
    Some(status)
}

impl fmt::Display for RuleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;
        writeln!(
            f,
            "{} record(s) evaluated, {} flagged, {} unparseable date cell(s)",
            s.total, s.flagged, s.unparsed_dates
        )?;
        for kind in AlertKind::all() {
            writeln!(f, "  {:<50} {}", kind.to_string(), s.count(*kind))?;
        }

        let expired = self
            .expiry
            .iter()
            .filter(|r| matches!(r.status, ExpiryStatus::Expired { .. }))
            .count();
        let incomplete = self
            .expiry
            .iter()
            .filter(|r| r.status == ExpiryStatus::IncompleteDates)
            .count();
        writeln!(
            f,
            "Petition expiry: {} checked, {} expired, {} with incomplete dates",
            self.expiry.len(),
            expired,
            incomplete
        )?;

        let failed = self
            .settlement
            .iter()
            .filter(|r| r.status == SettlementStatus::Failed)
            .count();
        writeln!(
            f,
            "Settlement: {} failed, {} reached",
            failed,
            self.settlement.len() - failed
        )?;

        let stale = self
            .inactivity
            .iter()
            .filter(|r| matches!(r.status, InactivityStatus::Stale { .. }))
            .count();
        writeln!(
            f,
            "Inactivity: {} dated, {} stale",
            self.inactivity.len(),
            stale
        )?;

        for row in &self.complainant {
            match row.status {
                ComplainantStatus::ReadyToArchive { days_since } => writeln!(
                    f,
                    "Complainant request {}: ready to archive ({days_since} days)",
                    row.case_id
                )?,
                ComplainantStatus::Pending { days_since } => writeln!(
                    f,
                    "Complainant request {}: pending ({days_since} days elapsed)",
                    row.case_id
                )?,
                ComplainantStatus::IncompleteDate => writeln!(
                    f,
                    "Complainant request {}: last action date missing",
                    row.case_id
                )?,
            }
        }
        Ok(())
    }
}
