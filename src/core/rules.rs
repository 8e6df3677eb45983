// CaseAlert - core/rules.rs
//
// Rule engine: evaluates the business rules for one case record.
// Rules are independent and run in a fixed order; each appends at most one
// alert. The only cross-rule coupling is that a settlement outcome
// suppresses the general inactivity alert.
//
// Core layer: pure logic, no I/O. `now` is always passed in explicitly.

use crate::core::model::{AlertKind, AlertResult, CaseRecord};
use crate::core::text::{self, Marker};
use crate::util::constants;
use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

// =============================================================================
// Settings
// =============================================================================

/// Length of the window within which a petition must be filed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryWindow {
    /// Calendar offset: same day-of-month N months later (clamped to month end).
    CalendarMonths(u32),
    /// Flat number of days.
    Days(i64),
}

impl Default for ExpiryWindow {
    fn default() -> Self {
        ExpiryWindow::CalendarMonths(constants::DEFAULT_EXPIRY_MONTHS)
    }
}

impl ExpiryWindow {
    /// Last day on which a petition is still in time. `None` on overflow.
    pub fn deadline(&self, incident: NaiveDate) -> Option<NaiveDate> {
        match *self {
            ExpiryWindow::CalendarMonths(m) => incident.checked_add_months(Months::new(m)),
            ExpiryWindow::Days(d) => {
                TimeDelta::try_days(d).and_then(|delta| incident.checked_add_signed(delta))
            }
        }
    }
}

/// Thresholds and phrases the rules compare against.
///
/// Markers and the petition type are stored pre-normalised so that
/// evaluating a record never re-normalises constants.
#[derive(Debug, Clone)]
pub struct RuleSettings {
    pub expiry_window: ExpiryWindow,
    pub inactivity_days: i64,
    petition_notice_type: String,
    failed_settlement: Marker,
    settlement_reached: Marker,
    complainant_request: Marker,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            expiry_window: ExpiryWindow::default(),
            inactivity_days: constants::DEFAULT_INACTIVITY_DAYS,
            petition_notice_type: text::normalize(constants::DEFAULT_PETITION_NOTICE_TYPE),
            failed_settlement: Marker::new(constants::FAILED_SETTLEMENT_MARKER),
            settlement_reached: Marker::new(constants::SETTLEMENT_REACHED_MARKER),
            complainant_request: Marker::new(constants::COMPLAINANT_REQUEST_MARKER),
        }
    }
}

impl RuleSettings {
    /// Replace the notice category subject to the expiry check.
    pub fn with_petition_notice_type(mut self, notice_type: &str) -> Self {
        self.petition_notice_type = text::normalize(notice_type);
        self
    }

    pub fn with_expiry_window(mut self, window: ExpiryWindow) -> Self {
        self.expiry_window = window;
        self
    }

    pub fn with_inactivity_days(mut self, days: i64) -> Self {
        self.inactivity_days = days;
        self
    }

    /// True if `notice_type` names the petition category.
    pub fn is_petition(&self, notice_type: &str) -> bool {
        text::normalize(notice_type) == self.petition_notice_type
    }

    pub(crate) fn complainant_request(&self) -> &Marker {
        &self.complainant_request
    }

    /// Instant before which a last action counts as stale. `None` on overflow.
    pub fn inactivity_cutoff(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        TimeDelta::try_days(self.inactivity_days).and_then(|d| now.checked_sub_signed(d))
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Outcome of the settlement rule, shared with the inactivity rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Failed,
    Reached,
}

impl Settlement {
    pub fn alert(&self) -> AlertKind {
        match self {
            Settlement::Failed => AlertKind::ProceedWithCase,
            Settlement::Reached => AlertKind::ProceedToArchive,
        }
    }
}

/// Evaluate every rule for one record.
///
/// Pure: the same `(record, now, settings)` always yields the same result.
/// Missing or unparsed fields make the affected rule not fire; nothing here
/// can fail.
pub fn evaluate(record: &CaseRecord, now: NaiveDateTime, settings: &RuleSettings) -> AlertResult {
    let mut result = AlertResult::new();
    let normalized_text = record.last_action_text.as_deref().map(text::normalize);

    if petition_expired(record, settings) {
        result.push(AlertKind::PetitionExpired);
    }

    let settlement = normalized_text
        .as_deref()
        .and_then(|t| settlement_outcome(t, settings));
    if let Some(outcome) = settlement {
        result.push(outcome.alert());
    }

    let stale = is_stale(record.last_action_date, now, settings);
    if stale && settlement.is_none() {
        result.push(AlertKind::AdvanceProcess);
    }

    let awaiting_complainant = normalized_text
        .as_deref()
        .is_some_and(|t| settings.complainant_request.found_in(t));
    if stale && awaiting_complainant {
        result.push(AlertKind::ComplainantInactivity);
    }

    result
}

/// Rule 1: complaint filed strictly after the petition deadline.
pub fn petition_expired(record: &CaseRecord, settings: &RuleSettings) -> bool {
    let Some(notice_type) = record.notice_type.as_deref() else {
        return false;
    };
    if !settings.is_petition(notice_type) {
        return false;
    }
    let (Some(incident), Some(complaint)) = (record.incident_date, record.complaint_date) else {
        return false;
    };
    settings
        .expiry_window
        .deadline(incident)
        .is_some_and(|deadline| complaint > deadline)
}

/// Rule 2: mediation outcome from normalised last-action text.
/// Failed settlement is checked first, so it wins if both markers appear.
pub fn settlement_outcome(normalized_text: &str, settings: &RuleSettings) -> Option<Settlement> {
    if settings.failed_settlement.found_in(normalized_text) {
        Some(Settlement::Failed)
    } else if settings.settlement_reached.found_in(normalized_text) {
        Some(Settlement::Reached)
    } else {
        None
    }
}

/// Shared staleness test for rules 3 and 4: the last action (taken at
/// midnight) lies strictly before `now - inactivity_days`.
pub fn is_stale(last_action: Option<NaiveDate>, now: NaiveDateTime, settings: &RuleSettings) -> bool {
    let (Some(date), Some(cutoff)) = (last_action, settings.inactivity_cutoff(now)) else {
        return false;
    };
    date.and_time(NaiveTime::MIN) < cutoff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dates::DateParser;
    use crate::core::model::Language;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> NaiveDateTime {
        ymd(2024, 10, 1).and_hms_opt(0, 0, 0).unwrap()
    }

    fn days_before_now(days: i64) -> NaiveDate {
        now().date() - TimeDelta::days(days)
    }

    fn petition(incident: NaiveDate, complaint: NaiveDate) -> CaseRecord {
        CaseRecord {
            case_id: "C-1".to_string(),
            notice_type: Some("QUERELLA".to_string()),
            incident_date: Some(incident),
            complaint_date: Some(complaint),
            ..Default::default()
        }
    }

    fn action(text: &str, date: Option<NaiveDate>) -> CaseRecord {
        CaseRecord {
            case_id: "C-2".to_string(),
            last_action_text: Some(text.to_string()),
            last_action_date: date,
            ..Default::default()
        }
    }

    // -------------------------------------------------------------------------
    // Rule 1: expiry
    // -------------------------------------------------------------------------

    #[test]
    fn test_petition_filed_after_six_months_expires() {
        let record = petition(ymd(2024, 1, 1), ymd(2024, 8, 1));
        let result = evaluate(&record, now(), &RuleSettings::default());
        assert_eq!(result.kinds(), &[AlertKind::PetitionExpired]);
    }

    #[test]
    fn test_petition_filed_within_window_is_valid() {
        let record = petition(ymd(2024, 1, 1), ymd(2024, 6, 1));
        assert!(evaluate(&record, now(), &RuleSettings::default()).is_empty());
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let settings = RuleSettings::default();
        let on_deadline = petition(ymd(2024, 1, 1), ymd(2024, 7, 1));
        assert!(!petition_expired(&on_deadline, &settings));
        let day_after = petition(ymd(2024, 1, 1), ymd(2024, 7, 2));
        assert!(petition_expired(&day_after, &settings));
    }

    #[test]
    fn test_calendar_window_clamps_to_month_end() {
        let window = ExpiryWindow::CalendarMonths(6);
        assert_eq!(window.deadline(ymd(2023, 8, 31)), Some(ymd(2024, 2, 29)));
    }

    #[test]
    fn test_day_window_differs_from_calendar_window() {
        // 2024-01-01 + 180 days = 2024-06-29; + 6 months = 2024-07-01.
        let record = petition(ymd(2024, 1, 1), ymd(2024, 6, 30));
        let days = RuleSettings::default().with_expiry_window(ExpiryWindow::Days(180));
        assert!(petition_expired(&record, &days));
        assert!(!petition_expired(&record, &RuleSettings::default()));
    }

    #[test]
    fn test_notice_type_match_is_case_and_space_insensitive() {
        let mut record = petition(ymd(2024, 1, 1), ymd(2024, 8, 1));
        record.notice_type = Some("  querella ".to_string());
        assert!(petition_expired(&record, &RuleSettings::default()));
        record.notice_type = Some("DENUNCIA".to_string());
        assert!(!petition_expired(&record, &RuleSettings::default()));
    }

    #[test]
    fn test_expiry_needs_both_dates() {
        let mut record = petition(ymd(2024, 1, 1), ymd(2024, 8, 1));
        record.incident_date = None;
        assert!(!petition_expired(&record, &RuleSettings::default()));
        let mut record = petition(ymd(2024, 1, 1), ymd(2024, 8, 1));
        record.complaint_date = None;
        assert!(!petition_expired(&record, &RuleSettings::default()));
    }

    #[test]
    fn test_custom_petition_type() {
        let settings = RuleSettings::default().with_petition_notice_type("Petición");
        let mut record = petition(ymd(2024, 1, 1), ymd(2024, 8, 1));
        record.notice_type = Some("PETICION".to_string());
        assert!(petition_expired(&record, &settings));
    }

    // -------------------------------------------------------------------------
    // Rule 2 + 3: settlement and suppression
    // -------------------------------------------------------------------------

    #[test]
    fn test_failed_settlement_suppresses_inactivity() {
        let record = action("Conciliación fracasada", Some(days_before_now(90)));
        let result = evaluate(&record, now(), &RuleSettings::default());
        assert_eq!(result.kinds(), &[AlertKind::ProceedWithCase]);
        assert_eq!(result.display(Language::English), "proceed with case");
    }

    #[test]
    fn test_settlement_reached_suppresses_inactivity() {
        let record = action("CONCILIACION CON ACUERDO firmada", Some(days_before_now(400)));
        let result = evaluate(&record, now(), &RuleSettings::default());
        assert_eq!(result.kinds(), &[AlertKind::ProceedToArchive]);
    }

    #[test]
    fn test_both_settlement_markers_failed_wins() {
        let record = action(
            "conciliacion con acuerdo anulada; conciliacion fracasada",
            None,
        );
        let result = evaluate(&record, now(), &RuleSettings::default());
        assert_eq!(result.kinds(), &[AlertKind::ProceedWithCase]);
        assert!(!result.contains(AlertKind::ProceedToArchive));
    }

    #[test]
    fn test_settlement_without_date_still_fires() {
        let record = action("conciliación con acuerdo", None);
        assert_eq!(
            evaluate(&record, now(), &RuleSettings::default()).kinds(),
            &[AlertKind::ProceedToArchive]
        );
    }

    // -------------------------------------------------------------------------
    // Rule 3: inactivity
    // -------------------------------------------------------------------------

    #[test]
    fn test_stale_last_action_advances_process() {
        let record = action("Auto de trámite", Some(days_before_now(61)));
        assert_eq!(
            evaluate(&record, now(), &RuleSettings::default()).kinds(),
            &[AlertKind::AdvanceProcess]
        );
    }

    #[test]
    fn test_recent_two_digit_year_action_is_not_stale() {
        let last = DateParser::default().parse("25/09/24").date();
        let record = action("Auto de trámite", last);
        assert!(evaluate(&record, now(), &RuleSettings::default()).is_empty());
    }

    #[test]
    fn test_inactivity_boundary_is_exclusive() {
        let settings = RuleSettings::default();
        assert!(!is_stale(Some(days_before_now(60)), now(), &settings));
        assert!(is_stale(Some(days_before_now(61)), now(), &settings));
        assert!(!is_stale(Some(days_before_now(10)), now(), &settings));
        assert!(!is_stale(None, now(), &settings));
    }

    #[test]
    fn test_time_of_day_in_now_counts() {
        // At noon, an action exactly 60 days back (midnight) is already stale.
        let noon = now().date().and_hms_opt(12, 0, 0).unwrap();
        assert!(is_stale(Some(days_before_now(60)), noon, &RuleSettings::default()));
    }

    // -------------------------------------------------------------------------
    // Rule 4: complainant inactivity
    // -------------------------------------------------------------------------

    #[test]
    fn test_complainant_request_stale_fires_rules_three_and_four() {
        let record = action(
            "Solicitud a denunciante de información adicional",
            Some(days_before_now(70)),
        );
        let result = evaluate(&record, now(), &RuleSettings::default());
        assert_eq!(
            result.kinds(),
            &[AlertKind::AdvanceProcess, AlertKind::ComplainantInactivity]
        );
        assert_eq!(
            result.display(Language::English),
            "advance the process; may proceed to archive (complainant inactivity)"
        );
    }

    #[test]
    fn test_complainant_request_recent_is_pending() {
        let record = action(
            "Solicitud a denunciante de información adicional",
            Some(days_before_now(20)),
        );
        assert!(evaluate(&record, now(), &RuleSettings::default()).is_empty());
    }

    #[test]
    fn test_complainant_request_without_date_does_not_fire() {
        let record = action("solicitud a denunciante de informacion", None);
        assert!(evaluate(&record, now(), &RuleSettings::default()).is_empty());
    }

    // -------------------------------------------------------------------------
    // Whole-record properties
    // -------------------------------------------------------------------------

    #[test]
    fn test_all_fields_absent_is_no_alerts() {
        let record = CaseRecord {
            case_id: "C-9".to_string(),
            notice_type: Some("QUERELLA".to_string()),
            ..Default::default()
        };
        let result = evaluate(&record, now(), &RuleSettings::default());
        assert!(result.is_empty());
        assert_eq!(result.display(Language::English), "no alerts");
    }

    #[test]
    fn test_rules_accumulate_in_order() {
        let record = CaseRecord {
            case_id: "C-10".to_string(),
            notice_type: Some("Querella".to_string()),
            incident_date: Some(ymd(2023, 1, 1)),
            complaint_date: Some(ymd(2023, 12, 1)),
            last_action_date: Some(days_before_now(100)),
            last_action_text: Some("Solicitud a denunciante de información".to_string()),
            ..Default::default()
        };
        let result = evaluate(&record, now(), &RuleSettings::default());
        assert_eq!(
            result.kinds(),
            &[
                AlertKind::PetitionExpired,
                AlertKind::AdvanceProcess,
                AlertKind::ComplainantInactivity,
            ]
        );
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let record = action("conciliacion fracasada", Some(days_before_now(5)));
        let settings = RuleSettings::default();
        assert_eq!(evaluate(&record, now(), &settings), evaluate(&record, now(), &settings));
    }

    #[test]
    fn test_custom_inactivity_window() {
        let settings = RuleSettings::default().with_inactivity_days(30);
        let record = action("Auto", Some(days_before_now(45)));
        assert_eq!(evaluate(&record, now(), &settings).kinds(), &[AlertKind::AdvanceProcess]);
    }
}
