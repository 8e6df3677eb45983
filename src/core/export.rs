// CaseAlert - core/export.rs
//
// CSV and JSON export of flagged cases.
// Core layer: writes to any Write trait object.

use crate::core::batch::FlaggedCase;
use crate::core::model::{AlertResult, Language};
use crate::core::table::{Field, TableLayout};
use crate::util::constants;
use crate::util::error::ExportError;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

/// Columns written for every row, in order. The article column is
/// included only when the input table had one.
fn output_fields(layout: &TableLayout) -> Vec<Field> {
    Field::all()
        .iter()
        .copied()
        .filter(|f| *f != Field::ArticleRef || layout.has_article_ref)
        .collect()
}

fn header_for(field: Field, language: Language) -> &'static str {
    match language {
        Language::English => field.name(),
        Language::Spanish => field.spanish_header(),
    }
}

fn alerts_header(language: Language) -> &'static str {
    match language {
        Language::English => "alerts",
        Language::Spanish => "Alertas",
    }
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(constants::EXPORT_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn cell_for(case: &FlaggedCase, field: Field) -> String {
    let r = &case.record;
    match field {
        Field::CaseId => r.case_id.clone(),
        Field::ArticleRef => r.article_ref.clone().unwrap_or_default(),
        Field::NoticeType => r.notice_type.clone().unwrap_or_default(),
        Field::IncidentDate => fmt_date(r.incident_date),
        Field::ComplaintDate => fmt_date(r.complaint_date),
        Field::LastActionDate => fmt_date(r.last_action_date),
        Field::LastActionText => r.last_action_text.clone().unwrap_or_default(),
    }
}

/// Export flagged cases to CSV (UTF-8, comma-delimited).
///
/// Writes: case_id, [article_ref], notice_type, incident_date,
/// complaint_date, last_action_date, last_action_text, alerts
pub fn export_csv<W: Write>(
    cases: &[FlaggedCase],
    layout: &TableLayout,
    language: Language,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e: csv::Error| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(b',')
        .from_writer(writer);
    let fields = output_fields(layout);

    let mut header: Vec<&str> = fields.iter().map(|f| header_for(*f, language)).collect();
    header.push(alerts_header(language));
    csv_writer.write_record(&header).map_err(csv_err)?;

    let mut count = 0;
    for case in cases {
        let mut row: Vec<String> = fields.iter().map(|f| cell_for(case, *f)).collect();
        row.push(case.alert_display(language));
        csv_writer.write_record(&row).map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// JSON shape of one exported row.
#[derive(Debug, Serialize)]
struct JsonRow<'a> {
    case_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    article_ref: Option<&'a str>,
    notice_type: Option<&'a str>,
    incident_date: Option<NaiveDate>,
    complaint_date: Option<NaiveDate>,
    last_action_date: Option<NaiveDate>,
    last_action_text: Option<&'a str>,
    alerts: &'a AlertResult,
    display: String,
}

/// Export flagged cases to JSON (pretty array of objects).
///
/// `alerts` holds machine codes; `display` holds the joined labels.
pub fn export_json<W: Write>(
    cases: &[FlaggedCase],
    layout: &TableLayout,
    language: Language,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let rows: Vec<JsonRow<'_>> = cases
        .iter()
        .map(|case| {
            let r = &case.record;
            JsonRow {
                case_id: &r.case_id,
                article_ref: if layout.has_article_ref {
                    Some(r.article_ref.as_deref().unwrap_or(""))
                } else {
                    None
                },
                notice_type: r.notice_type.as_deref(),
                incident_date: r.incident_date,
                complaint_date: r.complaint_date,
                last_action_date: r.last_action_date,
                last_action_text: r.last_action_text.as_deref(),
                alerts: &case.alerts,
                display: case.alert_display(language),
            }
        })
        .collect();

    serde_json::to_writer_pretty(writer, &rows).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(rows.len())
}

/// Dispatch on format.
pub fn export<W: Write>(
    format: ExportFormat,
    cases: &[FlaggedCase],
    layout: &TableLayout,
    language: Language,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    match format {
        ExportFormat::Csv => export_csv(cases, layout, language, writer, export_path),
        ExportFormat::Json => export_json(cases, layout, language, writer, export_path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{AlertKind, CaseRecord};
    use std::path::PathBuf;

    fn make_case(id: &str, kinds: Vec<AlertKind>) -> FlaggedCase {
        FlaggedCase {
            record: CaseRecord {
                row_number: 1,
                case_id: id.to_string(),
                article_ref: Some("ART 239".to_string()),
                notice_type: Some("QUERELLA".to_string()),
                incident_date: NaiveDate::from_ymd_opt(2024, 1, 1),
                complaint_date: NaiveDate::from_ymd_opt(2024, 8, 1),
                last_action_date: None,
                last_action_text: Some("Conciliación, fracasada".to_string()),
            },
            alerts: AlertResult::from(kinds),
        }
    }

    fn layout(has_article_ref: bool) -> TableLayout {
        TableLayout {
            delimiter: b';',
            has_article_ref,
        }
    }

    #[test]
    fn test_csv_export() {
        let cases = vec![
            make_case("C1", vec![AlertKind::PetitionExpired]),
            make_case("C2", vec![AlertKind::PetitionExpired, AlertKind::ProceedWithCase]),
        ];
        let mut buf = Vec::new();
        let count = export_csv(&cases, &layout(true), Language::English, &mut buf, &PathBuf::from("out.csv")).unwrap();
        assert_eq!(count, 2);

        let output = String::from_utf8(buf).unwrap();
        let mut lines = output.lines();
        assert_eq!(
            lines.next().unwrap(),
            "case_id,article_ref,notice_type,incident_date,complaint_date,last_action_date,last_action_text,alerts"
        );
        assert_eq!(
            lines.next().unwrap(),
            "C1,ART 239,QUERELLA,2024-01-01,2024-08-01,,\"Conciliación, fracasada\",petition expired"
        );
        assert!(lines.next().unwrap().ends_with(",petition expired; proceed with case"));
    }

    #[test]
    fn test_csv_export_omits_missing_article_column() {
        let cases = vec![make_case("C1", vec![AlertKind::AdvanceProcess])];
        let mut buf = Vec::new();
        export_csv(&cases, &layout(false), Language::English, &mut buf, &PathBuf::from("out.csv")).unwrap();
        let output = String::from_utf8(buf).unwrap();
        assert!(output.starts_with("case_id,notice_type,"));
        assert!(!output.contains("ART 239"));
    }

    #[test]
    fn test_csv_export_spanish_headers() {
        let cases = vec![make_case("C1", vec![AlertKind::AdvanceProcess])];
        let mut buf = Vec::new();
        export_csv(&cases, &layout(true), Language::Spanish, &mut buf, &PathBuf::from("out.csv")).unwrap();
        let output = String::from_utf8(buf).unwrap();
        assert!(output.starts_with("Caso Noticia,Artículo,Tipo de Noticia,"));
        assert!(output.contains("Avanzar con el proceso"));
    }

    #[test]
    fn test_json_export() {
        let cases = vec![make_case("C1", vec![AlertKind::ProceedWithCase])];
        let mut buf = Vec::new();
        let count = export_json(&cases, &layout(false), Language::English, &mut buf, &PathBuf::from("out.json")).unwrap();
        assert_eq!(count, 1);

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let row = &value[0];
        assert_eq!(row["case_id"], "C1");
        assert_eq!(row["alerts"][0], "proceed_with_case");
        assert_eq!(row["display"], "proceed with case");
        assert_eq!(row["incident_date"], "2024-01-01");
        assert!(row["last_action_date"].is_null());
        assert!(row.get("article_ref").is_none());
    }

    #[test]
    fn test_export_format_from_name() {
        assert_eq!(ExportFormat::from_name("CSV"), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::from_name("json"), Some(ExportFormat::Json));
        assert_eq!(ExportFormat::from_name("xlsx"), None);
    }
}
