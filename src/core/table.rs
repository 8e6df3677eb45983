// CaseAlert - core/table.rs
//
// Input boundary: turns delimited text into typed `CaseRecord`s.
// Handles delimiter sniffing, header alias matching, and per-cell date
// parsing. Shape errors (missing required column, unreadable CSV) abort the
// load; per-cell parse failures degrade to `None` and are only counted.
//
// Core layer: operates on in-memory text; reading files is the caller's job.

use crate::core::dates::{DateCell, DateParser};
use crate::core::model::CaseRecord;
use crate::core::text;
use crate::util::error::TableError;

// =============================================================================
// Column mapping
// =============================================================================

/// Logical columns understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    CaseId,
    ArticleRef,
    NoticeType,
    IncidentDate,
    ComplaintDate,
    LastActionDate,
    LastActionText,
}

impl Field {
    pub fn all() -> &'static [Field] {
        &[
            Field::CaseId,
            Field::ArticleRef,
            Field::NoticeType,
            Field::IncidentDate,
            Field::ComplaintDate,
            Field::LastActionDate,
            Field::LastActionText,
        ]
    }

    /// Canonical snake_case name, used in error messages and English export.
    pub fn name(&self) -> &'static str {
        match self {
            Field::CaseId => "case_id",
            Field::ArticleRef => "article_ref",
            Field::NoticeType => "notice_type",
            Field::IncidentDate => "incident_date",
            Field::ComplaintDate => "complaint_date",
            Field::LastActionDate => "last_action_date",
            Field::LastActionText => "last_action_text",
        }
    }

    /// Header as it appears in the Spanish source tables.
    pub fn spanish_header(&self) -> &'static str {
        match self {
            Field::CaseId => "Caso Noticia",
            Field::ArticleRef => "Artículo",
            Field::NoticeType => "Tipo de Noticia",
            Field::IncidentDate => "Fecha de los Hechos",
            Field::ComplaintDate => "Fecha de la denuncia",
            Field::LastActionDate => "Fecha Última Actuación",
            Field::LastActionText => "Última Actuación",
        }
    }

    /// Accepted header spellings, already in `normalize_header` form.
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Field::CaseId => &["caso noticia", "case id", "caso"],
            Field::ArticleRef => &["articulo", "delito", "article", "article ref", "article reference"],
            Field::NoticeType => &["tipo de noticia", "notice type"],
            Field::IncidentDate => &["fecha de los hechos", "incident date"],
            Field::ComplaintDate => &["fecha de la denuncia", "complaint date"],
            Field::LastActionDate => &["fecha ultima actuacion", "last action date"],
            Field::LastActionText => &["ultima actuacion", "last action", "last action text"],
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, Field::ArticleRef)
    }
}

/// Column index for each logical field found in the header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    case_id: Option<usize>,
    article_ref: Option<usize>,
    notice_type: Option<usize>,
    incident_date: Option<usize>,
    complaint_date: Option<usize>,
    last_action_date: Option<usize>,
    last_action_text: Option<usize>,
}

impl ColumnMap {
    /// Match headers against the alias table. The first matching column wins.
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut map = ColumnMap::default();
        for (idx, header) in headers.into_iter().enumerate() {
            let normalized = text::normalize_header(header);
            let Some(field) = Field::all()
                .iter()
                .find(|f| f.aliases().contains(&normalized.as_str()))
            else {
                continue;
            };
            let slot = map.slot_mut(*field);
            if slot.is_none() {
                *slot = Some(idx);
            }
        }
        map
    }

    pub fn get(&self, field: Field) -> Option<usize> {
        match field {
            Field::CaseId => self.case_id,
            Field::ArticleRef => self.article_ref,
            Field::NoticeType => self.notice_type,
            Field::IncidentDate => self.incident_date,
            Field::ComplaintDate => self.complaint_date,
            Field::LastActionDate => self.last_action_date,
            Field::LastActionText => self.last_action_text,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<usize> {
        match field {
            Field::CaseId => &mut self.case_id,
            Field::ArticleRef => &mut self.article_ref,
            Field::NoticeType => &mut self.notice_type,
            Field::IncidentDate => &mut self.incident_date,
            Field::ComplaintDate => &mut self.complaint_date,
            Field::LastActionDate => &mut self.last_action_date,
            Field::LastActionText => &mut self.last_action_text,
        }
    }

    /// First required field with no matching column, if any.
    pub fn first_missing_required(&self) -> Option<Field> {
        Field::all()
            .iter()
            .copied()
            .find(|f| f.is_required() && self.get(*f).is_none())
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Options for a single table load.
#[derive(Debug, Clone, Default)]
pub struct TableOptions {
    /// Fixed delimiter. `None` = sniff from the header line.
    pub delimiter: Option<u8>,
    pub date_parser: DateParser,
}

/// Shape of the loaded table, needed to project the output columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    pub delimiter: u8,
    /// Whether the optional article column was present.
    pub has_article_ref: bool,
}

/// Result of a successful load.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub records: Vec<CaseRecord>,
    pub layout: TableLayout,
    /// Non-blank date cells that no format could parse.
    pub unparsed_dates: usize,
}

/// Pick `;` or `,` by counting unquoted occurrences in the header line.
/// Ties (including zero of each) resolve to comma.
pub fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or("");
    let (mut commas, mut semicolons) = (0usize, 0usize);
    let mut in_quotes = false;
    for c in header.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => commas += 1,
            ';' if !in_quotes => semicolons += 1,
            _ => {}
        }
    }
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Parse a delimited table into case records, preserving row order.
pub fn load_table(content: &str, options: &TableOptions) -> Result<LoadedTable, TableError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let delimiter = options.delimiter.unwrap_or_else(|| sniff_delimiter(content));
    let delimiter_char = delimiter as char;
    tracing::debug!(delimiter = %delimiter_char, "Table delimiter selected");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| TableError::Csv { source: e })?
        .clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(TableError::Empty);
    }

    let columns = ColumnMap::from_headers(headers.iter());
    if let Some(missing) = columns.first_missing_required() {
        return Err(TableError::MissingColumn {
            column: missing.name(),
        });
    }

    let mut records = Vec::new();
    let mut unparsed_dates = 0usize;

    for (idx, row) in reader.records().enumerate() {
        let row = row.map_err(|e| TableError::Csv { source: e })?;
        let cell = |field: Field| columns.get(field).and_then(|i| row.get(i)).unwrap_or("");
        let mut date = |field: Field| -> Option<chrono::NaiveDate> {
            match options.date_parser.parse(cell(field)) {
                DateCell::Parsed(d) => Some(d),
                DateCell::Blank => None,
                DateCell::Unparsed => {
                    unparsed_dates += 1;
                    None
                }
            }
        };

        let incident_date = date(Field::IncidentDate);
        let complaint_date = date(Field::ComplaintDate);
        let last_action_date = date(Field::LastActionDate);

        records.push(CaseRecord {
            row_number: idx + 1,
            case_id: cell(Field::CaseId).trim().to_string(),
            article_ref: non_blank(cell(Field::ArticleRef)),
            notice_type: non_blank(cell(Field::NoticeType)),
            incident_date,
            complaint_date,
            last_action_date,
            last_action_text: non_blank(cell(Field::LastActionText)),
        });
    }

    tracing::debug!(
        rows = records.len(),
        unparsed_dates,
        "Table loaded"
    );

    Ok(LoadedTable {
        records,
        layout: TableLayout {
            delimiter,
            has_article_ref: columns.get(Field::ArticleRef).is_some(),
        },
        unparsed_dates,
    })
}

/// Trimmed text, or `None` for an empty cell.
fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
