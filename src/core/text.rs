// CaseAlert - core/text.rs
//
// Text normalisation shared by the rule engine and header matching.
// Core layer: pure logic, no I/O.

use regex::Regex;
use std::sync::OnceLock;

/// Collapse whitespace runs to one space and trim both ends.
fn collapse_whitespace(raw: &str) -> String {
    static WS: OnceLock<Regex> = OnceLock::new();
    let ws = WS.get_or_init(|| Regex::new(r"\s+").expect("collapse_whitespace: invalid regex"));
    ws.replace_all(raw.trim(), " ").into_owned()
}

/// Map an accented Latin letter to its bare form. Other chars pass through.
fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' => 'a',
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ç' => 'c',
        'Ç' => 'C',
        other => other,
    }
}

/// Normalise free text for marker matching: trim, collapse whitespace,
/// fold accents, uppercase.
///
/// "  Conciliación   fracasada " -> "CONCILIACION FRACASADA"
pub fn normalize(raw: &str) -> String {
    collapse_whitespace(raw)
        .chars()
        .map(fold_char)
        .collect::<String>()
        .to_uppercase()
}

/// Normalise a column header: same as `normalize` but lowercase, with
/// underscores treated as spaces.
pub fn normalize_header(raw: &str) -> String {
    normalize(&raw.replace('_', " ")).to_lowercase()
}

/// A marker phrase pre-normalised for repeated substring checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    normalized: String,
}

impl Marker {
    pub fn new(phrase: &str) -> Self {
        Self {
            normalized: normalize(phrase),
        }
    }

    /// True if the already-normalised `text` contains this marker.
    /// An empty marker never matches.
    pub fn found_in(&self, normalized_text: &str) -> bool {
        !self.normalized.is_empty() && normalized_text.contains(&self.normalized)
    }
}
