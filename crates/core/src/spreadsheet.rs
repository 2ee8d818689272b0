//! Spreadsheet schema, analysis, and row parsing for bulk case import.
//!
//! This module has zero external I/O: every function operates on a
//! caller-buffered byte slice, so the same upload can be read twice (an
//! analysis pass and an import pass) without the analyzer ever consuming
//! or mutating the canonical source.
//!
//! Header labels are localized. The import template is generated in the
//! tenant's locale, so the header row of an uploaded file is matched
//! case-insensitively against the labels of every supported locale.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

// ── Constants ────────────────────────────────────────────────────────

/// UTF-8 byte order mark, emitted by most spreadsheet applications.
pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Maximum accepted upload size in bytes (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Number of columns in the case import schema.
pub const COLUMN_COUNT: usize = 6;

// ── Locale ───────────────────────────────────────────────────────────

/// A locale supported by the import schema and template generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    En,
    PtBr,
}

impl Locale {
    /// Every supported locale.
    pub const ALL: [Locale; 2] = [Locale::En, Locale::PtBr];

    /// Parse a BCP 47-style tag (`"en"`, `"pt-BR"`), case-insensitive.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "en" => Some(Locale::En),
            "pt-br" => Some(Locale::PtBr),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::PtBr => "pt-BR",
        }
    }
}

// ── Column schema ────────────────────────────────────────────────────

/// A column of the case import schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKey {
    Title = 0,
    Client = 1,
    Lawyer = 2,
    Classification = 3,
    FilingNumber = 4,
    Notes = 5,
}

impl ColumnKey {
    /// All columns, in canonical template order.
    pub const ALL: [ColumnKey; COLUMN_COUNT] = [
        ColumnKey::Title,
        ColumnKey::Client,
        ColumnKey::Lawyer,
        ColumnKey::Classification,
        ColumnKey::FilingNumber,
        ColumnKey::Notes,
    ];

    /// Returns `true` if an uploaded file must carry this column.
    pub fn required(&self) -> bool {
        !matches!(self, ColumnKey::FilingNumber | ColumnKey::Notes)
    }

    /// The header label for this column in the given locale.
    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (ColumnKey::Title, Locale::En) => "Title",
            (ColumnKey::Title, Locale::PtBr) => "Título",
            (ColumnKey::Client, Locale::En) => "Client",
            (ColumnKey::Client, Locale::PtBr) => "Cliente",
            (ColumnKey::Lawyer, Locale::En) => "Lawyer",
            (ColumnKey::Lawyer, Locale::PtBr) => "Advogado",
            (ColumnKey::Classification, Locale::En) => "Classification",
            (ColumnKey::Classification, Locale::PtBr) => "Classificação",
            (ColumnKey::FilingNumber, Locale::En) => "Filing Number",
            (ColumnKey::FilingNumber, Locale::PtBr) => "Número do Processo",
            (ColumnKey::Notes, Locale::En) => "Notes",
            (ColumnKey::Notes, Locale::PtBr) => "Observações",
        }
    }

    /// Resolve a header cell to a column, matching any supported locale's
    /// label case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim().to_lowercase();
        for key in Self::ALL {
            for locale in Locale::ALL {
                if key.label(locale).to_lowercase() == wanted {
                    return Some(key);
                }
            }
        }
        None
    }
}

/// Resolved positions of schema columns within an uploaded header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    positions: [Option<usize>; COLUMN_COUNT],
}

impl ColumnMap {
    /// Position of `key` in the header row, if the column is present.
    pub fn position(&self, key: ColumnKey) -> Option<usize> {
        self.positions[key as usize]
    }

    fn set(&mut self, key: ColumnKey, index: usize) {
        self.positions[key as usize] = Some(index);
    }
}

// ── File-level errors ────────────────────────────────────────────────

/// A file whose header cannot be reconciled with the import schema.
///
/// Raised before any quota or import work begins; row-level problems are
/// never a `FormatError`.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("The file is empty or has no header row")]
    Empty,

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Duplicate column header: {0}")]
    DuplicateColumn(String),

    #[error("Unrecognized column header: {0}")]
    UnknownColumn(String),

    #[error("Malformed spreadsheet: {0}")]
    Malformed(#[from] csv::Error),
}

// ── Analysis ─────────────────────────────────────────────────────────

/// The read-only analysis result for an uploaded file.
#[derive(Debug, Clone)]
pub struct FileSummary {
    /// Number of data rows (header and fully blank trailing rows excluded).
    pub row_count: i64,
    /// Resolved header positions, used by the import pass.
    pub columns: ColumnMap,
}

/// A fully decoded sheet: resolved columns plus the data rows in file order.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub columns: ColumnMap,
    /// Trimmed cell values per data row. Fully blank trailing rows are
    /// dropped; a blank row in the middle of the file is kept (it is a
    /// data row and will fail parsing).
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn summary(&self) -> FileSummary {
        FileSummary {
            row_count: self.rows.len() as i64,
            columns: self.columns.clone(),
        }
    }
}

/// Decode an uploaded file into a [`Sheet`].
///
/// Strips a UTF-8 BOM, validates the header row against the schema, and
/// decodes cells lossily so a stray byte never aborts the whole file.
pub fn read_sheet(bytes: &[u8]) -> Result<Sheet, FormatError> {
    let bytes = strip_bom(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut records = reader.byte_records();

    let header = match records.next() {
        Some(record) => record?,
        None => return Err(FormatError::Empty),
    };
    let header_cells: Vec<String> = header
        .iter()
        .map(|cell| String::from_utf8_lossy(cell).into_owned())
        .collect();
    let columns = resolve_columns(&header_cells)?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in records {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|cell| String::from_utf8_lossy(cell).trim().to_string())
                .collect(),
        );
    }

    // Spreadsheet apps keep phantom rows past the data; drop them.
    while rows
        .last()
        .is_some_and(|row| row.iter().all(|cell| cell.is_empty()))
    {
        rows.pop();
    }

    Ok(Sheet { columns, rows })
}

/// Read-only analysis pass: header validation plus a data row count.
///
/// Pure and side-effect free; analyzing the same bytes twice yields the
/// same summary.
pub fn analyze(bytes: &[u8]) -> Result<FileSummary, FormatError> {
    Ok(read_sheet(bytes)?.summary())
}

fn resolve_columns(cells: &[String]) -> Result<ColumnMap, FormatError> {
    let mut map = ColumnMap::default();
    for (index, cell) in cells.iter().enumerate() {
        let label = cell.trim();
        if label.is_empty() {
            // Trailing separators produce empty header cells; ignore them.
            continue;
        }
        let key = ColumnKey::from_label(label)
            .ok_or_else(|| FormatError::UnknownColumn(label.to_string()))?;
        if map.position(key).is_some() {
            return Err(FormatError::DuplicateColumn(label.to_string()));
        }
        map.set(key, index);
    }
    for key in ColumnKey::ALL {
        if key.required() && map.position(key).is_none() {
            return Err(FormatError::MissingColumn(key.label(Locale::En)));
        }
    }
    Ok(map)
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

// ── Row parsing ──────────────────────────────────────────────────────

/// One spreadsheet data row, structurally validated but with references
/// still unresolved. Exists only during import; never persisted.
#[derive(Debug, Clone, Validate)]
pub struct CaseRowDraft {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 120))]
    pub client_ref: String,
    #[validate(length(min = 1, max = 120))]
    pub lawyer_ref: String,
    #[validate(length(min = 1, max = 60))]
    pub classification_ref: String,
    #[validate(length(min = 1, max = 64))]
    pub filing_number: Option<String>,
    pub notes: Option<String>,
}

/// Parse one data row into a [`CaseRowDraft`].
///
/// A missing cell reads as empty; empty optional cells become `None`.
/// Structural failures come back as [`CoreError::Validation`] with the
/// offending fields named.
pub fn parse_row(columns: &ColumnMap, cells: &[String]) -> Result<CaseRowDraft, CoreError> {
    let cell = |key: ColumnKey| -> String {
        columns
            .position(key)
            .and_then(|index| cells.get(index))
            .cloned()
            .unwrap_or_default()
    };
    let optional = |key: ColumnKey| -> Option<String> {
        let value = cell(key);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    };

    let draft = CaseRowDraft {
        title: cell(ColumnKey::Title),
        client_ref: cell(ColumnKey::Client),
        lawyer_ref: cell(ColumnKey::Lawyer),
        classification_ref: cell(ColumnKey::Classification),
        filing_number: optional(ColumnKey::FilingNumber),
        notes: optional(ColumnKey::Notes),
    };

    draft.validate().map_err(|errors| {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort_unstable();
        CoreError::Validation(format!("invalid field(s): {}", fields.join(", ")))
    })?;

    Ok(draft)
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const EN_HEADER: &str = "Title,Client,Lawyer,Classification,Filing Number,Notes";

    fn sheet_bytes(rows: &[&str]) -> Vec<u8> {
        let mut out = String::from(EN_HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out.into_bytes()
    }

    // -- Locale tests --

    #[test]
    fn locale_from_tag_is_case_insensitive() {
        assert_eq!(Locale::from_tag("en"), Some(Locale::En));
        assert_eq!(Locale::from_tag("EN"), Some(Locale::En));
        assert_eq!(Locale::from_tag("pt-BR"), Some(Locale::PtBr));
        assert_eq!(Locale::from_tag("PT-br"), Some(Locale::PtBr));
        assert_eq!(Locale::from_tag("fr"), None);
    }

    // -- Header resolution tests --

    #[test]
    fn english_header_resolves_all_columns() {
        let summary = analyze(&sheet_bytes(&[])).expect("header should resolve");
        for key in ColumnKey::ALL {
            assert!(summary.columns.position(key).is_some(), "column {key:?}");
        }
        assert_eq!(summary.row_count, 0);
    }

    #[test]
    fn localized_header_resolves() {
        let bytes =
            "Título,Cliente,Advogado,Classificação,Número do Processo,Observações\n".as_bytes();
        let summary = analyze(bytes).expect("pt-BR header should resolve");
        assert_eq!(summary.columns.position(ColumnKey::Title), Some(0));
        assert_eq!(summary.columns.position(ColumnKey::FilingNumber), Some(4));
    }

    #[test]
    fn header_match_is_case_insensitive() {
        let bytes = b"TITLE,client,LAWYER,classification\n";
        let summary = analyze(bytes).expect("case-folded header should resolve");
        assert_eq!(summary.columns.position(ColumnKey::Client), Some(1));
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let bytes = b"Title,Client,Lawyer,Classification\nA,B,C,D\n";
        let summary = analyze(bytes).expect("optional columns may be missing");
        assert_eq!(summary.row_count, 1);
        assert!(summary.columns.position(ColumnKey::FilingNumber).is_none());
    }

    #[test]
    fn missing_required_column_is_a_format_error() {
        let bytes = b"Title,Client,Lawyer\nA,B,C\n";
        match analyze(bytes) {
            Err(FormatError::MissingColumn(name)) => assert_eq!(name, "Classification"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn unknown_column_is_a_format_error() {
        let bytes = b"Title,Client,Lawyer,Classification,Budget\n";
        match analyze(bytes) {
            Err(FormatError::UnknownColumn(label)) => assert_eq!(label, "Budget"),
            other => panic!("expected UnknownColumn, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_column_is_a_format_error() {
        let bytes = b"Title,Client,Client,Lawyer,Classification\n";
        match analyze(bytes) {
            Err(FormatError::DuplicateColumn(label)) => assert_eq!(label, "Client"),
            other => panic!("expected DuplicateColumn, got {other:?}"),
        }
    }

    #[test]
    fn empty_file_is_a_format_error() {
        assert!(matches!(analyze(b""), Err(FormatError::Empty)));
    }

    #[test]
    fn bom_is_stripped_before_header_matching() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(EN_HEADER.as_bytes());
        bytes.push(b'\n');
        let summary = analyze(&bytes).expect("BOM-prefixed header should resolve");
        assert_eq!(summary.columns.position(ColumnKey::Title), Some(0));
    }

    // -- Row counting tests --

    #[test]
    fn counts_data_rows_excluding_header() {
        let bytes = sheet_bytes(&["A,Acme,JS,CIV,,", "B,Acme,JS,CIV,,"]);
        assert_eq!(analyze(&bytes).unwrap().row_count, 2);
    }

    #[test]
    fn blank_trailing_rows_are_excluded() {
        let bytes = sheet_bytes(&["A,Acme,JS,CIV,,", ",,,,,", ",,,,,"]);
        assert_eq!(analyze(&bytes).unwrap().row_count, 1);
    }

    #[test]
    fn blank_row_mid_file_counts_as_data() {
        let bytes = sheet_bytes(&["A,Acme,JS,CIV,,", ",,,,,", "B,Acme,JS,CIV,,"]);
        assert_eq!(analyze(&bytes).unwrap().row_count, 3);
    }

    #[test]
    fn reanalysis_of_same_bytes_is_identical() {
        let bytes = sheet_bytes(&["A,Acme,JS,CIV,,", "B,Acme,JS,CIV,,", ",,,,,"]);
        let first = analyze(&bytes).unwrap().row_count;
        let second = analyze(&bytes).unwrap().row_count;
        assert_eq!(first, second);
    }

    // -- Row parsing tests --

    fn en_columns() -> ColumnMap {
        read_sheet(&sheet_bytes(&[])).unwrap().columns
    }

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_a_complete_row() {
        let draft = parse_row(
            &en_columns(),
            &cells(&["Dissolution", "Acme Ltd", "JS", "CIV", "0012345-67", "urgent"]),
        )
        .expect("row should parse");
        assert_eq!(draft.title, "Dissolution");
        assert_eq!(draft.client_ref, "Acme Ltd");
        assert_eq!(draft.filing_number.as_deref(), Some("0012345-67"));
        assert_eq!(draft.notes.as_deref(), Some("urgent"));
    }

    #[test]
    fn empty_optional_cells_become_none() {
        let draft = parse_row(
            &en_columns(),
            &cells(&["Dissolution", "Acme Ltd", "JS", "CIV", "", ""]),
        )
        .expect("row should parse");
        assert!(draft.filing_number.is_none());
        assert!(draft.notes.is_none());
    }

    #[test]
    fn short_row_reads_missing_cells_as_empty() {
        let result = parse_row(&en_columns(), &cells(&["Dissolution", "Acme Ltd"]));
        match result {
            Err(CoreError::Validation(message)) => {
                assert!(message.contains("classification_ref"), "{message}");
                assert!(message.contains("lawyer_ref"), "{message}");
            }
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_title_fails_validation() {
        let result = parse_row(&en_columns(), &cells(&["", "Acme Ltd", "JS", "CIV", "", ""]));
        match result {
            Err(CoreError::Validation(message)) => assert!(message.contains("title"), "{message}"),
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn overlong_title_fails_validation() {
        let long_title = "x".repeat(256);
        let result = parse_row(
            &en_columns(),
            &cells(&[&long_title, "Acme Ltd", "JS", "CIV", "", ""]),
        );
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }
}
