//! Import template rendering.
//!
//! Produces the spreadsheet users download, fill in, and upload back. The
//! output is a function of the requested locale plus the tenant's current
//! classification codes and active lawyers; nothing here touches storage.

use crate::error::CoreError;
use crate::spreadsheet::{ColumnKey, Locale, UTF8_BOM};

/// Render a one-example-row import template as CSV bytes.
///
/// The header row uses the locale's column labels, so a template generated
/// in any supported locale re-analyzes cleanly. The example row borrows the
/// tenant's first active lawyer and first classification code when
/// available, falling back to placeholders for a freshly provisioned
/// tenant. Output is UTF-8 with a BOM so desktop spreadsheet applications
/// pick the right encoding.
pub fn render_template(
    locale: Locale,
    lawyer_names: &[String],
    classification_codes: &[String],
) -> Result<Vec<u8>, CoreError> {
    let lawyer = lawyer_names
        .first()
        .map(String::as_str)
        .unwrap_or_else(|| example_lawyer(locale));
    let classification = classification_codes
        .first()
        .map(String::as_str)
        .unwrap_or("CIV");

    let mut writer = csv::Writer::from_writer(Vec::new());
    let header: Vec<&str> = ColumnKey::ALL.iter().map(|key| key.label(locale)).collect();
    writer
        .write_record(&header)
        .map_err(|err| CoreError::Internal(err.to_string()))?;
    writer
        .write_record([
            example_title(locale),
            example_client(locale),
            lawyer,
            classification,
            "0001234-56",
            example_notes(locale),
        ])
        .map_err(|err| CoreError::Internal(err.to_string()))?;

    let body = writer
        .into_inner()
        .map_err(|err| CoreError::Internal(err.to_string()))?;

    let mut bytes = UTF8_BOM.to_vec();
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

fn example_title(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Example: Contract dispute",
        Locale::PtBr => "Exemplo: Disputa contratual",
    }
}

fn example_client(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Acme Industries Ltd",
        Locale::PtBr => "Indústrias Acme Ltda",
    }
}

fn example_lawyer(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Jane Smith",
        Locale::PtBr => "João Silva",
    }
}

fn example_notes(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Delete this row before importing",
        Locale::PtBr => "Remova esta linha antes de importar",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::{analyze, parse_row, read_sheet};

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn output_starts_with_a_bom() {
        let bytes = render_template(Locale::En, &[], &[]).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
    }

    #[test]
    fn template_reanalyzes_under_its_own_schema() {
        for locale in Locale::ALL {
            let bytes = render_template(locale, &[], &[]).unwrap();
            let summary = analyze(&bytes).expect("template must satisfy its own analyzer");
            assert_eq!(summary.row_count, 1, "locale {locale:?}");
        }
    }

    #[test]
    fn example_row_parses_into_a_draft() {
        let bytes = render_template(
            Locale::En,
            &names(&["Jane Smith"]),
            &names(&["CIV", "CRIM"]),
        )
        .unwrap();
        let sheet = read_sheet(&bytes).unwrap();
        let draft = parse_row(&sheet.columns, &sheet.rows[0]).expect("example row must parse");
        assert_eq!(draft.lawyer_ref, "Jane Smith");
        assert_eq!(draft.classification_ref, "CIV");
    }

    #[test]
    fn uses_tenant_data_when_available() {
        let bytes = render_template(Locale::En, &names(&["Ada B."]), &names(&["LAB"])).unwrap();
        let sheet = read_sheet(&bytes).unwrap();
        assert_eq!(sheet.rows[0][2], "Ada B.");
        assert_eq!(sheet.rows[0][3], "LAB");
    }

    #[test]
    fn localized_header_uses_locale_labels() {
        let bytes = render_template(Locale::PtBr, &[], &[]).unwrap();
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let header = text.lines().next().unwrap();
        assert!(header.starts_with("Título,Cliente,Advogado"), "{header}");
    }
}
