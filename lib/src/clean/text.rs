//! Repairs for free text cells: the corrupted carriage-return marker, multi-valued cells and
//! name fields.

use crate::{record::CellValue, ArcStr};
use itertools::Itertools;

/// The token some exports leave behind in place of a carriage return.
pub const CR_MARKER: &str = "_x000D_";

/// Replace markers and line breaks with spaces, collapse runs of whitespace and trim.
pub fn flatten(raw: &str) -> String {
    raw.replace(CR_MARKER, " ").split_whitespace().join(" ")
}

/// Split a multi-valued cell into its trimmed, non-empty segments.
///
/// Markers and `\r` count as line breaks.
pub fn split_multi(value: &CellValue) -> Vec<ArcStr> {
    match value.as_text() {
        Some(text) => split_multi_str(&text),
        None => vec![],
    }
}

pub fn split_multi_str(raw: &str) -> Vec<ArcStr> {
    raw.replace(CR_MARKER, "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ArcStr::from)
        .collect()
}

/// Like [`split_multi`], with repeated segments removed (first occurrence kept).
pub fn split_multi_unique(value: &CellValue) -> Vec<ArcStr> {
    split_multi(value).into_iter().unique().collect()
}

/// Clean a district or state name. Returns `None` for missing values.
pub fn clean_location(value: &CellValue) -> Option<ArcStr> {
    let text = value.as_text()?;
    let cleaned = text.replace(CR_MARKER, "").replace('\r', "");
    let cleaned = cleaned.split_whitespace().join(" ");
    if cleaned.is_empty() || is_null_token(&cleaned) {
        None
    } else {
        Some(cleaned.into())
    }
}

/// Clean a reporter organisation name. Returns `None` for missing values.
pub fn clean_organisation(value: &CellValue) -> Option<ArcStr> {
    let text = value.as_text()?;
    let cleaned = text.replace(CR_MARKER, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || is_null_token(cleaned) {
        None
    } else {
        Some(cleaned.into())
    }
}

/// Trimmed text, with the usual spreadsheet placeholders for "nothing here" mapped to `None`.
pub fn clean_free_text(value: &CellValue) -> Option<ArcStr> {
    let text = value.as_text()?;
    let cleaned = text.trim();
    if cleaned.is_empty() || is_null_token(cleaned) || cleaned.eq_ignore_ascii_case("n/a") {
        None
    } else {
        Some(cleaned.into())
    }
}

/// Placeholder text some exports write in place of an empty cell.
pub fn is_null_token(s: &str) -> bool {
    s.eq_ignore_ascii_case("null") || s.eq_ignore_ascii_case("undefined")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn split_on_marker() {
        let parts = split_multi(&CellValue::from("DrugA_x000D_DrugB"));
        assert_eq!(parts, vec![ArcStr::from("DrugA"), ArcStr::from("DrugB")]);
        assert!(split_multi(&CellValue::from("")).is_empty());
        assert!(split_multi(&CellValue::Empty).is_empty());
    }

    #[test]
    fn split_on_mixed_breaks() {
        let parts = split_multi_str(" Paracetamol \r\n\r\nIbuprofen_x000D_\n  ");
        assert_eq!(
            parts,
            vec![ArcStr::from("Paracetamol"), ArcStr::from("Ibuprofen")]
        );
    }

    #[test]
    fn unique_segments() {
        let parts = split_multi_unique(&CellValue::from("A\nB\nA"));
        assert_eq!(parts, vec![ArcStr::from("A"), ArcStr::from("B")]);
    }

    #[test]
    fn locations() {
        assert_eq!(
            clean_location(&CellValue::from("  Nairobi_x000D_\n  West ")).as_deref(),
            Some("Nairobi West")
        );
        assert_eq!(clean_location(&CellValue::from("NULL")), None);
        assert_eq!(clean_location(&CellValue::from("undefined")), None);
        assert_eq!(clean_location(&CellValue::Empty), None);
        assert_eq!(
            clean_organisation(&CellValue::from(" City Hospital_x000D_")).as_deref(),
            Some("City Hospital")
        );
    }

    #[test]
    fn flatten_text() {
        assert_eq!(flatten("Yes_x000D_\r\nYes "), "Yes Yes");
        assert_eq!(clean_free_text(&CellValue::from("N/A")), None);
    }
}
