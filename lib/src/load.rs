//! Reading a report dataset from a spreadsheet (first sheet, header row), CSV or JSON file.

use crate::{
    record::{CellValue, Report, Reports},
    ArcStr, Result,
};
use calamine::{DataType, Range, Reader};
use qu::ick_use::*;
use std::{fs, path::Path};

/// The message every load failure is reported with.
pub const READ_ERROR: &str = "Error reading file. Please ensure it's a valid Excel file.";

const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Load all reports from `path`, choosing the reader by file extension.
///
/// The first row gives the column names. Rows with no values are skipped.
pub fn load_reports(path: impl AsRef<Path>) -> Result<Reports> {
    fn inner(path: &Path) -> Result<Reports> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
            load_workbook(path)
        } else if ext == "csv" {
            load_csv(path)
        } else if ext == "json" {
            Reports::from_json_str(&fs::read_to_string(path)?)
        } else {
            bail!("unsupported file type `.{}`", ext)
        }
    }
    let path = path.as_ref();
    let reports = inner(path)
        .with_context(|| format!("while loading \"{}\"", path.display()))
        .context(READ_ERROR)?;
    event!(
        Level::INFO,
        "loaded {} reports from \"{}\"",
        reports.len(),
        path.display()
    );
    Ok(reports)
}

fn load_workbook(path: &Path) -> Result<Reports> {
    let mut workbook = calamine::open_workbook_auto(path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("workbook has no sheets")?;
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("missing `{}` worksheet", sheet))??;
    event!(Level::DEBUG, "reading worksheet `{}`", sheet);
    reports_from_range(&range)
}

/// Reports from a worksheet whose first row holds the column names.
pub fn reports_from_range(range: &Range<DataType>) -> Result<Reports> {
    let mut rows = range.rows();
    let headers: Vec<Option<ArcStr>> = match rows.next() {
        Some(row) => row.iter().map(header_name).collect(),
        None => return Ok(Reports::default()),
    };
    ensure!(
        headers.iter().any(Option::is_some),
        "the first row has no column names"
    );
    Ok(rows
        .filter_map(|row| {
            to_report(
                headers
                    .iter()
                    .zip(row.iter().map(cell_value).chain(std::iter::repeat(CellValue::Empty))),
            )
        })
        .collect())
}

fn header_name(cell: &DataType) -> Option<ArcStr> {
    let name = match cell_value(cell).as_text() {
        Some(name) => name.trim().to_string(),
        None => return None,
    };
    if name.is_empty() {
        None
    } else {
        Some(name.into())
    }
}

fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::String(s) => CellValue::from(s.as_str()),
        DataType::Float(v) | DataType::DateTime(v) => CellValue::Number(*v),
        DataType::Int(v) => CellValue::Number(*v as f64),
        DataType::Bool(b) => CellValue::from(b.to_string()),
        _ => CellValue::Empty,
    }
}

/// Build a report from `(column, value)` pairs, or `None` when every value is missing.
fn to_report<'a>(cells: impl Iterator<Item = (&'a Option<ArcStr>, CellValue)>) -> Option<Report> {
    let mut report = Report::new();
    let mut any = false;
    for (column, value) in cells {
        let column = match column {
            Some(column) => column,
            None => continue,
        };
        any |= !value.is_missing();
        report.insert(column, value);
    }
    any.then(|| report)
}

fn load_csv(path: &Path) -> Result<Reports> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers: Vec<Option<ArcStr>> = reader
        .headers()?
        .iter()
        .map(|h| if h.is_empty() { None } else { Some(h.into()) })
        .collect();
    let mut reports = vec![];
    for record in reader.records() {
        let record = record?;
        let values = record
            .iter()
            .map(|v| {
                if v.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::from(v)
                }
            })
            .chain(std::iter::repeat(CellValue::Empty));
        if let Some(report) = to_report(headers.iter().zip(values)) {
            reports.push(report);
        }
    }
    Ok(Reports::new(reports))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::record::col;

    fn temp_file(name: &str, contents: &[u8]) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("adr-analysis-load-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn reads_csv() {
        let path = temp_file(
            "reports.csv",
            b"Outcome,Sex,Initial received date\nRecovered, Female ,20230115\n,,\nDied,Male\n",
        );
        let reports = load_reports(&path).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].text(col::SEX).as_deref(), Some("Female"));
        assert!(reports[1].get(col::RECEIVED_DATE).is_missing());
    }

    #[test]
    fn reads_json() {
        let path = temp_file(
            "reports.json",
            br#"[{"Outcome": "Died", "Age at onset of reaction": 42}]"#,
        );
        let reports = load_reports(&path).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].get(col::AGE_AT_ONSET).as_number(), Some(42.));
    }

    #[test]
    fn invalid_workbook_reports_read_error() {
        let path = temp_file("garbage.xlsx", b"this is not a spreadsheet");
        let err = load_reports(&path).unwrap_err();
        assert_eq!(err.to_string(), READ_ERROR);
    }

    #[test]
    fn unsupported_extension() {
        let path = temp_file("reports.txt", b"Outcome\nDied\n");
        assert_eq!(load_reports(&path).unwrap_err().to_string(), READ_ERROR);
    }

    #[test]
    fn worksheet_rows() {
        let mut range = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), DataType::String("Outcome".into()));
        range.set_value((0, 1), DataType::String("Initial received date".into()));
        range.set_value((1, 0), DataType::String("Recovered".into()));
        range.set_value((1, 1), DataType::DateTime(45000.));
        let reports = reports_from_range(&range).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].get(col::RECEIVED_DATE).as_number(), Some(45000.));
    }
}
