//! The raw record model: one ADR case report per row, keyed by spreadsheet column name.

use crate::{ArcStr, Result};
use anyhow::Context;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::{borrow::Cow, collections::BTreeMap, fmt, ops::Deref, sync::Arc};

/// Column names as they appear in the spreadsheet export.
pub mod col {
    pub const OUTCOME: &str = "Outcome";
    pub const SEX: &str = "Sex";
    pub const PREGNANT: &str = "Pregnant";
    pub const LACTATING: &str = "Lactating";
    pub const SERIOUSNESS_IME: &str = "Seriousness (IME)";
    pub const SERIOUSNESS: &str = "Seriousness";
    pub const ACTION_TAKEN: &str = "Action taken";
    pub const REPORTER_QUALIFICATION: &str = "Reporter qualification";
    pub const REPORT_TYPE: &str = "Report type";
    pub const REPORTER_DISTRICT: &str = "Reporter district";
    pub const REPORTER_STATE: &str = "Reporter state or province";
    pub const REPORTER_ORGANISATION: &str = "Organisation (reporter)";
    pub const DRUG_WHO: &str = "Drug name (WHODrug)";
    pub const DRUG_REPORTED: &str = "Drug name as reported by initial reporter";
    pub const RECEIVED_DATE: &str = "Initial received date";
    pub const ONSET_DATE: &str = "Onset date / Time";
    pub const DATE_OF_BIRTH: &str = "Date of birth";
    pub const AGE_AT_ONSET: &str = "Age at onset of reaction";
}

/// A single loosely typed spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(ArcStr),
    Number(f64),
    Empty,
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    /// The cell as text. Numbers are rendered without a trailing `.0` when integral.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            CellValue::Text(s) => Some(Cow::Borrowed(&**s)),
            CellValue::Number(n) if n.fract() == 0. && n.abs() < 1e15 => {
                Some(Cow::Owned(format!("{}", *n as i64)))
            }
            CellValue::Number(n) => Some(Cow::Owned(n.to_string())),
            CellValue::Empty => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// `true` for empty cells and cells holding only whitespace.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(n) => n.is_nan(),
            CellValue::Empty => true,
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.as_text() {
            Some(text) => f.write_str(&text),
            None => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.into())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s.into())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CellVisitor;

        impl<'de> de::Visitor<'de> for CellVisitor {
            type Value = CellValue;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string, number, boolean or null")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(CellValue::Text(v.into()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(CellValue::Text(v.into()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(CellValue::Number(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(CellValue::Number(v as f64))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(CellValue::Number(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(CellValue::Text(if v { "true" } else { "false" }.into()))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(CellValue::Empty)
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(CellValue::Empty)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
                Deserialize::deserialize(d)
            }
        }

        d.deserialize_any(CellVisitor)
    }
}

/// One ADR case report. Columns that are absent read as [`CellValue::Empty`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
    fields: BTreeMap<ArcStr, CellValue>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for constructing records in code.
    pub fn with(mut self, column: &str, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: &str, value: impl Into<CellValue>) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> &CellValue {
        self.fields.get(column).unwrap_or(&EMPTY_CELL)
    }

    pub fn text(&self, column: &str) -> Option<Cow<'_, str>> {
        self.get(column).as_text()
    }

    pub fn columns(&self) -> impl Iterator<Item = &ArcStr> + '_ {
        self.fields.keys()
    }
}

/// The dataset: reports in source-file order.
///
/// Cloning is cheap, the reports themselves are shared.
#[derive(Debug, Clone, Default)]
pub struct Reports {
    els: Arc<Vec<Report>>,
}

impl Reports {
    pub fn new(els: Vec<Report>) -> Self {
        Reports { els: els.into() }
    }

    /// Parse a JSON array of row objects.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let els: Vec<Report> =
            serde_json::from_str(input).context("expected a JSON array of row objects")?;
        Ok(Self::new(els))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Report> + '_ {
        self.els.iter()
    }

    pub fn filter(&self, f: impl Fn(&Report) -> bool) -> Self {
        self.iter().filter(|r| f(r)).cloned().collect()
    }

    /// The reports at the given indices, in the order given.
    pub fn select(&self, idxs: impl IntoIterator<Item = usize>) -> Self {
        idxs.into_iter()
            .filter_map(|idx| self.els.get(idx).cloned())
            .collect()
    }

    pub fn retain(&mut self, f: impl Fn(&Report) -> bool) {
        Arc::make_mut(&mut self.els).retain(f)
    }
}

impl Deref for Reports {
    type Target = [Report];
    fn deref(&self) -> &Self::Target {
        &*self.els
    }
}

impl FromIterator<Report> for Reports {
    fn from_iter<I: IntoIterator<Item = Report>>(iter: I) -> Self {
        Reports::new(iter.into_iter().collect())
    }
}
