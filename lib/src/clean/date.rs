//! Date parsing for the encodings found in ADR exports.
//!
//! Encodings are tried in a fixed order and the first success wins:
//!
//!  1. compact `YYYYMMDD`, as text or as an integer, with the year limited to 1900..=2030
//!  2. Excel serial dates (days since 1899-12-30)
//!  3. `DD-MMM-YY`, two digit years are taken to be in the 2000s
//!  4. `YYYY-MM-DD` or `YYYY/MM/DD`
//!  5. `DD/MM/YYYY` or `DD-MM-YYYY`
//!  6. a list of long-hand formats (`15 March 2023`, `Mar 15, 2023`, RFC 3339, ...)
//!
//! Nothing here fails loudly: unparseable input is `None`.

use super::text::CR_MARKER;
use crate::record::CellValue;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub const MIN_COMPACT_YEAR: i32 = 1900;
pub const MAX_COMPACT_YEAR: i32 = 2030;
/// 9999-12-31, the last date Excel can represent.
const MAX_EXCEL_SERIAL: f64 = 2_958_465.;

const MONTH_ABBRS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

static DAY_MONTH_ABBR_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,2})-([A-Za-z]{3})-([0-9]{2})$").unwrap());
static YEAR_MONTH_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})[-/]([0-9]{1,2})[-/]([0-9]{1,2})(?:[T\s].*)?$").unwrap());
static DAY_MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,2})[/-]([0-9]{1,2})[/-]([0-9]{4})(?:\s.*)?$").unwrap());
static EMBEDDED_COMPACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{8}(?:\s+[0-9]{2}:[0-9]{2}:[0-9]{2})?").unwrap());

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%d %B %Y", "%d %b %Y", "%B %d, %Y", "%b %d, %Y", "%B %d %Y", "%b %d %Y", "%d-%b-%Y",
    "%d.%m.%Y", "%Y.%m.%d",
];

/// Parse a cell holding a date in any of the supported encodings.
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Number(n) => parse_number(*n),
        CellValue::Text(s) => parse_date_str(s),
        CellValue::Empty => None,
    }
}

pub fn parse_date_str(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(date) = leading_compact(s).and_then(parse_compact) {
        return Some(date);
    }
    if let Ok(n) = s.parse::<f64>() {
        return parse_number(n);
    }
    if let Some(date) = parse_day_month_abbr(s) {
        return Some(date);
    }
    if let Some(caps) = YEAR_MONTH_DAY.captures(s) {
        if let Some(date) = ymd_from_captures(&caps[1], &caps[2], &caps[3]) {
            return Some(date);
        }
    }
    if let Some(caps) = DAY_MONTH_YEAR.captures(s) {
        if let Some(date) = ymd_from_captures(&caps[3], &caps[2], &caps[1]) {
            return Some(date);
        }
    }
    parse_long_hand(s)
}

/// Parse `YYYYMMDD`, checking the components are in range and name a real calendar day.
pub fn parse_compact(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[4..6].parse().ok()?;
    let day: u32 = s[6..8].parse().ok()?;
    if !(MIN_COMPACT_YEAR..=MAX_COMPACT_YEAR).contains(&year)
        || !(1..=12).contains(&month)
        || !(1..=31).contains(&day)
    {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Convert an Excel serial date. Any fractional (time of day) part is dropped.
pub fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1. || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

fn parse_number(n: f64) -> Option<NaiveDate> {
    if n.fract() == 0. && (10_000_000. ..=99_999_999.).contains(&n) {
        return parse_compact(&format!("{}", n as i64));
    }
    from_excel_serial(n)
}

/// The first 8 characters, if they are digits standing on their own (optionally followed by a
/// time).
fn leading_compact(s: &str) -> Option<&str> {
    let head = s.get(..8)?;
    if !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match s[8..].chars().next() {
        None => Some(head),
        Some(c) if c.is_whitespace() || c == 'T' => Some(head),
        Some(_) => None,
    }
}

fn parse_day_month_abbr(s: &str) -> Option<NaiveDate> {
    let caps = DAY_MONTH_ABBR_YEAR.captures(s)?;
    let day: u32 = caps[1].parse().ok()?;
    let month_name = caps[2].to_ascii_lowercase();
    let month = MONTH_ABBRS.iter().position(|m| *m == month_name)? as u32 + 1;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(2000 + year, month, day)
}

fn ymd_from_captures(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn parse_long_hand(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local().date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_local().date());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok().map(|dt| dt.date()))
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        })
}

/// The onset date of a reaction, or the received date standing in for it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum OnsetDate {
    Reported(NaiveDate),
    /// No usable onset date, the initial received date is used instead.
    FromReceived(NaiveDate),
    Missing,
}

impl OnsetDate {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            OnsetDate::Reported(d) | OnsetDate::FromReceived(d) => Some(*d),
            OnsetDate::Missing => None,
        }
    }

    pub fn is_substituted(&self) -> bool {
        matches!(self, OnsetDate::FromReceived(_))
    }
}

/// Parse an onset cell. Free text is searched for an embedded `YYYYMMDD` (first match) before
/// the general parser is tried. Falls back to `received`.
pub fn parse_onset_date(value: &CellValue, received: Option<NaiveDate>) -> OnsetDate {
    let reported = match value {
        CellValue::Text(s) => parse_onset_str(s),
        other => parse_date(other),
    };
    match (reported, received) {
        (Some(date), _) => OnsetDate::Reported(date),
        (None, Some(date)) => OnsetDate::FromReceived(date),
        (None, None) => OnsetDate::Missing,
    }
}

fn parse_onset_str(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw.replace(CR_MARKER, " ");
    let cleaned = cleaned.trim();
    if let Some(m) = EMBEDDED_COMPACT.find(cleaned) {
        if let Some(date) = m.as_str().get(..8).and_then(parse_compact) {
            return Some(date);
        }
    }
    parse_date_str(cleaned)
}

#[cfg(test)]
mod test {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn compact_and_serial() {
        let compact = parse_date(&CellValue::from("20230115"));
        let serial = parse_date(&CellValue::Number(45000.));
        assert_eq!(compact, Some(ymd(2023, 1, 15)));
        assert_eq!(serial, Some(ymd(2023, 3, 15)));
        assert_ne!(compact, serial);
        assert_eq!(
            parse_date(&CellValue::Number(20230115.)),
            Some(ymd(2023, 1, 15))
        );
        assert_eq!(parse_date_str("45000"), Some(ymd(2023, 3, 15)));
        assert_eq!(parse_date_str("20230115 08:30:00"), Some(ymd(2023, 1, 15)));
    }

    #[test]
    fn invalid_dates_are_none() {
        assert_eq!(parse_date_str("2023-13-40"), None);
        assert_eq!(parse_date_str("18991231"), None);
        assert_eq!(parse_date_str("20311231"), None);
        assert_eq!(parse_date_str("20230230"), None);
        assert_eq!(parse_date_str("not a date"), None);
        assert_eq!(parse_date_str(""), None);
        assert_eq!(parse_date(&CellValue::Empty), None);
        assert_eq!(parse_date(&CellValue::Number(-3.)), None);
        assert_eq!(parse_date(&CellValue::Number(f64::NAN)), None);
    }

    #[test]
    fn textual_layouts() {
        assert_eq!(parse_date_str("15-Mar-23"), Some(ymd(2023, 3, 15)));
        assert_eq!(parse_date_str("15-mar-23"), Some(ymd(2023, 3, 15)));
        assert_eq!(parse_date_str("2023-03-15"), Some(ymd(2023, 3, 15)));
        assert_eq!(parse_date_str("2023/3/5"), Some(ymd(2023, 3, 5)));
        assert_eq!(parse_date_str("2023-03-15T10:00:00"), Some(ymd(2023, 3, 15)));
        assert_eq!(parse_date_str("15/03/2023"), Some(ymd(2023, 3, 15)));
        assert_eq!(parse_date_str("15-03-2023"), Some(ymd(2023, 3, 15)));
        assert_eq!(parse_date_str("15 March 2023"), Some(ymd(2023, 3, 15)));
        assert_eq!(parse_date_str("Mar 15, 2023"), Some(ymd(2023, 3, 15)));
    }

    #[test]
    fn onset_dates() {
        let received = Some(ymd(2023, 2, 1));
        assert_eq!(
            parse_onset_date(&CellValue::from("_x000D_20230110 10:00:00"), received),
            OnsetDate::Reported(ymd(2023, 1, 10))
        );
        assert_eq!(
            parse_onset_date(&CellValue::from("started on 20230105, again 20230107"), None),
            OnsetDate::Reported(ymd(2023, 1, 5))
        );
        let fallback = parse_onset_date(&CellValue::from("sometime"), received);
        assert_eq!(fallback, OnsetDate::FromReceived(ymd(2023, 2, 1)));
        assert!(fallback.is_substituted());
        assert_eq!(
            parse_onset_date(&CellValue::Empty, None),
            OnsetDate::Missing
        );
        assert_eq!(OnsetDate::Missing.date(), None);
    }

    #[test]
    fn non_ascii_digits_are_not_dates() {
        for raw in ["1234567१", "१२३४५६७८", "2023-01-1५"] {
            assert_eq!(parse_date_str(raw), None, "{:?}", raw);
            let onset = parse_onset_date(&CellValue::from(raw), None);
            assert_eq!(onset, OnsetDate::Missing, "{:?}", raw);
            assert_eq!(onset.date(), None);
        }
        assert_eq!(
            parse_onset_date(&CellValue::from("on 20230105१"), None),
            OnsetDate::Reported(ymd(2023, 1, 5))
        );
    }
}
