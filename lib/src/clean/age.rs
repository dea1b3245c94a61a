//! Age at reaction onset, and the age-group taxonomy.

use super::category::Taxonomy;
use crate::record::CellValue;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

pub const DAYS_PER_YEAR: f64 = 365.25;
pub const DAYS_PER_MONTH: f64 = 30.44;

static AGE_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([0-9]+\.?[0-9]*)\s*(year|month|week|day|hour)").unwrap());

/// Age in days.
///
/// Prefers the gap between birth and received dates. When that is unavailable (or not
/// positive) the free text age is used, e.g. `34 Years` or `6 months`. A bare number is taken to
/// be in years.
pub fn age_in_days(
    birth: Option<NaiveDate>,
    received: Option<NaiveDate>,
    age_at_onset: &CellValue,
) -> Option<f64> {
    if let (Some(birth), Some(received)) = (birth, received) {
        let days = (received - birth).num_days();
        if days > 0 {
            return Some(days as f64);
        }
    }
    match age_at_onset {
        CellValue::Number(years) if *years > 0. && years.is_finite() => {
            Some(years * DAYS_PER_YEAR)
        }
        CellValue::Text(text) => parse_age_text(text),
        _ => None,
    }
}

/// Parse `<number> <Year|Month|Week|Day|Hour>` into days. Zero ages count as unknown.
pub fn parse_age_text(raw: &str) -> Option<f64> {
    let caps = AGE_TEXT.captures(raw)?;
    let value: f64 = caps[1].parse().ok()?;
    let days = match caps[2].to_ascii_lowercase().as_str() {
        "year" => value * DAYS_PER_YEAR,
        "month" => value * DAYS_PER_MONTH,
        "week" => value * 7.,
        "day" => value,
        "hour" => value / 24.,
        _ => return None,
    };
    if days > 0. {
        Some(days)
    } else {
        None
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AgeGroup {
    Neonate,
    Infant,
    Child,
    Adolescent,
    Adult,
    Elderly,
    Unknown,
}

impl Taxonomy for AgeGroup {
    const ALL: &'static [Self] = &[
        AgeGroup::Neonate,
        AgeGroup::Infant,
        AgeGroup::Child,
        AgeGroup::Adolescent,
        AgeGroup::Adult,
        AgeGroup::Elderly,
        AgeGroup::Unknown,
    ];

    fn label(self) -> &'static str {
        match self {
            AgeGroup::Neonate => "Neonate (≤ 28 days)",
            AgeGroup::Infant => "Infant (29 days - 1 year)",
            AgeGroup::Child => "Child (1-12 years)",
            AgeGroup::Adolescent => "Adolescent (13-17 years)",
            AgeGroup::Adult => "Adult (18-60 years)",
            AgeGroup::Elderly => "Elderly (> 60 years)",
            AgeGroup::Unknown => "Unknown",
        }
    }
}

impl AgeGroup {
    pub fn from_days(days: Option<f64>) -> Self {
        let days = match days {
            Some(days) if days > 0. => days,
            _ => return AgeGroup::Unknown,
        };
        if days <= 28. {
            return AgeGroup::Neonate;
        }
        if days <= 365. {
            return AgeGroup::Infant;
        }
        let years = days / DAYS_PER_YEAR;
        if years <= 12. {
            AgeGroup::Child
        } else if years <= 17. {
            AgeGroup::Adolescent
        } else if years <= 60. {
            AgeGroup::Adult
        } else {
            AgeGroup::Elderly
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn birth_date_preferred() {
        let days = age_in_days(
            ymd(2023, 1, 1),
            ymd(2023, 1, 11),
            &CellValue::from("40 Years"),
        );
        assert_eq!(days, Some(10.));
    }

    #[test]
    fn free_text_fallback() {
        assert_eq!(parse_age_text("2 Weeks"), Some(14.));
        assert_eq!(parse_age_text("48 hours"), Some(2.));
        assert_eq!(parse_age_text("1 Month"), Some(30.44));
        assert_eq!(parse_age_text("0 Year"), None);
        assert_eq!(parse_age_text("adult"), None);
        // birth after received: ignore the dates
        assert_eq!(
            age_in_days(ymd(2023, 2, 1), ymd(2023, 1, 1), &CellValue::from("3 days")),
            Some(3.)
        );
        assert_eq!(
            age_in_days(None, None, &CellValue::Number(2.)),
            Some(2. * DAYS_PER_YEAR)
        );
    }

    #[test]
    fn groups() {
        assert_eq!(AgeGroup::from_days(Some(28.)), AgeGroup::Neonate);
        assert_eq!(AgeGroup::from_days(Some(29.)), AgeGroup::Infant);
        assert_eq!(AgeGroup::from_days(Some(365.)), AgeGroup::Infant);
        assert_eq!(AgeGroup::from_days(Some(5. * DAYS_PER_YEAR)), AgeGroup::Child);
        assert_eq!(
            AgeGroup::from_days(Some(15. * DAYS_PER_YEAR)),
            AgeGroup::Adolescent
        );
        assert_eq!(AgeGroup::from_days(Some(60. * DAYS_PER_YEAR)), AgeGroup::Adult);
        assert_eq!(
            AgeGroup::from_days(Some(61. * DAYS_PER_YEAR)),
            AgeGroup::Elderly
        );
        assert_eq!(AgeGroup::from_days(None), AgeGroup::Unknown);
        assert_eq!(AgeGroup::from_days(Some(0.)), AgeGroup::Unknown);
    }
}
