use super::Coverage;
use crate::{
    clean::OnsetDate,
    derived::DerivedFields,
    freq::{format_percentage, FrequencyTable},
};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum DateField {
    /// `Initial received date`.
    Received,
    /// `Onset date / Time`, with the received date standing in when absent.
    Onset,
}

impl DateField {
    pub fn label(self) -> &'static str {
        match self {
            DateField::Received => "Received Date",
            DateField::Onset => "Onset Date",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DateSummary {
    pub field: DateField,
    /// Reports per calendar month, pooled over years, January first.
    pub monthly: FrequencyTable,
    /// Reports per year, ascending.
    pub yearly: BTreeMap<i32, usize>,
    /// Reports per month, chronologically, labelled like `Jan 2023`. Only months with reports.
    pub timeline: FrequencyTable,
    /// `missing` counts reports with no usable date.
    pub coverage: Coverage,
    pub range: Option<(NaiveDate, NaiveDate)>,
    /// Dates taken from the field itself (as opposed to the received-date substitute).
    pub direct: usize,
    /// Onset dates substituted by the received date.
    pub substituted: usize,
}

impl DateSummary {
    pub fn valid(&self) -> usize {
        self.coverage.known()
    }

    /// Share of reports with a date of their own.
    pub fn direct_completeness(&self) -> String {
        format_percentage(self.direct, self.coverage.total)
    }

    pub fn range_str(&self) -> Option<String> {
        self.range
            .map(|(min, max)| format!("{} - {}", min.format("%Y-%m-%d"), max.format("%Y-%m-%d")))
    }

    pub fn yearly_table(&self) -> FrequencyTable {
        let mut table = FrequencyTable::new();
        for (year, count) in &self.yearly {
            table.add_n(&year.to_string(), *count);
        }
        table
    }
}

pub fn aggregate_dates(data: &DerivedFields<'_>, field: DateField) -> DateSummary {
    let mut monthly = FrequencyTable::with_labels(MONTH_NAMES);
    let mut yearly = BTreeMap::new();
    let mut by_month = BTreeMap::new();
    let mut range: Option<(NaiveDate, NaiveDate)> = None;
    let (mut missing, mut direct, mut substituted) = (0, 0, 0);

    for (idx, _) in data.iter() {
        let date = match field {
            DateField::Received => data.received_date(idx),
            DateField::Onset => {
                let onset = data.onset_date(idx);
                match onset {
                    OnsetDate::Reported(_) => direct += 1,
                    OnsetDate::FromReceived(_) => substituted += 1,
                    OnsetDate::Missing => (),
                }
                onset.date()
            }
        };
        let date = match date {
            Some(date) => date,
            None => {
                missing += 1;
                continue;
            }
        };
        if field == DateField::Received {
            direct += 1;
        }
        monthly.add(MONTH_NAMES[date.month0() as usize]);
        *yearly.entry(date.year()).or_insert(0) += 1;
        *by_month.entry((date.year(), date.month())).or_insert(0) += 1;
        range = Some(match range {
            Some((min, max)) => (min.min(date), max.max(date)),
            None => (date, date),
        });
    }

    let mut timeline = FrequencyTable::new();
    for ((year, month), count) in by_month {
        let label = match NaiveDate::from_ymd_opt(year, month, 1) {
            Some(first) => first.format("%b %Y").to_string(),
            None => format!("{}-{:02}", year, month),
        };
        timeline.add_n(&label, count);
    }

    DateSummary {
        field,
        monthly,
        yearly,
        timeline,
        coverage: Coverage::new(data.len(), missing),
        range,
        direct,
        substituted,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::record::{col, CellValue, Report, Reports};

    fn reports() -> Reports {
        Reports::new(vec![
            Report::new()
                .with(col::RECEIVED_DATE, "20230115")
                .with(col::ONSET_DATE, "20230110"),
            Report::new().with(col::RECEIVED_DATE, CellValue::Number(45000.)),
            Report::new()
                .with(col::RECEIVED_DATE, "2022-12-01")
                .with(col::ONSET_DATE, "soon"),
            Report::new().with(col::RECEIVED_DATE, "2023-13-40"),
        ])
    }

    #[test]
    fn received_dates() {
        let reports = reports();
        let summary = aggregate_dates(&DerivedFields::new(&reports), DateField::Received);
        assert_eq!(summary.valid(), 3);
        assert_eq!(summary.coverage.missing, 1);
        assert_eq!(summary.monthly.count("January"), 1);
        assert_eq!(summary.monthly.count("March"), 1);
        assert_eq!(summary.monthly.count("December"), 1);
        assert_eq!(summary.monthly.len(), 12);
        assert_eq!(summary.yearly.get(&2022), Some(&1));
        assert_eq!(summary.yearly.get(&2023), Some(&2));
        let timeline: Vec<_> = summary.timeline.labels().map(|l| l.to_string()).collect();
        assert_eq!(timeline, vec!["Dec 2022", "Jan 2023", "Mar 2023"]);
        assert_eq!(
            summary.range_str().as_deref(),
            Some("2022-12-01 - 2023-03-15")
        );
    }

    #[test]
    fn onset_dates_fall_back() {
        let reports = reports();
        let summary = aggregate_dates(&DerivedFields::new(&reports), DateField::Onset);
        assert_eq!(summary.direct, 1);
        assert_eq!(summary.substituted, 2);
        assert_eq!(summary.valid(), 3);
        assert_eq!(summary.direct_completeness(), "25.0");
        assert_eq!(summary.coverage.completeness_str(), "75.0");
    }

    #[test]
    fn onset_with_non_ascii_digits() {
        let reports = Reports::new(vec![
            Report::new().with(col::ONSET_DATE, "1234567१"),
            Report::new()
                .with(col::RECEIVED_DATE, "20230115")
                .with(col::ONSET_DATE, "१२३४५६७८"),
        ]);
        let summary = aggregate_dates(&DerivedFields::new(&reports), DateField::Onset);
        assert_eq!(summary.coverage.missing, 1);
        assert_eq!(summary.direct, 0);
        assert_eq!(summary.substituted, 1);
        assert_eq!(summary.valid(), 1);
    }
}
