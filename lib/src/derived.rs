//! Derived per-report fields (parsed dates, age), computed on first use and cached by report
//! index. The reports themselves are never modified.

use crate::{
    clean::{age_in_days, parse_date, parse_onset_date, AgeGroup, OnsetDate},
    record::{col, Report, Reports},
};
use chrono::NaiveDate;
use once_cell::unsync::OnceCell;

/// A dataset plus lazily computed fields for each of its reports.
///
/// Indices are positions in the wrapped [`Reports`], and out of range indices panic as slice
/// indexing does.
pub struct DerivedFields<'a> {
    reports: &'a Reports,
    received: Vec<OnceCell<Option<NaiveDate>>>,
    onset: Vec<OnceCell<OnsetDate>>,
    age_days: Vec<OnceCell<Option<f64>>>,
}

impl<'a> DerivedFields<'a> {
    pub fn new(reports: &'a Reports) -> Self {
        let len = reports.len();
        DerivedFields {
            reports,
            received: (0..len).map(|_| OnceCell::new()).collect(),
            onset: (0..len).map(|_| OnceCell::new()).collect(),
            age_days: (0..len).map(|_| OnceCell::new()).collect(),
        }
    }

    pub fn reports(&self) -> &'a Reports {
        self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn report(&self, idx: usize) -> &'a Report {
        &self.reports[idx]
    }

    /// `(index, report)` pairs in dataset order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a Report)> + 'a {
        self.reports.iter().enumerate()
    }

    /// The parsed `Initial received date`.
    pub fn received_date(&self, idx: usize) -> Option<NaiveDate> {
        *self.received[idx].get_or_init(|| parse_date(self.report(idx).get(col::RECEIVED_DATE)))
    }

    /// The parsed onset date, falling back to the received date.
    pub fn onset_date(&self, idx: usize) -> OnsetDate {
        *self.onset[idx].get_or_init(|| {
            parse_onset_date(
                self.report(idx).get(col::ONSET_DATE),
                self.received_date(idx),
            )
        })
    }

    pub fn age_days(&self, idx: usize) -> Option<f64> {
        *self.age_days[idx].get_or_init(|| {
            let report = self.report(idx);
            age_in_days(
                parse_date(report.get(col::DATE_OF_BIRTH)),
                self.received_date(idx),
                report.get(col::AGE_AT_ONSET),
            )
        })
    }

    pub fn age_group(&self, idx: usize) -> AgeGroup {
        AgeGroup::from_days(self.age_days(idx))
    }
}

#[cfg(test)]
mod test {
    use super::DerivedFields;
    use crate::{
        clean::{AgeGroup, OnsetDate},
        record::{col, CellValue, Report, Reports},
    };
    use chrono::NaiveDate;

    #[test]
    fn fields_are_stable_and_input_untouched() {
        let reports = Reports::new(vec![
            Report::new()
                .with(col::RECEIVED_DATE, "20230115")
                .with(col::DATE_OF_BIRTH, "20230101"),
            Report::new().with(col::AGE_AT_ONSET, "70 Years"),
        ]);
        let before = reports.to_vec();
        let derived = DerivedFields::new(&reports);

        let received = NaiveDate::from_ymd_opt(2023, 1, 15);
        assert_eq!(derived.received_date(0), received);
        assert_eq!(derived.received_date(0), received);
        assert_eq!(
            derived.onset_date(0),
            OnsetDate::FromReceived(received.unwrap())
        );
        assert_eq!(derived.age_days(0), Some(14.));
        assert_eq!(derived.age_group(0), AgeGroup::Neonate);
        assert_eq!(derived.age_group(1), AgeGroup::Elderly);
        assert_eq!(derived.onset_date(1), OnsetDate::Missing);

        assert_eq!(reports.to_vec(), before);
        assert_eq!(reports[1].get(col::RECEIVED_DATE), &CellValue::Empty);
    }
}
