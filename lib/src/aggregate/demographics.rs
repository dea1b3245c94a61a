use super::Coverage;
use crate::{
    clean::{AgeGroup, Sex, Taxonomy, YesNo, DAYS_PER_YEAR},
    derived::DerivedFields,
    freq::{format_percentage, FrequencyTable},
    record::col,
};
use qu::ick_use::*;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SexSummary {
    /// Every category in canonical order.
    pub table: FrequencyTable,
    pub coverage: Coverage,
}

impl SexSummary {
    /// Non-empty categories, largest first.
    pub fn ranked(&self) -> FrequencyTable {
        self.table.non_zero().sorted_desc()
    }
}

pub fn aggregate_sex(data: &DerivedFields<'_>) -> SexSummary {
    let mut table = FrequencyTable::for_taxonomy::<Sex>();
    for (_, report) in data.iter() {
        table.add(Sex::clean(report.get(col::SEX)).label());
    }
    let missing = table.count(Sex::Unknown.label());
    SexSummary {
        table,
        coverage: Coverage::new(data.len(), missing),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgeSummary {
    pub table: FrequencyTable,
    pub coverage: Coverage,
    /// Mean age in years over reports with an age.
    pub average_age_years: Option<f64>,
}

impl AgeSummary {
    pub fn average_age_str(&self) -> String {
        match self.average_age_years {
            Some(years) => format!("{:.1}", years),
            None => "N/A".into(),
        }
    }
}

pub fn aggregate_age(data: &DerivedFields<'_>) -> AgeSummary {
    let mut table = FrequencyTable::for_taxonomy::<AgeGroup>();
    let mut total_days = 0.;
    let mut with_age = 0;
    for (idx, _) in data.iter() {
        let days = data.age_days(idx);
        if let Some(days) = days.filter(|d| *d > 0.) {
            total_days += days;
            with_age += 1;
        }
        table.add(AgeGroup::from_days(days).label());
    }
    AgeSummary {
        table,
        coverage: Coverage::new(data.len(), data.len() - with_age),
        average_age_years: if with_age > 0 {
            Some(total_days / with_age as f64 / DAYS_PER_YEAR)
        } else {
            None
        },
    }
}

/// The female-only yes/no fields.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum FemaleStatus {
    Pregnancy,
    Lactation,
}

impl FemaleStatus {
    pub fn column(self) -> &'static str {
        match self {
            FemaleStatus::Pregnancy => col::PREGNANT,
            FemaleStatus::Lactation => col::LACTATING,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FemaleStatus::Pregnancy => "Pregnancy",
            FemaleStatus::Lactation => "Lactation",
        }
    }
}

/// Pregnancy or lactation status over female reports only.
#[derive(Debug, Clone, Serialize)]
pub struct FemaleStatusSummary {
    pub kind: FemaleStatus,
    /// Yes / No / Unknown, counted over female reports.
    pub table: FrequencyTable,
    pub total_records: usize,
    /// Coverage over female reports.
    pub coverage: Coverage,
}

impl FemaleStatusSummary {
    pub fn female_count(&self) -> usize {
        self.coverage.total
    }

    /// Share of all reports that are female.
    pub fn female_percentage(&self) -> String {
        format_percentage(self.female_count(), self.total_records)
    }

    /// Share of female reports with the given status.
    pub fn status_percentage(&self, status: YesNo) -> String {
        format_percentage(self.table.count(status.label()), self.female_count())
    }
}

pub fn aggregate_female_status(
    data: &DerivedFields<'_>,
    kind: FemaleStatus,
) -> FemaleStatusSummary {
    let mut table = FrequencyTable::for_taxonomy::<YesNo>();
    for (_, report) in data.iter() {
        let sex = report.text(col::SEX).unwrap_or_default();
        if Sex::classify(&sex) != Some(Sex::Female) {
            continue;
        }
        let status = YesNo::clean_status(report.get(kind.column()), kind.label());
        table.add(status.label());
    }
    let female_count = table.total();
    if female_count == 0 {
        event!(
            Level::INFO,
            "no female reports, skipping {} analysis",
            kind.label().to_lowercase()
        );
    }
    let missing = table.count(YesNo::Unknown.label());
    FemaleStatusSummary {
        kind,
        table,
        total_records: data.len(),
        coverage: Coverage::new(female_count, missing),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::record::{Report, Reports};

    fn reports(rows: &[(&str, &str, &str)]) -> Reports {
        rows.iter()
            .map(|(sex, pregnant, age)| {
                Report::new()
                    .with(col::SEX, *sex)
                    .with(col::PREGNANT, *pregnant)
                    .with(col::AGE_AT_ONSET, *age)
            })
            .collect()
    }

    #[test]
    fn sex_counts() {
        let reports = reports(&[("Female", "", ""), ("m", "", ""), ("", "", ""), ("x", "", "")]);
        let summary = aggregate_sex(&DerivedFields::new(&reports));
        assert_eq!(summary.table.total(), 4);
        assert_eq!(summary.table.count("Other"), 1);
        assert_eq!(summary.coverage.missing, 1);
        assert_eq!(summary.ranked().len(), 4);
    }

    #[test]
    fn pregnancy_counts_females_only() {
        let reports = reports(&[
            ("Female", "Yes", ""),
            ("female", "No", ""),
            ("F", "", ""),
            ("Male", "Yes", ""),
        ]);
        let data = DerivedFields::new(&reports);
        let summary = aggregate_female_status(&data, FemaleStatus::Pregnancy);
        assert_eq!(summary.table.total(), 3);
        assert_eq!(summary.female_count(), 3);
        assert_eq!(summary.table.count("Yes"), 1);
        assert_eq!(summary.status_percentage(YesNo::Yes), "33.3");
        assert_eq!(summary.female_percentage(), "75.0");
    }

    #[test]
    fn no_females() {
        let reports = reports(&[("Male", "Yes", "")]);
        let data = DerivedFields::new(&reports);
        let summary = aggregate_female_status(&data, FemaleStatus::Lactation);
        assert_eq!(summary.female_count(), 0);
        assert_eq!(summary.status_percentage(YesNo::Yes), "0.0");
    }

    #[test]
    fn age_groups() {
        let reports = reports(&[("", "", "30 Years"), ("", "", "10 days"), ("", "", "")]);
        let summary = aggregate_age(&DerivedFields::new(&reports));
        assert_eq!(summary.table.total(), 3);
        assert_eq!(summary.table.count("Adult (18-60 years)"), 1);
        assert_eq!(summary.table.count("Neonate (≤ 28 days)"), 1);
        assert_eq!(summary.table.count("Unknown"), 1);
        assert_eq!(summary.coverage.missing, 1);
        assert!(summary.average_age_years.is_some());
    }
}
