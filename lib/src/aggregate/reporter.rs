use super::Coverage;
use crate::{
    clean::{split_multi, Qualification, ReportType, Taxonomy},
    derived::DerivedFields,
    freq::{format_percentage, FrequencyTable},
    record::col,
    ArcStr,
};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize)]
pub struct QualificationSummary {
    /// Distinct qualifications per report, summed. Reports with no qualification count once under
    /// `Unknown`.
    pub table: FrequencyTable,
    /// `missing` counts reports with nothing in the qualification column.
    pub coverage: Coverage,
}

impl QualificationSummary {
    /// Mentions of physicians, pharmacists and other health professionals.
    pub fn healthcare(&self) -> usize {
        self.sum_where(|q| q.is_healthcare())
    }

    /// Mentions of lawyers, patients and other non-health professionals.
    pub fn non_healthcare(&self) -> usize {
        self.sum_where(|q| !q.is_healthcare() && q != Qualification::Unknown)
    }

    fn sum_where(&self, f: impl Fn(Qualification) -> bool) -> usize {
        Qualification::ALL
            .iter()
            .filter(|q| f(**q))
            .map(|q| self.table.count(q.label()))
            .sum()
    }
}

pub fn aggregate_qualifications(data: &DerivedFields<'_>) -> QualificationSummary {
    let mut table = FrequencyTable::for_taxonomy::<Qualification>();
    let mut missing = 0;
    for (_, report) in data.iter() {
        let segments = split_multi(report.get(col::REPORTER_QUALIFICATION));
        if segments.is_empty() {
            missing += 1;
            table.add(Qualification::Unknown.label());
            continue;
        }
        let found: BTreeSet<_> = segments
            .iter()
            .map(|s| Qualification::clean_segment(s))
            .collect();
        for qualification in found {
            table.add(qualification.label());
        }
    }
    QualificationSummary {
        table,
        coverage: Coverage::new(data.len(), missing),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportTypeSummary {
    pub table: FrequencyTable,
    pub coverage: Coverage,
}

impl ReportTypeSummary {
    pub fn most_common(&self) -> Option<(&ArcStr, usize)> {
        self.table.most_common()
    }

    pub fn most_common_percentage(&self) -> String {
        match self.most_common() {
            Some((_, count)) => format_percentage(count, self.coverage.total),
            None => "0.0".into(),
        }
    }

    /// Categories with at least one report.
    pub fn categories(&self) -> usize {
        self.table.non_zero().len()
    }
}

pub fn aggregate_report_types(data: &DerivedFields<'_>) -> ReportTypeSummary {
    let mut table = FrequencyTable::for_taxonomy::<ReportType>();
    for (_, report) in data.iter() {
        table.add(ReportType::clean(report.get(col::REPORT_TYPE)).label());
    }
    let missing = table.count(ReportType::NotAvailable.label());
    ReportTypeSummary {
        table,
        coverage: Coverage::new(data.len(), missing),
    }
}
