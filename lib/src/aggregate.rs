//! Field aggregators: one single-pass reducer per visualisation dimension.
//!
//! Each takes the dataset (with its derived fields) and returns a summary holding the frequency
//! table for the dimension plus whatever statistics its panel shows.

mod action;
mod dates;
mod demographics;
mod drugs;
mod location;
mod outcome;
mod reporter;
mod seriousness;

pub use self::{
    action::{aggregate_actions, ActionSummary},
    dates::{aggregate_dates, DateField, DateSummary, MONTH_NAMES},
    demographics::{
        aggregate_age, aggregate_female_status, aggregate_sex, AgeSummary, FemaleStatus,
        FemaleStatusSummary, SexSummary,
    },
    drugs::{aggregate_drugs, CountMode, DrugSource, DrugSummary},
    location::{aggregate_locations, LocationField, LocationSummary, OrganisationType},
    outcome::{aggregate_outcomes, OutcomeSummary},
    reporter::{
        aggregate_qualifications, aggregate_report_types, QualificationSummary,
        ReportTypeSummary,
    },
    seriousness::{
        aggregate_seriousness, aggregate_seriousness_outcomes, SeriousnessOutcomeSummary,
        SeriousnessSummary,
    },
};

use crate::freq::{format_percentage, percentage};
use serde::Serialize;

/// How many reports had a usable value for a dimension.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub total: usize,
    /// Reports whose value was missing or cleaned to the unknown label.
    pub missing: usize,
}

impl Coverage {
    pub fn new(total: usize, missing: usize) -> Self {
        debug_assert!(missing <= total);
        Coverage { total, missing }
    }

    pub fn known(&self) -> usize {
        self.total - self.missing
    }

    pub fn missing_percentage(&self) -> f64 {
        percentage(self.missing, self.total)
    }

    /// `100 - missing percentage`.
    pub fn completeness(&self) -> f64 {
        100. - self.missing_percentage()
    }

    pub fn completeness_str(&self) -> String {
        format!("{:.1}", self.completeness())
    }

    pub fn known_percentage_str(&self) -> String {
        format_percentage(self.known(), self.total)
    }
}
