//! The filter engine: select the reports matching a set of criteria, and count the options
//! available for each filter.

use crate::{
    clean::{clean_location, split_multi, Outcome, Taxonomy},
    derived::DerivedFields,
    freq::FrequencyTable,
    record::{col, Reports},
    util::{optional_date, optional_string},
    ArcStr,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The default cap on the number of drug options.
pub const MAX_DRUG_OPTIONS: usize = 50;

/// User-selected constraints. Absent fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Earliest `Initial received date`, inclusive.
    #[serde(deserialize_with = "optional_date")]
    pub date_from: Option<NaiveDate>,
    /// Latest `Initial received date`, inclusive.
    #[serde(deserialize_with = "optional_date")]
    pub date_to: Option<NaiveDate>,
    /// Case-insensitive substring of the reporter district or state.
    #[serde(deserialize_with = "optional_string")]
    pub location: Option<String>,
    /// Case-insensitive substring of any WHODrug or reporter-named drug.
    #[serde(deserialize_with = "optional_string")]
    pub drug: Option<String>,
    /// A cleaned outcome label.
    #[serde(deserialize_with = "optional_string")]
    pub outcome: Option<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date_from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn date_to(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = non_blank(location.into());
        self
    }

    pub fn drug(mut self, drug: impl Into<String>) -> Self {
        self.drug = non_blank(drug.into());
        self
    }

    pub fn outcome(mut self, outcome: impl Into<String>) -> Self {
        self.outcome = non_blank(outcome.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Whether the report at `idx` satisfies every present criterion.
    pub fn matches(&self, data: &DerivedFields<'_>, idx: usize) -> bool {
        let report = data.report(idx);

        if self.date_from.is_some() || self.date_to.is_some() {
            let date = match data.received_date(idx) {
                Some(date) => date,
                None => return false,
            };
            if matches!(self.date_from, Some(from) if date < from)
                || matches!(self.date_to, Some(to) if date > to)
            {
                return false;
            }
        }

        if let Some(location) = &self.location {
            let needle = location.to_lowercase();
            let found = [col::REPORTER_DISTRICT, col::REPORTER_STATE]
                .iter()
                .filter_map(|column| clean_location(report.get(column)))
                .any(|name| name.to_lowercase().contains(&needle));
            if !found {
                return false;
            }
        }

        if let Some(drug) = &self.drug {
            let needle = drug.to_lowercase();
            let found = [col::DRUG_WHO, col::DRUG_REPORTED]
                .iter()
                .flat_map(|column| split_multi(report.get(column)))
                .any(|name| name.to_lowercase().contains(&needle));
            if !found {
                return false;
            }
        }

        if let Some(outcome) = &self.outcome {
            if !quiet_outcome(data, idx)
                .label()
                .eq_ignore_ascii_case(outcome.trim())
            {
                return false;
            }
        }

        true
    }
}

fn non_blank(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Outcome without the unrecognised-value warning, which the outcome aggregator already logs.
fn quiet_outcome(data: &DerivedFields<'_>, idx: usize) -> Outcome {
    let raw = data.report(idx).text(col::OUTCOME).unwrap_or_default();
    Outcome::classify(&raw).unwrap_or(Outcome::Unknown)
}

/// Indices of the reports matching `criteria`, in dataset order.
pub fn filter_indices(data: &DerivedFields<'_>, criteria: &FilterCriteria) -> Vec<usize> {
    (0..data.len())
        .filter(|idx| criteria.matches(data, *idx))
        .collect()
}

/// The subset of `reports` matching `criteria`, in dataset order.
pub fn apply_filters(reports: &Reports, criteria: &FilterCriteria) -> Reports {
    if criteria.is_empty() {
        return reports.clone();
    }
    let data = DerivedFields::new(reports);
    reports.select(filter_indices(&data, criteria))
}

/// A filter value and the number of reports it would select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub value: ArcStr,
    pub count: usize,
}

/// The options for each filter, largest count first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub locations: Vec<FilterOption>,
    pub drugs: Vec<FilterOption>,
    /// In canonical outcome order, outcomes with no reports left out.
    pub outcomes: Vec<FilterOption>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

pub fn calculate_filter_counts(data: &DerivedFields<'_>, max_drugs: usize) -> FilterOptions {
    let mut locations = FrequencyTable::new();
    let mut drugs = FrequencyTable::new();
    let mut outcomes = FrequencyTable::for_taxonomy::<Outcome>();
    let mut date_range: Option<(NaiveDate, NaiveDate)> = None;

    for (idx, report) in data.iter() {
        for column in [col::REPORTER_DISTRICT, col::REPORTER_STATE] {
            if let Some(name) = clean_location(report.get(column)) {
                locations.add(&name);
            }
        }

        let who = split_multi(report.get(col::DRUG_WHO));
        for drug in &who {
            drugs.add(drug);
        }
        let who: BTreeSet<_> = who.into_iter().collect();
        for drug in split_multi(report.get(col::DRUG_REPORTED)) {
            if !who.contains(&drug) {
                drugs.add(&drug);
            }
        }

        outcomes.add(quiet_outcome(data, idx).label());

        if let Some(date) = data.received_date(idx) {
            date_range = Some(match date_range {
                Some((min, max)) => (min.min(date), max.max(date)),
                None => (date, date),
            });
        }
    }

    FilterOptions {
        locations: to_options(&locations.sorted_desc()),
        drugs: to_options(&drugs.sorted_desc().truncated(max_drugs)),
        outcomes: to_options(&outcomes.non_zero()),
        date_range,
    }
}

fn to_options(table: &FrequencyTable) -> Vec<FilterOption> {
    table
        .iter()
        .map(|(value, count)| FilterOption {
            value: value.clone(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::record::Report;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reports() -> Reports {
        Reports::new(vec![
            Report::new()
                .with(col::OUTCOME, "Died")
                .with(col::RECEIVED_DATE, "20230115")
                .with(col::REPORTER_DISTRICT, "Nairobi")
                .with(col::DRUG_WHO, "PARACETAMOL")
                .with(col::DRUG_REPORTED, "Panadol\nPARACETAMOL"),
            Report::new()
                .with(col::OUTCOME, "recovered")
                .with(col::RECEIVED_DATE, "20230301")
                .with(col::REPORTER_STATE, "Nairobi County"),
            Report::new()
                .with(col::OUTCOME, "fatal")
                .with(col::RECEIVED_DATE, "garbage")
                .with(col::DRUG_REPORTED, "Brufen"),
        ])
    }

    #[test]
    fn outcome_equality() {
        let reports = reports();
        let died = apply_filters(&reports, &FilterCriteria::new().outcome("Died"));
        assert_eq!(died.len(), 2);
        assert_eq!(died[0], reports[0]);
        assert_eq!(died[1], reports[2]);
    }

    #[test]
    fn date_bounds() {
        let reports = reports();
        let from = apply_filters(&reports, &FilterCriteria::new().date_from(ymd(2023, 1, 15)));
        assert_eq!(from.len(), 2);
        let window = FilterCriteria::new()
            .date_from(ymd(2023, 1, 1))
            .date_to(ymd(2023, 1, 31));
        assert_eq!(apply_filters(&reports, &window).len(), 1);
        let contradictory = FilterCriteria::new()
            .date_from(ymd(2023, 6, 1))
            .date_to(ymd(2023, 1, 1));
        assert!(apply_filters(&reports, &contradictory).is_empty());
    }

    #[test]
    fn substrings() {
        let reports = reports();
        let nairobi = apply_filters(&reports, &FilterCriteria::new().location("nairobi"));
        assert_eq!(nairobi.len(), 2);
        let brufen = apply_filters(&reports, &FilterCriteria::new().drug("BRU"));
        assert_eq!(brufen.len(), 1);
        let all = apply_filters(&reports, &FilterCriteria::new().drug("  "));
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn option_counts() {
        let reports = reports();
        let options = calculate_filter_counts(&DerivedFields::new(&reports), MAX_DRUG_OPTIONS);
        assert_eq!(options.locations.len(), 2);
        let drugs: Vec<_> = options
            .drugs
            .iter()
            .map(|o| (o.value.to_string(), o.count))
            .collect();
        assert_eq!(
            drugs,
            vec![
                ("Brufen".to_string(), 1),
                ("PARACETAMOL".to_string(), 1),
                ("Panadol".to_string(), 1)
            ]
        );
        let outcomes: Vec<_> = options.outcomes.iter().map(|o| o.value.to_string()).collect();
        assert_eq!(outcomes, vec!["Recovered", "Died"]);
        assert_eq!(options.outcomes[1].count, 2);
        assert_eq!(options.date_range, Some((ymd(2023, 1, 15), ymd(2023, 3, 1))));

        let capped = calculate_filter_counts(&DerivedFields::new(&reports), 1);
        assert_eq!(capped.drugs.len(), 1);
    }

    #[test]
    fn criteria_from_toml() {
        let criteria: FilterCriteria = toml::from_str(
            r#"
            date_from = "2023-01-01"
            date_to = ""
            location = ""
            outcome = "Died"
            "#,
        )
        .unwrap();
        assert_eq!(criteria.date_from, Some(ymd(2023, 1, 1)));
        assert_eq!(criteria.date_to, None);
        assert_eq!(criteria.location, None);
        assert_eq!(criteria.outcome.as_deref(), Some("Died"));
    }

    #[test]
    fn criteria_survive_json() {
        let empty = FilterCriteria::default();
        let json = serde_json::to_string(&empty).unwrap();
        assert!(json.contains("null"));
        assert_eq!(serde_json::from_str::<FilterCriteria>(&json).unwrap(), empty);

        let set = FilterCriteria {
            date_from: Some(ymd(2023, 1, 1)),
            outcome: Some("Died".into()),
            ..FilterCriteria::default()
        };
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(serde_json::from_str::<FilterCriteria>(&json).unwrap(), set);
    }
}
