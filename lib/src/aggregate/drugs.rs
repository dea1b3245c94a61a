use super::Coverage;
use crate::{
    clean::split_multi,
    derived::DerivedFields,
    freq::FrequencyTable,
    record::col,
    ArcStr,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which drug column to analyse.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrugSource {
    /// Free text names as given by the reporter.
    Reported,
    /// WHODrug standardised names.
    WhoDrug,
}

impl DrugSource {
    pub fn column(self) -> &'static str {
        match self {
            DrugSource::Reported => col::DRUG_REPORTED,
            DrugSource::WhoDrug => col::DRUG_WHO,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DrugSource::Reported => "Drug Name (Reporter)",
            DrugSource::WhoDrug => "Drug Name (WHODrug)",
        }
    }
}

/// Count each drug once per report, or once per mention.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountMode {
    Cases,
    Mentions,
}

impl CountMode {
    pub fn column_label(self) -> &'static str {
        match self {
            CountMode::Cases => "Number of Cases",
            CountMode::Mentions => "Number of Mentions",
        }
    }
}

impl Default for CountMode {
    fn default() -> Self {
        CountMode::Cases
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DrugSummary {
    pub source: DrugSource,
    /// Reports naming each drug, largest first.
    pub cases: FrequencyTable,
    /// Every mention of each drug, largest first.
    pub mentions: FrequencyTable,
    /// Reports naming two or more distinct drugs, by sorted drug set. Largest first.
    pub combinations: FrequencyTable,
    /// `missing` counts reports with no drug named.
    pub coverage: Coverage,
    pub single_drug_cases: usize,
    pub multiple_drug_cases: usize,
    /// Distinct reporter-named drugs in reports with no WHODrug name. Reporter-named source only.
    pub without_who_mapping: Option<usize>,
}

impl DrugSummary {
    pub fn table(&self, mode: CountMode) -> &FrequencyTable {
        match mode {
            CountMode::Cases => &self.cases,
            CountMode::Mentions => &self.mentions,
        }
    }

    pub fn cases_with_drugs(&self) -> usize {
        self.coverage.known()
    }

    pub fn unique_drugs(&self) -> usize {
        self.cases.len()
    }

    pub fn top(&self, n: usize) -> impl Iterator<Item = (&ArcStr, usize)> + '_ {
        self.cases.iter().take(n)
    }
}

pub fn aggregate_drugs(data: &DerivedFields<'_>, source: DrugSource) -> DrugSummary {
    let mut cases = FrequencyTable::new();
    let mut mentions = FrequencyTable::new();
    let mut combinations = FrequencyTable::new();
    let mut unmapped = BTreeSet::new();
    let (mut missing, mut single, mut multiple) = (0, 0, 0);

    for (_, report) in data.iter() {
        let drugs = split_multi(report.get(source.column()));
        if drugs.is_empty() {
            missing += 1;
            continue;
        }
        for drug in &drugs {
            mentions.add(drug);
        }
        let distinct: Vec<&ArcStr> = drugs.iter().unique().collect();
        for drug in &distinct {
            cases.add(drug);
        }
        if distinct.len() > 1 {
            multiple += 1;
            combinations.add(&distinct.iter().sorted().join(" + "));
        } else {
            single += 1;
        }
        if source == DrugSource::Reported && split_multi(report.get(col::DRUG_WHO)).is_empty() {
            unmapped.extend(distinct.iter().map(|d| (*d).clone()));
        }
    }

    DrugSummary {
        source,
        cases: cases.sorted_desc(),
        mentions: mentions.sorted_desc(),
        combinations: combinations.sorted_desc(),
        coverage: Coverage::new(data.len(), missing),
        single_drug_cases: single,
        multiple_drug_cases: multiple,
        without_who_mapping: (source == DrugSource::Reported).then(|| unmapped.len()),
    }
}
