use super::Coverage;
use crate::{
    clean::{SeriousnessOutcome, Taxonomy, YesNo},
    derived::DerivedFields,
    freq::{format_percentage, FrequencyTable},
    record::col,
    ArcStr,
};
use itertools::Itertools;
use serde::Serialize;

/// The `Seriousness (IME)` flag.
#[derive(Debug, Clone, Serialize)]
pub struct SeriousnessSummary {
    pub table: FrequencyTable,
    pub coverage: Coverage,
}

pub fn aggregate_seriousness(data: &DerivedFields<'_>) -> SeriousnessSummary {
    let mut table = FrequencyTable::for_taxonomy::<YesNo>();
    for (_, report) in data.iter() {
        table.add(YesNo::clean_seriousness(report.get(col::SERIOUSNESS_IME)).label());
    }
    let missing = table.count(YesNo::Unknown.label());
    SeriousnessSummary {
        table,
        coverage: Coverage::new(data.len(), missing),
    }
}

/// The multi-label `Seriousness` column.
#[derive(Debug, Clone, Serialize)]
pub struct SeriousnessOutcomeSummary {
    /// Mentions per outcome. Reports without a specific outcome count once under the fallback.
    pub table: FrequencyTable,
    /// Each report exactly once, under its sorted outcome combination. Largest first.
    pub combinations: FrequencyTable,
    /// `missing` is the number of reports with no specific outcome.
    pub coverage: Coverage,
    pub with_multiple: usize,
}

impl SeriousnessOutcomeSummary {
    pub fn with_specific(&self) -> usize {
        self.coverage.known()
    }

    pub fn with_specific_percentage(&self) -> String {
        format_percentage(self.with_specific(), self.coverage.total)
    }

    pub fn most_common(&self) -> Option<&ArcStr> {
        self.table.most_common().map(|(label, _)| label)
    }

    /// Share of all reports mentioning `label`.
    pub fn percentage_of_cases(&self, label: &str) -> String {
        format_percentage(self.table.count(label), self.coverage.total)
    }
}

/// Label for a set of outcomes: labels sorted alphabetically and joined with ` + `.
pub fn combination_label(outcomes: &[SeriousnessOutcome]) -> String {
    outcomes.iter().map(|o| o.label()).sorted().join(" + ")
}

pub fn aggregate_seriousness_outcomes(data: &DerivedFields<'_>) -> SeriousnessOutcomeSummary {
    let mut table = FrequencyTable::for_taxonomy::<SeriousnessOutcome>();
    let mut combinations = FrequencyTable::new();
    let mut without = 0;
    let mut with_multiple = 0;
    for (_, report) in data.iter() {
        let outcomes = SeriousnessOutcome::parse(report.get(col::SERIOUSNESS));
        if outcomes.is_empty() {
            without += 1;
            table.add(SeriousnessOutcome::NotSerious.label());
            combinations.add(SeriousnessOutcome::NotSerious.label());
            continue;
        }
        if outcomes.len() > 1 {
            with_multiple += 1;
        }
        for outcome in &outcomes {
            table.add(outcome.label());
        }
        combinations.add(&combination_label(&outcomes));
    }
    SeriousnessOutcomeSummary {
        table,
        combinations: combinations.sorted_desc(),
        coverage: Coverage::new(data.len(), without),
        with_multiple,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::record::{Report, Reports};

    fn reports(column: &str, values: &[&str]) -> Reports {
        values
            .iter()
            .map(|v| Report::new().with(column, *v))
            .collect()
    }

    #[test]
    fn ime_flag() {
        let reports = reports(col::SERIOUSNESS_IME, &["Yes", "YesYes", "No", "", "Unknown"]);
        let summary = aggregate_seriousness(&DerivedFields::new(&reports));
        assert_eq!(summary.table.count("Yes"), 2);
        assert_eq!(summary.table.count("No"), 1);
        assert_eq!(summary.table.count("Unknown"), 2);
        assert_eq!(summary.coverage.completeness_str(), "60.0");
    }

    #[test]
    fn outcomes_and_combinations() {
        let reports = reports(
            col::SERIOUSNESS,
            &[
                "Results in death\nLife threatening",
                "Life threatening_x000D_Results in death",
                "Caused / prolonged hospitalisation",
                "",
            ],
        );
        let summary = aggregate_seriousness_outcomes(&DerivedFields::new(&reports));
        assert_eq!(summary.table.count("Results in death"), 2);
        assert_eq!(summary.table.count("Unknown / Not Serious"), 1);
        assert_eq!(summary.combinations.total(), reports.len());
        assert_eq!(
            summary.combinations.iter().next().map(|(l, c)| (l.to_string(), c)),
            Some(("Life threatening + Results in death".to_string(), 2))
        );
        assert_eq!(summary.with_specific(), 3);
        assert_eq!(summary.with_multiple, 2);
        assert_eq!(summary.with_specific_percentage(), "75.0");
        assert_eq!(
            summary.most_common().map(|l| l.to_string()),
            Some("Results in death".to_string())
        );
    }
}
