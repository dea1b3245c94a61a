use super::Coverage;
use crate::{
    clean::{is_null_token, split_multi, ActionTaken, Taxonomy},
    derived::DerivedFields,
    freq::FrequencyTable,
    record::col,
    ArcStr,
};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize)]
pub struct ActionSummary {
    /// Every recorded action (a report may record several), in canonical order.
    pub table: FrequencyTable,
    /// Distinct reports per action, in canonical order.
    pub cases: FrequencyTable,
    /// `missing` counts reports with nothing (or only `null`) in the action column.
    pub coverage: Coverage,
    pub cases_with_multiple: usize,
}

impl ActionSummary {
    pub fn cases_with_actions(&self) -> usize {
        self.coverage.known()
    }

    pub fn total_actions(&self) -> usize {
        self.table.total()
    }

    pub fn most_common(&self) -> Option<&ArcStr> {
        self.table.most_common().map(|(label, _)| label)
    }
}

pub fn aggregate_actions(data: &DerivedFields<'_>) -> ActionSummary {
    let mut table = FrequencyTable::for_taxonomy::<ActionTaken>();
    let mut cases = FrequencyTable::for_taxonomy::<ActionTaken>();
    let mut missing = 0;
    let mut cases_with_multiple = 0;
    for (_, report) in data.iter() {
        let mut segments = split_multi(report.get(col::ACTION_TAKEN));
        segments.retain(|s| !is_null_token(s));
        if segments.is_empty() {
            missing += 1;
            continue;
        }
        if segments.len() > 1 {
            cases_with_multiple += 1;
        }
        let mut seen = BTreeSet::new();
        for segment in &segments {
            let action = ActionTaken::clean_segment(segment);
            table.add(action.label());
            if seen.insert(action) {
                cases.add(action.label());
            }
        }
    }
    ActionSummary {
        table,
        cases,
        coverage: Coverage::new(data.len(), missing),
        cases_with_multiple,
    }
}

#[cfg(test)]
mod test {
    use super::aggregate_actions;
    use crate::{
        derived::DerivedFields,
        record::{col, Report, Reports},
    };

    #[test]
    fn actions_and_cases() {
        let reports: Reports = [
            "Drug withdrawn_x000D_\nDose reduced",
            "Drug stopped\nDrug withdrawn",
            "",
            "Something odd",
        ]
        .into_iter()
        .map(|v| Report::new().with(col::ACTION_TAKEN, v))
        .collect();
        let summary = aggregate_actions(&DerivedFields::new(&reports));
        assert_eq!(summary.table.count("Drug stopped"), 3);
        assert_eq!(summary.cases.count("Drug stopped"), 2);
        assert_eq!(summary.table.count("Other"), 1);
        assert_eq!(summary.total_actions(), 5);
        assert_eq!(summary.cases_with_actions(), 3);
        assert_eq!(summary.cases_with_multiple, 2);
        assert_eq!(summary.coverage.missing, 1);
        assert_eq!(summary.table.percentage_str("Drug stopped"), "60.0");
        assert_eq!(
            summary.most_common().map(|l| l.to_string()),
            Some("Drug stopped".to_string())
        );
    }

    #[test]
    fn null_placeholder_is_missing() {
        let reports: Reports = ["null", "NULL\nDose reduced", "undefined"]
            .into_iter()
            .map(|v| Report::new().with(col::ACTION_TAKEN, v))
            .collect();
        let summary = aggregate_actions(&DerivedFields::new(&reports));
        assert_eq!(summary.coverage.missing, 2);
        assert_eq!(summary.cases_with_actions(), 1);
        assert_eq!(summary.table.count("Other"), 0);
        assert_eq!(summary.table.count("Dose reduced"), 1);
        assert_eq!(summary.cases_with_multiple, 0);
    }
}
