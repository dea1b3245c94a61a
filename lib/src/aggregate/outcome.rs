use super::Coverage;
use crate::{
    clean::{Outcome, Taxonomy},
    derived::DerivedFields,
    freq::{format_percentage, FrequencyTable},
    record::col,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeSummary {
    /// Every outcome in canonical order.
    pub table: FrequencyTable,
    pub coverage: Coverage,
    /// Recovered and recovering.
    pub positive: usize,
    /// Recovered with sequelae.
    pub partial: usize,
    /// Not recovered and died.
    pub negative: usize,
}

impl OutcomeSummary {
    pub fn total(&self) -> usize {
        self.coverage.total
    }

    pub fn positive_percentage(&self) -> String {
        format_percentage(self.positive, self.total())
    }

    pub fn partial_percentage(&self) -> String {
        format_percentage(self.partial, self.total())
    }

    pub fn negative_percentage(&self) -> String {
        format_percentage(self.negative, self.total())
    }

    /// Recovered as a share of reports with a known outcome.
    pub fn recovery_rate(&self) -> String {
        format_percentage(
            self.table.count(Outcome::Recovered.label()),
            self.coverage.known(),
        )
    }

    /// Died as a share of all reports.
    pub fn mortality_rate(&self) -> String {
        format_percentage(self.table.count(Outcome::Died.label()), self.total())
    }
}

pub fn aggregate_outcomes(data: &DerivedFields<'_>) -> OutcomeSummary {
    let mut table = FrequencyTable::for_taxonomy::<Outcome>();
    let (mut positive, mut partial, mut negative, mut unknown) = (0, 0, 0, 0);
    for (_, report) in data.iter() {
        let outcome = Outcome::clean(report.get(col::OUTCOME));
        table.add(outcome.label());
        if outcome.is_positive() {
            positive += 1;
        } else if outcome.is_negative() {
            negative += 1;
        } else if outcome == Outcome::RecoveredWithSequelae {
            partial += 1;
        } else {
            unknown += 1;
        }
    }
    OutcomeSummary {
        table,
        coverage: Coverage::new(data.len(), unknown),
        positive,
        partial,
        negative,
    }
}

#[cfg(test)]
mod test {
    use super::aggregate_outcomes;
    use crate::{
        derived::DerivedFields,
        record::{col, CellValue, Report, Reports},
    };

    #[test]
    fn three_record_scenario() {
        let reports: Reports = [
            CellValue::from("recovered"),
            CellValue::from("Died Died"),
            CellValue::Empty,
        ]
        .into_iter()
        .map(|v| Report::new().with(col::OUTCOME, v))
        .collect();
        let summary = aggregate_outcomes(&DerivedFields::new(&reports));
        let table = summary.table.non_zero();
        assert_eq!(table.len(), 3);
        for label in ["Recovered", "Died", "Unknown"] {
            assert_eq!(table.count(label), 1);
            assert_eq!(table.percentage_str(label), "33.3");
        }
        assert_eq!(summary.table.total(), reports.len());
        assert_eq!(summary.positive, 1);
        assert_eq!(summary.negative, 1);
        assert_eq!(summary.coverage.missing, 1);
        assert_eq!(summary.recovery_rate(), "50.0");
        assert_eq!(summary.mortality_rate(), "33.3");
    }
}
