//! Tabular CSV documents for each dimension, plus saving of CSV, JSON and HTML artefacts.

use crate::{
    aggregate::{
        ActionSummary, AgeSummary, CountMode, DateField, DateSummary, DrugSummary,
        FemaleStatusSummary, LocationField, LocationSummary, OutcomeSummary, QualificationSummary,
        ReportTypeSummary, SeriousnessOutcomeSummary, SeriousnessSummary, SexSummary,
    },
    clean::{ActionTaken, Outcome, Taxonomy},
    freq::{format_percentage, percentage, FrequencyTable},
    util::{self, check_extension},
    Result,
};
use qu::ick_use::*;
use serde::Serialize;
use std::{fmt, fs, io::Write, path::Path};

/// A CSV file made of blank-line separated sections, each a list of rows.
///
/// Rows within a section may have different lengths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvDocument {
    sections: Vec<Vec<Vec<String>>>,
}

impl CsvDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new section. Following rows go into it.
    pub fn section(mut self) -> Self {
        self.sections.push(vec![]);
        self
    }

    pub fn row(mut self, cells: &[&dyn fmt::Display]) -> Self {
        if self.sections.is_empty() {
            self.sections.push(vec![]);
        }
        let row = cells.iter().map(|c| c.to_string()).collect();
        if let Some(section) = self.sections.last_mut() {
            section.push(row);
        }
        self
    }

    /// `Label | Count | Percentage` rows for every entry in `table`, percentages of `denominator`.
    pub fn frequency_rows(mut self, table: &FrequencyTable, denominator: usize) -> Self {
        for (label, count) in table.iter() {
            self = self.row(&[label, &count, &percent(count, denominator)]);
        }
        self
    }

    pub fn sections(&self) -> &[Vec<Vec<String>>] {
        &self.sections
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut out = vec![];
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                out.push(b'\n');
            }
            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .quote_style(csv::QuoteStyle::Necessary)
                .from_writer(&mut out);
            for row in section {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        Ok(String::from_utf8(out)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result {
        let path = path.as_ref();
        check_extension(path, "csv")?;
        let contents = self.to_csv_string()?;
        write_file(path, contents.as_bytes())
    }
}

fn percent(count: usize, total: usize) -> String {
    format!("{}%", format_percentage(count, total))
}

/// Header, one row per category, then a `Total` row.
pub fn frequency_csv(label_header: &str, table: &FrequencyTable) -> CsvDocument {
    CsvDocument::new()
        .row(&[&label_header, &"Count", &"Percentage"])
        .frequency_rows(table, table.total())
        .section()
        .row(&[&"Total", &table.total(), &"100.0%"])
}

pub fn outcome_csv(summary: &OutcomeSummary) -> CsvDocument {
    let table = summary.table.non_zero();
    CsvDocument::new()
        .row(&[&"Outcome", &"Count", &"Percentage"])
        .frequency_rows(&table, summary.total())
        .section()
        .row(&[&"Total", &summary.total(), &"100.0%"])
        .section()
        .row(&[&"Summary Statistics"])
        .row(&[
            &"Positive Outcomes",
            &summary.positive,
            &format!("{}%", summary.positive_percentage()),
        ])
        .row(&[
            &"Partial Recovery",
            &summary.partial,
            &format!("{}%", summary.partial_percentage()),
        ])
        .row(&[
            &"Negative Outcomes",
            &summary.negative,
            &format!("{}%", summary.negative_percentage()),
        ])
        .row(&[&"Recovery Rate (Known)", &format!("{}%", summary.recovery_rate())])
        .row(&[&"Mortality Rate", &format!("{}%", summary.mortality_rate())])
        .row(&[&"Unknown Outcomes", &summary.table.count(Outcome::Unknown.label())])
}

pub fn sex_csv(summary: &SexSummary) -> CsvDocument {
    let total = summary.coverage.total;
    CsvDocument::new()
        .row(&[&"Sex", &"Count", &"Percentage"])
        .frequency_rows(&summary.ranked(), total)
        .row(&[&"TOTAL", &total, &"100.0%"])
}

pub fn age_csv(summary: &AgeSummary) -> CsvDocument {
    let total = summary.coverage.total;
    CsvDocument::new()
        .row(&[&"Age Group", &"Count", &"Percentage"])
        .frequency_rows(&summary.table, total)
        .section()
        .row(&[&"Total", &total, &"100.0%"])
        .section()
        .row(&[&"Summary Statistics"])
        .row(&[&"Cases with Age", &summary.coverage.known()])
        .row(&[&"Average Age (years)", &summary.average_age_str()])
        .row(&[&"Data Completeness", &format!("{}%", summary.coverage.completeness_str())])
}

pub fn female_status_csv(summary: &FemaleStatusSummary) -> CsvDocument {
    let females = summary.female_count();
    CsvDocument::new()
        .row(&[&format!("{} Status", summary.kind.label()), &"Count", &"Percentage"])
        .frequency_rows(&summary.table, females)
        .section()
        .row(&[&"Total", &females, &"100.0%"])
        .section()
        .row(&[&"Total Women in Dataset", &females, &""])
        .row(&[&"Total ADR Cases", &summary.total_records, &""])
}

pub fn seriousness_csv(summary: &SeriousnessSummary) -> CsvDocument {
    let total = summary.coverage.total;
    CsvDocument::new()
        .row(&[&"Seriousness", &"Count", &"Percentage"])
        .frequency_rows(&summary.table.non_zero(), total)
        .section()
        .row(&[&"Total", &total, &"100.0%"])
}

pub fn seriousness_outcomes_csv(summary: &SeriousnessOutcomeSummary) -> CsvDocument {
    let total = summary.coverage.total;
    let mut doc = CsvDocument::new()
        .row(&[&"Seriousness Outcome", &"Count", &"Percentage of All Cases"])
        .frequency_rows(&summary.table.non_zero(), total)
        .section()
        .row(&[&"Total ADR Cases", &total, &""])
        .row(&[&"Cases with Specific Outcomes", &summary.with_specific(), &""])
        .row(&[&"Cases with Multiple Outcomes", &summary.with_multiple, &""]);
    if !summary.combinations.is_empty() {
        doc = doc.section().row(&[&"Outcome Combination", &"Count"]);
        for (combination, count) in summary.combinations.iter() {
            doc = doc.row(&[combination, &count]);
        }
    }
    doc
}

pub fn actions_csv(summary: &ActionSummary) -> CsvDocument {
    let total_actions = summary.total_actions();
    let mut doc = CsvDocument::new().row(&[
        &"Action",
        &"Count",
        &"Percentage of Actions",
        &"Cases Affected",
    ]);
    for action in ActionTaken::ALL {
        let count = summary.table.count(action.label());
        if count > 0 {
            doc = doc.row(&[
                action,
                &count,
                &percent(count, total_actions),
                &summary.cases.count(action.label()),
            ]);
        }
    }
    if summary.coverage.missing > 0 {
        doc = doc.row(&[&"No Action Data", &summary.coverage.missing, &"", &""]);
    }
    doc.section()
        .row(&[&"Summary Statistics"])
        .row(&[&"Total Cases", &summary.coverage.total])
        .row(&[&"Cases with Actions", &summary.cases_with_actions()])
        .row(&[&"Total Actions Recorded", &total_actions])
        .row(&[&"Cases with Multiple Actions", &summary.cases_with_multiple])
        .row(&[&"Data Completeness", &format!("{}%", summary.coverage.completeness_str())])
}

pub fn qualifications_csv(summary: &QualificationSummary) -> CsvDocument {
    let total = summary.table.total();
    CsvDocument::new()
        .row(&[&"Reporter Qualification", &"Count", &"Percentage"])
        .frequency_rows(&summary.table.non_zero(), total)
        .section()
        .row(&[&"Total", &total, &"100.0%"])
        .section()
        .row(&[&"Summary Statistics"])
        .row(&[&"Healthcare Professionals", &summary.healthcare()])
        .row(&[&"Non-Healthcare Reporters", &summary.non_healthcare()])
        .row(&[&"Data Completeness", &format!("{}%", summary.coverage.completeness_str())])
}

pub fn report_types_csv(summary: &ReportTypeSummary) -> CsvDocument {
    let total = summary.coverage.total;
    CsvDocument::new()
        .row(&[&"Report Type", &"Count", &"Percentage"])
        .frequency_rows(&summary.table.non_zero(), total)
        .section()
        .row(&[&"Total", &total, &"100.0%"])
}

pub fn locations_csv(summary: &LocationSummary) -> CsvDocument {
    let label = summary.field.label();
    let coverage = summary.coverage;
    let mut doc = CsvDocument::new().row(&[
        &label,
        &"Count",
        &"Percentage of Total",
        &"Percentage of Available",
    ]);
    for (name, count) in summary.names() {
        doc = doc.row(&[
            name,
            &count,
            &format!("{}%", summary.percentage_of_total(name)),
            &format!("{}%", summary.percentage_of_available(name)),
        ]);
    }
    let (with, without) = match summary.field {
        LocationField::Organisation => ("Cases with Organization", "Missing Organization"),
        LocationField::District => ("Cases with District", "Cases without District"),
        LocationField::StateOrProvince => {
            ("Cases with State/Province", "Cases without State/Province")
        }
    };
    doc = doc
        .section()
        .row(&[&"Summary Statistics"])
        .row(&[&"Total Cases", &coverage.total])
        .row(&[&with, &coverage.known()])
        .row(&[&without, &coverage.missing]);
    if summary.field == LocationField::StateOrProvince {
        doc = doc.row(&[&"Placeholder Records", &summary.placeholders]);
    }
    doc.row(&[&"Data Completeness", &format!("{}%", coverage.completeness_str())])
        .row(&[&format!("Unique {} Values", label), &summary.unique()])
}

pub fn drugs_csv(summary: &DrugSummary, mode: CountMode) -> CsvDocument {
    let table = summary.table(mode);
    let total = table.total();
    let mut doc = CsvDocument::new().row(&[
        &format!("Drug Name ({})", summary.source.label()),
        &mode.column_label(),
        &"Percentage",
    ]);
    for (drug, count) in table.iter() {
        doc = doc.row(&[drug, &count, &format!("{:.2}%", percentage(count, total))]);
    }
    doc = doc
        .section()
        .row(&[&"SUMMARY"])
        .row(&[&"Total Cases", &summary.coverage.total])
        .row(&[&"Cases with Drugs", &summary.cases_with_drugs()])
        .row(&[&"Unique Drugs", &summary.unique_drugs()])
        .row(&[&"Single Drug Cases", &summary.single_drug_cases])
        .row(&[&"Multiple Drug Cases", &summary.multiple_drug_cases])
        .row(&[&"Data Completeness", &format!("{}%", summary.coverage.completeness_str())]);
    if let Some(unmapped) = summary.without_who_mapping {
        doc = doc.row(&[&"Drugs without WHO mapping", &unmapped]);
    }
    doc
}

pub fn dates_csv(summary: &DateSummary) -> CsvDocument {
    let mut doc = CsvDocument::new().row(&[&"Month", &"Number of Cases"]);
    for (month, count) in summary.monthly.iter() {
        doc = doc.row(&[month, &count]);
    }
    doc = doc
        .section()
        .row(&[&"SUMMARY"])
        .row(&[&"Total Cases", &summary.coverage.total])
        .row(&[&"Cases with Valid Dates", &summary.valid()])
        .row(&[&"Data Completeness", &format!("{}%", summary.coverage.completeness_str())])
        .row(&[
            &"Date Range",
            &summary.range_str().unwrap_or_else(|| "N/A".into()),
        ]);
    if summary.field == DateField::Onset {
        doc = doc
            .row(&[&"Cases with Onset Date", &summary.direct])
            .row(&[&"Cases using Received Date", &summary.substituted])
            .row(&[&"Onset Date Completeness", &format!("{}%", summary.direct_completeness())]);
    }
    if !summary.yearly.is_empty() {
        doc = doc.section().row(&[&"Year", &"Number of Cases"]);
        for (year, count) in &summary.yearly {
            doc = doc.row(&[year, count]);
        }
    }
    doc
}

/// Save a value as pretty-printed JSON.
pub fn save_json<T: Serialize + ?Sized>(value: &T, path: impl AsRef<Path>) -> Result {
    let path = path.as_ref();
    check_extension(path, "json")?;
    let contents = serde_json::to_vec_pretty(value)?;
    write_file(path, &contents)
}

/// Save an HTML fragment.
pub fn save_html(html: &str, path: impl AsRef<Path>) -> Result {
    let path = path.as_ref();
    check_extension(path, "html")?;
    write_file(path, html.as_bytes())
}

fn write_file(path: &Path, contents: &[u8]) -> Result {
    fn inner(path: &Path, contents: &[u8]) -> Result {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("could not create parent")?;
        }
        if util::path_exists(path)? {
            event!(
                Level::WARN,
                "overwriting existing file at \"{}\"",
                path.display()
            );
        }
        let mut out = fs::File::create(path)?;
        out.write_all(contents)?;
        Ok(())
    }
    inner(path, contents).with_context(|| format!("unable to save data to \"{}\"", path.display()))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        aggregate::{aggregate_drugs, aggregate_locations, aggregate_outcomes, DrugSource},
        derived::DerivedFields,
        record::{col, Report, Reports},
    };

    fn reports(column: &str, values: &[&str]) -> Reports {
        values
            .iter()
            .map(|v| Report::new().with(column, *v))
            .collect()
    }

    #[test]
    fn sections_are_blank_line_separated() {
        let doc = CsvDocument::new()
            .row(&[&"a", &1])
            .section()
            .row(&[&"Total", &"b,c", &""]);
        assert_eq!(doc.to_csv_string().unwrap(), "a,1\n\nTotal,\"b,c\",\n");
    }

    #[test]
    fn outcome_document() {
        let reports = reports(col::OUTCOME, &["recovered", "Died", ""]);
        let summary = aggregate_outcomes(&DerivedFields::new(&reports));
        let csv = outcome_csv(&summary).to_csv_string().unwrap();
        assert!(csv.starts_with("Outcome,Count,Percentage\nRecovered,1,33.3%\n"));
        assert!(csv.contains("\nTotal,3,100.0%\n"));
        assert!(csv.contains("Mortality Rate,33.3%\n"));
    }

    #[test]
    fn district_document() {
        let reports = reports(col::REPORTER_DISTRICT, &["Kandy", "Kandy", "Galle", "null"]);
        let summary = aggregate_locations(&DerivedFields::new(&reports), LocationField::District);
        let doc = locations_csv(&summary);
        let first = &doc.sections()[0];
        assert_eq!(
            first[0],
            ["District", "Count", "Percentage of Total", "Percentage of Available"]
        );
        assert_eq!(first[1], ["Kandy", "2", "50.0%", "66.7%"]);
        assert_eq!(first.len(), 3);
        let without = vec!["Cases without District".to_string(), "1".into()];
        assert!(doc.sections()[1].contains(&without));
    }

    #[test]
    fn drug_document_summary() {
        let reports: Reports = [("Aspirin\nIbuprofen", ""), ("Aspirin", "ASPIRIN")]
            .into_iter()
            .map(|(reported, who)| {
                Report::new()
                    .with(col::DRUG_REPORTED, reported)
                    .with(col::DRUG_WHO, who)
            })
            .collect();
        let summary = aggregate_drugs(&DerivedFields::new(&reports), DrugSource::Reported);
        let doc = drugs_csv(&summary, CountMode::Cases);
        assert_eq!(doc.sections()[0][1], ["Aspirin", "2", "66.67%"]);
        assert!(doc.sections()[1].contains(&vec![
            "Drugs without WHO mapping".to_string(),
            "2".into()
        ]));
    }

    #[test]
    fn save_checks_extension() {
        let dir = std::env::temp_dir().join("adr-analysis-export-test");
        let doc = frequency_csv("Sex", &["Male"].into_iter().collect());
        assert!(doc.save(dir.join("sex.txt")).is_err());
        doc.save(dir.join("sex.csv")).unwrap();
        let written = fs::read_to_string(dir.join("sex.csv")).unwrap();
        assert_eq!(written, "Sex,Count,Percentage\nMale,1,100.0%\n\nTotal,1,100.0%\n");
    }
}
