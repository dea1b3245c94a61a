//! Visualisation panels: one aggregator and its charts, cards, HTML and CSV per dimension.
//!
//! A [`Panel`] is built from the current (possibly filtered) dataset and owns everything it
//! shows. Changing the data means building a new panel; nothing is cached between builds.

use crate::{
    aggregate::{
        aggregate_actions, aggregate_age, aggregate_dates, aggregate_drugs,
        aggregate_female_status, aggregate_locations, aggregate_outcomes,
        aggregate_qualifications, aggregate_report_types, aggregate_seriousness,
        aggregate_seriousness_outcomes, aggregate_sex, ActionSummary, AgeSummary, DateField,
        DateSummary, DrugSource, DrugSummary, FemaleStatus, FemaleStatusSummary, LocationField,
        LocationSummary, OrganisationType, OutcomeSummary, QualificationSummary,
        ReportTypeSummary, SeriousnessOutcomeSummary, SeriousnessSummary, SexSummary,
    },
    chart::{self, palette, ChartConfig, ChartKind, Color, Share},
    clean::{Outcome, Sex, Taxonomy, YesNo},
    config::{Config, DisplayConfig},
    derived::DerivedFields,
    export::{self, CsvDocument},
    filter::{apply_filters, calculate_filter_counts, FilterCriteria, FilterOptions},
    freq::{format_percentage, FrequencyTable},
    html::{self, cells, StatCard, Table},
    record::Reports,
};
use qu::ick_use::*;
use serde::Serialize;

/// A visualisation dimension, one per panel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Outcome,
    Sex,
    AgeGroup,
    Pregnancy,
    Lactation,
    Seriousness,
    SeriousnessOutcomes,
    ActionTaken,
    ReporterQualification,
    ReportType,
    ReporterDistrict,
    ReporterState,
    ReporterOrganisation,
    DrugReported,
    DrugWho,
    ReceivedDate,
    OnsetDate,
}

impl Dimension {
    pub const ALL: &'static [Dimension] = &[
        Dimension::Outcome,
        Dimension::Sex,
        Dimension::AgeGroup,
        Dimension::Pregnancy,
        Dimension::Lactation,
        Dimension::Seriousness,
        Dimension::SeriousnessOutcomes,
        Dimension::ActionTaken,
        Dimension::ReporterQualification,
        Dimension::ReportType,
        Dimension::ReporterDistrict,
        Dimension::ReporterState,
        Dimension::ReporterOrganisation,
        Dimension::DrugReported,
        Dimension::DrugWho,
        Dimension::ReceivedDate,
        Dimension::OnsetDate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Outcome => "Outcome",
            Dimension::Sex => "Sex",
            Dimension::AgeGroup => "Age Group",
            Dimension::Pregnancy => "Pregnancy Status",
            Dimension::Lactation => "Lactation Status",
            Dimension::Seriousness => "Seriousness (IME)",
            Dimension::SeriousnessOutcomes => "Seriousness Outcomes",
            Dimension::ActionTaken => "Action Taken",
            Dimension::ReporterQualification => "Reporter Qualification",
            Dimension::ReportType => "Report Type",
            Dimension::ReporterDistrict => "Reporter District",
            Dimension::ReporterState => "Reporter State/Province",
            Dimension::ReporterOrganisation => "Reporter Organization",
            Dimension::DrugReported => "Drugs (as reported)",
            Dimension::DrugWho => "Drugs (WHODrug)",
            Dimension::ReceivedDate => "Received Date",
            Dimension::OnsetDate => "Onset Date",
        }
    }

    /// File stem used for exports.
    pub fn slug(self) -> &'static str {
        match self {
            Dimension::Outcome => "adr_outcome_distribution",
            Dimension::Sex => "adr_sex_distribution",
            Dimension::AgeGroup => "adr_age_group_distribution",
            Dimension::Pregnancy => "adr_pregnancy_status",
            Dimension::Lactation => "adr_lactation_status",
            Dimension::Seriousness => "adr_seriousness_distribution",
            Dimension::SeriousnessOutcomes => "adr_seriousness_outcomes",
            Dimension::ActionTaken => "adr_action_taken",
            Dimension::ReporterQualification => "adr_reporter_qualification",
            Dimension::ReportType => "adr_report_types",
            Dimension::ReporterDistrict => "adr_reporter_districts",
            Dimension::ReporterState => "adr_reporter_states_provinces",
            Dimension::ReporterOrganisation => "adr_reporter_organization",
            Dimension::DrugReported => "adr_drug_reported_analysis",
            Dimension::DrugWho => "adr_drug_who_analysis",
            Dimension::ReceivedDate => "adr_received_date_analysis",
            Dimension::OnsetDate => "adr_onset_date_analysis",
        }
    }

    pub fn default_filename(self) -> String {
        format!("{}.csv", self.slug())
    }
}

/// The aggregated statistics behind a panel.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Summary {
    Outcome(OutcomeSummary),
    Sex(SexSummary),
    Age(AgeSummary),
    FemaleStatus(FemaleStatusSummary),
    Seriousness(SeriousnessSummary),
    SeriousnessOutcomes(SeriousnessOutcomeSummary),
    Action(ActionSummary),
    Qualification(QualificationSummary),
    ReportType(ReportTypeSummary),
    Location(LocationSummary),
    Drug(DrugSummary),
    Date(DateSummary),
}

impl Summary {
    /// The main frequency table of the dimension.
    pub fn table(&self) -> &FrequencyTable {
        match self {
            Summary::Outcome(s) => &s.table,
            Summary::Sex(s) => &s.table,
            Summary::Age(s) => &s.table,
            Summary::FemaleStatus(s) => &s.table,
            Summary::Seriousness(s) => &s.table,
            Summary::SeriousnessOutcomes(s) => &s.table,
            Summary::Action(s) => &s.table,
            Summary::Qualification(s) => &s.table,
            Summary::ReportType(s) => &s.table,
            Summary::Location(s) => &s.table,
            Summary::Drug(s) => &s.cases,
            Summary::Date(s) => &s.monthly,
        }
    }
}

/// Everything one visualisation shows.
#[derive(Debug, Clone, Serialize)]
pub struct Panel {
    pub dimension: Dimension,
    pub summary: Summary,
    pub charts: Vec<ChartConfig>,
    pub cards: Vec<StatCard>,
    /// Shown instead of charts when there is nothing to chart.
    pub message: Option<String>,
    #[serde(skip)]
    pub html: String,
    #[serde(skip)]
    pub csv: CsvDocument,
}

impl Panel {
    pub fn build(dimension: Dimension, data: &DerivedFields<'_>, display: &DisplayConfig) -> Self {
        let builder = PanelBuilder::new(dimension, data.len());
        match dimension {
            Dimension::Outcome => builder.outcome(aggregate_outcomes(data)),
            Dimension::Sex => builder.sex(aggregate_sex(data)),
            Dimension::AgeGroup => builder.age(aggregate_age(data)),
            Dimension::Pregnancy => {
                builder.female_status(aggregate_female_status(data, FemaleStatus::Pregnancy))
            }
            Dimension::Lactation => {
                builder.female_status(aggregate_female_status(data, FemaleStatus::Lactation))
            }
            Dimension::Seriousness => builder.seriousness(aggregate_seriousness(data)),
            Dimension::SeriousnessOutcomes => {
                builder.seriousness_outcomes(aggregate_seriousness_outcomes(data))
            }
            Dimension::ActionTaken => builder.actions(aggregate_actions(data)),
            Dimension::ReporterQualification => {
                builder.qualifications(aggregate_qualifications(data))
            }
            Dimension::ReportType => builder.report_types(aggregate_report_types(data)),
            Dimension::ReporterDistrict => builder.locations(
                aggregate_locations(data, LocationField::District),
                display,
            ),
            Dimension::ReporterState => builder.locations(
                aggregate_locations(data, LocationField::StateOrProvince),
                display,
            ),
            Dimension::ReporterOrganisation => builder.locations(
                aggregate_locations(data, LocationField::Organisation),
                display,
            ),
            Dimension::DrugReported => {
                builder.drugs(aggregate_drugs(data, DrugSource::Reported), display)
            }
            Dimension::DrugWho => {
                builder.drugs(aggregate_drugs(data, DrugSource::WhoDrug), display)
            }
            Dimension::ReceivedDate => builder.dates(aggregate_dates(data, DateField::Received)),
            Dimension::OnsetDate => builder.dates(aggregate_dates(data, DateField::Onset)),
        }
    }

    pub fn table(&self) -> &FrequencyTable {
        self.summary.table()
    }

    pub fn default_filename(&self) -> String {
        self.dimension.default_filename()
    }
}

struct PanelBuilder {
    dimension: Dimension,
    total: usize,
    charts: Vec<ChartConfig>,
    cards: Vec<StatCard>,
    tables: Vec<String>,
    message: Option<String>,
}

impl PanelBuilder {
    fn new(dimension: Dimension, total: usize) -> Self {
        PanelBuilder {
            dimension,
            total,
            charts: vec![],
            cards: vec![StatCard::new(total, "Total ADR Cases")],
            tables: vec![],
            message: None,
        }
    }

    fn card(mut self, value: impl std::fmt::Display, label: &str) -> Self {
        self.cards.push(StatCard::new(value, label));
        self
    }

    fn chart(mut self, chart: ChartConfig) -> Self {
        self.charts.push(chart);
        self
    }

    fn table(mut self, html: String) -> Self {
        self.tables.push(html);
        self
    }

    fn message(mut self, message: String) -> Self {
        self.message = Some(message);
        self
    }

    fn finish(self, summary: Summary, csv: CsvDocument) -> Panel {
        let mut html = html::stat_cards(&self.cards);
        if let Some(message) = &self.message {
            html.push_str(&html::message(message));
        }
        for table in &self.tables {
            html.push_str(table);
        }
        Panel {
            dimension: self.dimension,
            summary,
            charts: self.charts,
            cards: self.cards,
            message: self.message,
            html,
            csv,
        }
    }

    fn outcome(self, s: OutcomeSummary) -> Panel {
        let csv = export::outcome_csv(&s);
        self.chart(chart::pie(
            ChartKind::Pie,
            "ADR Outcome Distribution",
            &s.table,
            palette::OUTCOME,
        ))
        .card(format!("{}%", s.positive_percentage()), "Positive Outcomes")
        .card(format!("{}%", s.negative_percentage()), "Negative Outcomes")
        .card(format!("{}%", s.recovery_rate()), "Recovery Rate (Known)")
        .card(format!("{}%", s.mortality_rate()), "Mortality Rate")
        .card(
            s.table.count(Outcome::Unknown.label()),
            "Unknown Outcomes",
        )
        .table(html::frequency_table("Outcome", &s.table.non_zero(), Some(s.total())))
        .finish(Summary::Outcome(s), csv)
    }

    fn sex(self, s: SexSummary) -> Panel {
        let csv = export::sex_csv(&s);
        self.chart(chart::pie(
            ChartKind::Pie,
            "Sex Distribution",
            &s.table,
            palette::SEX,
        ))
        .card(s.table.count(Sex::Male.label()), "Male")
        .card(s.table.count(Sex::Female.label()), "Female")
        .card(
            format!("{}%", s.coverage.completeness_str()),
            "Data Completeness",
        )
        .table(html::frequency_table("Sex", &s.ranked(), None))
        .finish(Summary::Sex(s), csv)
    }

    fn age(self, s: AgeSummary) -> Panel {
        let csv = export::age_csv(&s);
        self.chart(
            chart::bar(
                "Age Group Distribution",
                &s.table,
                palette::AGE_GROUP,
                Share::OfTable,
            )
            .with_axis_titles("Age Group", "Number of Cases"),
        )
        .card(s.coverage.known(), "Cases with Age")
        .card(s.average_age_str(), "Average Age (years)")
        .card(
            format!("{}%", s.coverage.completeness_str()),
            "Data Completeness",
        )
        .table(html::frequency_table("Age Group", &s.table, None))
        .finish(Summary::Age(s), csv)
    }

    fn female_status(self, s: FemaleStatusSummary) -> Panel {
        let csv = export::female_status_csv(&s);
        let label = s.kind.label();
        let builder = self
            .card(s.female_count(), "Female Cases")
            .card(format!("{}%", s.female_percentage()), "Of All Cases")
            .card(
                format!("{}%", s.status_percentage(YesNo::Yes)),
                &format!("{} Yes", label),
            );
        if s.female_count() == 0 {
            let message = format!(
                "No female cases found in the dataset. {} analysis is only applicable to female \
                 patients.",
                label
            );
            return builder
                .message(message)
                .finish(Summary::FemaleStatus(s), csv);
        }
        let colors = match s.kind {
            FemaleStatus::Pregnancy => palette::PREGNANCY,
            FemaleStatus::Lactation => palette::LACTATION,
        };
        builder
            .chart(chart::pie(
                ChartKind::Doughnut,
                &format!("{} Status (Female Cases)", label),
                &s.table,
                colors,
            ))
            .table(html::frequency_table(
                "Status",
                &s.table,
                Some(s.female_count()),
            ))
            .finish(Summary::FemaleStatus(s), csv)
    }

    fn seriousness(self, s: SeriousnessSummary) -> Panel {
        let csv = export::seriousness_csv(&s);
        self.chart(chart::pie(
            ChartKind::Pie,
            "Seriousness (IME)",
            &s.table,
            palette::SERIOUSNESS,
        ))
        .card(s.table.count(YesNo::Yes.label()), "Serious")
        .card(s.table.count(YesNo::No.label()), "Not Serious")
        .card(
            format!("{}%", s.coverage.completeness_str()),
            "Data Completeness",
        )
        .table(html::frequency_table("Seriousness", &s.table.non_zero(), None))
        .finish(Summary::Seriousness(s), csv)
    }

    fn seriousness_outcomes(self, s: SeriousnessOutcomeSummary) -> Panel {
        let csv = export::seriousness_outcomes_csv(&s);
        let total = self.total;
        let combinations = Table::new(
            s.combinations
                .iter()
                .map(|(label, count)| {
                    let percentage = format!("{}%", format_percentage(count, total));
                    cells(&[label, &count, &percentage])
                }),
        )
        .with_title("Outcome Combinations")
        .with_headers(["Combination", "Cases", "Percentage"])
        .to_html();
        self.chart(
            chart::bar(
                "Seriousness Outcomes",
                &s.table.non_zero(),
                palette::SERIOUSNESS_OUTCOME,
                Share::Of(total),
            )
            .horizontal()
            .with_axis_titles("Number of Cases", "Outcome"),
        )
        .card(
            format!("{}%", s.with_specific_percentage()),
            "Cases with Specific Outcomes",
        )
        .card(
            s.most_common().map_or_else(|| "N/A".into(), |l| l.to_string()),
            "Most Common Outcome",
        )
        .card(s.with_multiple, "Cases with Multiple Outcomes")
        .table(html::frequency_table(
            "Seriousness Outcome",
            &s.table.non_zero(),
            Some(total),
        ))
        .table(combinations)
        .finish(Summary::SeriousnessOutcomes(s), csv)
    }

    fn actions(self, s: ActionSummary) -> Panel {
        let csv = export::actions_csv(&s);
        let mut availability =
            FrequencyTable::with_labels(["Cases with Actions", "No Action Data"]);
        availability.add_n("Cases with Actions", s.cases_with_actions());
        availability.add_n("No Action Data", s.coverage.missing);
        let total_actions = s.total_actions();
        let rows = s.table.non_zero();
        let table = Table::new(rows.iter().map(|(action, count)| {
            let percentage = format!("{}%", format_percentage(count, total_actions));
            cells(&[action, &count, &percentage, &s.cases.count(action)])
        }))
        .with_headers(["Action", "Count", "Percentage of Actions", "Cases Affected"])
        .to_html();
        self.chart(
            chart::bar("Actions Taken", &rows, palette::ACTION, Share::OfTable)
                .horizontal()
                .with_axis_titles("Number of Actions", "Action"),
        )
        .chart(chart::pie(
            ChartKind::Doughnut,
            "Action Data Availability",
            &availability,
            palette::ACTION_AVAILABILITY,
        ))
        .card(s.cases_with_actions(), "Cases with Actions")
        .card(total_actions, "Total Actions Recorded")
        .card(s.cases_with_multiple, "Cases with Multiple Actions")
        .card(
            s.most_common().map_or_else(|| "N/A".into(), |l| l.to_string()),
            "Most Common Action",
        )
        .table(table)
        .finish(Summary::Action(s), csv)
    }

    fn qualifications(self, s: QualificationSummary) -> Panel {
        let csv = export::qualifications_csv(&s);
        let table = s.table.non_zero();
        self.chart(
            chart::bar(
                "Reporter Qualification",
                &table,
                palette::QUALIFICATION,
                Share::OfTable,
            )
            .with_axis_titles("Qualification", "Number of Reports"),
        )
        .card(s.healthcare(), "Healthcare Professionals")
        .card(s.non_healthcare(), "Non-Healthcare Reporters")
        .card(
            format!("{}%", s.coverage.completeness_str()),
            "Data Completeness",
        )
        .table(html::frequency_table("Reporter Qualification", &table, None))
        .finish(Summary::Qualification(s), csv)
    }

    fn report_types(self, s: ReportTypeSummary) -> Panel {
        let csv = export::report_types_csv(&s);
        let (most_common, count) = match s.most_common() {
            Some((label, count)) => (label.to_string(), count),
            None => ("N/A".into(), 0),
        };
        self.chart(chart::pie(
            ChartKind::Doughnut,
            "Report Types",
            &s.table,
            palette::REPORT_TYPE,
        ))
        .card(most_common, "Most Common Type")
        .card(format!("{}%", s.most_common_percentage()), "Of All Cases")
        .card(count, "Reports of Most Common Type")
        .card(s.categories(), "Report Categories")
        .table(html::frequency_table("Report Type", &s.table.non_zero(), None))
        .finish(Summary::ReportType(s), csv)
    }

    fn locations(self, s: LocationSummary, display: &DisplayConfig) -> Panel {
        let csv = export::locations_csv(&s);
        let label = s.field.label();
        let top = s.top(display.max_locations);
        let title = format!("Top {} {}", top.len(), label);
        let chart = match s.field {
            LocationField::Organisation => {
                let colors = top
                    .labels()
                    .map(|name| Color::Hex(OrganisationType::from_name(name).color()))
                    .collect();
                let share = Share::Of(s.coverage.total);
                chart::with_colors(ChartKind::Bar, &title, &top, colors, share)
            }
            _ => chart::ranked(ChartKind::Bar, &title, &top, Share::Of(s.coverage.total)),
        }
        .horizontal()
        .with_axis_titles("Number of Cases", label);
        let table = Table::new(s.names().map(|(name, count)| {
            let of_total = format!("{}%", s.percentage_of_total(name));
            let of_available = format!("{}%", s.percentage_of_available(name));
            cells(&[name, &count, &of_total, &of_available])
        }))
        .with_headers([
            label.to_string(),
            "Count".into(),
            "Percentage of Total".into(),
            "Percentage of Available".into(),
        ])
        .to_html();
        let builder = self
            .card(s.coverage.known(), &format!("Cases with {}", label))
            .card(s.unique(), &format!("Unique {} Values", label))
            .card(
                format!("{}%", s.coverage.completeness_str()),
                "Data Completeness",
            );
        let builder = if s.unique() == 0 {
            builder.message(format!("No {} data available.", label.to_lowercase()))
        } else {
            builder.chart(chart)
        };
        builder.table(table).finish(Summary::Location(s), csv)
    }

    fn drugs(self, s: DrugSummary, display: &DisplayConfig) -> Panel {
        let mode = display.drug_mode;
        let csv = export::drugs_csv(&s, mode);
        let table = s.table(mode);
        let source = s.source.label();
        let top3 = s
            .top(3)
            .map(|(drug, count)| format!("{} ({})", drug, count))
            .collect::<Vec<_>>()
            .join(", ");
        let mut builder = self
            .card(s.cases_with_drugs(), "Cases with Drugs")
            .card(s.unique_drugs(), "Unique Drugs")
            .card(s.multiple_drug_cases, "Multiple Drug Cases")
            .card(
                format!("{}%", s.coverage.completeness_str()),
                "Data Completeness",
            );
        if let Some(unmapped) = s.without_who_mapping {
            builder = builder.card(unmapped, "Drugs without WHO mapping");
        }
        if table.is_empty() {
            return builder
                .message(format!("No drug data available ({}).", source))
                .finish(Summary::Drug(s), csv);
        }
        let total = table.total();
        let ranked = Table::new(
            table
                .iter()
                .take(display.top_drugs_bar)
                .enumerate()
                .map(|(i, (drug, count))| {
                    let percentage = format!("{}%", format_percentage(count, total));
                    cells(&[&(i + 1), drug, &count, &percentage])
                }),
        )
        .with_title(format!("Top drugs: {}", top3))
        .with_headers(["Rank", "Drug", mode.column_label(), "Percentage"])
        .to_html();
        builder
            .chart(chart::ranked(
                ChartKind::Pie,
                &format!("Top {} Drugs ({})", display.top_drugs_pie, source),
                &table.top_n_with_others(display.top_drugs_pie, "Others"),
                Share::OfTable,
            ))
            .chart(
                chart::ranked(
                    ChartKind::Bar,
                    &format!("Top {} Drugs ({})", display.top_drugs_bar, source),
                    &table.truncated(display.top_drugs_bar),
                    Share::Of(total),
                )
                .horizontal()
                .with_axis_titles(mode.column_label(), "Drug"),
            )
            .table(ranked)
            .finish(Summary::Drug(s), csv)
    }

    fn dates(self, s: DateSummary) -> Panel {
        let csv = export::dates_csv(&s);
        let label = s.field.label();
        let monthly_colors = vec![Color::Rgb(54, 162, 235); s.monthly.len()];
        let timeline_colors = vec![Color::Rgb(75, 192, 192); s.timeline.len()];
        let mut builder = self
            .card(s.valid(), "Cases with Valid Dates")
            .card(
                format!("{}%", s.coverage.completeness_str()),
                "Data Completeness",
            )
            .card(
                s.range_str().unwrap_or_else(|| "N/A".into()),
                "Date Range",
            );
        if s.field == DateField::Onset {
            builder = builder
                .card(s.direct, "Cases with Onset Date")
                .card(s.substituted, "Cases using Received Date");
        }
        if s.valid() == 0 {
            return builder
                .message(format!("No valid {} values found.", label.to_lowercase()))
                .finish(Summary::Date(s), csv);
        }
        let yearly = s.yearly_table();
        builder
            .chart(
                chart::with_colors(
                    ChartKind::Bar,
                    &format!("{} by Month", label),
                    &s.monthly,
                    monthly_colors,
                    Share::OfTable,
                )
                .with_axis_titles("Month", "Number of Cases"),
            )
            .chart(
                chart::with_colors(
                    ChartKind::Bar,
                    &format!("{} Timeline", label),
                    &s.timeline,
                    timeline_colors,
                    Share::OfTable,
                )
                .with_axis_titles("Month", "Number of Cases"),
            )
            .table(html::frequency_table("Year", &yearly, None))
            .finish(Summary::Date(s), csv)
    }
}

/// The loaded dataset, the active filters and a panel per dimension built from the filtered data.
pub struct Dashboard {
    reports: Reports,
    config: Config,
    filtered: Reports,
    options: FilterOptions,
    panels: Vec<Panel>,
}

impl Dashboard {
    pub fn new(reports: Reports, config: Config) -> Self {
        let mut dashboard = Dashboard {
            filtered: reports.clone(),
            reports,
            config,
            options: FilterOptions::default(),
            panels: vec![],
        };
        dashboard.rebuild();
        dashboard
    }

    /// Replace the filters and rebuild every panel.
    pub fn set_filters(&mut self, criteria: FilterCriteria) {
        self.config.filters = criteria;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.filtered = apply_filters(&self.reports, &self.config.filters);
        event!(
            Level::DEBUG,
            "{} of {} reports match the filters",
            self.filtered.len(),
            self.reports.len()
        );
        // options always describe the whole dataset
        self.options = calculate_filter_counts(
            &DerivedFields::new(&self.reports),
            self.config.display.max_filter_drugs,
        );
        let data = DerivedFields::new(&self.filtered);
        self.panels = Dimension::ALL
            .iter()
            .map(|dimension| Panel::build(*dimension, &data, &self.config.display))
            .collect();
    }

    pub fn reports(&self) -> &Reports {
        &self.reports
    }

    pub fn filtered(&self) -> &Reports {
        &self.filtered
    }

    pub fn filters(&self) -> &FilterCriteria {
        &self.config.filters
    }

    pub fn filter_options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panel(&self, dimension: Dimension) -> Option<&Panel> {
        self.panels.iter().find(|p| p.dimension == dimension)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::record::{col, Report};

    fn reports() -> Reports {
        vec![
            Report::new()
                .with(col::OUTCOME, "Recovered")
                .with(col::SEX, "Male")
                .with(col::DRUG_REPORTED, "Aspirin"),
            Report::new()
                .with(col::OUTCOME, "fatal")
                .with(col::SEX, "Male")
                .with(col::DRUG_REPORTED, "Aspirin\nIbuprofen"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn filenames_are_distinct() {
        let mut names: Vec<_> = Dimension::ALL.iter().map(|d| d.default_filename()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Dimension::ALL.len());
        assert_eq!(Dimension::Outcome.default_filename(), "adr_outcome_distribution.csv");
    }

    #[test]
    fn no_females_gives_message() {
        let reports = reports();
        let data = DerivedFields::new(&reports);
        let panel = Panel::build(Dimension::Pregnancy, &data, &DisplayConfig::default());
        assert!(panel.charts.is_empty());
        assert!(panel.message.as_deref().unwrap().contains("No female cases"));
        assert!(panel.html.contains("alert"));
    }

    #[test]
    fn drug_panel_groups_others() {
        let reports = reports();
        let data = DerivedFields::new(&reports);
        let display = DisplayConfig {
            top_drugs_pie: 1,
            ..DisplayConfig::default()
        };
        let panel = Panel::build(Dimension::DrugReported, &data, &display);
        assert_eq!(panel.charts[0].labels, vec!["Aspirin", "Others"]);
        assert_eq!(panel.table().count("Aspirin"), 2);
    }

    #[test]
    fn dashboard_rebuilds_on_filter_change() {
        let mut dashboard = Dashboard::new(reports(), Config::default());
        assert_eq!(dashboard.panels().len(), Dimension::ALL.len());
        let outcome = dashboard.panel(Dimension::Outcome).unwrap();
        assert_eq!(outcome.table().total(), 2);

        dashboard.set_filters(FilterCriteria::new().outcome("Died"));
        assert_eq!(dashboard.filtered().len(), 1);
        let outcome = dashboard.panel(Dimension::Outcome).unwrap();
        assert_eq!(outcome.table().count("Died"), 1);
        assert_eq!(outcome.table().total(), 1);
        // options still cover the unfiltered data
        assert_eq!(dashboard.filter_options().outcomes.len(), 2);
    }
}
