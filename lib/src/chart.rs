//! Chart adapters: frequency tables to declarative chart configurations.
//!
//! The configurations are plain data, serialisable to JSON for whatever renders them. Legend and
//! tooltip text is produced here, so the renderer needs no callbacks.

use crate::{freq::FrequencyTable, Result};
use anyhow::Context;
use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Doughnut,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: Vec<String>,
    pub border_color: Vec<String>,
    pub border_width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    /// Bars run left to right.
    pub horizontal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_title: Option<String>,
    /// One legend entry per label, e.g. `Recovered: 12 (40.0%)`.
    pub legend: Vec<String>,
    /// Tooltip lines per label.
    pub tooltips: Vec<Vec<String>>,
}

impl ChartConfig {
    pub fn with_axis_titles(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_title = Some(x.into());
        self.y_title = Some(y.into());
        self
    }

    pub fn horizontal(mut self) -> Self {
        self.horizontal = true;
        self
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serializing chart configuration")
    }
}

/// A fill and border colour pair.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Color {
    /// Filled at 0.8 alpha, bordered at full alpha.
    Rgb(u8, u8, u8),
    /// The same colour for fill and border.
    Hex(&'static str),
}

impl Color {
    pub fn fill(self) -> String {
        match self {
            Color::Rgb(r, g, b) => format!("rgba({}, {}, {}, 0.8)", r, g, b),
            Color::Hex(hex) => hex.to_owned(),
        }
    }

    pub fn border(self) -> String {
        match self {
            Color::Rgb(r, g, b) => format!("rgba({}, {}, {}, 1)", r, g, b),
            Color::Hex(hex) => hex.to_owned(),
        }
    }
}

/// Colour for labels missing from a palette.
pub const FALLBACK: Color = Color::Rgb(189, 195, 199);

/// Colours keyed by canonical label.
pub type Palette = &'static [(&'static str, Color)];

pub fn color_for(palette: Palette, label: &str) -> Color {
    palette
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, c)| *c)
        .unwrap_or(FALLBACK)
}

pub mod palette {
    use super::{Color, Color::*, Palette};

    pub const OUTCOME: Palette = &[
        ("Recovered", Rgb(39, 174, 96)),
        ("Recovering", Rgb(82, 196, 26)),
        ("Recovered with sequelae", Rgb(243, 156, 18)),
        ("Not recovered", Rgb(231, 76, 60)),
        ("Died", Rgb(44, 62, 80)),
        ("Unknown", Rgb(149, 165, 166)),
    ];

    pub const SEX: Palette = &[
        ("Male", Rgb(52, 152, 219)),
        ("Female", Rgb(231, 76, 60)),
        ("Unknown", Rgb(149, 165, 166)),
        ("Other", Rgb(155, 89, 182)),
    ];

    pub const AGE_GROUP: Palette = &[
        ("Neonate (≤ 28 days)", Rgb(255, 99, 132)),
        ("Infant (29 days - 1 year)", Rgb(255, 159, 64)),
        ("Child (1-12 years)", Rgb(255, 205, 86)),
        ("Adolescent (13-17 years)", Rgb(75, 192, 192)),
        ("Adult (18-60 years)", Rgb(54, 162, 235)),
        ("Elderly (> 60 years)", Rgb(153, 102, 255)),
        ("Unknown", Rgb(201, 203, 207)),
    ];

    pub const PREGNANCY: Palette = &[
        ("Yes", Rgb(231, 76, 60)),
        ("No", Rgb(52, 152, 219)),
        ("Unknown", Rgb(149, 165, 166)),
    ];

    pub const LACTATION: Palette = &[
        ("Yes", Rgb(155, 89, 182)),
        ("No", Rgb(52, 152, 219)),
        ("Unknown", Rgb(149, 165, 166)),
    ];

    pub const SERIOUSNESS: Palette = &[
        ("Yes", Rgb(231, 76, 60)),
        ("No", Rgb(46, 204, 113)),
        ("Unknown", Rgb(149, 165, 166)),
    ];

    pub const SERIOUSNESS_OUTCOME: Palette = &[
        ("Results in death", Hex("#e74c3c")),
        ("Life threatening", Hex("#e67e22")),
        ("Caused / prolonged hospitalisation", Hex("#f39c12")),
        ("Disabling / incapacitating", Hex("#9b59b6")),
        ("Congenital anomaly / birth defect", Hex("#3498db")),
        ("Other medically important condition", Hex("#16a085")),
        ("Unknown / Not Serious", Hex("#95a5a6")),
    ];

    pub const ACTION: Palette = &[
        ("Drug stopped", Hex("#dc3545")),
        ("Dose reduced", Hex("#fd7e14")),
        ("Dose increased", Hex("#ffc107")),
        ("Drug not changed", Hex("#28a745")),
        ("Monitoring increased", Hex("#17a2b8")),
        ("Drug reintroduced", Hex("#6f42c1")),
        ("Unknown", Hex("#6c757d")),
        ("Not applicable", Hex("#adb5bd")),
        ("Other", Hex("#343a40")),
    ];

    pub const ACTION_AVAILABILITY: Palette = &[
        ("Cases with Actions", Hex("#28a745")),
        ("No Action Data", Hex("#dc3545")),
    ];

    pub const QUALIFICATION: Palette = &[
        ("Physician", Hex("#2196F3")),
        ("Pharmacist", Hex("#03A9F4")),
        ("Other Health Professional", Hex("#00BCD4")),
        ("Lawyer", Hex("#FF9800")),
        ("Patient/Consumer", Hex("#FF5722")),
        ("Other non-health professional", Hex("#F44336")),
        ("Unknown", Hex("#9E9E9E")),
    ];

    pub const REPORT_TYPE: Palette = &[
        ("Spontaneous report", Rgb(52, 152, 219)),
        ("Report from study", Rgb(46, 204, 113)),
        ("Other", Rgb(243, 156, 18)),
        ("Not available to sender or unknown", Rgb(149, 165, 166)),
    ];

    /// For ranked charts (drugs, places) where labels are not known in advance.
    pub const SERIES: [Color; 10] = [
        Hex("#3498db"),
        Hex("#2ecc71"),
        Hex("#f39c12"),
        Hex("#e74c3c"),
        Hex("#9b59b6"),
        Hex("#1abc9c"),
        Hex("#34495e"),
        Hex("#f1c40f"),
        Hex("#e67e22"),
        Hex("#95a5a6"),
    ];
}

/// How percentages in legends and tooltips are calculated.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Share {
    /// Of the table total.
    OfTable,
    /// Of a fixed denominator, e.g. all reports for multi-label tables.
    Of(usize),
}

impl Share {
    fn denominator(self, table: &FrequencyTable) -> usize {
        match self {
            Share::OfTable => table.total(),
            Share::Of(n) => n,
        }
    }
}

/// A pie or doughnut chart over the non-zero categories.
pub fn pie(kind: ChartKind, title: &str, table: &FrequencyTable, palette: Palette) -> ChartConfig {
    let table = table.non_zero();
    let colors = table.labels().map(|l| color_for(palette, l)).collect();
    build(kind, title, &table, colors, Share::OfTable)
}

/// A bar chart over every category, zeros included.
pub fn bar(title: &str, table: &FrequencyTable, palette: Palette, share: Share) -> ChartConfig {
    let colors = table.labels().map(|l| color_for(palette, l)).collect();
    build(ChartKind::Bar, title, table, colors, share)
}

/// A chart over labels not known in advance, coloured from [`palette::SERIES`] in order.
pub fn ranked(kind: ChartKind, title: &str, table: &FrequencyTable, share: Share) -> ChartConfig {
    let colors = (0..table.len())
        .map(|i| palette::SERIES[i % palette::SERIES.len()])
        .collect();
    build(kind, title, table, colors, share)
}

/// A chart with explicitly chosen colours, one per label.
pub fn with_colors(
    kind: ChartKind,
    title: &str,
    table: &FrequencyTable,
    colors: Vec<Color>,
    share: Share,
) -> ChartConfig {
    build(kind, title, table, colors, share)
}

fn build(
    kind: ChartKind,
    title: &str,
    table: &FrequencyTable,
    colors: Vec<Color>,
    share: Share,
) -> ChartConfig {
    let denominator = share.denominator(table);
    let labels: Vec<String> = table.labels().map(|l| l.to_string()).collect();
    let data = table.iter().map(|(_, count)| count as f64).collect();
    let legend = table
        .iter()
        .map(|(label, count)| {
            format!(
                "{}: {} ({})",
                label,
                count,
                percent(count, denominator)
            )
        })
        .collect();
    let tooltips = table
        .iter()
        .map(|(label, count)| {
            vec![
                format!("{}: {}", label, count),
                format!("Percentage: {}", percent(count, denominator)),
            ]
        })
        .collect();
    ChartConfig {
        kind,
        title: title.to_owned(),
        labels,
        datasets: vec![Dataset {
            label: title.to_owned(),
            data,
            background_color: colors.iter().map(|c| c.fill()).collect(),
            border_color: colors.iter().map(|c| c.border()).collect(),
            border_width: 1,
        }],
        horizontal: false,
        x_title: None,
        y_title: None,
        legend,
        tooltips,
    }
}

fn percent(count: usize, total: usize) -> String {
    format!("{}%", crate::freq::format_percentage(count, total))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clean::Outcome;

    fn outcomes() -> FrequencyTable {
        let mut table = FrequencyTable::for_taxonomy::<Outcome>();
        table.add_n("Recovered", 3);
        table.add_n("Died", 1);
        table
    }

    #[test]
    fn pie_drops_empty_categories() {
        let chart = pie(ChartKind::Pie, "Outcomes", &outcomes(), palette::OUTCOME);
        assert_eq!(chart.labels, vec!["Recovered", "Died"]);
        assert_eq!(chart.datasets[0].data, vec![3., 1.]);
        assert_eq!(
            chart.datasets[0].background_color,
            vec!["rgba(39, 174, 96, 0.8)", "rgba(44, 62, 80, 0.8)"]
        );
        assert_eq!(chart.datasets[0].border_color[0], "rgba(39, 174, 96, 1)");
        assert_eq!(chart.legend[0], "Recovered: 3 (75.0%)");
        assert_eq!(chart.tooltips[1], vec!["Died: 1", "Percentage: 25.0%"]);
    }

    #[test]
    fn bar_keeps_every_category() {
        let chart = bar("Outcomes", &outcomes(), palette::OUTCOME, Share::OfTable);
        assert_eq!(chart.labels.len(), 6);
        assert_eq!(chart.kind, ChartKind::Bar);
    }

    #[test]
    fn unknown_labels_are_gray() {
        let table: FrequencyTable = ["Mystery"].into_iter().collect();
        let chart = pie(ChartKind::Doughnut, "x", &table, palette::OUTCOME);
        assert_eq!(
            chart.datasets[0].background_color,
            vec!["rgba(189, 195, 199, 0.8)"]
        );
    }

    #[test]
    fn serialises_to_json() {
        let chart = ranked(ChartKind::Bar, "Drugs", &outcomes().non_zero(), Share::Of(10))
            .horizontal()
            .with_axis_titles("Cases", "Drug");
        let json: serde_json::Value = serde_json::from_str(&chart.to_json().unwrap()).unwrap();
        assert_eq!(json["kind"], "bar");
        assert_eq!(json["horizontal"], true);
        assert_eq!(json["datasets"][0]["backgroundColor"][0], "#3498db");
        assert_eq!(json["legend"][0], "Recovered: 3 (30.0%)");
    }
}
