//! HTML fragments for panel summaries: stat cards and data tables. All text is escaped.

use crate::freq::{format_percentage, FrequencyTable};
use serde::Serialize;
use std::{borrow::Cow, fmt, fmt::Write};

/// The default maximum number of body rows drawn.
pub const DEFAULT_MAX_ROWS: usize = 100;

/// Render a row of mixed values as table cells.
pub fn cells(values: &[&dyn fmt::Display]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// A `data-table` over some rows, with optional title, header and footer.
pub struct Table {
    title: Option<Cow<'static, str>>,
    headers: Option<Vec<Cow<'static, str>>>,
    rows: Vec<Vec<String>>,
    footer: Option<Vec<String>>,
    max_rows: usize,
}

impl Table {
    pub fn new(rows: impl IntoIterator<Item = Vec<String>>) -> Self {
        Table {
            title: None,
            headers: None,
            rows: rows.into_iter().collect(),
            footer: None,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }

    pub fn with_title(mut self, title: impl Into<Cow<'static, str>>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_headers(
        mut self,
        headers: impl IntoIterator<Item = impl Into<Cow<'static, str>>>,
    ) -> Self {
        self.headers = Some(headers.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_footer(mut self, footer: Vec<String>) -> Self {
        self.footer = Some(footer);
        self
    }

    /// Set the maximum number of body rows to show. 0 means no limit.
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn to_html(&self) -> String {
        let mut output = String::new();
        if let Some(title) = &self.title {
            output.push_str(r#"<h4 class="table-title">"#);
            html_escape::encode_text_to_string(title, &mut output);
            output.push_str("</h4>");
        }

        output.push_str(r#"<table class="data-table">"#);
        if let Some(headers) = &self.headers {
            output.push_str("<thead><tr>");
            for header in headers {
                output.push_str("<th>");
                html_escape::encode_text_to_string(header, &mut output);
                output.push_str("</th>");
            }
            output.push_str("</tr></thead>");
        }

        output.push_str("<tbody>");
        let shown = if self.max_rows == 0 {
            self.rows.len()
        } else {
            self.max_rows.min(self.rows.len())
        };
        for row in &self.rows[..shown] {
            write_row(row, &mut output);
        }
        if shown < self.rows.len() {
            let _ = write!(
                output,
                r#"<tr class="more"><td colspan="{}">... {} more</td></tr>"#,
                self.headers.as_ref().map_or(1, |h| h.len()),
                self.rows.len() - shown
            );
        }
        output.push_str("</tbody>");

        if let Some(footer) = &self.footer {
            output.push_str("<tfoot>");
            write_row(footer, &mut output);
            output.push_str("</tfoot>");
        }
        output.push_str("</table>");
        output
    }
}

fn write_row(row: &[String], output: &mut String) {
    output.push_str("<tr>");
    for cell in row {
        output.push_str("<td>");
        html_escape::encode_text_to_string(cell, output);
        output.push_str("</td>");
    }
    output.push_str("</tr>");
}

/// `Label | Count | Percentage` rows with a `Total | n | 100.0%` footer.
///
/// Percentages are of `denominator`, or of the table total when `None`.
pub fn frequency_table(
    label_header: &'static str,
    table: &FrequencyTable,
    denominator: Option<usize>,
) -> String {
    let total = table.total();
    let denominator = denominator.unwrap_or(total);
    let rows = table.iter().map(|(label, count)| {
        vec![
            label.to_string(),
            count.to_string(),
            format!("{}%", format_percentage(count, denominator)),
        ]
    });
    Table::new(rows)
        .with_headers([label_header, "Count", "Percentage"])
        .with_footer(vec!["Total".into(), total.to_string(), "100.0%".into()])
        .to_html()
}

/// A single summary figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub value: String,
    pub label: String,
}

impl StatCard {
    pub fn new(value: impl fmt::Display, label: impl Into<String>) -> Self {
        StatCard {
            value: value.to_string(),
            label: label.into(),
        }
    }
}

pub fn stat_cards(cards: &[StatCard]) -> String {
    let mut output = String::from(r#"<div class="summary-grid">"#);
    for card in cards {
        output.push_str(r#"<div class="stat-card"><div class="stat-value">"#);
        html_escape::encode_text_to_string(&card.value, &mut output);
        output.push_str(r#"</div><div class="stat-label">"#);
        html_escape::encode_text_to_string(&card.label, &mut output);
        output.push_str("</div></div>");
    }
    output.push_str("</div>");
    output
}

/// A panel section with an explanatory message in place of a chart.
pub fn message(text: &str) -> String {
    let mut output = String::from(r#"<div class="alert alert-info">"#);
    html_escape::encode_text_to_string(text, &mut output);
    output.push_str("</div>");
    output
}
