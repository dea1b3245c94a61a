use adr_analysis::{
    freq::format_percentage, header, load_reports, Config, Dashboard, FrequencyTable, Panel,
    ResultExt,
};
use clap::Parser;
use qu::ick_use::*;
use std::path::PathBuf;
use term_data_table::{Cell, Row, Table};

/// Print a summary table for every dimension of an ADR report export.
#[derive(Parser)]
struct Opt {
    /// The spreadsheet (or csv/json) export to read.
    input: PathBuf,
    /// A TOML config file with filters and display limits.
    #[clap(long, short)]
    config: Option<PathBuf>,
}

#[qu::ick]
pub fn main(opt: Opt) -> Result {
    let config = Config::load_or_default(opt.config.as_deref()).print_error()?;
    let reports = load_reports(&opt.input).print_error()?;
    let dashboard = Dashboard::new(reports, config);

    header("Data stats");
    println!("total reports: {}", dashboard.reports().len());
    if !dashboard.filters().is_empty() {
        println!("reports matching filters: {}", dashboard.filtered().len());
    }

    for panel in dashboard.panels() {
        print_panel(panel);
    }
    Ok(())
}

fn print_panel(panel: &Panel) {
    header(panel.dimension.label());
    for card in &panel.cards {
        println!("{}: {}", card.label, card.value);
    }
    if let Some(message) = &panel.message {
        println!("{}", message);
        return;
    }
    println!("{}", frequency_table(panel.dimension.label(), panel.table()));
}

fn frequency_table(label: &str, counts: &FrequencyTable) -> Table<'static> {
    let total = counts.total();
    let mut table = Table::new().with_row(
        Row::new()
            .with_cell(Cell::from(label.to_string()))
            .with_cell(Cell::from("Count"))
            .with_cell(Cell::from("Percentage")),
    );
    for (label, count) in counts.iter().filter(|(_, count)| *count > 0) {
        table.add_row(
            Row::new()
                .with_cell(Cell::from(label.to_string()))
                .with_cell(Cell::from(count.to_string()))
                .with_cell(Cell::from(format!("{}%", format_percentage(count, total)))),
        );
    }
    table
}
