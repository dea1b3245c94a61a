use adr_analysis::{
    calculate_filter_counts, filter::FilterOption, header, load_reports, Config, DerivedFields,
    ResultExt,
};
use clap::Parser;
use qu::ick_use::*;
use std::path::PathBuf;
use term_data_table::{Cell, Row, Table};

/// List the values each filter can take, with the number of reports for each.
#[derive(Parser)]
struct Opt {
    input: PathBuf,
    #[clap(long, short)]
    config: Option<PathBuf>,
}

#[qu::ick]
pub fn main(opt: Opt) -> Result {
    let config = Config::load_or_default(opt.config.as_deref()).print_error()?;
    let reports = load_reports(&opt.input).print_error()?;
    let options = calculate_filter_counts(
        &DerivedFields::new(&reports),
        config.display.max_filter_drugs,
    );

    header("Received dates");
    match options.date_range {
        Some((min, max)) => println!("{} to {}", min, max),
        None => println!("no valid received dates"),
    }

    header("Locations");
    println!("{}", option_table("Location", &options.locations));
    header("Drugs");
    println!("{}", option_table("Drug", &options.drugs));
    header("Outcomes");
    println!("{}", option_table("Outcome", &options.outcomes));
    Ok(())
}

fn option_table<'a>(label: &'a str, options: &'a [FilterOption]) -> Table<'a> {
    let mut table = Table::new().with_row(
        Row::new()
            .with_cell(Cell::from(label))
            .with_cell(Cell::from("Reports")),
    );
    for option in options {
        table.add_row(
            Row::new()
                .with_cell(Cell::from(&*option.value))
                .with_cell(Cell::from(option.count.to_string())),
        );
    }
    table
}
