use adr_analysis::{
    export::{save_html, save_json},
    load_reports, Config, Dashboard, ResultExt,
};
use clap::Parser;
use qu::ick_use::*;
use std::path::PathBuf;

/// Write the CSV export, chart configuration and HTML fragment of every panel.
#[derive(Parser)]
struct Opt {
    /// The spreadsheet (or csv/json) export to read.
    input: PathBuf,
    /// A TOML config file with filters, display limits and the output directory.
    #[clap(long, short)]
    config: Option<PathBuf>,
    /// Output directory, overriding the config.
    #[clap(long, short)]
    out: Option<PathBuf>,
    /// Only write CSV files.
    #[clap(long)]
    csv_only: bool,
}

#[qu::ick]
pub fn main(opt: Opt) -> Result {
    let mut config = Config::load_or_default(opt.config.as_deref()).print_error()?;
    if let Some(out) = opt.out {
        config.export.dir = out;
    }
    let dir = config.export.dir.clone();
    let reports = load_reports(&opt.input).print_error()?;
    let dashboard = Dashboard::new(reports, config);

    for panel in dashboard.panels() {
        panel.csv.save(dir.join(panel.default_filename()))?;
        if opt.csv_only {
            continue;
        }
        let slug = panel.dimension.slug();
        save_json(panel, dir.join(format!("{}.json", slug)))?;
        save_html(&panel.html, dir.join(format!("{}.html", slug)))?;
    }
    if !opt.csv_only {
        save_json(dashboard.filter_options(), dir.join("filter_options.json"))?;
    }

    event!(
        Level::INFO,
        "wrote {} panels to \"{}\"",
        dashboard.panels().len(),
        dir.display()
    );
    Ok(())
}
