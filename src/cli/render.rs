use std::path::PathBuf;

use chrono::{Datelike, Local};
use colored::Colorize;

use crate::cli::{demo, summary, Cli};
use crate::error::Result;
use crate::report::{save_combined_charts, ReportOptions};
use crate::settings::load_settings;

pub fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(cli.config.as_deref())?;
    let today = Local::now().date_naive();

    if cli.input.is_none() && cli.output.is_none() {
        println!(
            "{} no input and output files specified; using {} -> {}",
            "Note:".yellow().bold(),
            settings.default_input,
            settings.default_output
        );
    }
    let input = cli
        .input
        .unwrap_or_else(|| PathBuf::from(&settings.default_input));
    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&settings.default_output));

    if cli.demo {
        demo::write_sample(&input, today.year())?;
    }

    let mut options = ReportOptions::new(today, &settings);
    if let Some(as_of) = cli.as_of {
        options.as_of = as_of;
    }
    if let Some(title) = cli.title {
        options.title = title;
    }

    let report = save_combined_charts(&input, &output, &options, &settings)?;
    if cli.summary {
        summary::print(&report);
    }
    if report.overallocated_cells > 0 {
        println!(
            "{} {} person-year cell(s) over {:.0} hours",
            "Warning:".red().bold(),
            report.overallocated_cells,
            settings.capacity_hours
        );
    }
    println!("Wrote {}", output.display());
    Ok(())
}
