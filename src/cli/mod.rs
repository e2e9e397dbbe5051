pub mod demo;
pub mod render;
pub mod summary;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::error::PlanError;
use crate::models::DATE_FORMAT;

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| PlanError::InvalidDate(raw.to_string()).to_string())
}

#[derive(Parser)]
#[command(
    name = "planchart",
    version,
    about = "Chart a program budget and staff utilization from a CSV task list."
)]
pub struct Cli {
    /// Task list CSV (default: ./testTasks.csv)
    pub input: Option<PathBuf>,
    /// Output PDF (default: ./testOutput.pdf)
    pub output: Option<PathBuf>,
    /// Date the spend figures were taken: YYYY-MM-DD (default: today)
    #[arg(long = "as-of", value_parser = parse_date)]
    pub as_of: Option<NaiveDate>,
    /// Document title (default: report_title from settings)
    #[arg(long)]
    pub title: Option<String>,
    /// Settings file (default: ~/.config/planchart/settings.json)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Write a sample task list to INPUT before charting it.
    #[arg(long)]
    pub demo: bool,
    /// Print a per-project summary table.
    #[arg(long)]
    pub summary: bool,
}
