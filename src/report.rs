use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use crate::aggregate::aggregate_projects;
use crate::budget_chart::BudgetChart;
use crate::chart::Page;
use crate::error::{PlanError, Result};
use crate::importer::import_tasks;
use crate::models::{Project, Task};
use crate::pdf::render_pages;
use crate::settings::Settings;
use crate::utilization::UtilizationChart;

pub struct ReportOptions {
    /// Date the spend figures were taken.
    pub as_of: NaiveDate,
    /// Date the report is generated; also where the "today" marker goes.
    pub today: NaiveDate,
    pub title: String,
}

impl ReportOptions {
    pub fn new(today: NaiveDate, settings: &Settings) -> Self {
        Self {
            as_of: today,
            today,
            title: settings.report_title.clone(),
        }
    }
}

#[derive(Debug)]
pub struct ReportSummary {
    pub tasks: usize,
    pub projects: Vec<Project>,
    pub owners: usize,
    pub years: usize,
    pub overallocated_cells: usize,
}

/// Budget page followed by the utilization page.
pub fn build_pages(
    tasks: &[Task],
    options: &ReportOptions,
    settings: &Settings,
) -> Result<(Vec<Page>, ReportSummary)> {
    if tasks.is_empty() {
        return Err(PlanError::EmptyInput);
    }
    let projects = aggregate_projects(tasks);
    let budget = BudgetChart::build(&projects, options.as_of, options.today, settings)?;
    let utilization = UtilizationChart::build(tasks, settings)?;

    let summary = ReportSummary {
        tasks: tasks.len(),
        owners: utilization.owners.len(),
        years: utilization.years.len(),
        overallocated_cells: utilization
            .cells
            .iter()
            .filter(|c| c.is_overallocated())
            .count(),
        projects,
    };
    Ok((vec![budget.render(), utilization.render()], summary))
}

pub fn render_report(
    tasks: &[Task],
    options: &ReportOptions,
    settings: &Settings,
) -> Result<(Vec<u8>, ReportSummary)> {
    let (pages, summary) = build_pages(tasks, options, settings)?;
    let bytes = render_pages(&options.title, &pages)?;
    Ok((bytes, summary))
}

/// Import `input`, draw both charts and write them to `output` as one PDF.
pub fn save_combined_charts(
    input: &Path,
    output: &Path,
    options: &ReportOptions,
    settings: &Settings,
) -> Result<ReportSummary> {
    let tasks = import_tasks(input)?;
    let (bytes, summary) = render_report(&tasks, options, settings)?;
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output, &bytes)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        tasks = summary.tasks,
        projects = summary.projects.len(),
        "wrote report"
    );
    Ok(summary)
}
