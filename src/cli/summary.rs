use colored::{ColoredString, Colorize};
use comfy_table::{Cell, Table};

use crate::fmt::money;
use crate::models::{Project, Status};
use crate::report::ReportSummary;

fn status_label(status: &Status) -> ColoredString {
    match status {
        Status::Complete => "complete".blue(),
        Status::Working => "working".green(),
        Status::Proposed => "proposed".yellow(),
        other => other.label().dimmed(),
    }
}

pub fn project_table(projects: &[Project]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Project", "Status", "Start", "End", "Budget", "Spend", "Monthly",
    ]);
    for p in projects {
        table.add_row(vec![
            Cell::new(&p.name),
            Cell::new(status_label(&p.status)),
            Cell::new(p.start.format("%Y-%m-%d")),
            Cell::new(p.end.format("%Y-%m-%d")),
            Cell::new(money(p.budget)),
            Cell::new(money(p.spend)),
            Cell::new(money(p.monthly_rate())),
        ]);
    }
    let budget: f64 = projects.iter().map(|p| p.budget).sum();
    let spend: f64 = projects.iter().map(|p| p.spend).sum();
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(money(budget)),
        Cell::new(money(spend)),
        Cell::new(""),
    ]);
    table
}

pub fn print(report: &ReportSummary) {
    println!("{table}", table = project_table(&report.projects));
    println!(
        "{} tasks, {} projects, {} people over {} year(s)",
        report.tasks,
        report.projects.len(),
        report.owners,
        report.years
    );
}
