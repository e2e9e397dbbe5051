//! Person × year grid of stacked task hours.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::chart::{Frame, LinearScale, Page, Rgb, PAGE_H, PAGE_W};
use crate::error::{PlanError, Result};
use crate::models::Task;
use crate::settings::Settings;
use crate::yearfrac::{task_year_fraction, years_spanned};

const GRID_LEFT: f32 = 28.0;
const GRID_TOP: f32 = 18.0;
const GRID_RIGHT: f32 = 8.0;
const GRID_BOTTOM: f32 = 8.0;
const CELL_PAD: f32 = 1.5;
const LABEL_SIZE: f32 = 4.0;
/// Label baseline offset above the segment bottom, in hours.
const LABEL_LIFT_HOURS: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct Segment {
    pub project: String,
    pub hours: f64,
    /// Hours stacked below this segment.
    pub bottom: f64,
    pub overallocated: bool,
    pub labeled: bool,
}

impl Segment {
    pub fn top(&self) -> f64 {
        self.bottom + self.hours
    }

    pub fn label(&self) -> String {
        format!("{} - {}", self.project, self.hours.round() as i64)
    }
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub owner: String,
    pub year: i32,
    pub segments: Vec<Segment>,
}

impl Cell {
    pub fn total_hours(&self) -> f64 {
        self.segments.iter().map(|s| s.hours).sum()
    }

    pub fn is_overallocated(&self) -> bool {
        self.segments.iter().any(|s| s.overallocated)
    }
}

#[derive(Debug, Clone)]
pub struct UtilizationChart {
    pub years: Vec<i32>,
    pub owners: Vec<String>,
    /// Row-major: one row per owner, one column per year.
    pub cells: Vec<Cell>,
    pub capacity: f64,
    pub axis_max: f64,
}

/// Hours funded for `task` in `year`.
pub fn task_hours(task: &Task, year: i32) -> f64 {
    task.budget * task_year_fraction(task, year) / task.rate
}

fn build_cell(tasks: &[Task], owner: &str, year: i32, settings: &Settings) -> Cell {
    let mut segments = Vec::new();
    let mut running = 0.0;
    for task in tasks.iter().filter(|t| t.owner == owner) {
        let hours = task_hours(task, year);
        if hours <= 0.0 {
            continue;
        }
        segments.push(Segment {
            project: task.project.clone(),
            hours,
            bottom: running,
            overallocated: running + hours > settings.capacity_hours,
            labeled: hours > settings.label_min_hours,
        });
        running += hours;
    }
    Cell {
        owner: owner.to_string(),
        year,
        segments,
    }
}

impl UtilizationChart {
    pub fn build(tasks: &[Task], settings: &Settings) -> Result<Self> {
        let years: Vec<i32> = years_spanned(tasks).ok_or(PlanError::EmptyInput)?.collect();
        let owners: Vec<String> = tasks
            .iter()
            .map(|t| t.owner.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut cells = Vec::with_capacity(owners.len() * years.len());
        for owner in &owners {
            for &year in &years {
                let cell = build_cell(tasks, owner, year, settings);
                if cell.is_overallocated() {
                    info!(
                        owner = %cell.owner,
                        year = cell.year,
                        hours = cell.total_hours(),
                        "overallocated"
                    );
                }
                cells.push(cell);
            }
        }
        debug!(owners = owners.len(), years = years.len(), "built utilization chart");

        Ok(Self {
            years,
            owners,
            cells,
            capacity: settings.capacity_hours,
            axis_max: settings.hours_axis_max,
        })
    }

    #[cfg(test)]
    pub fn cell(&self, owner: &str, year: i32) -> Option<&Cell> {
        let row = self.owners.iter().position(|o| o == owner)?;
        let col = self.years.iter().position(|&y| y == year)?;
        self.cells.get(row * self.years.len() + col)
    }

    pub fn render(&self) -> Page {
        let mut page = Page::new("Utilization");
        let grid_w = PAGE_W - GRID_LEFT - GRID_RIGHT;
        let grid_h = PAGE_H - GRID_TOP - GRID_BOTTOM;
        let cols = self.years.len().max(1) as f32;
        let rows = self.owners.len().max(1) as f32;
        let cell_w = grid_w / cols;
        let cell_h = grid_h / rows;
        let name_size = (cell_h * 1.2).clamp(4.0, 8.0);

        page.text(
            format!("Utilization (hours per year, capacity {:.0})", self.capacity),
            GRID_LEFT,
            9.0,
            10.0,
            Rgb::BLACK,
            false,
        );

        for (col, year) in self.years.iter().enumerate() {
            let x = GRID_LEFT + col as f32 * cell_w;
            page.text(year.to_string(), x + cell_w / 2.0 - 4.0, GRID_TOP - 2.0, 9.0, Rgb::BLACK, true);
        }
        for (row, owner) in self.owners.iter().enumerate() {
            let y = GRID_TOP + row as f32 * cell_h + cell_h / 2.0;
            page.text(owner.as_str(), 3.0, y + name_size * 0.15, name_size, Rgb::BLACK, false);
        }

        for (i, cell) in self.cells.iter().enumerate() {
            let row = i / self.years.len();
            let col = i % self.years.len();
            let frame = Frame {
                x: GRID_LEFT + col as f32 * cell_w + CELL_PAD,
                y: GRID_TOP + row as f32 * cell_h + CELL_PAD,
                w: cell_w - 2.0 * CELL_PAD,
                h: cell_h - 2.0 * CELL_PAD,
            };
            self.draw_cell(&mut page, &frame, cell);
        }
        page
    }

    fn draw_cell(&self, page: &mut Page, frame: &Frame, cell: &Cell) {
        let ys = LinearScale::new((0.0, self.axis_max), (frame.bottom(), frame.y));
        let border = Rgb::LIGHT_GRAY;
        page.line(frame.x, frame.y, frame.right(), frame.y, border, 0.3, false);
        page.line(frame.x, frame.bottom(), frame.right(), frame.bottom(), border, 0.3, false);
        page.line(frame.x, frame.y, frame.x, frame.bottom(), border, 0.3, false);
        page.line(frame.right(), frame.y, frame.right(), frame.bottom(), border, 0.3, false);

        if ys.contains(self.capacity) {
            let y = ys.map(self.capacity);
            page.line(frame.x, y, frame.right(), y, Rgb::GRAY, 0.5, true);
        }

        let bar_x = frame.x + frame.w * 0.2;
        let bar_w = frame.w * 0.6;
        let center = frame.x + frame.w / 2.0;
        for seg in &cell.segments {
            let top = ys.map_clamped(seg.top());
            let bottom = ys.map_clamped(seg.bottom);
            let fill = if seg.overallocated { Rgb::RED } else { Rgb::GRAY };
            page.rect(bar_x, top, bar_w, bottom - top, fill, Some(Rgb::WHITE));
            if seg.labeled && seg.bottom + LABEL_LIFT_HOURS < self.axis_max {
                let y = ys.map(seg.bottom + LABEL_LIFT_HOURS);
                page.text(seg.label(), center, y, LABEL_SIZE, Rgb::WHITE, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Shape;
    use crate::models::Status;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// A task fully inside 2024 worth `hours` at $100/hour.
    fn task_2024(project: &str, owner: &str, hours: f64) -> Task {
        Task {
            project: project.to_string(),
            owner: owner.to_string(),
            status: Status::Working,
            start: date(2024, 2, 1),
            end: date(2024, 11, 1),
            budget: hours * 100.0,
            spend: 0.0,
            rate: 100.0,
        }
    }

    #[test]
    fn test_task_hours_within_year() {
        let t = task_2024("A", "Alice", 750.0);
        assert_eq!(task_hours(&t, 2024), 750.0);
        assert_eq!(task_hours(&t, 2023), 0.0);
    }

    #[test]
    fn test_task_hours_split_across_years() {
        // 2023-07-01 .. 2024-07-01 is 366 days: 184 in 2023, 182 in 2024.
        let t = Task {
            start: date(2023, 7, 1),
            end: date(2024, 7, 1),
            budget: 36_600.0,
            ..task_2024("A", "Alice", 0.0)
        };
        assert!((task_hours(&t, 2023) - 184.0).abs() < 1e-9);
        assert!((task_hours(&t, 2024) - 182.0).abs() < 1e-9);
    }

    #[test]
    fn test_grid_dimensions_and_owner_order() {
        let tasks = vec![
            task_2024("A", "Zoe", 100.0),
            Task {
                start: date(2023, 6, 1),
                end: date(2025, 3, 1),
                ..task_2024("B", "Alice", 100.0)
            },
        ];
        let chart = UtilizationChart::build(&tasks, &Settings::default()).unwrap();
        assert_eq!(chart.years, vec![2023, 2024, 2025]);
        assert_eq!(chart.owners, vec!["Alice", "Zoe"]);
        assert_eq!(chart.cells.len(), 6);
        let zoe_2023 = chart.cell("Zoe", 2023).unwrap();
        assert!(zoe_2023.segments.is_empty());
        assert_eq!(chart.cell("Zoe", 2024).unwrap().segments.len(), 1);
        assert!(chart.cell("Nobody", 2024).is_none());
    }

    #[test]
    fn test_overallocation_flags_only_crossing_and_later_segments() {
        let tasks = vec![
            task_2024("A", "Alice", 900.0),
            task_2024("B", "Alice", 900.0),
            task_2024("C", "Alice", 900.0),
        ];
        let chart = UtilizationChart::build(&tasks, &Settings::default()).unwrap();
        let cell = chart.cell("Alice", 2024).unwrap();
        let flags: Vec<bool> = cell.segments.iter().map(|s| s.overallocated).collect();
        assert_eq!(flags, vec![false, false, true]);
        assert_eq!(cell.segments[2].bottom, 1800.0);
        assert_eq!(cell.total_hours(), 2700.0);
        assert!(cell.is_overallocated());
    }

    #[test]
    fn test_exactly_at_capacity_is_not_overallocated() {
        let tasks = vec![task_2024("A", "Alice", 1500.0), task_2024("B", "Alice", 500.0)];
        let chart = UtilizationChart::build(&tasks, &Settings::default()).unwrap();
        assert!(!chart.cell("Alice", 2024).unwrap().is_overallocated());
    }

    #[test]
    fn test_owners_accumulate_independently() {
        let tasks = vec![task_2024("A", "Alice", 1500.0), task_2024("B", "Bob", 1500.0)];
        let chart = UtilizationChart::build(&tasks, &Settings::default()).unwrap();
        assert!(!chart.cell("Alice", 2024).unwrap().is_overallocated());
        assert!(!chart.cell("Bob", 2024).unwrap().is_overallocated());
    }

    #[test]
    fn test_segment_labels() {
        let tasks = vec![task_2024("Small", "Alice", 150.0), task_2024("Big", "Alice", 200.6)];
        let chart = UtilizationChart::build(&tasks, &Settings::default()).unwrap();
        let cell = chart.cell("Alice", 2024).unwrap();
        assert!(!cell.segments[0].labeled);
        assert!(cell.segments[1].labeled);
        assert_eq!(cell.segments[1].label(), "Big - 201");

        let page = chart.render();
        assert!(page.texts().any(|t| t == "Big - 201"));
        assert!(!page.texts().any(|t| t.starts_with("Small")));
    }

    #[test]
    fn test_render_capacity_lines_and_warning_fill() {
        let tasks = vec![task_2024("A", "Alice", 1500.0), task_2024("B", "Alice", 600.0)];
        let chart = UtilizationChart::build(&tasks, &Settings::default()).unwrap();
        let page = chart.render();
        let capacity_lines = page
            .shapes
            .iter()
            .filter(|s| matches!(s, Shape::Line { dashed: true, .. }))
            .count();
        assert_eq!(capacity_lines, chart.cells.len());
        let reds = page
            .shapes
            .iter()
            .filter(|s| matches!(s, Shape::Rect { fill, .. } if *fill == Rgb::RED))
            .count();
        assert_eq!(reds, 1);
        assert!(page.texts().any(|t| t == "2024"));
        assert!(page.texts().any(|t| t == "Alice"));
    }

    #[test]
    fn test_empty_tasks_is_error() {
        let err = UtilizationChart::build(&[], &Settings::default()).unwrap_err();
        assert!(matches!(err, PlanError::EmptyInput));
    }
}
