//! Year-fraction arithmetic shared by both charts.
//!
//! A full calendar year counts as [`DAYS_PER_YEAR`] days regardless of leap
//! years, so an interval that spans an entire leap year loses one day of
//! weight. Partial years are measured in real days against `[Jan 1, Jan 1)`.

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};

use crate::models::Task;

pub const DAYS_PER_YEAR: f64 = 365.0;

fn jan_first(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MAX)
}

/// Fraction of `[start, end)` that falls inside `year`, in `[0, 1]`.
pub fn year_fraction(start: NaiveDate, end: NaiveDate, year: i32) -> f64 {
    let year_start = jan_first(year);
    let next_year = jan_first(year + 1);
    let total = (end - start).num_days();

    if total <= 0 {
        return if start.year() == year { 1.0 } else { 0.0 };
    }
    if end <= year_start || start >= next_year {
        return 0.0;
    }

    let total = total as f64;
    let starts_before = start < year_start;
    let fraction = if starts_before && end >= next_year {
        DAYS_PER_YEAR / total
    } else if starts_before {
        (end - year_start).num_days() as f64 / total
    } else if end > next_year {
        (next_year - start).num_days() as f64 / total
    } else {
        1.0
    };
    fraction.clamp(0.0, 1.0)
}

pub fn task_year_fraction(task: &Task, year: i32) -> f64 {
    year_fraction(task.start, task.end, year)
}

/// Calendar years from the earliest task start to the latest task end.
pub fn years_spanned(tasks: &[Task]) -> Option<RangeInclusive<i32>> {
    let first = tasks.iter().map(|t| t.start.year()).min()?;
    let last = tasks.iter().map(|t| t.end.year()).max()?;
    Some(first..=last)
}
