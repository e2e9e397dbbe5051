use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use tracing::warn;

use crate::models::{Project, Task};

/// Calendar months between two dates, ignoring the day of month.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32
}

impl Project {
    /// Months used to spread the budget. A project that starts and ends in
    /// the same calendar month counts as one month.
    pub fn billing_months(&self) -> i32 {
        months_between(self.start, self.end).max(1)
    }

    pub fn monthly_rate(&self) -> f64 {
        self.budget / self.billing_months() as f64
    }

    /// Share of the budget already spent, clamped to `[0, 1]`.
    pub fn spend_fraction(&self) -> f64 {
        if self.budget <= 0.0 {
            return 0.0;
        }
        (self.spend / self.budget).clamp(0.0, 1.0)
    }
}

/// Group tasks by project id. Results are ordered by start date, then name.
///
/// A project's status is taken from its most recent task: latest end date,
/// then latest start, then whichever comes last in `tasks`.
pub fn aggregate_projects(tasks: &[Task]) -> Vec<Project> {
    let mut groups: BTreeMap<&str, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        groups.entry(task.project.as_str()).or_default().push(task);
    }

    let mut projects: Vec<Project> = groups
        .into_iter()
        .filter_map(|(name, group)| {
            let latest = group.iter().copied().max_by_key(|t| (t.end, t.start))?;
            let project = Project {
                name: name.to_string(),
                start: group.iter().map(|t| t.start).min()?,
                end: group.iter().map(|t| t.end).max()?,
                budget: group.iter().map(|t| t.budget).sum(),
                spend: group.iter().map(|t| t.spend).sum(),
                status: latest.status.clone(),
            };
            if months_between(project.start, project.end) < 1 {
                warn!(
                    project = %project.name,
                    "project starts and ends in the same month; spreading budget over one month"
                );
            }
            if project.spend > project.budget {
                warn!(
                    project = %project.name,
                    budget = project.budget,
                    spend = project.spend,
                    "spend exceeds budget"
                );
            }
            Some(project)
        })
        .collect();

    projects.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.name.cmp(&b.name)));
    projects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(project: &str, status: Status, start: NaiveDate, end: NaiveDate, budget: f64) -> Task {
        Task {
            project: project.to_string(),
            owner: "Alice".to_string(),
            status,
            start,
            end,
            budget,
            spend: budget / 2.0,
            rate: 100.0,
        }
    }

    #[test]
    fn test_months_between() {
        assert_eq!(months_between(date(2024, 1, 1), date(2024, 6, 1)), 5);
        assert_eq!(months_between(date(2023, 11, 30), date(2024, 2, 1)), 3);
        assert_eq!(months_between(date(2024, 3, 1), date(2024, 3, 31)), 0);
    }

    #[test]
    fn test_single_task_monthly_rate_and_spend_fraction() {
        let tasks = vec![Task {
            project: "A".into(),
            owner: "Alice".into(),
            status: Status::Working,
            start: date(2024, 1, 1),
            end: date(2024, 6, 1),
            budget: 6000.0,
            spend: 3000.0,
            rate: 100.0,
        }];
        let projects = aggregate_projects(&tasks);
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].monthly_rate(), 1200.0);
        assert_eq!(projects[0].spend_fraction(), 0.5);
    }

    #[test]
    fn test_same_month_project_uses_one_month() {
        let tasks = vec![task("A", Status::Working, date(2024, 3, 1), date(2024, 3, 15), 900.0)];
        let p = &aggregate_projects(&tasks)[0];
        assert_eq!(p.billing_months(), 1);
        assert_eq!(p.monthly_rate(), 900.0);
        assert!(p.monthly_rate().is_finite());
    }

    #[test]
    fn test_aggregate_min_max_sum() {
        let tasks = vec![
            task("A", Status::Working, date(2024, 2, 1), date(2024, 5, 1), 1000.0),
            task("A", Status::Working, date(2024, 1, 15), date(2024, 4, 1), 2500.0),
            task("B", Status::Proposed, date(2024, 6, 1), date(2024, 9, 1), 300.0),
            task("A", Status::Complete, date(2024, 3, 1), date(2024, 8, 1), 500.0),
        ];
        let projects = aggregate_projects(&tasks);
        assert_eq!(projects.len(), 2);
        let a = &projects[0];
        assert_eq!(a.name, "A");
        assert_eq!(a.start, date(2024, 1, 15));
        assert_eq!(a.end, date(2024, 8, 1));
        assert_eq!(a.budget, 4000.0);
        assert_eq!(a.spend, 2000.0);
        assert_eq!(projects[1].name, "B");
    }

    #[test]
    fn test_budget_invariant_under_reordering() {
        let mut tasks = vec![
            task("A", Status::Working, date(2024, 2, 1), date(2024, 5, 1), 1000.0),
            task("A", Status::Working, date(2024, 1, 15), date(2024, 4, 1), 2500.25),
            task("A", Status::Complete, date(2024, 3, 1), date(2024, 8, 1), 500.5),
        ];
        let forward = aggregate_projects(&tasks)[0].budget;
        tasks.reverse();
        let backward = aggregate_projects(&tasks)[0].budget;
        tasks.swap(0, 1);
        let shuffled = aggregate_projects(&tasks)[0].budget;
        assert_eq!(forward, 4000.75);
        assert_eq!(forward, backward);
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn test_status_comes_from_most_recent_task() {
        let tasks = vec![
            task("A", Status::Complete, date(2024, 1, 1), date(2024, 3, 1), 100.0),
            task("A", Status::Proposed, date(2024, 2, 1), date(2024, 9, 1), 100.0),
            task("A", Status::Working, date(2024, 4, 1), date(2024, 6, 1), 100.0),
        ];
        assert_eq!(aggregate_projects(&tasks)[0].status, Status::Proposed);

        // Same end date: the later start wins regardless of input order.
        let tasks = vec![
            task("B", Status::Working, date(2024, 5, 1), date(2024, 9, 1), 100.0),
            task("B", Status::Complete, date(2024, 1, 1), date(2024, 9, 1), 100.0),
        ];
        assert_eq!(aggregate_projects(&tasks)[0].status, Status::Working);
    }

    #[test]
    fn test_spend_fraction_guards() {
        let mut p = aggregate_projects(&[task(
            "A",
            Status::Working,
            date(2024, 1, 1),
            date(2024, 6, 1),
            0.0,
        )])
        .remove(0);
        assert_eq!(p.spend_fraction(), 0.0);
        p.budget = 100.0;
        p.spend = 250.0;
        assert_eq!(p.spend_fraction(), 1.0);
    }

    #[test]
    fn test_projects_sorted_by_start() {
        let tasks = vec![
            task("Z", Status::Working, date(2023, 1, 1), date(2023, 6, 1), 1.0),
            task("M", Status::Working, date(2024, 1, 1), date(2024, 6, 1), 1.0),
            task("A", Status::Working, date(2024, 1, 1), date(2024, 6, 1), 1.0),
        ];
        let names: Vec<String> = aggregate_projects(&tasks).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Z", "A", "M"]);
    }
}
