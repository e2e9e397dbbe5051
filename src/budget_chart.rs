//! Stacked budget timeline with a monthly funded-vs-bid histogram below it.

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::aggregate::months_between;
use crate::chart::{spend_color, status_color, DateScale, Frame, LinearScale, Page, Rgb, PAGE_W};
use crate::error::{PlanError, Result};
use crate::fmt::thousands;
use crate::models::{Project, Status};
use crate::settings::Settings;

const MARGIN_LEFT: f32 = 15.0;
const MARGIN_RIGHT: f32 = 8.0;
const TIMELINE_TOP: f32 = 18.0;
const TIMELINE_H: f32 = 115.0;
const MONTHLY_TOP: f32 = 142.0;
const MONTHLY_H: f32 = 36.0;
const LABEL_SIZE: f32 = 4.5;
const AXIS_SIZE: f32 = 7.0;
const Y_TICKS: usize = 4;

/// One project's horizontal band on the timeline.
#[derive(Debug, Clone)]
pub struct Band {
    pub name: String,
    pub status: Status,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Sum of the monthly rates of every band below this one.
    pub bottom: f64,
    /// This project's monthly rate.
    pub height: f64,
    pub spend_fraction: f64,
    pub labeled: bool,
}

impl Band {
    pub fn days(&self) -> f64 {
        (self.end - self.start).num_days() as f64
    }

    pub fn spend_days(&self) -> f64 {
        self.days() * self.spend_fraction
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthBin {
    pub month: NaiveDate,
    pub funded: f64,
    pub proposed: f64,
}

impl MonthBin {
    pub fn total(&self) -> f64 {
        self.funded + self.proposed
    }
}

#[derive(Debug, Clone)]
pub struct BudgetChart {
    pub bands: Vec<Band>,
    pub months: Vec<MonthBin>,
    pub total_rate: f64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub as_of: NaiveDate,
    pub today: NaiveDate,
}

pub fn first_of_month(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

pub fn first_of_next_month(d: NaiveDate) -> NaiveDate {
    let (y, m) = if d.month() == 12 {
        (d.year() + 1, 1)
    } else {
        (d.year(), d.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(NaiveDate::MAX)
}

impl BudgetChart {
    /// Lay out `projects` (ascending start order) as stacked bands.
    pub fn build(
        projects: &[Project],
        as_of: NaiveDate,
        today: NaiveDate,
        settings: &Settings,
    ) -> Result<Self> {
        let start = projects.iter().map(|p| p.start).min().ok_or(PlanError::EmptyInput)?;
        let end = projects.iter().map(|p| p.end).max().ok_or(PlanError::EmptyInput)?;
        let total_rate: f64 = projects.iter().map(Project::monthly_rate).sum();
        let label_floor = settings.label_min_share * total_rate;

        let mut bottom = 0.0;
        let bands: Vec<Band> = projects
            .iter()
            .map(|p| {
                let height = p.monthly_rate();
                let band = Band {
                    name: p.name.clone(),
                    status: p.status.clone(),
                    start: p.start,
                    end: p.end,
                    bottom,
                    height,
                    spend_fraction: p.spend_fraction(),
                    labeled: height > label_floor,
                };
                bottom += height;
                band
            })
            .collect();

        let months = monthly_bins(projects, start, end);
        debug!(
            bands = bands.len(),
            months = months.len(),
            total_rate,
            "built budget chart"
        );

        Ok(Self {
            bands,
            months,
            total_rate,
            start,
            end,
            as_of,
            today,
        })
    }

    pub fn title(&self) -> String {
        format!(
            "Plot created on {} with spend data from {}",
            self.today.format("%Y-%m-%d"),
            self.as_of.format("%Y-%m-%d")
        )
    }

    pub fn render(&self) -> Page {
        let mut page = Page::new("Budget");
        let width = PAGE_W - MARGIN_LEFT - MARGIN_RIGHT;
        let timeline = Frame {
            x: MARGIN_LEFT,
            y: TIMELINE_TOP,
            w: width,
            h: TIMELINE_H,
        };
        let monthly = Frame {
            x: MARGIN_LEFT,
            y: MONTHLY_TOP,
            w: width,
            h: MONTHLY_H,
        };
        let xs = DateScale::new(self.start, self.end, (timeline.x, timeline.right()));

        page.text(self.title(), MARGIN_LEFT + width / 2.0 - 45.0, 11.0, 10.0, Rgb::BLACK, false);
        self.draw_timeline(&mut page, &timeline, &xs);
        self.draw_monthly(&mut page, &monthly, &xs);
        draw_year_ticks(&mut page, &monthly, &xs, self.start, self.end);
        page
    }

    fn draw_timeline(&self, page: &mut Page, frame: &Frame, xs: &DateScale) {
        let ys = LinearScale::new((0.0, self.total_rate), (frame.bottom(), frame.y));

        for band in &self.bands {
            let x = xs.map(band.start);
            let top = ys.map(band.bottom + band.height);
            let h = ys.map(band.bottom) - top;
            page.rect(x, top, xs.width(band.days()), h, status_color(&band.status), Some(Rgb::WHITE));
            page.rect(
                x,
                top,
                xs.width(band.spend_days()),
                h,
                spend_color(&band.status),
                Some(Rgb::WHITE),
            );
            if band.labeled {
                let y = ys.map(band.bottom + 0.005 * self.total_rate);
                page.text(format!(" {}", band.name), x, y - 0.5, LABEL_SIZE, Rgb::WHITE, false);
            }
        }

        if xs.contains(self.today) {
            let x = xs.map(self.today);
            page.line(x, frame.y, x, frame.bottom(), Rgb::RED, 0.8, true);
        }

        let legend = [
            ("Complete", Status::Complete),
            ("Working", Status::Working),
            ("Proposed", Status::Proposed),
        ];
        for (i, (label, status)) in legend.iter().enumerate() {
            let y = frame.y + 3.0 + i as f32 * 4.5;
            page.rect(frame.x + 2.0, y, 5.0, 3.0, status_color(status), Some(Rgb::WHITE));
            page.text(*label, frame.x + 8.5, y + 2.6, AXIS_SIZE, Rgb::BLACK, false);
        }
    }

    fn draw_monthly(&self, page: &mut Page, frame: &Frame, xs: &DateScale) {
        let peak = self.months.iter().map(MonthBin::total).fold(0.0, f64::max);
        let ys = LinearScale::new((0.0, peak), (frame.bottom(), frame.y));

        for bin in &self.months {
            let x0 = xs.map_clamped(bin.month);
            let x1 = xs.map_clamped(first_of_next_month(bin.month));
            let funded_top = ys.map(bin.funded);
            page.rect(x0, funded_top, x1 - x0, frame.bottom() - funded_top, Rgb::GRAY, Some(Rgb::WHITE));
            let total_top = ys.map(bin.total());
            page.rect(x0, total_top, x1 - x0, funded_top - total_top, Rgb::DARK_GRAY, Some(Rgb::WHITE));
        }

        page.line(frame.x, frame.bottom(), frame.right(), frame.bottom(), Rgb::BLACK, 0.3, false);
        page.line(frame.x, frame.y, frame.x, frame.bottom(), Rgb::BLACK, 0.3, false);
        for i in 0..=Y_TICKS {
            let v = peak * i as f64 / Y_TICKS as f64;
            let y = ys.map(v);
            page.line(frame.x - 1.0, y, frame.x, y, Rgb::BLACK, 0.3, false);
            page.text(thousands(v), frame.x - 7.0, y + 1.0, AXIS_SIZE, Rgb::BLACK, false);
        }
        page.text("Monthly Spend (k$)", frame.x - 12.0, frame.y - 2.5, AXIS_SIZE, Rgb::BLACK, false);

        for (i, (label, color)) in [("Funded", Rgb::GRAY), ("Bid", Rgb::DARK_GRAY)].iter().enumerate() {
            let y = frame.y + 1.0 + i as f32 * 4.5;
            page.rect(frame.x + 2.0, y, 5.0, 3.0, *color, None);
            page.text(*label, frame.x + 8.5, y + 2.6, AXIS_SIZE, Rgb::BLACK, false);
        }
    }
}

/// Monthly funded/proposed totals from the earliest start month through the
/// latest end month. A project counts toward a month when it is running on
/// the first day of that month.
pub fn monthly_bins(projects: &[Project], start: NaiveDate, end: NaiveDate) -> Vec<MonthBin> {
    let count = months_between(start, end).max(0) as usize + 1;
    let mut month = first_of_month(start);
    let mut bins = Vec::with_capacity(count);
    for _ in 0..count {
        let mut bin = MonthBin {
            month,
            funded: 0.0,
            proposed: 0.0,
        };
        for p in projects.iter().filter(|p| p.start <= month && p.end > month) {
            if p.status.is_proposed() {
                bin.proposed += p.monthly_rate();
            } else {
                bin.funded += p.monthly_rate();
            }
        }
        bins.push(bin);
        month = first_of_next_month(month);
    }
    bins
}

fn draw_year_ticks(page: &mut Page, frame: &Frame, xs: &DateScale, start: NaiveDate, end: NaiveDate) {
    for year in start.year()..=end.year() + 1 {
        let Some(jan) = NaiveDate::from_ymd_opt(year, 1, 1) else {
            continue;
        };
        if !xs.contains(jan) {
            continue;
        }
        let x = xs.map(jan);
        page.line(x, frame.bottom(), x, frame.bottom() + 1.5, Rgb::BLACK, 0.3, false);
        page.text(year.to_string(), x - 3.0, frame.bottom() + 5.0, AXIS_SIZE, Rgb::BLACK, false);
    }
}
