use chrono::NaiveDate;

use crate::models::Status;

// Landscape 10 x 7.5 in (mm)
pub const PAGE_W: f32 = 254.0;
pub const PAGE_H: f32 = 190.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const GRAY: Rgb = Rgb(128, 128, 128);
    pub const DARK_GRAY: Rgb = Rgb(169, 169, 169);
    pub const LIGHT_GRAY: Rgb = Rgb(211, 211, 211);
    pub const DODGER_BLUE: Rgb = Rgb(30, 144, 255);
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    pub const GREEN: Rgb = Rgb(0, 128, 0);
    pub const DARK_GREEN: Rgb = Rgb(0, 100, 0);
    pub const ORANGE: Rgb = Rgb(255, 165, 0);
    pub const DARK_ORANGE: Rgb = Rgb(255, 140, 0);

    /// Components scaled to `0.0..=1.0`.
    pub fn unit(self) -> (f32, f32, f32) {
        (
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        )
    }
}

/// Budget bar fill for a status.
pub fn status_color(status: &Status) -> Rgb {
    match status {
        Status::Complete => Rgb::DODGER_BLUE,
        Status::Working => Rgb::GREEN,
        Status::Proposed => Rgb::ORANGE,
        Status::Unknown(_) => Rgb::GRAY,
    }
}

/// Spend overlay fill for a status.
pub fn spend_color(status: &Status) -> Rgb {
    match status {
        Status::Complete => Rgb::BLUE,
        Status::Working => Rgb::DARK_GREEN,
        Status::Proposed => Rgb::DARK_ORANGE,
        Status::Unknown(_) => Rgb::GRAY,
    }
}

/// A drawing primitive in page millimetres, origin at the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fill: Rgb,
        stroke: Option<Rgb>,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: Rgb,
        width: f32,
        dashed: bool,
    },
    Text {
        x: f32,
        y: f32,
        text: String,
        size: f32,
        color: Rgb,
        bold: bool,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub title: String,
    pub shapes: Vec<Shape>,
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            shapes: Vec::new(),
        }
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: Rgb, stroke: Option<Rgb>) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        self.shapes.push(Shape::Rect { x, y, w, h, fill, stroke });
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Rgb, width: f32, dashed: bool) {
        self.shapes.push(Shape::Line {
            x1,
            y1,
            x2,
            y2,
            color,
            width,
            dashed,
        });
    }

    pub fn text(&mut self, s: impl Into<String>, x: f32, y: f32, size: f32, color: Rgb, bold: bool) {
        self.shapes.push(Shape::Text {
            x,
            y,
            text: s.into(),
            size,
            color,
            bold,
        });
    }

    #[cfg(test)]
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Plot area inside a page, in page millimetres.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Frame {
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }
}

/// Linear map from a data domain onto a page range.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    d0: f64,
    d1: f64,
    r0: f32,
    r1: f32,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f32, f32)) -> Self {
        Self {
            d0: domain.0,
            d1: domain.1,
            r0: range.0,
            r1: range.1,
        }
    }

    pub fn map(&self, v: f64) -> f32 {
        let span = self.d1 - self.d0;
        if span == 0.0 {
            return self.r0;
        }
        let t = (v - self.d0) / span;
        self.r0 + (self.r1 - self.r0) * t as f32
    }

    /// Like `map`, but pinned to the range ends.
    pub fn map_clamped(&self, v: f64) -> f32 {
        let (lo, hi) = if self.d0 <= self.d1 {
            (self.d0, self.d1)
        } else {
            (self.d1, self.d0)
        };
        self.map(v.clamp(lo, hi))
    }

    pub fn contains(&self, v: f64) -> bool {
        let (lo, hi) = if self.d0 <= self.d1 {
            (self.d0, self.d1)
        } else {
            (self.d1, self.d0)
        };
        (lo..=hi).contains(&v)
    }
}

/// Linear scale over calendar days.
#[derive(Debug, Clone, Copy)]
pub struct DateScale {
    origin: NaiveDate,
    inner: LinearScale,
}

impl DateScale {
    pub fn new(start: NaiveDate, end: NaiveDate, range: (f32, f32)) -> Self {
        let days = (end - start).num_days() as f64;
        Self {
            origin: start,
            inner: LinearScale::new((0.0, days), range),
        }
    }

    fn offset(&self, d: NaiveDate) -> f64 {
        (d - self.origin).num_days() as f64
    }

    pub fn map(&self, d: NaiveDate) -> f32 {
        self.inner.map(self.offset(d))
    }

    pub fn map_clamped(&self, d: NaiveDate) -> f32 {
        self.inner.map_clamped(self.offset(d))
    }

    pub fn contains(&self, d: NaiveDate) -> bool {
        self.inner.contains(self.offset(d))
    }

    /// Page width covered by `days` days.
    pub fn width(&self, days: f64) -> f32 {
        self.inner.map(days) - self.inner.map(0.0)
    }
}
