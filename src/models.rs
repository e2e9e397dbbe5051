use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

/// Fixed input date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A CSV field after type coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(u128),
    Date(NaiveDate),
    Text(String),
}

impl Value {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One imported row, keyed by header name.
pub type Record = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Complete,
    Working,
    Proposed,
    Unknown(String),
}

impl Status {
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        match s.to_ascii_lowercase().as_str() {
            "complete" => Self::Complete,
            "working" => Self::Working,
            "proposed" => Self::Proposed,
            _ => Self::Unknown(s.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Complete => "complete",
            Self::Working => "working",
            Self::Proposed => "proposed",
            Self::Unknown(s) => s,
        }
    }

    pub fn is_proposed(&self) -> bool {
        matches!(self, Self::Proposed)
    }
}

#[derive(Debug, Clone)]
pub struct Task {
    pub project: String,
    pub owner: String,
    pub status: Status,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub budget: f64,
    pub spend: f64,
    pub rate: f64,
}

#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub budget: f64,
    pub spend: f64,
    pub status: Status,
}
