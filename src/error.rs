use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Row {row}: invalid {field} value {value:?}")]
    InvalidField {
        row: usize,
        field: String,
        value: String,
    },

    #[error("Row {row}: end date {end} precedes start date {start}")]
    InvalidRange {
        row: usize,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("Row {row}: task for {project} ({owner}) has non-positive rate {rate}")]
    InvalidRate {
        row: usize,
        project: String,
        owner: String,
        rate: f64,
    },

    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("No tasks with a status found in input")]
    EmptyInput,
}

pub type Result<T> = std::result::Result<T, PlanError>;
