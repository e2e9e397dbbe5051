use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{PlanError, Result};
use crate::models::{Record, Status, Task, Value, DATE_FORMAT};

/// Columns every task file must name in its header.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "project", "owner", "status", "start", "end", "budget", "spend", "rate",
];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Coerce one raw field: all digits → Int, `YYYY-MM-DD` → Date, else Text.
/// A date that doesn't match the fixed format stays text.
pub fn coerce_field(raw: &str) -> Value {
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(i) = raw.parse::<u128>() {
            return Value::Int(i);
        }
    }
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(d) => Value::Date(d),
        Err(_) => Value::Text(raw.to_string()),
    }
}

/// Parse a currency amount such as `$1,234.56` or `(500.00)`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    let value = if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        -inner.trim().parse::<f64>().ok()?
    } else {
        s.parse::<f64>().ok()?
    };
    value.is_finite().then_some(value)
}

// ---------------------------------------------------------------------------
// Record import
// ---------------------------------------------------------------------------

/// An imported row with its line number in the source file.
#[derive(Debug, Clone)]
pub struct Row {
    pub line: usize,
    pub fields: Record,
}

impl Row {
    fn start(&self) -> Option<NaiveDate> {
        self.fields.get("start").and_then(Value::as_date)
    }

    fn has_status(&self) -> bool {
        self.fields.get("status").is_some_and(|v| !v.is_blank())
    }
}

pub struct Import {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    pub dropped: usize,
}

/// Read delimited text into typed rows. Rows without a status are dropped;
/// the rest are ordered by start date, undated rows last.
pub fn import_records<R: Read>(reader: R) -> Result<Import> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(i + 2);
        let fields: Record = headers
            .iter()
            .zip(record.iter())
            .map(|(h, f)| (h.clone(), coerce_field(f)))
            .collect();
        let row = Row { line, fields };
        if !row.has_status() {
            dropped += 1;
            continue;
        }
        rows.push(row);
    }
    rows.sort_by_key(|r| (r.start().is_none(), r.start()));
    debug!(kept = rows.len(), dropped, "imported records");

    Ok(Import {
        headers,
        rows,
        dropped,
    })
}

// ---------------------------------------------------------------------------
// Record → Task
// ---------------------------------------------------------------------------

fn invalid(row: &Row, field: &str) -> PlanError {
    PlanError::InvalidField {
        row: row.line,
        field: field.to_string(),
        value: row.fields.get(field).map(Value::to_string).unwrap_or_default(),
    }
}

fn text_field(row: &Row, field: &str) -> Result<String> {
    match row.fields.get(field) {
        Some(v) if !v.is_blank() => Ok(v.to_string()),
        _ => Err(invalid(row, field)),
    }
}

fn date_field(row: &Row, field: &str) -> Result<NaiveDate> {
    row.fields
        .get(field)
        .and_then(Value::as_date)
        .ok_or_else(|| invalid(row, field))
}

fn amount_field(row: &Row, field: &str) -> Result<f64> {
    match row.fields.get(field) {
        Some(Value::Int(i)) => Ok(*i as f64),
        Some(Value::Text(s)) => parse_amount(s).ok_or_else(|| invalid(row, field)),
        _ => Err(invalid(row, field)),
    }
}

pub fn task_from_row(row: &Row) -> Result<Task> {
    let start = date_field(row, "start")?;
    let end = date_field(row, "end")?;
    if end < start {
        return Err(PlanError::InvalidRange {
            row: row.line,
            start,
            end,
        });
    }
    let project = text_field(row, "project")?;
    let owner = text_field(row, "owner")?;
    let rate = amount_field(row, "rate")?;
    if rate <= 0.0 {
        return Err(PlanError::InvalidRate {
            row: row.line,
            project,
            owner,
            rate,
        });
    }
    Ok(Task {
        status: Status::parse(&text_field(row, "status")?),
        start,
        end,
        budget: amount_field(row, "budget")?,
        spend: amount_field(row, "spend")?,
        rate,
        project,
        owner,
    })
}

pub fn tasks_from_import(import: &Import) -> Result<Vec<Task>> {
    for col in REQUIRED_COLUMNS {
        if !import.headers.iter().any(|h| h == col) {
            return Err(PlanError::MissingColumn(col.to_string()));
        }
    }
    import.rows.iter().map(task_from_row).collect()
}

pub fn import_tasks(file_path: &Path) -> Result<Vec<Task>> {
    let file = std::fs::File::open(file_path)?;
    let import = import_records(std::io::BufReader::new(file))?;
    tasks_from_import(&import)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "project,owner,status,start,end,budget,spend,rate\n";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn import_str(content: &str) -> Import {
        import_records(content.as_bytes()).unwrap()
    }

    #[test]
    fn test_coerce_field_digits_become_int() {
        assert_eq!(coerce_field("6000"), Value::Int(6000));
        assert_eq!(coerce_field("0"), Value::Int(0));
        assert_eq!(coerce_field("007"), Value::Int(7));
        assert_eq!(
            coerce_field("99999999999999999999"),
            Value::Int(99_999_999_999_999_999_999)
        );
    }

    #[test]
    fn test_coerce_field_dates() {
        assert_eq!(coerce_field("2024-01-01"), Value::Date(date(2024, 1, 1)));
        assert_eq!(coerce_field("2024-02-29"), Value::Date(date(2024, 2, 29)));
    }

    #[test]
    fn test_coerce_field_falls_back_to_text() {
        assert_eq!(coerce_field("2024-13-01"), Value::Text("2024-13-01".into()));
        assert_eq!(coerce_field("01/15/2024"), Value::Text("01/15/2024".into()));
        assert_eq!(coerce_field("12.5"), Value::Text("12.5".into()));
        assert_eq!(coerce_field("-5"), Value::Text("-5".into()));
        assert_eq!(coerce_field(""), Value::Text(String::new()));
    }

    #[test]
    fn test_coerce_field_is_stable_on_typed_output() {
        for raw in ["6000", "2024-06-01", "working", "Alice", "12.5", ""] {
            let once = coerce_field(raw);
            let twice = coerce_field(&once.to_string());
            assert_eq!(once, twice, "re-import changed {raw:?}");
        }
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("$500"), Some(500.0));
        assert_eq!(parse_amount("(50.00)"), Some(-50.0));
        assert_eq!(parse_amount("n/a"), None);
        assert_eq!(parse_amount("NaN"), None);
    }

    #[test]
    fn test_import_drops_rows_without_status() {
        let content = format!(
            "{HEADER}A,Alice,,2024-01-01,2024-06-01,6000,3000,100\n\
             B,Bob,working,2024-02-01,2024-06-01,4000,1000,100\n\
             C,Carol,   ,2024-01-01,2024-06-01,6000,3000,100\n"
        );
        let import = import_str(&content);
        assert_eq!(import.rows.len(), 1);
        assert_eq!(import.dropped, 2);
        assert_eq!(import.rows[0].fields["project"], Value::Text("B".into()));
    }

    #[test]
    fn test_import_drops_rows_missing_status_column() {
        let content = "project,owner,start\nA,Alice,2024-01-01\n";
        let import = import_str(content);
        assert!(import.rows.is_empty());
        assert_eq!(import.dropped, 1);
    }

    #[test]
    fn test_import_sorts_by_start_with_undated_last() {
        let content = format!(
            "{HEADER}Late,Alice,working,2024-09-01,2024-12-01,1,0,1\n\
             Bad,Alice,working,soon,2024-12-01,1,0,1\n\
             Early,Alice,working,2023-01-01,2024-12-01,1,0,1\n"
        );
        let import = import_str(&content);
        let names: Vec<String> = import
            .rows
            .iter()
            .map(|r| r.fields["project"].to_string())
            .collect();
        assert_eq!(names, vec!["Early", "Late", "Bad"]);
    }

    #[test]
    fn test_import_tracks_line_numbers() {
        let content = format!(
            "{HEADER}B,Bob,working,2024-02-01,2024-06-01,4000,1000,100\n\
             A,Alice,working,2024-01-01,2024-06-01,6000,3000,100\n"
        );
        let import = import_str(&content);
        assert_eq!(import.rows[0].line, 3);
        assert_eq!(import.rows[1].line, 2);
    }

    #[test]
    fn test_tasks_from_import_builds_typed_tasks() {
        let content = format!(
            "{HEADER}A,Alice,working,2024-01-01,2024-06-01,6000,3000,100\n\
             B,Bob,Proposed,2024-02-01,2024-07-01,\"$4,500.50\",0,85.5\n"
        );
        let tasks = tasks_from_import(&import_str(&content)).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].project, "A");
        assert_eq!(tasks[0].status, Status::Working);
        assert_eq!(tasks[0].budget, 6000.0);
        assert_eq!((tasks[0].end - tasks[0].start).num_days(), 152);
        assert_eq!(tasks[1].status, Status::Proposed);
        assert_eq!(tasks[1].budget, 4500.5);
        assert_eq!(tasks[1].rate, 85.5);
    }

    #[test]
    fn test_numeric_project_name_kept_as_text() {
        let content = format!("{HEADER}2024,Alice,working,2024-01-01,2024-06-01,1,0,1\n");
        let tasks = tasks_from_import(&import_str(&content)).unwrap();
        assert_eq!(tasks[0].project, "2024");
    }

    #[test]
    fn test_missing_column_is_reported() {
        let content = "project,owner,status,start,end,budget,spend\n";
        let err = tasks_from_import(&import_str(content)).unwrap_err();
        assert!(matches!(err, PlanError::MissingColumn(c) if c == "rate"));
    }

    #[test]
    fn test_malformed_date_rejected_at_task_level() {
        let content = format!("{HEADER}A,Alice,working,2024/01/01,2024-06-01,6000,3000,100\n");
        let import = import_str(&content);
        assert_eq!(
            import.rows[0].fields["start"],
            Value::Text("2024/01/01".into())
        );
        let err = tasks_from_import(&import).unwrap_err();
        match err {
            PlanError::InvalidField { row, field, value } => {
                assert_eq!(row, 2);
                assert_eq!(field, "start");
                assert_eq!(value, "2024/01/01");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_end_before_start_rejected() {
        let content = format!("{HEADER}A,Alice,working,2024-06-01,2024-01-01,6000,3000,100\n");
        let err = tasks_from_import(&import_str(&content)).unwrap_err();
        assert!(matches!(err, PlanError::InvalidRange { row: 2, .. }));
    }

    #[test]
    fn test_zero_rate_rejected() {
        let content = format!("{HEADER}A,Alice,working,2024-01-01,2024-06-01,6000,3000,0\n");
        let err = tasks_from_import(&import_str(&content)).unwrap_err();
        assert!(matches!(err, PlanError::InvalidRate { ref project, .. } if project == "A"));
    }

    #[test]
    fn test_import_tasks_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.csv");
        std::fs::write(
            &path,
            format!("{HEADER}A, Alice , working ,2024-01-01,2024-06-01,6000,3000,100\n"),
        )
        .unwrap();
        let tasks = import_tasks(&path).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].owner, "Alice");
        assert_eq!(tasks[0].status, Status::Working);
    }

    #[test]
    fn test_import_tasks_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = import_tasks(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, PlanError::Io(_)));
    }
}
