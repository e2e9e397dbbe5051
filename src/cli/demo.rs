use std::io::Write;
use std::path::Path;

use crate::error::Result;

struct DemoTask {
    project: &'static str,
    owner: &'static str,
    status: &'static str,
    /// Offsets in years from the base year, plus month and day.
    start: (i32, u32, u32),
    end: (i32, u32, u32),
    budget: u32,
    spend: u32,
    rate: u32,
}

const TASKS: &[DemoTask] = &[
    DemoTask { project: "Sourdough Supply", owner: "Alice", status: "complete", start: (-1, 1, 1), end: (-1, 9, 1), budget: 120000, spend: 118000, rate: 95 },
    DemoTask { project: "Sourdough Supply", owner: "Bob", status: "complete", start: (-1, 3, 1), end: (-1, 9, 1), budget: 60000, spend: 61000, rate: 80 },
    DemoTask { project: "Pickle Program", owner: "Carol", status: "working", start: (-1, 6, 1), end: (0, 6, 1), budget: 150000, spend: 90000, rate: 110 },
    DemoTask { project: "Pickle Program", owner: "Alice", status: "working", start: (-1, 10, 1), end: (0, 10, 1), budget: 95000, spend: 40000, rate: 95 },
    DemoTask { project: "Mustard Research", owner: "Dmitri", status: "working", start: (0, 1, 1), end: (0, 12, 1), budget: 80000, spend: 30000, rate: 100 },
    DemoTask { project: "Mustard Research", owner: "Bob", status: "working", start: (0, 2, 1), end: (0, 8, 1), budget: 45000, spend: 20000, rate: 80 },
    DemoTask { project: "Lettuce Logistics", owner: "Carol", status: "working", start: (0, 3, 1), end: (1, 3, 1), budget: 110000, spend: 25000, rate: 110 },
    DemoTask { project: "Deli Expansion", owner: "Alice", status: "proposed", start: (0, 9, 1), end: (1, 9, 1), budget: 200000, spend: 0, rate: 95 },
    DemoTask { project: "Deli Expansion", owner: "Dmitri", status: "proposed", start: (1, 1, 1), end: (1, 12, 1), budget: 90000, spend: 0, rate: 100 },
    DemoTask { project: "Catering Pilot", owner: "Bob", status: "proposed", start: (1, 2, 1), end: (1, 5, 1), budget: 8000, spend: 0, rate: 80 },
    DemoTask { project: "Menu Refresh", owner: "Erin", status: "", start: (0, 4, 1), end: (0, 7, 1), budget: 5000, spend: 0, rate: 70 },
];

/// Sample task list spanning the year before and after `base_year`.
pub fn sample_csv(base_year: i32) -> String {
    let mut out = String::from("project,owner,status,start,end,budget,spend,rate\n");
    for t in TASKS {
        let (sy, sm, sd) = t.start;
        let (ey, em, ed) = t.end;
        out.push_str(&format!(
            "{},{},{},{:04}-{sm:02}-{sd:02},{:04}-{em:02}-{ed:02},{},{},{}\n",
            t.project,
            t.owner,
            t.status,
            base_year + sy,
            base_year + ey,
            t.budget,
            t.spend,
            t.rate,
        ));
    }
    out
}

/// Write the sample task list to `path`. Never overwrites an existing file.
pub fn write_sample(path: &Path, base_year: i32) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    file.write_all(sample_csv(base_year).as_bytes())?;
    println!("Wrote sample tasks to {}", path.display());
    Ok(())
}
