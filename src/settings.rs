use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PlanError, Result};

pub const DEFAULT_INPUT: &str = "./testTasks.csv";
pub const DEFAULT_OUTPUT: &str = "./testOutput.pdf";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_report_title")]
    pub report_title: String,
    /// Yearly hours one person can carry before a cell is overallocated.
    #[serde(default = "default_capacity_hours")]
    pub capacity_hours: f64,
    /// Top of each utilization cell's vertical axis.
    #[serde(default = "default_hours_axis_max")]
    pub hours_axis_max: f64,
    #[serde(default = "default_label_min_hours")]
    pub label_min_hours: f64,
    /// Minimum share of the total monthly rate for a budget band to get a label.
    #[serde(default = "default_label_min_share")]
    pub label_min_share: f64,
    #[serde(default = "default_input")]
    pub default_input: String,
    #[serde(default = "default_output")]
    pub default_output: String,
}

fn default_report_title() -> String {
    "Program Budget".to_string()
}

fn default_capacity_hours() -> f64 {
    2000.0
}

fn default_hours_axis_max() -> f64 {
    2500.0
}

fn default_label_min_hours() -> f64 {
    200.0
}

fn default_label_min_share() -> f64 {
    0.015
}

fn default_input() -> String {
    DEFAULT_INPUT.to_string()
}

fn default_output() -> String {
    DEFAULT_OUTPUT.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            report_title: default_report_title(),
            capacity_hours: default_capacity_hours(),
            hours_axis_max: default_hours_axis_max(),
            label_min_hours: default_label_min_hours(),
            label_min_share: default_label_min_share(),
            default_input: default_input(),
            default_output: default_output(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("planchart")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Load settings from `path`. A missing file yields defaults; a file that
/// exists but can't be parsed is an error.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        debug!(path = %path.display(), "no settings file, using defaults");
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&content)
        .map_err(|e| PlanError::Settings(format!("{}: {e}", path.display())))?;
    if settings.hours_axis_max < settings.capacity_hours {
        warn!(
            capacity = settings.capacity_hours,
            axis_max = settings.hours_axis_max,
            "capacity line is above the utilization axis and will not be visible"
        );
    }
    Ok(settings)
}

pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    match explicit {
        Some(path) => load_settings_from(path),
        None => load_settings_from(&settings_path()),
    }
}
