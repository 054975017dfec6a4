#![warn(missing_docs)]
//! Spatialbench Report - Output Generation
//!
//! Assembles the per-run report artifact and renders it as:
//! - JSON (machine-readable, the primary format)
//! - CSV (spreadsheet-compatible flat rows)
//!
//! Output files embed the run name and a timestamp so consecutive runs never
//! overwrite each other.

mod csv;
mod json;
mod report;

pub use csv::generate_csv_report;
pub use json::generate_json_report;
pub use report::{
    ApproachStatistics, ConfigurationSection, PlacementSummary, Report, ReportMeta,
};

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON with full schema
    Json,
    /// CSV for spreadsheets
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Derive the timestamped output path for a run.
///
/// `results/bench.json` with name `sphere` becomes
/// `results/bench_sphere_20240101_120000.json`.
pub fn timestamped_output_path(
    output: &Path,
    name: Option<&str>,
    timestamp: DateTime<Utc>,
) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "benchmark".to_string());
    let ext = output
        .extension()
        .map(|s| format!(".{}", s.to_string_lossy()))
        .unwrap_or_default();
    let stamp = timestamp.format("%Y%m%d_%H%M%S");

    let file_name = match name {
        Some(name) => format!("{}_{}_{}{}", stem, name, stamp, ext),
        None => format!("{}_{}{}", stem, stamp, ext),
    };

    match output.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}
