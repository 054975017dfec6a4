//! Report Data Structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spatialbench_core::{BoundingBox, RawOutcome};
use spatialbench_stats::SummaryStatistics;
use std::collections::BTreeMap;

/// Complete benchmark report, written once per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Run metadata
    pub meta: ReportMeta,
    /// Immutable run configuration echo
    pub configuration: ConfigurationSection,
    /// Ordered per-variant outcomes, keyed by backend label
    pub results: BTreeMap<String, Vec<RawOutcome>>,
    /// Aggregate statistics keyed by backend label; `null` when a backend had
    /// zero successful outcomes
    pub statistics: BTreeMap<String, Option<ApproachStatistics>>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Report schema version
    pub schema_version: u32,
    /// Orchestrator version
    pub version: String,
    /// Run start time
    pub timestamp: DateTime<Utc>,
}

impl ReportMeta {
    /// Metadata for a run starting at `timestamp`.
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            schema_version: 1,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp,
        }
    }
}

/// Placement mode echoed into the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PlacementSummary {
    /// Grid of translations covering the point cloud
    Grid {
        /// Grid dimensions (nx, ny, nz)
        grid_size: [u32; 3],
    },
    /// Two repeated runs at the bounding-box center
    Centered,
}

/// Configuration section of the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationSection {
    /// Query geometry path as configured
    pub query_obj: String,
    /// Points dataset path as configured
    pub points_file: String,
    /// Placement mode
    #[serde(flatten)]
    pub placement: PlacementSummary,
    /// Backend labels in dispatch order
    pub backends: Vec<String>,
    /// Bounding box of the points dataset
    pub points_bbox: BoundingBox,
}

/// Aggregate over all successful outcomes for one backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproachStatistics {
    /// Mean of the chosen timing metric in milliseconds
    pub mean: f64,
    /// Median in milliseconds
    pub median: f64,
    /// Sample standard deviation in milliseconds
    pub std: f64,
    /// Fastest successful outcome
    pub min: f64,
    /// Slowest successful outcome
    pub max: f64,
    /// Number of successful outcomes
    pub count: usize,
    /// Number of failed attempts (excluded from the figures above)
    pub failures: usize,
}

impl ApproachStatistics {
    /// Build report statistics from a summary plus the failure tally.
    pub fn from_summary(summary: &SummaryStatistics, failures: usize) -> Self {
        Self {
            mean: summary.mean,
            median: summary.median,
            std: summary.std_dev,
            min: summary.min,
            max: summary.max,
            count: summary.count,
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_from_summary() {
        let summary = SummaryStatistics {
            mean: 15.0,
            median: 15.0,
            std_dev: 7.07,
            min: 10.0,
            max: 20.0,
            count: 2,
        };
        let stats = ApproachStatistics::from_summary(&summary, 1);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.failures, 1);
        assert!((stats.mean - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_placement_serialization() {
        let grid = PlacementSummary::Grid {
            grid_size: [3, 3, 3],
        };
        let json = serde_json::to_value(&grid).unwrap();
        assert_eq!(json["mode"], "grid");
        assert_eq!(json["grid_size"][0], 3);

        let centered = serde_json::to_value(PlacementSummary::Centered).unwrap();
        assert_eq!(centered["mode"], "centered");
    }
}
