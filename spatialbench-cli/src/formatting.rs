//! Output Formatting
//!
//! Human-readable console summary printed after a run, alongside the
//! persisted report.

use spatialbench_report::Report;

/// Format the per-backend statistics block for terminal display.
pub fn format_run_summary(report: &Report) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("Benchmark Results\n");
    output.push_str(&"=".repeat(60));
    output.push('\n');

    for (backend, stats) in &report.statistics {
        let attempted = report
            .results
            .get(backend)
            .map(|outcomes| outcomes.len())
            .unwrap_or(0);

        output.push_str(&format!("\n{} Statistics:\n", backend));
        match stats {
            Some(stats) => {
                output.push_str(&format!(
                    "  Successful queries: {}/{}\n",
                    stats.count, attempted
                ));
                output.push_str(&format!("  Mean query time:    {:.2} ms\n", stats.mean));
                output.push_str(&format!("  Median query time:  {:.2} ms\n", stats.median));
                output.push_str(&format!("  Std deviation:      {:.2} ms\n", stats.std));
                output.push_str(&format!("  Min:                {:.2} ms\n", stats.min));
                output.push_str(&format!("  Max:                {:.2} ms\n", stats.max));
            }
            None => {
                output.push_str(&format!(
                    "  No successful queries ({} attempted)\n",
                    attempted
                ));
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use spatialbench_core::{BoundingBox, RawOutcome, Variant, VariantIndex};
    use spatialbench_report::{
        ApproachStatistics, ConfigurationSection, PlacementSummary, ReportMeta,
    };
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    #[test]
    fn test_summary_lists_all_backends() {
        let variant = Variant {
            index: VariantIndex::Repeat { run: 0 },
            translation: [0.0; 3],
            geometry: PathBuf::from("mesh.obj"),
        };
        let mut ok = RawOutcome::succeeded(&variant);
        ok.total_query_ms = Some(12.0);

        let report = Report {
            meta: ReportMeta::new(Utc::now()),
            configuration: ConfigurationSection {
                query_obj: "m.obj".to_string(),
                points_file: "p.wkt".to_string(),
                placement: PlacementSummary::Centered,
                backends: vec!["CGAL".to_string(), "SQL".to_string()],
                points_bbox: BoundingBox::new([0.0; 3], [1.0; 3]),
            },
            results: BTreeMap::from([
                ("CGAL".to_string(), vec![ok]),
                ("SQL".to_string(), Vec::new()),
            ]),
            statistics: BTreeMap::from([
                (
                    "CGAL".to_string(),
                    Some(ApproachStatistics {
                        mean: 12.0,
                        median: 12.0,
                        std: 0.0,
                        min: 12.0,
                        max: 12.0,
                        count: 1,
                        failures: 0,
                    }),
                ),
                ("SQL".to_string(), None),
            ]),
        };

        let summary = format_run_summary(&report);
        assert!(summary.contains("CGAL Statistics:"));
        assert!(summary.contains("Successful queries: 1/1"));
        assert!(summary.contains("Mean query time:    12.00 ms"));
        assert!(summary.contains("SQL Statistics:"));
        assert!(summary.contains("No successful queries"));
    }
}
