//! Result Aggregation
//!
//! Accumulates per-variant outcomes by backend and derives the per-backend
//! statistics section. Statistics cover successful outcomes only; failures
//! are tallied separately and never mixed into the timing figures.

use spatialbench_core::RawOutcome;
use spatialbench_report::ApproachStatistics;
use spatialbench_stats::compute_summary;
use std::collections::BTreeMap;

/// Accumulates outcomes for the report, keyed by backend label.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    results: BTreeMap<String, Vec<RawOutcome>>,
}

impl ResultAggregator {
    /// Empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register a backend so it appears in the report even if every call
    /// fails before producing an outcome.
    pub fn register(&mut self, backend: &str) {
        self.results.entry(backend.to_string()).or_default();
    }

    /// Record one outcome. Outcomes are kept in arrival order.
    pub fn record(&mut self, backend: &str, outcome: RawOutcome) {
        self.results.entry(backend.to_string()).or_default().push(outcome);
    }

    /// Per-backend statistics over the successful outcomes' `total_query_ms`.
    /// A backend with zero successes maps to `None`.
    pub fn statistics(&self) -> BTreeMap<String, Option<ApproachStatistics>> {
        self.results
            .iter()
            .map(|(backend, outcomes)| {
                let samples: Vec<f64> = outcomes
                    .iter()
                    .filter(|o| o.success)
                    .filter_map(|o| o.total_query_ms)
                    .collect();
                let failures = outcomes.len() - samples.len();
                let stats = compute_summary(&samples)
                    .map(|summary| ApproachStatistics::from_summary(&summary, failures));
                (backend.clone(), stats)
            })
            .collect()
    }

    /// Consume the aggregator, yielding the ordered results per backend.
    pub fn into_results(self) -> BTreeMap<String, Vec<RawOutcome>> {
        self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spatialbench_core::{FailureKind, Variant, VariantIndex};
    use std::path::PathBuf;

    fn variant(run: u32) -> Variant {
        Variant {
            index: VariantIndex::Repeat { run },
            translation: [0.0; 3],
            geometry: PathBuf::from("mesh.obj"),
        }
    }

    fn success(run: u32, total_ms: f64) -> RawOutcome {
        let mut outcome = RawOutcome::succeeded(&variant(run));
        outcome.query_ms = Some(total_ms);
        outcome.total_query_ms = Some(total_ms);
        outcome
    }

    #[test]
    fn test_failures_excluded_from_statistics() {
        let mut agg = ResultAggregator::new();
        agg.record("CGAL", success(0, 10.0));
        agg.record("CGAL", success(1, 20.0));
        agg.record("CGAL", RawOutcome::failed(&variant(2), FailureKind::Timeout, "t"));

        let stats = agg.statistics();
        let cgal = stats["CGAL"].as_ref().unwrap();
        assert!((cgal.mean - 15.0).abs() < 1e-9);
        assert_eq!(cgal.count, 2);
        assert_eq!(cgal.failures, 1);
        assert_eq!(cgal.min, 10.0);
        assert_eq!(cgal.max, 20.0);
    }

    #[test]
    fn test_all_failed_backend_yields_none() {
        let mut agg = ResultAggregator::new();
        agg.record("SQL", RawOutcome::failed(&variant(0), FailureKind::Spawn, "missing"));
        agg.record("SQL", RawOutcome::failed(&variant(1), FailureKind::Spawn, "missing"));

        let stats = agg.statistics();
        assert!(stats["SQL"].is_none());
    }

    #[test]
    fn test_registered_backend_appears_without_outcomes() {
        let mut agg = ResultAggregator::new();
        agg.register("CUDA");
        assert!(agg.statistics().contains_key("CUDA"));
        assert!(agg.into_results()["CUDA"].is_empty());
    }

    #[test]
    fn test_outcomes_keep_arrival_order() {
        let mut agg = ResultAggregator::new();
        agg.record("CGAL", success(1, 5.0));
        agg.record("CGAL", success(0, 7.0));
        let results = agg.into_results();
        assert_eq!(results["CGAL"][0].index, VariantIndex::Repeat { run: 1 });
    }
}
