//! CUDA Backend
//!
//! Brute-force GPU baseline: a bounding-box filter kernel followed by
//! ray-triangle intersection. Takes the geometry, points file, and timing
//! output path as positional arguments. All phases and result counts come
//! from the timing document; phase keys use underscores
//! (`upload_geometry_1`) unlike the raytracer family.

use crate::process::run_to_completion;
use crate::{AdapterContext, AdapterError, BackendAdapter};
use spatialbench_core::{BackendKind, FailureKind, PhaseTimings, RawOutcome, Variant};
use std::path::PathBuf;
use std::process::Command;
use std::time::{Duration, Instant};
use tracing::info;

const LOG_PREFIX: &str = "[CUDA]";

// Per-query phases; upload_points_1 is a one-time cost and excluded
const TOTAL_PHASES: [&str; 4] = ["upload_geometry_1", "filter_1", "query_1", "download_results_1"];

/// Drives the `cuda_query` executable.
pub struct CudaAdapter {
    workspace: PathBuf,
    executable: PathBuf,
    points: PathBuf,
    timeout: Duration,
}

impl CudaAdapter {
    /// Build the adapter against the configured CUDA checkout.
    pub fn new(ctx: &AdapterContext) -> Result<Self, AdapterError> {
        Ok(Self {
            workspace: crate::adapter_workspace(ctx, BackendKind::Cuda)?,
            executable: ctx.cuda_dir.join("build").join("cuda_query"),
            points: ctx.points.clone(),
            timeout: ctx.timeout,
        })
    }

    fn run_inner(&self, variant: &Variant) -> RawOutcome {
        let staged = match crate::stage_geometry(&self.workspace, variant) {
            Ok(path) => path,
            Err(e) => {
                return RawOutcome::failed(
                    variant,
                    FailureKind::Setup,
                    format!("Failed to stage geometry: {}", e),
                );
            }
        };

        let timing_path = self
            .workspace
            .join(format!("timing_{}.json", variant.index.label()));

        let mut cmd = Command::new(&self.executable);
        cmd.arg(&staged).arg(&self.points).arg(&timing_path);

        let result = run_to_completion(cmd, LOG_PREFIX, self.timeout);
        let _ = std::fs::remove_file(&staged);

        if let Err(e) = result {
            return RawOutcome::failed(variant, e.failure_kind(), e.to_string());
        }

        let timings = match PhaseTimings::load(&timing_path) {
            Ok(doc) => doc,
            Err(e) => {
                return RawOutcome::failed(variant, FailureKind::TimingDocument, e.to_string());
            }
        };

        let query_ms = match timings.duration_ms("query_1") {
            Some(ms) => ms,
            None => {
                return RawOutcome::failed(
                    variant,
                    FailureKind::MissingOutput,
                    "Query phase missing from timing document",
                );
            }
        };

        let total = timings.sum_phases(&TOTAL_PHASES);
        if total <= 0.0 {
            return RawOutcome::failed(
                variant,
                FailureKind::MissingOutput,
                "Phase timings sum to zero",
            );
        }

        let mut outcome = RawOutcome::succeeded(variant);
        outcome.query_ms = Some(query_ms);
        outcome.total_query_ms = Some(total);
        for (key, name) in TOTAL_PHASES
            .iter()
            .copied()
            .zip(["upload_geometry", "filter", "query", "download_results"])
        {
            if let Some(ms) = timings.duration_ms(key) {
                outcome.phases.insert(name.to_string(), ms);
            }
        }
        outcome.inside_count = timings.num_inside;
        outcome.total_points = timings.num_points;
        outcome
    }
}

impl BackendAdapter for CudaAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Cuda
    }

    fn setup(&mut self) -> Result<(), AdapterError> {
        if !self.executable.exists() {
            return Err(AdapterError::MissingExecutable(self.executable.clone()));
        }
        info!("{} Using executable {}", LOG_PREFIX, self.executable.display());
        Ok(())
    }

    fn run(&mut self, variant: &Variant) -> RawOutcome {
        let start = Instant::now();
        let mut outcome = self.run_inner(variant);
        outcome.wall_time_s = start.elapsed().as_secs_f64();
        outcome
    }

    fn teardown(&mut self) {}
}
