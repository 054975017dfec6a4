//! Filter-Refine Backend
//!
//! Raytracing variant that first filters candidates against the geometry's
//! bounding box, then refines with exact ray tests. Shares the preprocessing
//! stage with the plain raytracer but labels some phases differently
//! (`upload query geometry_1`, `build query index_1`), with plain labels as a
//! fallback for older builds. The filter phase counts into the per-query
//! total.

use crate::process::run_to_completion;
use crate::raytracer::PREPROCESS_TIMEOUT;
use crate::{console, AdapterContext, AdapterError, BackendAdapter};
use spatialbench_core::{BackendKind, FailureKind, PhaseTimings, RawOutcome, Variant};
use std::path::PathBuf;
use std::process::Command;
use std::time::{Duration, Instant};
use tracing::info;

const LOG_PREFIX: &str = "[FilterRefine]";

/// Drives the `raytracer_filter_refine` executable.
pub struct FilterRefineAdapter {
    workspace: PathBuf,
    executable: PathBuf,
    preprocess_exec: PathBuf,
    points: PathBuf,
    timeout: Duration,
}

impl FilterRefineAdapter {
    /// Build the adapter against the configured raytracer checkout.
    pub fn new(ctx: &AdapterContext) -> Result<Self, AdapterError> {
        let bin = ctx.rayspace_dir.join("build").join("bin");
        Ok(Self {
            workspace: crate::adapter_workspace(ctx, BackendKind::FilterRefine)?,
            executable: bin.join("raytracer_filter_refine"),
            preprocess_exec: bin.join("preprocess_dataset"),
            points: ctx.points.clone(),
            timeout: ctx.timeout,
        })
    }

    fn run_inner(&self, variant: &Variant) -> RawOutcome {
        let label = variant.index.label();

        let mesh_dir = self.workspace.join(format!("mesh_{}", label));
        if let Err(e) = std::fs::create_dir_all(&mesh_dir) {
            return RawOutcome::failed(
                variant,
                FailureKind::Setup,
                format!("Failed to create mesh directory: {}", e),
            );
        }
        let staged = mesh_dir.join("mesh.obj");
        if let Err(e) =
            spatialbench_geometry::mesh::translate_file(&variant.geometry, &staged, variant.translation)
        {
            return RawOutcome::failed(
                variant,
                FailureKind::Setup,
                format!("Failed to stage geometry: {}", e),
            );
        }

        let geometry = self.workspace.join(format!("geom_{}.txt", label));
        let preprocess_timing = self.workspace.join(format!("preprocess_timing_{}.json", label));

        let mut preprocess = Command::new(&self.preprocess_exec);
        preprocess
            .arg("--mode")
            .arg("mesh")
            .arg("--dataset")
            .arg(&mesh_dir)
            .arg("--output-geometry")
            .arg(&geometry)
            .arg("--output-timing")
            .arg(&preprocess_timing);

        if let Err(e) = run_to_completion(preprocess, LOG_PREFIX, PREPROCESS_TIMEOUT) {
            return RawOutcome::failed(
                variant,
                e.failure_kind(),
                format!("Preprocessing failed: {}", e),
            );
        }

        let timing_path = self.workspace.join(format!("timing_fr_{}.json", label));
        let mut refine = Command::new(&self.executable);
        refine
            .arg("--geometry")
            .arg(&geometry)
            .arg("--points")
            .arg(&self.points)
            .arg("--output")
            .arg(&timing_path)
            .arg("--no-export");

        let result = run_to_completion(refine, LOG_PREFIX, self.timeout);

        let output = match result {
            Ok(output) => output,
            Err(e) => return RawOutcome::failed(variant, e.failure_kind(), e.to_string()),
        };

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

        let upload_geometry =
            timings.first_of(&["upload query geometry_1", "upload geometry_1"]);
        let build_index = timings.first_of(&["build query index_1", "build index_1"]);
        let filter = timings.duration_ms("filter_1");
        let download = timings.duration_ms("download results_1");

        let total = upload_geometry.unwrap_or(0.0)
            + build_index.unwrap_or(0.0)
            + filter.unwrap_or(0.0)
            + query_ms
            + download.unwrap_or(0.0);
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
        for (name, value) in [
            ("upload_geometry", upload_geometry),
            ("build_index", build_index),
            ("filter", filter),
            ("query", Some(query_ms)),
            ("download_results", download),
        ] {
            if let Some(ms) = value {
                outcome.phases.insert(name.to_string(), ms);
            }
        }
        outcome.inside_count = console::points_inside_polygons(&output.stdout);
        outcome.total_points = console::total_points(&output.stdout);
        outcome
    }
}

impl BackendAdapter for FilterRefineAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::FilterRefine
    }

    fn setup(&mut self) -> Result<(), AdapterError> {
        for exe in [&self.executable, &self.preprocess_exec] {
            if !exe.exists() {
                return Err(AdapterError::MissingExecutable(exe.clone()));
            }
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
