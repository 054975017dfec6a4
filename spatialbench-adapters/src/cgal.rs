//! CGAL Backend
//!
//! CPU baseline built on CGAL's AABB tree. The executable takes the
//! translated geometry and the points file as positional arguments and reports
//! everything on stdout; there is no phase-timing document.

use crate::process::run_to_completion;
use crate::{console, AdapterContext, AdapterError, BackendAdapter};
use spatialbench_core::{BackendKind, FailureKind, RawOutcome, Variant};
use std::path::PathBuf;
use std::process::Command;
use std::time::{Duration, Instant};
use tracing::info;

const LOG_PREFIX: &str = "[CGAL]";

/// Drives the `cgal_query` executable.
pub struct CgalAdapter {
    workspace: PathBuf,
    executable: PathBuf,
    points: PathBuf,
    timeout: Duration,
}

impl CgalAdapter {
    /// Build the adapter against the configured CGAL checkout.
    pub fn new(ctx: &AdapterContext) -> Result<Self, AdapterError> {
        Ok(Self {
            workspace: crate::adapter_workspace(ctx, BackendKind::Cgal)?,
            executable: ctx.cgal_dir.join("build").join("cgal_query"),
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

        let mut cmd = Command::new(&self.executable);
        cmd.arg(&staged).arg(&self.points);

        let result = run_to_completion(cmd, LOG_PREFIX, self.timeout);
        let _ = std::fs::remove_file(&staged);

        let output = match result {
            Ok(output) => output,
            Err(e) => return RawOutcome::failed(variant, e.failure_kind(), e.to_string()),
        };

        let query_ms = match console::containment_query_time_ms(&output.stdout) {
            Some(ms) => ms,
            None => {
                return RawOutcome::failed(
                    variant,
                    FailureKind::MissingOutput,
                    "Containment query time not found in output",
                );
            }
        };

        let mut outcome = RawOutcome::succeeded(variant);
        outcome.query_ms = Some(query_ms);
        // Single-phase backend: the query is the whole per-query cost
        outcome.total_query_ms = Some(query_ms);
        outcome.inside_count = console::points_inside_mesh(&output.stdout);
        outcome.total_points = console::total_points(&output.stdout);
        outcome
    }
}

impl BackendAdapter for CgalAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Cgal
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
