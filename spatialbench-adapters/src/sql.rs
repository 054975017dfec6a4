//! SQL Backend
//!
//! PostGIS-style baseline driven through the `spatial_query` executable. The
//! points table is loaded once during setup and reused by every variant, so
//! per-variant work is just the geometry query itself.

use crate::process::run_to_completion;
use crate::{console, AdapterContext, AdapterError, BackendAdapter};
use spatialbench_core::{BackendKind, FailureKind, RawOutcome, Variant};
use spatialbench_geometry::points::wkt_to_csv;
use std::path::PathBuf;
use std::process::Command;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const LOG_PREFIX: &str = "[SQL]";

/// Drives the `spatial_query` executable and its database scripts.
pub struct SqlAdapter {
    workspace: PathBuf,
    base_dir: PathBuf,
    executable: PathBuf,
    points: PathBuf,
    timeout: Duration,
    points_loaded: bool,
}

impl SqlAdapter {
    /// Build the adapter against the configured SQL checkout.
    pub fn new(ctx: &AdapterContext) -> Result<Self, AdapterError> {
        Ok(Self {
            workspace: crate::adapter_workspace(ctx, BackendKind::Sql)?,
            base_dir: ctx.sql_dir.clone(),
            executable: ctx.sql_dir.join("build").join("spatial_query"),
            points: ctx.points.clone(),
            timeout: ctx.timeout,
            points_loaded: false,
        })
    }

    /// Run an optional maintenance script from the checkout's `scripts/`
    /// directory. Missing scripts are skipped, failing ones only warned
    /// about; the database may already be in the desired state.
    fn run_optional_script(&self, name: &str, args: &[&str]) {
        let script = self.base_dir.join("scripts").join(name);
        if !script.exists() {
            return;
        }
        let mut cmd = Command::new("bash");
        cmd.arg(&script).args(args).current_dir(&self.base_dir);
        match run_to_completion(cmd, LOG_PREFIX, self.timeout) {
            Ok(_) => info!("{} {} completed", LOG_PREFIX, name),
            Err(e) => warn!("{} {} failed: {}", LOG_PREFIX, name, e),
        }
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
        cmd.arg("query").arg(&staged);

        let result = run_to_completion(cmd, LOG_PREFIX, self.timeout);
        let _ = std::fs::remove_file(&staged);

        let output = match result {
            Ok(output) => output,
            Err(e) => return RawOutcome::failed(variant, e.failure_kind(), e.to_string()),
        };

        let query_ms = match console::query_time_ms(&output.stdout) {
            Some(ms) => ms,
            None => {
                return RawOutcome::failed(
                    variant,
                    FailureKind::MissingOutput,
                    "Query time not found in output",
                );
            }
        };

        let mut outcome = RawOutcome::succeeded(variant);
        outcome.query_ms = Some(query_ms);
        outcome.total_query_ms = Some(query_ms);
        outcome.inside_count = console::points_inside_mesh(&output.stdout);
        outcome.total_points = console::total_points(&output.stdout);
        outcome
    }
}

impl BackendAdapter for SqlAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Sql
    }

    fn setup(&mut self) -> Result<(), AdapterError> {
        if !self.executable.exists() {
            return Err(AdapterError::MissingExecutable(self.executable.clone()));
        }

        // --yes suppresses interactive prompts that would hang the run
        self.run_optional_script("init_db.sh", &["--yes"]);

        info!("{} Loading points (one-time per run)", LOG_PREFIX);
        let csv = self.workspace.join("points.csv");
        let count = wkt_to_csv(&self.points, &csv)?;
        info!("{} Converted {} points to CSV", LOG_PREFIX, count);

        let mut cmd = Command::new(&self.executable);
        cmd.arg("load_points").arg(&csv);
        run_to_completion(cmd, LOG_PREFIX, self.timeout)?;
        self.points_loaded = true;
        Ok(())
    }

    fn run(&mut self, variant: &Variant) -> RawOutcome {
        let start = Instant::now();
        let mut outcome = self.run_inner(variant);
        outcome.wall_time_s = start.elapsed().as_secs_f64();
        outcome
    }

    fn teardown(&mut self) {
        if self.points_loaded {
            self.run_optional_script("stop_server.sh", &[]);
            self.points_loaded = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn write_executable(path: &Path, script: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, script).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn context(root: &Path) -> AdapterContext {
        let points = root.join("points.wkt");
        fs::write(&points, "POINT Z (1 2 3)\nPOINT Z (4 5 6)\n").unwrap();
        AdapterContext {
            workspace: root.join("workspace"),
            points,
            timeout: Duration::from_secs(10),
            cgal_dir: root.join("cgal"),
            sql_dir: root.join("sql"),
            rayspace_dir: root.join("rayspace"),
            cuda_dir: root.join("cuda"),
        }
    }

    fn variant(root: &Path) -> Variant {
        let geometry = root.join("mesh.obj");
        fs::write(&geometry, "v 0 0 0\nv 1 1 1\n").unwrap();
        Variant {
            index: spatialbench_core::VariantIndex::Repeat { run: 1 },
            translation: [0.0; 3],
            geometry,
        }
    }

    #[test]
    fn test_setup_loads_points_once() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        // Executable records its subcommand invocations
        write_executable(
            &ctx.sql_dir.join("build/spatial_query"),
            "#!/bin/sh\necho \"$1\" >> \"$(dirname \"$0\")/calls.log\"\nif [ \"$1\" = query ]; then echo 'QUERY TIME: 3.0 ms'; fi\n",
        );

        let mut adapter = SqlAdapter::new(&ctx).unwrap();
        adapter.setup().unwrap();
        assert!(adapter.points_loaded);

        // CSV staged with header plus both points
        let csv = fs::read_to_string(ctx.workspace.join("sql/points.csv")).unwrap();
        assert_eq!(csv.lines().count(), 3);

        let outcome = adapter.run(&variant(dir.path()));
        assert!(outcome.success);
        assert_eq!(outcome.query_ms, Some(3.0));

        let calls = fs::read_to_string(ctx.sql_dir.join("build/calls.log")).unwrap();
        assert_eq!(calls, "load_points\nquery\n");
    }

    #[test]
    fn test_setup_fails_on_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        write_executable(&ctx.sql_dir.join("build/spatial_query"), "#!/bin/sh\nexit 2\n");

        let mut adapter = SqlAdapter::new(&ctx).unwrap();
        assert!(matches!(adapter.setup(), Err(AdapterError::Process(_))));
        assert!(!adapter.points_loaded);
    }
}
