//! Raytracer Backend
//!
//! Hardware-raytracing containment query. Each variant is a two-stage
//! pipeline: `preprocess_dataset` converts the translated mesh into the
//! tracer's geometry format, then `raytracer` runs the query and writes a
//! phase-timing document. The per-query total is the sum of the geometry
//! upload, index build, query, and result download phases; the one-time
//! points upload is excluded.

use crate::process::run_to_completion;
use crate::{console, AdapterContext, AdapterError, BackendAdapter};
use spatialbench_core::{BackendKind, FailureKind, PhaseTimings, RawOutcome, Variant};
use std::path::PathBuf;
use std::process::Command;
use std::time::{Duration, Instant};
use tracing::info;

const LOG_PREFIX: &str = "[Raytracer]";

/// Preprocessing converts the whole mesh, bounded separately from queries.
pub(crate) const PREPROCESS_TIMEOUT: Duration = Duration::from_secs(600);

const TOTAL_PHASES: [&str; 4] = [
    "upload geometry_1",
    "build index_1",
    "query_1",
    "download results_1",
];

/// Drives the `raytracer` executable via `preprocess_dataset`.
pub struct RaytracerAdapter {
    workspace: PathBuf,
    executable: PathBuf,
    preprocess_exec: PathBuf,
    points: PathBuf,
    timeout: Duration,
}

impl RaytracerAdapter {
    /// Build the adapter against the configured raytracer checkout.
    pub fn new(ctx: &AdapterContext) -> Result<Self, AdapterError> {
        let bin = ctx.rayspace_dir.join("build").join("bin");
        Ok(Self {
            workspace: crate::adapter_workspace(ctx, BackendKind::Raytracer)?,
            executable: bin.join("raytracer"),
            preprocess_exec: bin.join("preprocess_dataset"),
            points: ctx.points.clone(),
            timeout: ctx.timeout,
        })
    }

    fn run_inner(&self, variant: &Variant) -> RawOutcome {
        let label = variant.index.label();

        // preprocess_dataset expects the mesh alone in its own directory
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

        let timing_path = self.workspace.join(format!("timing_{}.json", label));
        let mut trace = Command::new(&self.executable);
        trace
            .arg("--geometry")
            .arg(&geometry)
            .arg("--points")
            .arg(&self.points)
            .arg("--output")
            .arg(&timing_path)
            .arg("--no-export");

        let output = match run_to_completion(trace, LOG_PREFIX, self.timeout) {
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
        for (key, name) in TOTAL_PHASES.iter().copied().zip([
            "upload_geometry",
            "build_index",
            "query",
            "download_results",
        ]) {
            if let Some(ms) = timings.duration_ms(key) {
                outcome.phases.insert(name.to_string(), ms);
            }
        }
        outcome.inside_count = console::points_inside_polygons(&output.stdout);
        outcome.total_points = console::total_rays(&output.stdout);
        outcome
    }
}

impl BackendAdapter for RaytracerAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Raytracer
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
        fs::write(&points, "POINT Z (1 2 3)\n").unwrap();
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
            index: spatialbench_core::VariantIndex::Grid { ix: 1, iy: 0, iz: 2 },
            translation: [0.0; 3],
            geometry,
        }
    }

    const TIMING_JSON: &str = r#"{
        "phases": {
            "upload points_1": {"duration_ms": 100.0},
            "upload geometry_1": {"duration_ms": 1.0},
            "build index_1": {"duration_ms": 2.0},
            "query_1": {"duration_ms": 4.0},
            "download results_1": {"duration_ms": 0.5}
        }
    }"#;

    fn setup_backend(ctx: &AdapterContext, timing_json: &str) {
        let bin = ctx.rayspace_dir.join("build/bin");
        write_executable(&bin.join("preprocess_dataset"), "#!/bin/sh\nexit 0\n");
        // The tracer writes the timing document at the --output argument
        // (argument 6) and reports counts on stdout.
        let script = format!(
            "#!/bin/sh\nprintf '%s' '{}' > \"$6\"\necho 'Points INSIDE polygons: 7'\necho 'Total rays: 1000'\n",
            timing_json.replace('\n', " ")
        );
        write_executable(&bin.join("raytracer"), &script);
    }

    #[test]
    fn test_total_excludes_points_upload() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        setup_backend(&ctx, TIMING_JSON);

        let mut adapter = RaytracerAdapter::new(&ctx).unwrap();
        adapter.setup().unwrap();
        let outcome = adapter.run(&variant(dir.path()));

        assert!(outcome.success, "failure: {:?}", outcome.failure);
        assert_eq!(outcome.query_ms, Some(4.0));
        // 1.0 + 2.0 + 4.0 + 0.5, points upload not included
        assert_eq!(outcome.total_query_ms, Some(7.5));
        assert_eq!(outcome.phases.get("build_index"), Some(&2.0));
        assert_eq!(outcome.inside_count, Some(7));
        assert_eq!(outcome.total_points, Some(1000));
    }

    #[test]
    fn test_missing_query_phase_is_classified() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        setup_backend(&ctx, r#"{"phases": {"upload geometry_1": {"duration_ms": 1.0}}}"#);

        let mut adapter = RaytracerAdapter::new(&ctx).unwrap();
        let outcome = adapter.run(&variant(dir.path()));
        assert_eq!(
            outcome.failure.unwrap().kind,
            FailureKind::MissingOutput
        );
    }

    #[test]
    fn test_zero_phase_total_is_classified() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        setup_backend(&ctx, r#"{"phases": {"query_1": {"duration_ms": 0.0}}}"#);

        let mut adapter = RaytracerAdapter::new(&ctx).unwrap();
        let outcome = adapter.run(&variant(dir.path()));
        assert_eq!(
            outcome.failure.unwrap().kind,
            FailureKind::MissingOutput
        );
    }

    #[test]
    fn test_malformed_timing_document_is_classified() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        setup_backend(&ctx, "not json at all");

        let mut adapter = RaytracerAdapter::new(&ctx).unwrap();
        let outcome = adapter.run(&variant(dir.path()));
        assert_eq!(
            outcome.failure.unwrap().kind,
            FailureKind::TimingDocument
        );
    }

    #[test]
    fn test_setup_requires_both_executables() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        write_executable(
            &ctx.rayspace_dir.join("build/bin/raytracer"),
            "#!/bin/sh\nexit 0\n",
        );

        let mut adapter = RaytracerAdapter::new(&ctx).unwrap();
        assert!(matches!(
            adapter.setup(),
            Err(AdapterError::MissingExecutable(_))
        ));
    }
}
