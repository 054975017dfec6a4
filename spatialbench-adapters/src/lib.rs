#![warn(missing_docs)]
//! Spatialbench Adapters - Backend Drivers
//!
//! One adapter per backend executable. Each adapter owns its processes,
//! working files, and output parsing, and presents the uniform
//! [`BackendAdapter`] lifecycle to the runner:
//!
//! 1. [`setup`](BackendAdapter::setup) - one-time preparation (executable
//!    check, database load). A setup error disqualifies the backend for the
//!    whole run.
//! 2. [`run`](BackendAdapter::run) - one variant, one [`RawOutcome`]. Never
//!    fails at the API level; every error becomes a classified failed outcome
//!    so one backend cannot abort the matrix.
//! 3. [`teardown`](BackendAdapter::teardown) - best-effort cleanup, always
//!    invoked.

mod console;
mod process;

mod cgal;
mod cuda;
mod filter_refine;
mod raytracer;
mod sql;

pub use cgal::CgalAdapter;
pub use cuda::CudaAdapter;
pub use filter_refine::FilterRefineAdapter;
pub use process::{run_to_completion, ProcessError, ProcessOutput};
pub use raytracer::RaytracerAdapter;
pub use sql::SqlAdapter;

use spatialbench_core::{BackendKind, RawOutcome, Variant};
use spatialbench_geometry::{MeshError, PointsError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors from adapter construction and one-time setup.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Backend executable does not exist at the expected path
    #[error("Executable not found: {0} (is the backend built?)")]
    MissingExecutable(PathBuf),

    /// Adapter working directory could not be prepared
    #[error("Failed to prepare workspace: {0}")]
    Workspace(#[from] std::io::Error),

    /// A setup process failed
    #[error("Setup process failed: {0}")]
    Process(#[from] ProcessError),

    /// Points dataset conversion failed
    #[error("Points dataset conversion failed: {0}")]
    Points(#[from] PointsError),
}

/// Shared inputs every adapter is constructed from.
#[derive(Debug, Clone)]
pub struct AdapterContext {
    /// Per-run scratch directory; each adapter gets a subdirectory
    pub workspace: PathBuf,
    /// WKT points dataset shared by all backends
    pub points: PathBuf,
    /// Wall-clock timeout for each backend invocation
    pub timeout: Duration,
    /// CGAL backend checkout (executable under `build/`)
    pub cgal_dir: PathBuf,
    /// SQL backend checkout (executable under `build/`, scripts under `scripts/`)
    pub sql_dir: PathBuf,
    /// Raytracer checkout shared by the raytracing backends
    pub rayspace_dir: PathBuf,
    /// CUDA backend checkout
    pub cuda_dir: PathBuf,
}

/// Uniform backend lifecycle driven by the runner.
pub trait BackendAdapter {
    /// Which backend this adapter drives.
    fn kind(&self) -> BackendKind;

    /// One-time preparation before any variant runs.
    fn setup(&mut self) -> Result<(), AdapterError>;

    /// Execute one variant. Infallible at the API level: every error path
    /// yields a failed [`RawOutcome`] with a classification.
    fn run(&mut self, variant: &Variant) -> RawOutcome;

    /// Best-effort cleanup. Invoked exactly once, even after failures.
    fn teardown(&mut self);
}

/// Construct the adapter for `kind`, creating its workspace subdirectory.
pub fn create_adapter(
    kind: BackendKind,
    ctx: &AdapterContext,
) -> Result<Box<dyn BackendAdapter>, AdapterError> {
    Ok(match kind {
        BackendKind::Cgal => Box::new(CgalAdapter::new(ctx)?),
        BackendKind::Sql => Box::new(SqlAdapter::new(ctx)?),
        BackendKind::Raytracer => Box::new(RaytracerAdapter::new(ctx)?),
        BackendKind::FilterRefine => Box::new(FilterRefineAdapter::new(ctx)?),
        BackendKind::Cuda => Box::new(CudaAdapter::new(ctx)?),
    })
}

/// Create (and return) the adapter's subdirectory under the run workspace.
fn adapter_workspace(ctx: &AdapterContext, kind: BackendKind) -> Result<PathBuf, AdapterError> {
    let dir = ctx.workspace.join(kind.id());
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Write the variant's translated geometry into `dir`, returning its path.
///
/// Paths carry the variant label so a failed write can never leave a stale
/// file from an earlier variant in place.
fn stage_geometry(dir: &Path, variant: &Variant) -> Result<PathBuf, MeshError> {
    let staged = dir.join(format!("translated_{}.obj", variant.index.label()));
    spatialbench_geometry::mesh::translate_file(&variant.geometry, &staged, variant.translation)?;
    Ok(staged)
}
