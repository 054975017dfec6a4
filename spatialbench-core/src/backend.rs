//! Backend Identifiers
//!
//! The five query backends the orchestrator can drive. The CLI accepts the
//! lowercase `id` form; report sections are keyed by the display `label`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the external query backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// CPU geometry-kernel baseline (console output, milliseconds)
    Cgal,
    /// SQL/spatial-index baseline with a load-once database session
    Sql,
    /// GPU ray tracer, direct query mode (phase-timing document)
    Raytracer,
    /// GPU ray tracer, filter-then-refine mode (phase-timing document)
    FilterRefine,
    /// Naive GPU filter baseline
    Cuda,
}

impl BackendKind {
    /// Stable lowercase identifier used on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            BackendKind::Cgal => "cgal",
            BackendKind::Sql => "sql",
            BackendKind::Raytracer => "raytracer",
            BackendKind::FilterRefine => "raytracer_filter_refine",
            BackendKind::Cuda => "cuda",
        }
    }

    /// Display label used as the report key for this backend.
    pub fn label(&self) -> &'static str {
        match self {
            BackendKind::Cgal => "CGAL",
            BackendKind::Sql => "SQL",
            BackendKind::Raytracer => "Raytracer",
            BackendKind::FilterRefine => "FilterRefine",
            BackendKind::Cuda => "CUDA",
        }
    }

    /// All known backends in canonical order.
    pub fn all() -> &'static [BackendKind] {
        &[
            BackendKind::Cgal,
            BackendKind::Sql,
            BackendKind::Raytracer,
            BackendKind::FilterRefine,
            BackendKind::Cuda,
        ]
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cgal" => Ok(BackendKind::Cgal),
            "sql" => Ok(BackendKind::Sql),
            "raytracer" => Ok(BackendKind::Raytracer),
            "raytracer_filter_refine" | "filter_refine" => Ok(BackendKind::FilterRefine),
            "cuda" => Ok(BackendKind::Cuda),
            other => Err(format!(
                "Unknown backend '{}' (expected one of: cgal, sql, raytracer, raytracer_filter_refine, cuda)",
                other
            )),
        }
    }
}
