//! Experiment Variants
//!
//! A variant is one parameterized experiment instance: a spatial placement of
//! the query geometry plus the geometry file to use for it. Variants are
//! produced by the planner and consumed read-only by every adapter, so each
//! backend sees the identical experiment matrix.

use crate::bbox::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Position of a variant within the run's experiment matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariantIndex {
    /// Cell coordinates within a grid placement.
    Grid {
        /// X cell index
        ix: u32,
        /// Y cell index
        iy: u32,
        /// Z cell index
        iz: u32,
    },
    /// Repeat number in centered mode (same placement measured twice).
    Repeat {
        /// Zero-based run number
        run: u32,
    },
}

impl VariantIndex {
    /// Filesystem-safe label, used in workspace file names.
    pub fn label(&self) -> String {
        match self {
            VariantIndex::Grid { ix, iy, iz } => format!("{}_{}_{}", ix, iy, iz),
            VariantIndex::Repeat { run } => format!("run{}", run),
        }
    }
}

impl fmt::Display for VariantIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantIndex::Grid { ix, iy, iz } => write!(f, "({}, {}, {})", ix, iy, iz),
            VariantIndex::Repeat { run } => write!(f, "run {}", run),
        }
    }
}

/// One parameterized experiment instance.
///
/// The translation vector moves the query geometry's bounding-box center to
/// the variant's target position. `geometry` may point at a rescaled copy of
/// the configured query mesh; the planner decides which file applies, the
/// adapters only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// Position within the experiment matrix
    pub index: VariantIndex,
    /// Translation applied to the query geometry for this instance
    pub translation: Vec3,
    /// Geometry file to query with (possibly a rescaled copy)
    pub geometry: PathBuf,
}
