//! Variant Planning
//!
//! Expands the configured placement mode into the concrete experiment matrix.
//! The planner only decides *where* the query geometry goes; which geometry
//! file is used (rescaled or not) was settled during configuration. Every
//! backend receives the identical variant list.

use spatialbench_core::{BoundingBox, Variant, VariantIndex, Vec3};
use std::path::Path;

/// How query-geometry placements are generated for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementMode {
    /// Translate the geometry to the center of each cell of an
    /// `nx` x `ny` x `nz` grid over the point cloud's bounding box.
    Grid {
        /// Cells along x
        nx: u32,
        /// Cells along y
        ny: u32,
        /// Cells along z
        nz: u32,
    },
    /// Place the geometry at the bounding-box center and measure twice.
    Centered,
}

impl PlacementMode {
    /// Number of variants this mode produces.
    pub fn variant_count(&self) -> usize {
        match self {
            PlacementMode::Grid { nx, ny, nz } => (*nx as usize) * (*ny as usize) * (*nz as usize),
            PlacementMode::Centered => 2,
        }
    }
}

/// Generate the run's variants.
///
/// Each translation moves the mesh center onto the variant's target position.
/// Grid cells are enumerated x-outer, y-middle, z-inner, which fixes both the
/// dispatch order and the order of rows in the report.
pub fn generate_variants(
    mode: PlacementMode,
    points_bbox: &BoundingBox,
    mesh_center: Vec3,
    geometry: &Path,
) -> Vec<Variant> {
    match mode {
        PlacementMode::Grid { nx, ny, nz } => {
            let extents = points_bbox.extents();
            let cell = [
                extents[0] / nx as f64,
                extents[1] / ny as f64,
                extents[2] / nz as f64,
            ];

            let mut variants = Vec::with_capacity(mode.variant_count());
            for ix in 0..nx {
                for iy in 0..ny {
                    for iz in 0..nz {
                        let cell_center = [
                            points_bbox.min[0] + (ix as f64 + 0.5) * cell[0],
                            points_bbox.min[1] + (iy as f64 + 0.5) * cell[1],
                            points_bbox.min[2] + (iz as f64 + 0.5) * cell[2],
                        ];
                        variants.push(Variant {
                            index: VariantIndex::Grid { ix, iy, iz },
                            translation: [
                                cell_center[0] - mesh_center[0],
                                cell_center[1] - mesh_center[1],
                                cell_center[2] - mesh_center[2],
                            ],
                            geometry: geometry.to_path_buf(),
                        });
                    }
                }
            }
            variants
        }
        PlacementMode::Centered => {
            let center = points_bbox.center();
            let translation = [
                center[0] - mesh_center[0],
                center[1] - mesh_center[1],
                center[2] - mesh_center[2],
            ];
            (0..2)
                .map(|run| Variant {
                    index: VariantIndex::Repeat { run },
                    translation,
                    geometry: geometry.to_path_buf(),
                })
                .collect()
        }
    }
}
