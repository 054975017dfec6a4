#![warn(missing_docs)]
//! Spatialbench Geometry - Mesh and Point-Cloud Utilities
//!
//! Pure geometric building blocks of the orchestrator:
//! - [`mesh`] - plain-text OBJ loading, translation, and extent rescaling
//! - [`points`] - WKT point-cloud bounding boxes and CSV conversion
//! - [`selectivity`] - sphere sizing for a target volumetric selectivity

pub mod mesh;
pub mod points;
pub mod selectivity;

pub use mesh::{MeshError, ObjMesh};
pub use points::PointsError;
pub use selectivity::{sphere_diameter, sphere_radius, SelectivityError};
