//! Selectivity Solver
//!
//! Closed-form sphere sizing: given a target volumetric selectivity `s` and a
//! bounding-box volume `V`, the query sphere must satisfy
//! `(4/3)·π·r³ = s·V`, so `r = ((3·s·V)/(4·π))^(1/3)`.

use std::f64::consts::PI;
use thiserror::Error;

/// Errors for invalid solver inputs.
#[derive(Debug, Error, PartialEq)]
pub enum SelectivityError {
    /// Selectivity outside the open interval (0, 1)
    #[error("Selectivity {0} is outside (0, 1)")]
    OutOfRange(f64),
    /// Non-positive bounding-box volume
    #[error("Bounding-box volume {0} must be positive")]
    InvalidVolume(f64),
}

/// Sphere radius covering fraction `selectivity` of a box of `volume`.
pub fn sphere_radius(selectivity: f64, volume: f64) -> Result<f64, SelectivityError> {
    if !selectivity.is_finite() || selectivity <= 0.0 || selectivity >= 1.0 {
        return Err(SelectivityError::OutOfRange(selectivity));
    }
    if !volume.is_finite() || volume <= 0.0 {
        return Err(SelectivityError::InvalidVolume(volume));
    }
    Ok(((3.0 * selectivity * volume) / (4.0 * PI)).cbrt())
}

/// Sphere diameter for the target selectivity; what the benchmark scripts
/// feed to the mesh rescaler as a per-axis extent.
pub fn sphere_diameter(selectivity: f64, volume: f64) -> Result<f64, SelectivityError> {
    Ok(2.0 * sphere_radius(selectivity, volume)?)
}
