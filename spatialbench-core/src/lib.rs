#![warn(missing_docs)]
//! Spatialbench Core - Shared Data Model
//!
//! Types exchanged between the variant planner, backend adapters, the
//! aggregator, and the report layer:
//! - [`Variant`] - one parameterized experiment instance
//! - [`RawOutcome`] - the normalized result of one (backend, variant) call
//! - [`PhaseTimings`] - the structured phase-duration document some backends
//!   emit as a side-file
//! - [`BoundingBox`] - axis-aligned box used for placement and selectivity

mod bbox;
mod backend;
mod outcome;
mod timing;
mod variant;

pub use backend::BackendKind;
pub use bbox::{BoundingBox, Vec3};
pub use outcome::{Failure, FailureKind, RawOutcome};
pub use timing::{PhaseEntry, PhaseTimings, TimingDocumentError};
pub use variant::{Variant, VariantIndex};
