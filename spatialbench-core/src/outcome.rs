//! Raw Outcomes
//!
//! The normalized result of one (backend, variant) call. Every invocation
//! produces exactly one `RawOutcome`; failures are recorded explicitly with a
//! classification rather than omitted, so the aggregator can tell "attempted
//! and failed" apart from "no attempt". Timings are never defaulted to zero;
//! a zero would be indistinguishable from a fast success.

use crate::bbox::Vec3;
use crate::variant::{Variant, VariantIndex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Classification of why a (backend, variant) call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Executable missing or could not be started
    Spawn,
    /// Process ran but exited with a non-zero status
    NonZeroExit,
    /// Process exceeded the per-call timeout
    Timeout,
    /// Process succeeded but an expected console pattern or phase was absent
    MissingOutput,
    /// Phase-timing side-file missing or malformed
    TimingDocument,
    /// One-time setup (build check, database load) failed before this call
    Setup,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Spawn => "spawn",
            FailureKind::NonZeroExit => "non_zero_exit",
            FailureKind::Timeout => "timeout",
            FailureKind::MissingOutput => "missing_output",
            FailureKind::TimingDocument => "timing_document",
            FailureKind::Setup => "setup",
        };
        f.write_str(s)
    }
}

/// A classified failure with a diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Failure classification
    pub kind: FailureKind,
    /// Human-readable diagnostic
    pub message: String,
}

/// Per (backend, variant) result, immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOutcome {
    /// Variant this outcome belongs to
    pub index: VariantIndex,
    /// Translation the geometry was placed with
    pub translation: Vec3,
    /// Whether the call produced usable timings
    pub success: bool,
    /// Failure classification when `success` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
    /// Named phase timings in milliseconds, where the backend reports them
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub phases: BTreeMap<String, f64>,
    /// Core query phase in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_ms: Option<f64>,
    /// Derived per-query total in milliseconds (excludes one-time setup)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_query_ms: Option<f64>,
    /// Points reported inside the query geometry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inside_count: Option<u64>,
    /// Total points the backend tested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_points: Option<u64>,
    /// Wall-clock time of the whole adapter call in seconds
    pub wall_time_s: f64,
}

impl RawOutcome {
    /// Failed outcome for the given variant with a classification.
    pub fn failed(variant: &Variant, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            index: variant.index,
            translation: variant.translation,
            success: false,
            failure: Some(Failure {
                kind,
                message: message.into(),
            }),
            phases: BTreeMap::new(),
            query_ms: None,
            total_query_ms: None,
            inside_count: None,
            total_points: None,
            wall_time_s: 0.0,
        }
    }

    /// Skeleton of a successful outcome; callers fill timings and counts.
    pub fn succeeded(variant: &Variant) -> Self {
        Self {
            index: variant.index,
            translation: variant.translation,
            success: true,
            failure: None,
            phases: BTreeMap::new(),
            query_ms: None,
            total_query_ms: None,
            inside_count: None,
            total_points: None,
            wall_time_s: 0.0,
        }
    }
}
