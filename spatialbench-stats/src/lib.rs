#![warn(missing_docs)]
//! Spatialbench Statistical Engine
//!
//! Descriptive statistics over per-variant timing samples. Callers feed only
//! the timings of successful outcomes; failures are counted separately by the
//! aggregator so they never skew the distribution.

mod summary;

pub use summary::{compute_summary, SummaryStatistics};
