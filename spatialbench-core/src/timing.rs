//! Phase-Timing Documents
//!
//! The GPU backends write a JSON side-file with named phase durations instead
//! of (or in addition to) console output. Keys carry an invocation suffix
//! (`query_1`) and durations appear as `duration_ms` or `duration_us`
//! depending on the backend build; `duration_ms` wins when both are present.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors reading a phase-timing document.
#[derive(Debug, Error)]
pub enum TimingDocumentError {
    /// The side-file could not be read
    #[error("Failed to read timing document {path}: {source}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The side-file was not valid JSON of the expected shape
    #[error("Malformed timing document {path}: {source}")]
    Parse {
        /// Path that failed
        path: String,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },
}

/// One named phase entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseEntry {
    /// Duration in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    /// Duration in microseconds (older backend builds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_us: Option<f64>,
}

impl PhaseEntry {
    /// Duration in milliseconds, converting from microseconds when needed.
    pub fn duration_ms(&self) -> Option<f64> {
        self.duration_ms.or(self.duration_us.map(|us| us / 1000.0))
    }
}

/// A backend's structured phase-timing document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseTimings {
    /// Named phases keyed by stage name (with invocation suffix)
    #[serde(default)]
    pub phases: BTreeMap<String, PhaseEntry>,
    /// Result count: points inside (naive GPU filter build reports it here)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_inside: Option<u64>,
    /// Result count: total points tested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_points: Option<u64>,
}

impl PhaseTimings {
    /// Load and parse a timing document from disk.
    pub fn load(path: &Path) -> Result<Self, TimingDocumentError> {
        let text = std::fs::read_to_string(path).map_err(|source| TimingDocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| TimingDocumentError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Duration of a named phase in milliseconds, if present.
    pub fn duration_ms(&self, key: &str) -> Option<f64> {
        self.phases.get(key).and_then(PhaseEntry::duration_ms)
    }

    /// First present phase among `keys`, in order.
    pub fn first_of(&self, keys: &[&str]) -> Option<f64> {
        keys.iter().find_map(|k| self.duration_ms(k))
    }

    /// Sum of the named phases, treating absent phases as zero.
    pub fn sum_phases(&self, keys: &[&str]) -> f64 {
        keys.iter().filter_map(|k| self.duration_ms(k)).sum()
    }
}
