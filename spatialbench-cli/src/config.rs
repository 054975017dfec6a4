//! Configuration loading from spatialbench.toml
//!
//! Defaults can be specified in a `spatialbench.toml` file, discovered by
//! walking up from the current directory. CLI flags override file values, and
//! the merged result is validated into an immutable [`RunConfig`] before any
//! backend is touched.

use serde::{Deserialize, Serialize};
use spatialbench_core::BackendKind;
use spatialbench_report::OutputFormat;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::planner::PlacementMode;
use crate::Cli;

/// Configuration errors. All of these are fatal and reported before any
/// backend invocation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required input argument was not given
    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    /// An input file does not exist
    #[error("{what} not found: {path}")]
    InputNotFound {
        /// Which input is missing
        what: &'static str,
        /// Path that was checked
        path: PathBuf,
    },

    /// Grid dimensions must all be positive
    #[error("Invalid grid size {0}x{1}x{2}: all dimensions must be positive")]
    InvalidGridSize(u32, u32, u32),

    /// Exactly one placement mode must be selected
    #[error("--grid-size and --centered are mutually exclusive; specify exactly one")]
    PlacementConflict,

    /// An unparseable duration string
    #[error("Invalid duration '{0}'")]
    InvalidDuration(String),

    /// An unknown backend id on the command line
    #[error("{0}")]
    UnknownBackend(String),

    /// An unknown output format
    #[error("{0}")]
    UnknownFormat(String),
}

/// File-level configuration (`spatialbench.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Runner table
    #[serde(default)]
    pub runner: RunnerTable,
    /// Backend checkout directories
    #[serde(default)]
    pub backends: BackendsTable,
}

/// `[runner]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerTable {
    /// Per-call timeout (e.g. "3600s", "30m")
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

impl Default for RunnerTable {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> String {
    "3600s".to_string()
}

/// `[backends]` table: base directories of the backend checkouts.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BackendsTable {
    /// CGAL checkout
    #[serde(default)]
    pub cgal_dir: Option<PathBuf>,
    /// SQL checkout
    #[serde(default)]
    pub sql_dir: Option<PathBuf>,
    /// Raytracer checkout (shared by raytracer and filter-refine)
    #[serde(default)]
    pub rayspace_dir: Option<PathBuf>,
    /// CUDA checkout
    #[serde(default)]
    pub cuda_dir: Option<PathBuf>,
}

impl FileConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Discover and load configuration by walking up from the current directory.
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join("spatialbench.toml");
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }
}

/// Parse a duration string (e.g. "3600s", "30m", "500ms") into a [`Duration`].
/// A bare number is taken as seconds.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ConfigError::InvalidDuration(s.to_string()));
    }

    let (num_part, unit_part) = s
        .char_indices()
        .find(|(_, c)| c.is_alphabetic())
        .map(|(i, _)| s.split_at(i))
        .unwrap_or((s, "s"));

    let value: f64 = num_part
        .parse()
        .map_err(|_| ConfigError::InvalidDuration(s.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidDuration(s.to_string()));
    }

    let seconds = match unit_part.to_lowercase().as_str() {
        "ms" => value / 1000.0,
        "s" | "" => value,
        "m" | "min" => value * 60.0,
        "h" => value * 3600.0,
        _ => return Err(ConfigError::InvalidDuration(s.to_string())),
    };

    Ok(Duration::from_secs_f64(seconds))
}

/// Validated, immutable run configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Query geometry (OBJ)
    pub query_obj: PathBuf,
    /// Points dataset (WKT)
    pub points: PathBuf,
    /// Backends to drive, in dispatch order
    pub backends: Vec<BackendKind>,
    /// Placement mode
    pub placement: PlacementMode,
    /// Output path template (timestamp inserted before the extension)
    pub output: PathBuf,
    /// Scratch directory for intermediate files
    pub workspace: PathBuf,
    /// Optional run name embedded in the output file name
    pub name: Option<String>,
    /// Report format
    pub format: OutputFormat,
    /// Per-call timeout
    pub timeout: Duration,
    /// CGAL checkout
    pub cgal_dir: PathBuf,
    /// SQL checkout
    pub sql_dir: PathBuf,
    /// Raytracer checkout
    pub rayspace_dir: PathBuf,
    /// CUDA checkout
    pub cuda_dir: PathBuf,
}

impl RunConfig {
    /// Merge CLI arguments over file configuration and validate everything.
    pub fn resolve(cli: &Cli, file: &FileConfig) -> Result<Self, ConfigError> {
        let query_obj = cli
            .query_obj
            .clone()
            .ok_or(ConfigError::MissingArgument("--query-obj"))?;
        if !query_obj.exists() {
            return Err(ConfigError::InputNotFound {
                what: "Query geometry",
                path: query_obj,
            });
        }

        let points = cli
            .points
            .clone()
            .ok_or(ConfigError::MissingArgument("--points"))?;
        if !points.exists() {
            return Err(ConfigError::InputNotFound {
                what: "Points file",
                path: points,
            });
        }

        let placement = match (&cli.grid_size, cli.centered) {
            (Some(_), true) => return Err(ConfigError::PlacementConflict),
            (None, false) => return Err(ConfigError::PlacementConflict),
            (Some(dims), false) => {
                let (nx, ny, nz) = (dims[0], dims[1], dims[2]);
                if nx == 0 || ny == 0 || nz == 0 {
                    return Err(ConfigError::InvalidGridSize(nx, ny, nz));
                }
                PlacementMode::Grid { nx, ny, nz }
            }
            (None, true) => PlacementMode::Centered,
        };

        let mut backends = Vec::new();
        for id in cli.backends.split(',') {
            let kind: BackendKind = id.parse().map_err(ConfigError::UnknownBackend)?;
            if !backends.contains(&kind) {
                backends.push(kind);
            }
        }

        let format: OutputFormat = cli.format.parse().map_err(ConfigError::UnknownFormat)?;

        let timeout = match cli.timeout {
            Some(secs) => Duration::from_secs(secs),
            None => parse_duration(&file.runner.timeout)?,
        };

        let dir = |cli_val: &Option<PathBuf>, file_val: &Option<PathBuf>, default: &str| {
            cli_val
                .clone()
                .or_else(|| file_val.clone())
                .unwrap_or_else(|| PathBuf::from(default))
        };

        Ok(Self {
            query_obj,
            points,
            backends,
            placement,
            output: cli.output.clone(),
            workspace: cli.workspace.clone(),
            name: cli.name.clone(),
            format,
            timeout,
            cgal_dir: dir(&cli.cgal_dir, &file.backends.cgal_dir, "baselines/CGAL"),
            sql_dir: dir(&cli.sql_dir, &file.backends.sql_dir, "baselines/SQL"),
            rayspace_dir: dir(&cli.rayspace_dir, &file.backends.rayspace_dir, "RaySpace3D"),
            cuda_dir: dir(&cli.cuda_dir, &file.backends.cuda_dir, "baselines/CUDA"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("3600s").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("30m").unwrap(), Duration::from_secs(1800));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_duration("45").unwrap(), Duration::from_secs(45));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("5 fortnights").is_err());
        assert!(parse_duration("-3s").is_err());
    }

    #[test]
    fn test_parse_toml_defaults() {
        let toml_str = r#"
            [runner]
            timeout = "30m"

            [backends]
            cgal_dir = "/opt/cgal"
        "#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.runner.timeout, "30m");
        assert_eq!(config.backends.cgal_dir, Some(PathBuf::from("/opt/cgal")));
        assert_eq!(config.backends.sql_dir, None);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.runner.timeout, "3600s");
    }
}
