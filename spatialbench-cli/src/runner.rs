//! Benchmark Runner
//!
//! Owns one benchmark run from validated configuration to the persisted
//! report. The run advances through a strictly forward state machine; there is
//! no retry or re-entry. Dispatch iterates variants in the outer loop and
//! backends in the inner loop, so every backend sees placement `k` before any
//! backend sees placement `k+1`.

use crate::aggregator::ResultAggregator;
use crate::config::RunConfig;
use crate::formatting::format_run_summary;
use crate::planner::{generate_variants, PlacementMode};
use anyhow::Context;
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use spatialbench_adapters::{create_adapter, AdapterContext, BackendAdapter};
use spatialbench_core::{BackendKind, FailureKind, RawOutcome, Variant};
use spatialbench_geometry::mesh::ObjMesh;
use spatialbench_geometry::points::bounding_box_of_wkt;
use spatialbench_report::{
    generate_csv_report, generate_json_report, timestamped_output_path, ConfigurationSection,
    OutputFormat, PlacementSummary, Report, ReportMeta,
};
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

/// Phases of a benchmark run, in order. Transitions are strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunnerState {
    /// Inputs are being resolved and checked
    Configuring,
    /// The experiment matrix is being expanded
    GeneratingVariants,
    /// Backends are being invoked, variants outer, backends inner
    Dispatching,
    /// Outcomes are being folded into statistics
    Aggregating,
    /// The report has been written
    Persisted,
}

impl fmt::Display for RunnerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunnerState::Configuring => "configuring",
            RunnerState::GeneratingVariants => "generating-variants",
            RunnerState::Dispatching => "dispatching",
            RunnerState::Aggregating => "aggregating",
            RunnerState::Persisted => "persisted",
        };
        f.write_str(s)
    }
}

/// One adapter slot in the dispatch loop. A backend whose setup failed stays
/// in the matrix and yields a classified failure for every variant, keeping
/// the variant set identical across backends.
enum AdapterSlot {
    Active(Box<dyn BackendAdapter>),
    SetupFailed(String),
}

/// Drives one benchmark run to completion.
pub struct BenchmarkRunner {
    config: RunConfig,
    state: RunnerState,
}

impl BenchmarkRunner {
    /// Runner for a validated configuration.
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            state: RunnerState::Configuring,
        }
    }

    /// Current phase.
    pub fn state(&self) -> RunnerState {
        self.state
    }

    fn advance(&mut self, next: RunnerState) {
        debug_assert!(self.state < next, "runner state must move forward");
        info!("Run phase: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Execute the run and return the path of the persisted report.
    pub fn run(&mut self) -> anyhow::Result<PathBuf> {
        let started_at = Utc::now();

        let points_bbox = bounding_box_of_wkt(&self.config.points)
            .context("Failed to compute the points bounding box")?;
        info!(
            "Points bounding box: min {:?}, max {:?}",
            points_bbox.min, points_bbox.max
        );

        let mesh = ObjMesh::load(&self.config.query_obj)
            .context("Failed to load the query geometry")?;
        let mesh_center = mesh.center();
        info!(
            "Query mesh: {} vertices, center {:?}",
            mesh.vertex_count(),
            mesh_center
        );

        std::fs::create_dir_all(&self.config.workspace)
            .context("Failed to create the workspace directory")?;

        self.advance(RunnerState::GeneratingVariants);
        let variants = generate_variants(
            self.config.placement,
            &points_bbox,
            mesh_center,
            &self.config.query_obj,
        );
        info!("Generated {} variants", variants.len());

        let ctx = AdapterContext {
            workspace: self.config.workspace.clone(),
            points: self.config.points.clone(),
            timeout: self.config.timeout,
            cgal_dir: self.config.cgal_dir.clone(),
            sql_dir: self.config.sql_dir.clone(),
            rayspace_dir: self.config.rayspace_dir.clone(),
            cuda_dir: self.config.cuda_dir.clone(),
        };

        let mut slots: Vec<(BackendKind, AdapterSlot)> = Vec::new();
        for &kind in &self.config.backends {
            let slot = match create_adapter(kind, &ctx) {
                Ok(mut adapter) => match adapter.setup() {
                    Ok(()) => {
                        info!("[{}] Setup complete", kind);
                        AdapterSlot::Active(adapter)
                    }
                    Err(e) => {
                        warn!("[{}] Setup failed: {}", kind, e);
                        // Partial setup may hold resources; release them now
                        adapter.teardown();
                        AdapterSlot::SetupFailed(e.to_string())
                    }
                },
                Err(e) => {
                    warn!("[{}] Could not construct adapter: {}", kind, e);
                    AdapterSlot::SetupFailed(e.to_string())
                }
            };
            slots.push((kind, slot));
        }

        self.advance(RunnerState::Dispatching);
        let mut aggregator = ResultAggregator::new();
        for (kind, _) in &slots {
            aggregator.register(kind.label());
        }

        let pb = ProgressBar::new((variants.len() * slots.len()) as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        for variant in &variants {
            for (kind, slot) in &mut slots {
                pb.set_message(format!("{} {}", kind.label(), variant.index));
                let outcome = Self::dispatch_one(*kind, slot, variant);
                aggregator.record(kind.label(), outcome);
                pb.inc(1);
            }
        }
        pb.finish_with_message("Complete");

        // Teardown runs after the complete matrix, failures included
        for (kind, slot) in &mut slots {
            if let AdapterSlot::Active(adapter) = slot {
                info!("[{}] Tearing down", kind);
                adapter.teardown();
            }
        }

        self.advance(RunnerState::Aggregating);
        let statistics = aggregator.statistics();
        let report = Report {
            meta: ReportMeta::new(started_at),
            configuration: ConfigurationSection {
                query_obj: self.config.query_obj.display().to_string(),
                points_file: self.config.points.display().to_string(),
                placement: match self.config.placement {
                    PlacementMode::Grid { nx, ny, nz } => PlacementSummary::Grid {
                        grid_size: [nx, ny, nz],
                    },
                    PlacementMode::Centered => PlacementSummary::Centered,
                },
                backends: slots.iter().map(|(k, _)| k.label().to_string()).collect(),
                points_bbox,
            },
            results: aggregator.into_results(),
            statistics,
        };

        self.advance(RunnerState::Persisted);
        let path = timestamped_output_path(
            &self.config.output,
            self.config.name.as_deref(),
            started_at,
        );
        let rendered = match self.config.format {
            OutputFormat::Json => {
                generate_json_report(&report).context("Failed to serialize the report")?
            }
            OutputFormat::Csv => generate_csv_report(&report),
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create the output directory")?;
        }
        std::fs::write(&path, rendered)
            .with_context(|| format!("Failed to write the report to {}", path.display()))?;
        info!("Report saved to {}", path.display());

        println!("{}", format_run_summary(&report));
        println!("Results saved to: {}", path.display());

        Ok(path)
    }

    fn dispatch_one(kind: BackendKind, slot: &mut AdapterSlot, variant: &Variant) -> RawOutcome {
        match slot {
            AdapterSlot::Active(adapter) => {
                let outcome = adapter.run(variant);
                match &outcome.failure {
                    None => info!(
                        "[{}] {} total {:.2} ms",
                        kind,
                        variant.index,
                        outcome.total_query_ms.unwrap_or_default()
                    ),
                    Some(failure) => warn!(
                        "[{}] {} failed ({}): {}",
                        kind, variant.index, failure.kind, failure.message
                    ),
                }
                outcome
            }
            AdapterSlot::SetupFailed(message) => RawOutcome::failed(
                variant,
                FailureKind::Setup,
                format!("Setup failed: {}", message),
            ),
        }
    }
}
