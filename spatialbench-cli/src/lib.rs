#![warn(missing_docs)]
//! Spatialbench CLI
//!
//! Command surface of the orchestrator. The default (and `run`) command
//! drives the full benchmark: validate configuration, expand the experiment
//! matrix, dispatch the configured backends, aggregate statistics, and
//! persist a timestamped report. `rescale` and `selectivity` expose the
//! geometry utilities standalone.

mod aggregator;
mod config;
mod formatting;
mod planner;
mod runner;

pub use aggregator::ResultAggregator;
pub use config::{parse_duration, ConfigError, FileConfig, RunConfig};
pub use formatting::format_run_summary;
pub use planner::{generate_variants, PlacementMode};
pub use runner::{BenchmarkRunner, RunnerState};

use clap::{Parser, Subcommand};
use spatialbench_geometry::mesh::{rescale_file, ObjMesh};
use spatialbench_geometry::selectivity::{sphere_diameter, sphere_radius};
use std::path::PathBuf;

/// Spatialbench CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "spatialbench")]
#[command(author, version, about = "Comparative benchmark orchestrator for 3D spatial queries")]
pub struct Cli {
    /// Optional subcommand; defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the query OBJ file
    #[arg(long)]
    pub query_obj: Option<PathBuf>,

    /// Path to the WKT points file
    #[arg(long)]
    pub points: Option<PathBuf>,

    /// Comma-separated backends to run
    #[arg(long, default_value = "cgal,sql,raytracer,raytracer_filter_refine,cuda")]
    pub backends: String,

    /// Output file; a timestamp (and --name) is inserted before the extension
    #[arg(short, long, default_value = "results/benchmark.json")]
    pub output: PathBuf,

    /// Workspace directory for intermediate files
    #[arg(long, default_value = "workspace")]
    pub workspace: PathBuf,

    /// Grid dimensions (e.g. --grid-size 3 3 3); mutually exclusive with --centered
    #[arg(long, num_args = 3, value_names = ["NX", "NY", "NZ"])]
    pub grid_size: Option<Vec<u32>>,

    /// Run twice at the points bounding-box center instead of a grid
    #[arg(long)]
    pub centered: bool,

    /// Run name embedded in the output file name
    #[arg(long)]
    pub name: Option<String>,

    /// Report format: json or csv
    #[arg(long, default_value = "json")]
    pub format: String,

    /// Per-call timeout in seconds (overrides spatialbench.toml)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// CGAL backend directory
    #[arg(long)]
    pub cgal_dir: Option<PathBuf>,

    /// SQL backend directory
    #[arg(long)]
    pub sql_dir: Option<PathBuf>,

    /// Raytracer directory (shared by raytracer and raytracer_filter_refine)
    #[arg(long)]
    pub rayspace_dir: Option<PathBuf>,

    /// CUDA backend directory
    #[arg(long)]
    pub cuda_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the benchmark (default)
    Run,
    /// Rescale an OBJ mesh to target per-axis extents
    Rescale {
        /// Input OBJ file
        input: PathBuf,
        /// Output OBJ file
        output: PathBuf,
        /// Target extents (e.g. --extents 10 10 10)
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], required = true)]
        extents: Vec<f64>,
    },
    /// Compute the sphere radius and diameter for a target selectivity
    Selectivity {
        /// Target volumetric selectivity in (0, 1)
        #[arg(long)]
        selectivity: f64,
        /// Point-cloud bounding-box volume
        #[arg(long)]
        volume: f64,
    },
}

/// Parse arguments and run the CLI.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("spatialbench=debug,backend=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("spatialbench=info")
            .init();
    }

    match cli.command {
        Some(Commands::Rescale {
            ref input,
            ref output,
            ref extents,
        }) => rescale_command(input, output, [extents[0], extents[1], extents[2]]),
        Some(Commands::Selectivity {
            selectivity,
            volume,
        }) => selectivity_command(selectivity, volume),
        Some(Commands::Run) | None => {
            let file_config = FileConfig::discover().unwrap_or_default();
            let run_config = RunConfig::resolve(&cli, &file_config)?;
            BenchmarkRunner::new(run_config).run()?;
            Ok(())
        }
    }
}

/// Rescale a mesh, printing before and after bounding boxes.
fn rescale_command(input: &PathBuf, output: &PathBuf, extents: [f64; 3]) -> anyhow::Result<()> {
    let before = ObjMesh::load(input)?.bounding_box();
    println!("Input bbox:  min {:?}, max {:?}", before.min, before.max);

    rescale_file(input, output, extents)?;

    let after = ObjMesh::load(output)?.bounding_box();
    println!("Output bbox: min {:?}, max {:?}", after.min, after.max);
    println!("Rescaled mesh written to {}", output.display());
    Ok(())
}

/// Print the sphere dimensions for a target selectivity.
fn selectivity_command(selectivity: f64, volume: f64) -> anyhow::Result<()> {
    let radius = sphere_radius(selectivity, volume)?;
    let diameter = sphere_diameter(selectivity, volume)?;
    println!("Selectivity: {}", selectivity);
    println!("Volume:      {}", volume);
    println!("Radius:      {:.6}", radius);
    println!("Diameter:    {:.6}", diameter);
    Ok(())
}
