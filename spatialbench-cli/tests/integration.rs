//! End-to-end run against stub backend executables.
//!
//! Two backends share a 1x1x1 grid: a working CGAL stub and a raytracer
//! checkout with no executables. The run must complete, persist a report with
//! one success and one classified failure per the full matrix, and compute
//! statistics only for the working backend.

use spatialbench_cli::{BenchmarkRunner, PlacementMode, RunConfig, RunnerState};
use spatialbench_core::BackendKind;
use spatialbench_report::OutputFormat;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;

fn write_executable(path: &Path, script: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, script).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn test_run_with_partial_backend_failure() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let query_obj = root.join("sphere.obj");
    fs::write(
        &query_obj,
        "v 0 0 0\nv 2 0 0\nv 0 2 0\nv 0 0 2\nf 1 2 3\nf 1 2 4\n",
    )
    .unwrap();

    let points = root.join("points.wkt");
    fs::write(
        &points,
        "POINT Z (0 0 0)\nPOINT Z (10 10 10)\nPOINT Z (5 5 5)\n",
    )
    .unwrap();

    let cgal_dir = root.join("cgal");
    write_executable(
        &cgal_dir.join("build/cgal_query"),
        "#!/bin/sh\necho 'CONTAINMENT QUERY TIME: 12.5 ms'\necho 'Points inside mesh: 1'\necho 'Total points: 3'\n",
    );
    // Raytracer checkout exists but holds no executables
    let rayspace_dir = root.join("rayspace");
    fs::create_dir_all(&rayspace_dir).unwrap();

    let config = RunConfig {
        query_obj: query_obj.clone(),
        points: points.clone(),
        backends: vec![BackendKind::Cgal, BackendKind::Raytracer],
        placement: PlacementMode::Grid { nx: 1, ny: 1, nz: 1 },
        output: root.join("results/bench.json"),
        workspace: root.join("workspace"),
        name: Some("stub".to_string()),
        format: OutputFormat::Json,
        timeout: Duration::from_secs(10),
        cgal_dir,
        sql_dir: root.join("sql"),
        rayspace_dir,
        cuda_dir: root.join("cuda"),
    };

    let mut runner = BenchmarkRunner::new(config);
    let report_path = runner.run().unwrap();
    assert_eq!(runner.state(), RunnerState::Persisted);

    let file_name = report_path.file_name().unwrap().to_string_lossy();
    assert!(file_name.starts_with("bench_stub_"), "got {}", file_name);
    assert!(file_name.ends_with(".json"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();

    // Identical variant set for both backends
    let results = &report["results"];
    assert_eq!(results["CGAL"].as_array().unwrap().len(), 1);
    assert_eq!(results["Raytracer"].as_array().unwrap().len(), 1);

    let cgal = &results["CGAL"][0];
    assert_eq!(cgal["success"], true);
    assert_eq!(cgal["query_ms"], 12.5);
    assert_eq!(cgal["inside_count"], 1);

    let raytracer = &results["Raytracer"][0];
    assert_eq!(raytracer["success"], false);
    assert_eq!(raytracer["failure"]["kind"], "setup");
    // Failures carry no timings, not zeros
    assert!(raytracer.get("total_query_ms").is_none());

    // Statistics only for the working backend
    let stats = &report["statistics"];
    assert_eq!(stats["CGAL"]["count"], 1);
    assert_eq!(stats["CGAL"]["mean"], 12.5);
    assert_eq!(stats["CGAL"]["failures"], 0);
    assert!(stats["Raytracer"].is_null());

    // Configuration echo
    assert_eq!(report["configuration"]["mode"], "grid");
    assert_eq!(report["configuration"]["backends"][0], "CGAL");
}

#[test]
fn test_centered_csv_run() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let query_obj = root.join("cube.obj");
    fs::write(&query_obj, "v 0 0 0\nv 1 1 1\n").unwrap();
    let points = root.join("points.wkt");
    fs::write(&points, "POINT Z (0 0 0)\nPOINT Z (4 4 4)\n").unwrap();

    let cgal_dir = root.join("cgal");
    write_executable(
        &cgal_dir.join("build/cgal_query"),
        "#!/bin/sh\necho 'CONTAINMENT QUERY TIME: 3.0 ms'\n",
    );

    let config = RunConfig {
        query_obj,
        points,
        backends: vec![BackendKind::Cgal],
        placement: PlacementMode::Centered,
        output: root.join("results/bench.csv"),
        workspace: root.join("workspace"),
        name: None,
        format: OutputFormat::Csv,
        timeout: Duration::from_secs(10),
        cgal_dir,
        sql_dir: root.join("sql"),
        rayspace_dir: root.join("rayspace"),
        cuda_dir: root.join("cuda"),
    };

    let report_path = BenchmarkRunner::new(config).run().unwrap();
    let csv = fs::read_to_string(&report_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    // Header plus the two centered repeats
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("backend,variant"));
    assert!(lines[1].starts_with("CGAL,run0,"));
    assert!(lines[2].starts_with("CGAL,run1,"));
}
