//! Console Output Extraction
//!
//! The CPU backends report timings and result counts as free-form console
//! lines rather than structured documents. Each extractor returns `None` when
//! its pattern is absent; callers treat that as a missing-output failure, not
//! as zero.

use regex::Regex;
use std::sync::LazyLock;

static CONTAINMENT_QUERY_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CONTAINMENT QUERY TIME:\s*([0-9.]+)\s*ms").unwrap());

static QUERY_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"QUERY TIME:\s*([0-9.]+)\s*ms").unwrap());

static POINTS_INSIDE_MESH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Points inside mesh:\s*(\d+)").unwrap());

static TOTAL_POINTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Total points:\s*(\d+)").unwrap());

static POINTS_INSIDE_POLYGONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Points INSIDE polygons:\s*(\d+)").unwrap());

static TOTAL_RAYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Total rays:\s*(\d+)").unwrap());

fn capture_f64(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

fn capture_u64(re: &Regex, text: &str) -> Option<u64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// `CONTAINMENT QUERY TIME: <n> ms` (CGAL).
pub fn containment_query_time_ms(text: &str) -> Option<f64> {
    capture_f64(&CONTAINMENT_QUERY_TIME, text)
}

/// `QUERY TIME: <n> ms` (SQL).
pub fn query_time_ms(text: &str) -> Option<f64> {
    capture_f64(&QUERY_TIME, text)
}

/// `Points inside mesh: <n>` (CGAL, SQL).
pub fn points_inside_mesh(text: &str) -> Option<u64> {
    capture_u64(&POINTS_INSIDE_MESH, text)
}

/// `Total points: <n>` (CGAL, SQL, FilterRefine).
pub fn total_points(text: &str) -> Option<u64> {
    capture_u64(&TOTAL_POINTS, text)
}

/// `Points INSIDE polygons: <n>` (raytracer family).
pub fn points_inside_polygons(text: &str) -> Option<u64> {
    capture_u64(&POINTS_INSIDE_POLYGONS, text)
}

/// `Total rays: <n>` (raytracer).
pub fn total_rays(text: &str) -> Option<u64> {
    capture_u64(&TOTAL_RAYS, text)
}
