//! WKT Point Clouds
//!
//! The points dataset is plain-text WKT, one `POINT Z (x y z)` (or
//! `POINT(x y z)`) record per line. Non-POINT lines are skipped. The SQL
//! backend loads points from CSV, so a streaming converter is provided too.

use regex::Regex;
use spatialbench_core::BoundingBox;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

static COORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]+)\)").unwrap());

/// Errors reading a WKT points file.
#[derive(Debug, Error)]
pub enum PointsError {
    /// File could not be read or written
    #[error("Points I/O error for {path}: {source}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The file contained no parseable POINT records
    #[error("No valid points found in {0}")]
    NoPoints(String),
}

fn io_err(path: &Path, source: std::io::Error) -> PointsError {
    PointsError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn parse_point(line: &str) -> Option<[f64; 3]> {
    let line = line.trim();
    if !line.starts_with("POINT") {
        return None;
    }
    let inner = COORDS.captures(line)?.get(1)?.as_str();
    let mut coords = inner.split_whitespace();
    let x = coords.next()?.parse().ok()?;
    let y = coords.next()?.parse().ok()?;
    let z = coords.next()?.parse().ok()?;
    Some([x, y, z])
}

/// Compute the bounding box of a WKT points file in one streaming pass.
pub fn bounding_box_of_wkt(path: &Path) -> Result<BoundingBox, PointsError> {
    let file = std::fs::File::open(path).map_err(|e| io_err(path, e))?;
    let reader = BufReader::new(file);

    let mut bbox: Option<BoundingBox> = None;
    for line in reader.lines() {
        let line = line.map_err(|e| io_err(path, e))?;
        let Some(p) = parse_point(&line) else {
            continue;
        };
        match &mut bbox {
            None => bbox = Some(BoundingBox::new(p, p)),
            Some(b) => {
                for axis in 0..3 {
                    b.min[axis] = b.min[axis].min(p[axis]);
                    b.max[axis] = b.max[axis].max(p[axis]);
                }
            }
        }
    }

    bbox.ok_or_else(|| PointsError::NoPoints(path.display().to_string()))
}

/// Convert a WKT points file to `x,y,z` CSV for the SQL loader.
///
/// Returns the number of points written.
pub fn wkt_to_csv(wkt_path: &Path, csv_path: &Path) -> Result<u64, PointsError> {
    let input = std::fs::File::open(wkt_path).map_err(|e| io_err(wkt_path, e))?;
    let reader = BufReader::new(input);
    let output = std::fs::File::create(csv_path).map_err(|e| io_err(csv_path, e))?;
    let mut writer = BufWriter::new(output);

    writer
        .write_all(b"x,y,z\n")
        .map_err(|e| io_err(csv_path, e))?;

    let mut written = 0u64;
    for line in reader.lines() {
        let line = line.map_err(|e| io_err(wkt_path, e))?;
        let Some(p) = parse_point(&line) else {
            continue;
        };
        writeln!(writer, "{},{},{}", p[0], p[1], p[2]).map_err(|e| io_err(csv_path, e))?;
        written += 1;
    }

    if written == 0 {
        return Err(PointsError::NoPoints(wkt_path.display().to_string()));
    }
    writer.flush().map_err(|e| io_err(csv_path, e))?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    const WKT: &str = "POINT Z (0 0 0)\n\
        POINT Z (10 20 30)\n\
        not a point\n\
        POINT(5 5 5)\n";

    fn write_wkt(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_bounding_box() {
        let file = write_wkt(WKT);
        let bbox = bounding_box_of_wkt(file.path()).unwrap();
        assert_eq!(bbox.min, [0.0, 0.0, 0.0]);
        assert_eq!(bbox.max, [10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_no_points_is_error() {
        let file = write_wkt("LINESTRING (0 0, 1 1)\n");
        assert!(matches!(
            bounding_box_of_wkt(file.path()),
            Err(PointsError::NoPoints(_))
        ));
    }

    #[test]
    fn test_wkt_to_csv() {
        let file = write_wkt(WKT);
        let csv = NamedTempFile::new().unwrap();
        let count = wkt_to_csv(file.path(), csv.path()).unwrap();
        assert_eq!(count, 3);
        let text = std::fs::read_to_string(csv.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "x,y,z");
        assert_eq!(lines[1], "0,0,0");
        assert_eq!(lines[3], "5,5,5");
    }

    #[test]
    fn test_parse_point_variants() {
        assert_eq!(parse_point("POINT Z (1 2 3)"), Some([1.0, 2.0, 3.0]));
        assert_eq!(parse_point("POINT(1.5 -2 3e2)"), Some([1.5, -2.0, 300.0]));
        assert_eq!(parse_point("POINT (1 2)"), None);
        assert_eq!(parse_point("# comment"), None);
    }
}
