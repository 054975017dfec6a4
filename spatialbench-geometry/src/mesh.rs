//! OBJ Mesh Handling
//!
//! A deliberately minimal reader for the plain-text OBJ convention the
//! backends consume: vertex lines (`v x y z`) are parsed, everything else
//! (faces, normals, comments) is preserved verbatim. Rescaling and
//! translation rewrite only vertex coordinates, so line count and ordering
//! are identical between input and output.

use spatialbench_core::{BoundingBox, Vec3};
use std::path::Path;
use thiserror::Error;

/// Errors loading or transforming a mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    /// File could not be read or written
    #[error("Mesh I/O error for {path}: {source}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// A `v` line did not contain three parseable coordinates
    #[error("Invalid vertex on line {line}: {text}")]
    InvalidVertex {
        /// 1-based line number
        line: usize,
        /// Offending line text
        text: String,
    },
    /// The file contained no vertices at all
    #[error("No vertices found in {0}")]
    NoVertices(String),
    /// The mesh is flat along an axis so no finite scale factor exists
    #[error("Degenerate mesh: zero extent along {axis} axis, cannot rescale")]
    DegenerateExtent {
        /// Axis name ("x", "y", or "z")
        axis: &'static str,
    },
}

/// One line of an OBJ file.
#[derive(Debug, Clone, PartialEq)]
enum ObjLine {
    Vertex(Vec3),
    /// Face, normal, comment, or anything else - carried through untouched.
    Other(String),
}

/// An OBJ mesh that round-trips byte layout for non-vertex lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjMesh {
    lines: Vec<ObjLine>,
    vertex_count: usize,
}

impl ObjMesh {
    /// Load a mesh from disk.
    pub fn load(path: &Path) -> Result<Self, MeshError> {
        let text = std::fs::read_to_string(path).map_err(|source| MeshError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Result<Self, MeshError> {
        let mut lines = Vec::new();
        let mut vertex_count = 0;
        for (number, raw) in text.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.starts_with("v ") {
                let parts: Vec<&str> = trimmed.split_whitespace().collect();
                if parts.len() < 4 {
                    return Err(MeshError::InvalidVertex {
                        line: number + 1,
                        text: raw.to_string(),
                    });
                }
                let mut coords = [0.0f64; 3];
                for (slot, part) in coords.iter_mut().zip(&parts[1..4]) {
                    *slot = part.parse().map_err(|_| MeshError::InvalidVertex {
                        line: number + 1,
                        text: raw.to_string(),
                    })?;
                }
                lines.push(ObjLine::Vertex(coords));
                vertex_count += 1;
            } else {
                lines.push(ObjLine::Other(raw.to_string()));
            }
        }
        if vertex_count == 0 {
            return Err(MeshError::NoVertices(path.display().to_string()));
        }
        Ok(Self {
            lines,
            vertex_count,
        })
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Iterate over vertex positions.
    pub fn vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.lines.iter().filter_map(|l| match l {
            ObjLine::Vertex(v) => Some(*v),
            ObjLine::Other(_) => None,
        })
    }

    /// Axis-aligned bounding box of the vertices.
    pub fn bounding_box(&self) -> BoundingBox {
        // parse() guarantees at least one vertex
        BoundingBox::from_points(self.vertices())
            .unwrap_or(BoundingBox::new([0.0; 3], [0.0; 3]))
    }

    /// Center of the bounding box.
    pub fn center(&self) -> Vec3 {
        self.bounding_box().center()
    }

    /// Translate every vertex by the given vector.
    pub fn translate(&mut self, t: Vec3) {
        for line in &mut self.lines {
            if let ObjLine::Vertex(v) = line {
                v[0] += t[0];
                v[1] += t[1];
                v[2] += t[2];
            }
        }
    }

    /// Rescale the mesh so its bounding box matches `target_extents`, scaling
    /// about the bounding-box center so the centroid position is preserved.
    ///
    /// A zero extent along any axis is an error: there is no finite scale
    /// factor that reaches the target.
    pub fn rescale(&mut self, target_extents: Vec3) -> Result<(), MeshError> {
        let bbox = self.bounding_box();
        let center = bbox.center();
        let extents = bbox.extents();

        let mut scale = [0.0f64; 3];
        for (axis, name) in ["x", "y", "z"].iter().enumerate() {
            if extents[axis] <= 0.0 {
                return Err(MeshError::DegenerateExtent { axis: name });
            }
            scale[axis] = target_extents[axis] / extents[axis];
        }

        for line in &mut self.lines {
            if let ObjLine::Vertex(v) = line {
                for axis in 0..3 {
                    v[axis] = (v[axis] - center[axis]) * scale[axis] + center[axis];
                }
            }
        }
        Ok(())
    }

    /// Write the mesh to disk. Non-vertex lines are emitted exactly as read;
    /// only vertex coordinate values differ from the source file.
    pub fn save(&self, path: &Path) -> Result<(), MeshError> {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                ObjLine::Vertex(v) => {
                    out.push_str(&format!("v {} {} {}\n", v[0], v[1], v[2]));
                }
                ObjLine::Other(text) => {
                    out.push_str(text);
                    out.push('\n');
                }
            }
        }
        std::fs::write(path, out).map_err(|source| MeshError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Translate `input` by `translation` and write the result to `output`.
///
/// Always writes a fresh file, even for a zero translation, so downstream
/// steps never mutate shared source geometry.
pub fn translate_file(input: &Path, output: &Path, translation: Vec3) -> Result<(), MeshError> {
    let mut mesh = ObjMesh::load(input)?;
    mesh.translate(translation);
    mesh.save(output)
}

/// Rescale `input` to `target_extents` about its bounding-box center and
/// write the result to `output`. A fresh file is written even when all scale
/// factors are 1.0.
pub fn rescale_file(input: &Path, output: &Path, target_extents: Vec3) -> Result<(), MeshError> {
    let mut mesh = ObjMesh::load(input)?;
    mesh.rescale(target_extents)?;
    mesh.save(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CUBE: &str = "# unit cube\n\
        v 0 0 0\n\
        v 1 0 0\n\
        v 0 1 0\n\
        v 1 1 0\n\
        v 0 0 1\n\
        v 1 0 1\n\
        v 0 1 1\n\
        v 1 1 1\n\
        f 1 2 4 3\n\
        f 5 6 8 7\n";

    fn write_obj(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    fn load(text: &str) -> ObjMesh {
        let file = write_obj(text);
        ObjMesh::load(file.path()).unwrap()
    }

    #[test]
    fn test_load_counts_vertices() {
        let mesh = load(CUBE);
        assert_eq!(mesh.vertex_count(), 8);
    }

    #[test]
    fn test_bounding_box_and_center() {
        let mesh = load(CUBE);
        let bbox = mesh.bounding_box();
        assert_eq!(bbox.min, [0.0, 0.0, 0.0]);
        assert_eq!(bbox.max, [1.0, 1.0, 1.0]);
        assert_eq!(mesh.center(), [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_translate_moves_bbox() {
        let mut mesh = load(CUBE);
        mesh.translate([10.0, -5.0, 2.0]);
        let bbox = mesh.bounding_box();
        assert_eq!(bbox.min, [10.0, -5.0, 2.0]);
        assert_eq!(bbox.max, [11.0, -4.0, 3.0]);
    }

    #[test]
    fn test_rescale_hits_target_extents_and_preserves_center() {
        let mut mesh = load(CUBE);
        let before = mesh.center();
        mesh.rescale([10.0, 4.0, 2.0]).unwrap();
        let bbox = mesh.bounding_box();
        let extents = bbox.extents();
        assert!((extents[0] - 10.0).abs() < 1e-9);
        assert!((extents[1] - 4.0).abs() < 1e-9);
        assert!((extents[2] - 2.0).abs() < 1e-9);
        let after = mesh.center();
        for axis in 0..3 {
            assert!((before[axis] - after[axis]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rescale_is_idempotent() {
        let mut mesh = load(CUBE);
        mesh.rescale([3.0, 3.0, 3.0]).unwrap();
        let once = mesh.clone();
        mesh.rescale([3.0, 3.0, 3.0]).unwrap();
        for (a, b) in once.vertices().zip(mesh.vertices()) {
            for axis in 0..3 {
                assert!((a[axis] - b[axis]).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_rescale_degenerate_extent_is_error() {
        // All vertices share z = 0
        let flat = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mut mesh = load(flat);
        let err = mesh.rescale([1.0, 1.0, 1.0]).unwrap_err();
        assert!(matches!(err, MeshError::DegenerateExtent { axis: "z" }));
    }

    #[test]
    fn test_save_preserves_line_count_and_faces() {
        let mesh = load(CUBE);
        let out = NamedTempFile::new().unwrap();
        mesh.save(out.path()).unwrap();
        let written = std::fs::read_to_string(out.path()).unwrap();
        assert_eq!(written.lines().count(), CUBE.lines().count());
        assert!(written.contains("f 1 2 4 3"));
        assert!(written.contains("# unit cube"));
    }

    #[test]
    fn test_translate_file_writes_fresh_copy() {
        let input = write_obj(CUBE);
        let out = NamedTempFile::new().unwrap();
        translate_file(input.path(), out.path(), [0.0, 0.0, 0.0]).unwrap();
        let mesh = ObjMesh::load(out.path()).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
    }

    #[test]
    fn test_no_vertices_is_error() {
        let file = write_obj("# empty\nf 1 2 3\n");
        let err = ObjMesh::load(file.path()).unwrap_err();
        assert!(matches!(err, MeshError::NoVertices(_)));
    }

    #[test]
    fn test_invalid_vertex_is_error() {
        let file = write_obj("v 1.0 nan-ish\n");
        let err = ObjMesh::load(file.path()).unwrap_err();
        assert!(matches!(err, MeshError::InvalidVertex { line: 1, .. }));
    }
}
