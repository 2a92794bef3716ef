//! Seed meshes and minimal OBJ I/O.
//!
//! A bloom instances one small seed mesh onto every cage. The builtin
//! seed is a pyramid; arbitrary seeds come in as Wavefront OBJ, of which
//! we support exactly the subset a seed needs: `o`, `v` and `f` records.
//! Faces keep their vertex order, indices are 1-based per the format,
//! and anything malformed is reported with its line number.

use crate::geometry::{Bounds3, Point3};

/// An indexed face mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Point3>,
    /// Faces as vertex index lists (0-based, any arity >= 3).
    pub faces: Vec<Vec<usize>>,
}

impl Mesh {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), vertices: Vec::new(), faces: Vec::new() }
    }

    /// Bounding box, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Bounds3> {
        Bounds3::of(&self.vertices)
    }

    /// A mesh with no faces is just a point cloud - not a usable seed.
    pub fn has_faces(&self) -> bool {
        !self.faces.is_empty()
    }
}

/// The builtin seed: a four-sided pyramid on a unit footprint, apex up.
pub fn pyramid() -> Mesh {
    Mesh {
        name: "seed".to_string(),
        vertices: vec![
            Point3::new(-0.5, 0.0, -0.5),
            Point3::new(0.5, 0.0, -0.5),
            Point3::new(0.5, 0.0, 0.5),
            Point3::new(-0.5, 0.0, 0.5),
            Point3::new(0.0, 1.0, 0.0),
        ],
        faces: vec![
            // base, then the four sides
            vec![3, 2, 1, 0],
            vec![0, 1, 4],
            vec![1, 2, 4],
            vec![2, 3, 4],
            vec![3, 0, 4],
        ],
    }
}

/// Error from OBJ parsing.
#[derive(Debug, PartialEq)]
pub enum ObjError {
    /// A record we do parse was malformed. Line numbers are 1-based.
    Parse { line: usize, message: String },
    /// A face referenced a vertex that does not exist (yet).
    BadIndex { line: usize, index: i64 },
}

impl std::fmt::Display for ObjError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjError::Parse { line, message } => {
                write!(f, "OBJ parse error on line {}: {}", line, message)
            }
            ObjError::BadIndex { line, index } => {
                write!(f, "OBJ face on line {} references invalid vertex {}", line, index)
            }
        }
    }
}

impl std::error::Error for ObjError {}

/// Parse an OBJ string into its objects.
///
/// Vertices are global to the file (as the format defines); each returned
/// mesh gets its own re-based copy of the vertices its faces use. A file
/// with geometry before any `o` record yields an object named "default".
/// Normals, texcoords, materials and groups are ignored.
pub fn parse_obj(content: &str) -> Result<Vec<Mesh>, ObjError> {
    struct RawObject {
        name: String,
        faces: Vec<(usize, Vec<i64>)>, // line number + raw 1-based indices
    }

    let mut vertices: Vec<Point3> = Vec::new();
    let mut objects: Vec<RawObject> = Vec::new();

    for (line_index, raw_line) in content.lines().enumerate() {
        let line_no = line_index + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("o") => {
                let name = fields.next().unwrap_or("default").to_string();
                objects.push(RawObject { name, faces: Vec::new() });
            }
            Some("v") => {
                let mut coord = |axis: &str| -> Result<f64, ObjError> {
                    fields
                        .next()
                        .ok_or_else(|| ObjError::Parse {
                            line: line_no,
                            message: format!("vertex missing {} coordinate", axis),
                        })?
                        .parse::<f64>()
                        .map_err(|_| ObjError::Parse {
                            line: line_no,
                            message: format!("vertex {} is not a number", axis),
                        })
                };
                let x = coord("x")?;
                let y = coord("y")?;
                let z = coord("z")?;
                vertices.push(Point3::new(x, y, z));
            }
            Some("f") => {
                let mut indices = Vec::new();
                for field in fields {
                    // "v", "v/vt", "v/vt/vn", "v//vn" - we only want v.
                    let v = field.split('/').next().unwrap_or("");
                    let index: i64 = v.parse().map_err(|_| ObjError::Parse {
                        line: line_no,
                        message: format!("face index '{}' is not a number", field),
                    })?;
                    indices.push(index);
                }
                if indices.len() < 3 {
                    return Err(ObjError::Parse {
                        line: line_no,
                        message: "face needs at least 3 vertices".to_string(),
                    });
                }
                if objects.is_empty() {
                    objects.push(RawObject {
                        name: "default".to_string(),
                        faces: Vec::new(),
                    });
                }
                if let Some(object) = objects.last_mut() {
                    object.faces.push((line_no, indices));
                }
            }
            // vt, vn, s, g, usemtl, mtllib: ignored
            _ => {}
        }
    }

    // Re-base each object's faces onto its own vertex list.
    let mut meshes = Vec::with_capacity(objects.len());
    for object in objects {
        let mut mesh = Mesh::new(&object.name);
        let mut remap: std::collections::BTreeMap<usize, usize> =
            std::collections::BTreeMap::new();

        for (line_no, indices) in &object.faces {
            let mut face = Vec::with_capacity(indices.len());
            for &raw in indices {
                if raw < 1 || raw as usize > vertices.len() {
                    return Err(ObjError::BadIndex { line: *line_no, index: raw });
                }
                let global = raw as usize - 1;
                // ## Rust Lesson #26: The Entry API
                //
                // `map.entry(k).or_insert_with(...)` does lookup and
                // insert in one pass - no double hashing, and the
                // closure only runs when the key was missing.
                let local = *remap.entry(global).or_insert_with(|| {
                    mesh.vertices.push(vertices[global]);
                    mesh.vertices.len() - 1
                });
                face.push(local);
            }
            mesh.faces.push(face);
        }
        meshes.push(mesh);
    }

    Ok(meshes)
}

/// Serialize meshes to an OBJ string, one `o` record per mesh.
pub fn write_obj(meshes: &[Mesh]) -> String {
    let mut out = String::new();
    let mut offset = 0usize;

    for mesh in meshes {
        out.push_str(&format!("o {}\n", mesh.name));
        for v in &mesh.vertices {
            out.push_str(&format!("v {:.6} {:.6} {:.6}\n", v.x, v.y, v.z));
        }
        for face in &mesh.faces {
            out.push('f');
            for &idx in face {
                out.push_str(&format!(" {}", idx + offset + 1));
            }
            out.push('\n');
        }
        offset += mesh.vertices.len();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pyramid_is_a_closed_solid() {
        let seed = pyramid();
        assert_eq!(seed.vertices.len(), 5);
        assert_eq!(seed.faces.len(), 5);
        assert!(seed.has_faces());
        // Every vertex is used by some face.
        let used: std::collections::BTreeSet<usize> =
            seed.faces.iter().flatten().copied().collect();
        assert_eq!(used.len(), 5);
    }

    #[test]
    fn parse_single_object() {
        let obj = "o tri\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let meshes = parse_obj(obj).unwrap();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].name, "tri");
        assert_eq!(meshes[0].vertices.len(), 3);
        assert_eq!(meshes[0].faces, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn parse_geometry_before_o_record() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let meshes = parse_obj(obj).unwrap();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].name, "default");
    }

    #[test]
    fn parse_two_objects_rebases_indices() {
        let obj = "o a\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n\
                   o b\nv 2 0 0\nv 3 0 0\nv 2 1 0\nf 4 5 6\n";
        let meshes = parse_obj(obj).unwrap();
        assert_eq!(meshes.len(), 2);
        assert_eq!(meshes[1].faces, vec![vec![0, 1, 2]]);
        assert_eq!(meshes[1].vertices[0], Point3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn parse_slash_formats() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/1 2/2/2 3//3\n";
        let meshes = parse_obj(obj).unwrap();
        assert_eq!(meshes[0].faces, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn bad_face_index_names_the_line() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n";
        assert_eq!(
            parse_obj(obj),
            Err(ObjError::BadIndex { line: 4, index: 9 })
        );
    }

    #[test]
    fn malformed_vertex_names_the_line() {
        let obj = "v 0 zero 0\n";
        match parse_obj(obj) {
            Err(ObjError::Parse { line: 1, .. }) => {}
            other => panic!("expected parse error on line 1, got {:?}", other),
        }
    }

    #[test]
    fn roundtrip_through_obj() {
        // Vertex order may be re-based on parse, so compare face geometry.
        let seed = pyramid();
        let text = write_obj(std::slice::from_ref(&seed));
        let parsed = parse_obj(&text).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].faces.len(), seed.faces.len());
        for (face_a, face_b) in parsed[0].faces.iter().zip(&seed.faces) {
            assert_eq!(face_a.len(), face_b.len());
            for (&ia, &ib) in face_a.iter().zip(face_b) {
                let a = parsed[0].vertices[ia];
                let b = seed.vertices[ib];
                assert!(a.distance(b) < 1e-5);
            }
        }
    }

    #[test]
    fn write_obj_offsets_across_meshes() {
        let a = pyramid();
        let mut b = pyramid();
        b.name = "second".to_string();
        let text = write_obj(&[a, b]);
        // Second mesh's faces must reference vertices 6..10.
        assert!(text.contains("o second"));
        assert!(text.contains("f 9 8 7 6"));
    }
}
