//! OBJ parser for triangle meshes with positions, texture coordinates and normals.
//!
//! Face corners are resolved into full vertices and deduplicated by value,
//! so the result is one vertex table plus a triangle list into it.

use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::{
    error::{MalformedKind, MeshError, MeshResult},
    mesh::{Face, Mesh, Vertex, VertexKey},
};

/// Counts gathered by a successful load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub positions: usize,
    pub texcoords: usize,
    pub normals: usize,
    pub faces: usize,
    /// Unique vertices after dedup.
    pub vertices: usize,
    /// Lines with an unknown keyword.
    pub ignored_lines: usize,
}

/// Load an OBJ mesh from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> MeshResult<Mesh> {
    let mut mesh = Mesh::new();
    mesh.load(path)?;
    Ok(mesh)
}

/// Load an OBJ mesh from a [`BufRead`] implementation.
pub fn load_obj_from_reader<R: BufRead>(reader: R) -> MeshResult<Mesh> {
    let mut mesh = Mesh::new();
    mesh.load_from_reader(reader)?;
    Ok(mesh)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> MeshResult<Mesh> {
    load_obj_from_reader(io::Cursor::new(contents))
}

impl Mesh {
    /// Replace this mesh with the contents of the OBJ file at `path`.
    ///
    /// If the file cannot be opened the mesh is left as it was. Once the
    /// file is open the mesh is cleared, and it stays empty if parsing fails.
    pub fn load(&mut self, path: impl AsRef<Path>) -> MeshResult<LoadStats> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| MeshError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loading OBJ mesh from {}", path.display());
        self.load_from_reader(BufReader::new(file))
    }

    /// Replace this mesh with the OBJ content read from `reader`.
    pub fn load_from_reader<R: BufRead>(&mut self, reader: R) -> MeshResult<LoadStats> {
        self.clear();
        let (mesh, stats) = ObjParser::default().parse(reader)?;
        *self = mesh;
        Ok(stats)
    }

    /// Replace this mesh with OBJ content held in memory.
    pub fn load_from_str(&mut self, contents: &str) -> MeshResult<LoadStats> {
        self.load_from_reader(io::Cursor::new(contents))
    }
}

/// Corner of a face with 0-based indices already bounds-checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Corner {
    position: usize,
    texcoord: Option<usize>,
    normal: Option<usize>,
}

#[derive(Default)]
struct ObjParser {
    positions: Vec<[f32; 3]>,
    texcoords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,

    // Dedup is a hash lookup on the vertex bit pattern; first-seen order
    // is the order of `vertices`.
    unique: HashMap<VertexKey, u32>,
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
    name: Option<String>,
    ignored_lines: usize,
}

impl ObjParser {
    fn parse<R: BufRead>(mut self, reader: R) -> MeshResult<(Mesh, LoadStats)> {
        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.map_err(|source| MeshError::Read {
                line: line_no,
                source,
            })?;
            self.parse_line(line_no, &line)?;
        }

        let stats = LoadStats {
            positions: self.positions.len(),
            texcoords: self.texcoords.len(),
            normals: self.normals.len(),
            faces: self.faces.len(),
            vertices: self.vertices.len(),
            ignored_lines: self.ignored_lines,
        };
        log::info!(
            "Parsed OBJ{}: {} positions, {} uvs, {} normals, {} faces -> {} unique vertices",
            self.name
                .as_deref()
                .map(|n| format!(" '{n}'"))
                .unwrap_or_default(),
            stats.positions,
            stats.texcoords,
            stats.normals,
            stats.faces,
            stats.vertices,
        );
        if stats.ignored_lines > 0 {
            log::warn!("Ignored {} unrecognized OBJ lines", stats.ignored_lines);
        }

        Ok((Mesh::from_parts(self.vertices, self.faces, self.name), stats))
    }

    fn parse_line(&mut self, line_no: usize, line: &str) -> MeshResult<()> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }

        let malformed = |kind| MeshError::Malformed {
            line: line_no,
            kind,
        };

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            return Ok(());
        };
        let fields: Vec<&str> = parts.collect();

        match tag {
            "v" => {
                let position = parse_floats::<3>("v", &fields).map_err(malformed)?;
                self.positions.push(position);
            }
            "vt" => {
                let uv = parse_floats::<2>("vt", &fields).map_err(malformed)?;
                self.texcoords.push(uv);
            }
            "vn" => {
                let normal = parse_floats::<3>("vn", &fields).map_err(malformed)?;
                self.normals.push(normal);
            }
            "f" => {
                if fields.len() != 3 {
                    return Err(malformed(MalformedKind::CornerCount {
                        found: fields.len(),
                    }));
                }
                let mut face = [0u32; 3];
                for (slot, token) in face.iter_mut().zip(&fields) {
                    let corner = self.parse_corner(token).map_err(malformed)?;
                    let vertex = self.resolve(corner);
                    *slot = self.intern(vertex)?;
                }
                self.faces.push(Face(face));
            }
            "g" => {
                let name = trimmed[tag.len()..].trim();
                if name.is_empty() {
                    log::warn!("Group line {} has no name; keeping previous name", line_no);
                } else {
                    self.name = Some(name.to_owned());
                }
            }
            _ => {
                log::warn!("Unknown OBJ line {}: \"{}\"", line_no, trimmed);
                self.ignored_lines += 1;
            }
        }

        Ok(())
    }

    /// Parse `p`, `p/t`, `p//n` or `p/t/n` against the attributes declared so far.
    fn parse_corner(&self, token: &str) -> Result<Corner, MalformedKind> {
        let invalid = || MalformedKind::InvalidCorner {
            token: token.to_owned(),
        };

        let mut split = token.split('/');
        let pos = split.next().filter(|p| !p.is_empty()).ok_or_else(invalid)?;
        let tex = split.next().filter(|t| !t.is_empty());
        let norm = split.next().filter(|n| !n.is_empty());
        if split.next().is_some() {
            return Err(invalid());
        }

        Ok(Corner {
            position: resolve_index("position", pos, self.positions.len())?,
            texcoord: tex
                .map(|t| resolve_index("texcoord", t, self.texcoords.len()))
                .transpose()?,
            normal: norm
                .map(|n| resolve_index("normal", n, self.normals.len()))
                .transpose()?,
        })
    }

    /// Build the vertex for a corner. An omitted texcoord/normal reuses the
    /// position index and falls back to zero when there is no such entry.
    fn resolve(&self, corner: Corner) -> Vertex {
        let uv = match corner.texcoord {
            Some(i) => self.texcoords[i],
            None => self
                .texcoords
                .get(corner.position)
                .copied()
                .unwrap_or_default(),
        };
        let normal = match corner.normal {
            Some(i) => self.normals[i],
            None => self
                .normals
                .get(corner.position)
                .copied()
                .unwrap_or_default(),
        };
        Vertex::new(self.positions[corner.position], uv, normal)
    }

    fn intern(&mut self, vertex: Vertex) -> MeshResult<u32> {
        let key = vertex.key();
        if let Some(&idx) = self.unique.get(&key) {
            return Ok(idx);
        }

        let idx = u32::try_from(self.vertices.len()).map_err(|_| MeshError::TooManyVertices)?;
        log::trace!(
            "vertex {}: pos {:?}, uv {:?}, normal {:?}",
            idx,
            vertex.position,
            vertex.uv,
            vertex.normal
        );
        self.vertices.push(vertex);
        self.unique.insert(key, idx);
        Ok(idx)
    }
}

fn parse_floats<const N: usize>(
    keyword: &'static str,
    fields: &[&str],
) -> Result<[f32; N], MalformedKind> {
    if fields.len() != N {
        return Err(MalformedKind::FieldCount {
            keyword,
            expected: N,
            found: fields.len(),
        });
    }

    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(fields) {
        *slot = token
            .parse::<f32>()
            .map_err(|_| MalformedKind::InvalidNumber {
                token: (*token).to_owned(),
            })?;
    }
    Ok(out)
}

/// Turn a 1-based OBJ index into a 0-based one, checked against `len`.
fn resolve_index(attribute: &'static str, token: &str, len: usize) -> Result<usize, MalformedKind> {
    let index = token
        .parse::<usize>()
        .ok()
        .filter(|&i| i > 0)
        .ok_or_else(|| MalformedKind::InvalidIndex {
            attribute,
            token: token.to_owned(),
        })?;

    if index > len {
        return Err(MalformedKind::IndexOutOfRange {
            attribute,
            index,
            len,
        });
    }

    Ok(index - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn malformed_kind(src: &str) -> (usize, MalformedKind) {
        match load_obj_from_str(src) {
            Err(MeshError::Malformed { line, kind }) => (line, kind),
            other => panic!("expected malformed input, got {other:?}"),
        }
    }

    #[test]
    fn parse_simple_triangle() {
        let src = r#"
            v 0.0 0.0 0.0
            v 1.0 0.0 0.0
            v 0.0 1.0 0.0
            vn 0.0 0.0 1.0
            vt 0.0 0.0
            vt 1.0 0.0
            vt 0.0 1.0
            f 1/1/1 2/2/1 3/3/1
        "#;
        let mesh = load_obj_from_str(src).expect("parse triangle");
        assert_eq!(mesh.vertices().len(), 3);
        assert_eq!(mesh.indices().len(), 3);
        assert_eq!(mesh.vertices()[1].uv, [1.0, 0.0]);
        assert_eq!(mesh.vertices()[2].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn single_face_without_attributes() {
        let mesh = load_obj_from_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.vertices().len(), 3);
        assert_eq!(mesh.faces(), &[Face([0, 1, 2])]);
        assert_eq!(mesh.name(), None);
    }

    #[test]
    fn shared_corners_reuse_vertices() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf 1 2 3\nf 2 4 3\n";
        let mesh = load_obj_from_str(src).unwrap();
        assert_eq!(mesh.vertices().len(), 4);
        assert_eq!(mesh.faces(), &[Face([0, 1, 2]), Face([1, 3, 2])]);
    }

    #[test]
    fn identical_vertices_from_different_indices_are_merged() {
        // Positions 1 and 4 hold the same value.
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 0\nf 1 2 3\nf 4 2 3\n";
        let mesh = load_obj_from_str(src).unwrap();
        assert_eq!(mesh.vertices().len(), 3);
        assert_eq!(mesh.faces()[0], mesh.faces()[1]);
    }

    #[test]
    fn same_position_different_normal_stays_distinct() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvn 0 0 -1\n\
                   f 1//1 2//1 3//1\nf 1//2 3//2 2//2\n";
        let mesh = load_obj_from_str(src).unwrap();
        assert_eq!(mesh.vertices().len(), 6);
        assert_eq!(mesh.faces()[1], Face([3, 4, 5]));
    }

    #[test]
    fn last_group_name_wins() {
        let src = "g MyModel\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        assert_eq!(load_obj_from_str(src).unwrap().name(), Some("MyModel"));

        let src = "g MyModel\nv 0 0 0\ng Other\n";
        assert_eq!(load_obj_from_str(src).unwrap().name(), Some("Other"));
    }

    #[test]
    fn group_name_keeps_rest_of_line() {
        let mesh = load_obj_from_str("g  Left Arm  \n").unwrap();
        assert_eq!(mesh.name(), Some("Left Arm"));

        let mesh = load_obj_from_str("g Body\ng\n").unwrap();
        assert_eq!(mesh.name(), Some("Body"));
    }

    #[test]
    fn omitted_attributes_fall_back_to_zero() {
        let src = "v 1 2 3\nv 4 5 6\nv 7 8 9\nv 1 1 1\nv 2 2 2\n\
                   vn 0 1 0\nvn 0 1 0\nvn 0 1 0\nvn 0 1 0\n\
                   f 1 2 5\n";
        let mesh = load_obj_from_str(src).unwrap();
        let v = mesh.vertices();
        // Normals 1 and 2 exist, normal 5 does not.
        assert_eq!(v[0].normal, [0.0, 1.0, 0.0]);
        assert_eq!(v[1].normal, [0.0, 1.0, 0.0]);
        assert_eq!(v[2].normal, [0.0, 0.0, 0.0]);
        assert!(v.iter().all(|v| v.uv == [0.0, 0.0]));
    }

    #[test]
    fn omitted_attribute_uses_entry_at_position_index() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\nv 1 1 1\n\
                   vn 1 0 0\nvn 1 0 0\nvn 1 0 0\nvn 1 0 0\nvn 0 0 1\n\
                   vt 0.5 0.5\n\
                   f 5 1 2\n";
        let mesh = load_obj_from_str(src).unwrap();
        let first = mesh.vertices()[0];
        assert_eq!(first.position, [1.0, 1.0, 1.0]);
        assert_eq!(first.normal, [0.0, 0.0, 1.0]);
        assert_eq!(first.uv, [0.0, 0.0]);
        assert_eq!(mesh.vertices()[1].uv, [0.5, 0.5]);
    }

    #[test]
    fn empty_texcoord_slot_is_implicit() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.25 0.75\nvn 0 0 1\nf 1//1 2//1 3//1\n";
        let mesh = load_obj_from_str(src).unwrap();
        assert_eq!(mesh.vertices()[0].uv, [0.25, 0.75]);
        assert_eq!(mesh.vertices()[1].uv, [0.0, 0.0]);
        assert_eq!(mesh.vertices()[2].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn comments_blank_and_unknown_lines_are_skipped() {
        let src = "# header\n\n   # indented comment\nmtllib x.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\ns off\nf 1 2 3\n";
        let mut mesh = Mesh::new();
        let stats = mesh.load_from_str(src).unwrap();
        assert_eq!(
            stats,
            LoadStats {
                positions: 3,
                texcoords: 0,
                normals: 0,
                faces: 1,
                vertices: 3,
                ignored_lines: 2,
            }
        );
    }

    #[test]
    fn empty_source_yields_empty_mesh() {
        let mesh = load_obj_from_str("").unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn face_count_matches_face_lines() {
        let mut src = String::from("v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nv 2 0 0\n");
        for _ in 0..4 {
            src.push_str("f 1 2 3\nf 2 4 3\nf 2 5 4\n");
        }
        let mesh = load_obj_from_str(&src).unwrap();
        assert_eq!(mesh.faces().len(), 12);
    }

    #[test]
    fn vertex_table_is_unique_and_faces_are_in_range() {
        let mut src = String::new();
        for z in 0..4 {
            for y in 0..4 {
                for x in 0..4 {
                    src.push_str(&format!("v {x} {y} {z}\n"));
                }
            }
        }
        src.push_str("vn 0 0 1\nvn 0 1 0\n");
        for i in 1..=60 {
            let n = (i % 2) + 1;
            src.push_str(&format!("f {}//{n} {}//{n} {}//{n}\n", i, i + 1, i + 4));
        }

        let mesh = load_obj_from_str(&src).unwrap();
        let vertices = mesh.vertices();
        for (i, a) in vertices.iter().enumerate() {
            for b in &vertices[i + 1..] {
                assert_ne!(a, b);
            }
        }
        let count = vertices.len() as u32;
        assert!(mesh.indices().iter().all(|&i| i < count));
        assert_eq!(mesh.faces().len(), 60);
    }

    #[test]
    fn wrong_field_counts_are_rejected() {
        assert_eq!(
            malformed_kind("v 1 2\n"),
            (
                1,
                MalformedKind::FieldCount {
                    keyword: "v",
                    expected: 3,
                    found: 2
                }
            )
        );
        assert_eq!(
            malformed_kind("vt 1 2 3\n").1,
            MalformedKind::FieldCount {
                keyword: "vt",
                expected: 2,
                found: 3
            }
        );
        assert!(matches!(
            malformed_kind("vn 0 1\n").1,
            MalformedKind::FieldCount { keyword: "vn", .. }
        ));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let (line, kind) = malformed_kind("v 0 0 0\nv 1 x 0\n");
        assert_eq!(line, 2);
        assert_eq!(kind, MalformedKind::InvalidNumber { token: "x".into() });
    }

    #[test]
    fn faces_must_be_triangles() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf 1 2 3 4\n";
        assert_eq!(
            malformed_kind(src),
            (5, MalformedKind::CornerCount { found: 4 })
        );
        let src = "v 0 0 0\nv 1 0 0\nf 1 2\n";
        assert_eq!(malformed_kind(src).1, MalformedKind::CornerCount { found: 2 });
    }

    #[test]
    fn non_positive_indices_are_rejected() {
        let base = "v 0 0 0\nv 1 0 0\nv 0 1 0\n";
        assert_eq!(
            malformed_kind(&format!("{base}f 0 1 2\n")).1,
            MalformedKind::InvalidIndex {
                attribute: "position",
                token: "0".into()
            }
        );
        assert!(matches!(
            malformed_kind(&format!("{base}f -1 1 2\n")).1,
            MalformedKind::InvalidIndex { .. }
        ));
        assert!(matches!(
            malformed_kind(&format!("{base}f 1/a 2 3\n")).1,
            MalformedKind::InvalidIndex {
                attribute: "texcoord",
                ..
            }
        ));
    }

    #[test]
    fn forward_references_are_out_of_range() {
        let src = "v 0 0 0\nv 1 0 0\nf 1 2 3\nv 0 1 0\n";
        assert_eq!(
            malformed_kind(src),
            (
                3,
                MalformedKind::IndexOutOfRange {
                    attribute: "position",
                    index: 3,
                    len: 2
                }
            )
        );
    }

    #[test]
    fn explicit_attribute_indices_are_bounds_checked() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1/1 2/2 3/1\n";
        assert_eq!(
            malformed_kind(src).1,
            MalformedKind::IndexOutOfRange {
                attribute: "texcoord",
                index: 2,
                len: 1
            }
        );
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//1 2//1 3//1\n";
        assert_eq!(
            malformed_kind(src).1,
            MalformedKind::IndexOutOfRange {
                attribute: "normal",
                index: 1,
                len: 0
            }
        );
    }

    #[test]
    fn malformed_corner_syntax() {
        let base = "v 0 0 0\nv 1 0 0\nv 0 1 0\n";
        assert_eq!(
            malformed_kind(&format!("{base}f /1 2 3\n")).1,
            MalformedKind::InvalidCorner { token: "/1".into() }
        );
        assert_eq!(
            malformed_kind(&format!("{base}f 1/1/1/1 2 3\n")).1,
            MalformedKind::InvalidCorner {
                token: "1/1/1/1".into()
            }
        );
    }

    #[test]
    fn failed_parse_leaves_mesh_cleared() {
        let mut mesh = load_obj_from_str("g Keep\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert!(!mesh.is_empty());

        let err = mesh.load_from_str("v 0 0 0\nf 1 2 3\n").unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(mesh.is_empty());
        assert_eq!(mesh.name(), None);
    }

    #[test]
    fn reload_discards_previous_state() {
        let mut mesh = load_obj_from_str("g First\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        mesh.load_from_str("v 5 5 5\nv 6 5 5\nv 5 6 5\nv 6 6 5\nf 1 2 3\nf 2 4 3\n")
            .unwrap();
        assert_eq!(mesh.name(), None);
        assert_eq!(mesh.vertices().len(), 4);
        assert_eq!(mesh.vertices()[0].position, [5.0, 5.0, 5.0]);
        assert_eq!(mesh.faces().len(), 2);
    }

    #[test]
    fn invalid_utf8_is_a_read_error() {
        let bytes: &[u8] = b"v 0 0 0\nv \xff 0 0\n";
        let err = load_obj_from_reader(bytes).unwrap_err();
        assert!(matches!(err, MeshError::Read { line: 2, .. }));
    }
}
