//! CPU-side mesh representation produced by the loaders.

use std::collections::HashSet;

use bytemuck::{Pod, Zeroable};

/// Vertex with position/uv/normal, packed in that order for direct upload.
/// Values are in object space.
///
/// Equality is exact bitwise equality of all eight floats, so `0.0` and
/// `-0.0` are distinct and identical NaNs compare equal.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex {
    pub const fn new(position: [f32; 3], uv: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            uv,
            normal,
        }
    }

    /// Bit pattern of the vertex, used as the dedup key.
    pub fn key(&self) -> VertexKey {
        let words: [u32; 8] = bytemuck::cast(*self);
        VertexKey(words)
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Vertex {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexKey([u32; 8]);

/// Triangle as three indices into the vertex table.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Face(pub [u32; 3]);

/// Indexed triangle mesh: a deduplicated vertex table plus faces into it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
    name: Option<String>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(vertices: Vec<Vertex>, faces: Vec<Face>, name: Option<String>) -> Self {
        Self {
            vertices,
            faces,
            name,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Faces as a flat triangle-list index stream (3 per face).
    pub fn indices(&self) -> &[u32] {
        bytemuck::cast_slice(&self.faces)
    }

    /// Display name from the last `g` line, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// `true` if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.faces.clear();
        self.name = None;
    }

    /// Largest distance of a vertex position from the origin.
    pub fn bounding_radius(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| {
                let [x, y, z] = v.position;
                (x * x + y * y + z * z).sqrt()
            })
            .fold(0.0, f32::max)
    }

    /// Uniform scale that maps the bounding radius onto `target`.
    /// Returns 1.0 when the mesh has no extent.
    pub fn fit_scale(&self, target: f32) -> f32 {
        let radius = self.bounding_radius();
        if radius > f32::EPSILON && radius.is_finite() {
            target / radius
        } else {
            1.0
        }
    }

    /// Line-list positions visualizing the normals: `p`, `p + n * length`
    /// for every vertex.
    pub fn normal_lines(&self, length: f32) -> Vec<[f32; 3]> {
        let mut lines = Vec::with_capacity(self.vertices.len() * 2);
        for v in &self.vertices {
            let [px, py, pz] = v.position;
            let [nx, ny, nz] = v.normal;
            lines.push(v.position);
            lines.push([px + nx * length, py + ny * length, pz + nz * length]);
        }
        lines
    }

    /// Line-list indices of every distinct triangle edge, in first-seen order.
    pub fn wireframe_indices(&self) -> Vec<u32> {
        let mut seen: HashSet<(u32, u32)> = HashSet::with_capacity(self.faces.len() * 3);
        let mut lines = Vec::with_capacity(self.faces.len() * 6);
        for Face([a, b, c]) in &self.faces {
            for (from, to) in [(*a, *b), (*b, *c), (*c, *a)] {
                if seen.insert((from.min(to), from.max(to))) {
                    lines.push(from);
                    lines.push(to);
                }
            }
        }
        lines
    }
}
