//! GPU copies of a loaded mesh. Buffers are released when `GpuMesh` drops.

use asset::{Mesh, Vertex};
use wgpu::{Buffer, BufferUsages, Device, VertexBufferLayout, VertexStepMode, util::DeviceExt};

use crate::error::{RenderError, RenderResult};

/// Full mesh vertex: position, uv, normal.
pub const MESH_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: std::mem::size_of::<Vertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Float32x3],
};

/// Same vertex buffer, position only (wireframe overlay).
pub const MESH_POSITION_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: std::mem::size_of::<Vertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
};

/// Tightly packed positions (normal lines).
pub const LINE_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: std::mem::size_of::<[f32; 3]>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
};

/// Normal lines are this fraction of the bounding radius long.
pub const NORMAL_LINE_FRACTION: f32 = 0.1;

/// Draw ranges are `u32`; reject counts that would not fit.
fn draw_count(what: &'static str, count: usize) -> RenderResult<u32> {
    u32::try_from(count).map_err(|_| RenderError::DrawRangeOverflow { what, count })
}

pub struct GpuMesh {
    pub vertex_buf: Buffer,
    pub index_buf: Buffer,
    pub index_count: u32,
    pub wire_index_buf: Buffer,
    pub wire_index_count: u32,
    pub normal_buf: Buffer,
    pub normal_vertex_count: u32,
    /// Uniform scale that fits the mesh into the viewer's framing.
    pub fit_scale: f32,
}

impl GpuMesh {
    pub fn upload(device: &Device, mesh: &Mesh, fit_radius: f32) -> RenderResult<Self> {
        if mesh.is_empty() {
            return Err(RenderError::EmptyMesh);
        }

        let label = mesh.name().unwrap_or("Mesh");
        let wire_indices = mesh.wireframe_indices();
        let normal_lines = mesh.normal_lines(mesh.bounding_radius() * NORMAL_LINE_FRACTION);
        let index_count = draw_count("index", mesh.indices().len())?;
        let wire_index_count = draw_count("wireframe index", wire_indices.len())?;
        let normal_vertex_count = draw_count("normal line vertex", normal_lines.len())?;

        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} VB")),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: BufferUsages::VERTEX,
        });
        let index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} IB")),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: BufferUsages::INDEX,
        });
        let wire_index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} wire IB")),
            contents: bytemuck::cast_slice(&wire_indices),
            usage: BufferUsages::INDEX,
        });
        let normal_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} normals VB")),
            contents: bytemuck::cast_slice(&normal_lines),
            usage: BufferUsages::VERTEX,
        });

        let fit_scale = mesh.fit_scale(fit_radius);
        log::info!(
            "Uploaded mesh '{}': {} vertices, {} triangles, {} edges, scale {:.4}",
            label,
            mesh.vertices().len(),
            mesh.faces().len(),
            wire_indices.len() / 2,
            fit_scale
        );

        Ok(Self {
            vertex_buf,
            index_buf,
            index_count,
            wire_index_buf,
            wire_index_count,
            normal_buf,
            normal_vertex_count,
            fit_scale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_match_vertex_packing() {
        assert_eq!(MESH_LAYOUT.array_stride, 32);
        let offsets: Vec<u64> = MESH_LAYOUT.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 20]);
        assert_eq!(MESH_POSITION_LAYOUT.array_stride, MESH_LAYOUT.array_stride);
        assert_eq!(LINE_LAYOUT.array_stride, 12);
    }

    #[test]
    fn draw_counts_must_fit_u32() {
        assert_eq!(draw_count("index", 36).unwrap(), 36);
        assert_eq!(draw_count("index", u32::MAX as usize).unwrap(), u32::MAX);

        let too_many = u32::MAX as usize + 1;
        match draw_count("index", too_many) {
            Err(RenderError::DrawRangeOverflow { what, count }) => {
                assert_eq!(what, "index");
                assert_eq!(count, too_many);
            }
            other => panic!("expected overflow, got {other:?}"),
        }
    }
}
