//! Uniform blocks shared with the WGSL shaders (16-byte aligned).

use bytemuck::{Pod, Zeroable};
use corelib::{Vec3, frame::FrameMatrices};
use glam::Vec4;

/// Point light and surface response for the shaded pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
    /// World-space light position.
    pub light_position: Vec3,
    pub ambient_coefficient: f32,
    pub diffuse_coefficient: f32,
    pub specular_coefficient: f32,
    /// Specular exponent; higher gives a tighter highlight.
    pub shininess: f32,
    pub ambient_color: Vec3,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            // 10 units above the camera.
            light_position: Vec3::new(40.0, 40.0, 30.0),
            ambient_coefficient: 1.0,
            diffuse_coefficient: 1.0,
            specular_coefficient: 1.0,
            shininess: 80.0,
            ambient_color: Vec3::new(0.1, 0.1, 0.2),
            diffuse_color: Vec3::new(0.5, 0.5, 0.9),
            specular_color: Vec3::ONE,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ShadingUniform {
    pub mvp: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    /// View-space light position (w = 1).
    pub light_position: [f32; 4],
    /// ambient, diffuse, specular, shininess.
    pub coefficients: [f32; 4],
    pub ambient_color: [f32; 4],
    pub diffuse_color: [f32; 4],
    pub specular_color: [f32; 4],
}

impl ShadingUniform {
    pub fn new(matrices: &FrameMatrices, lighting: &Lighting) -> Self {
        let light = matrices.view * lighting.light_position.extend(1.0);
        Self {
            mvp: matrices.mvp.to_cols_array_2d(),
            model_view: matrices.model_view.to_cols_array_2d(),
            normal_matrix: matrices.normal.to_cols_array_2d(),
            light_position: light.to_array(),
            coefficients: [
                lighting.ambient_coefficient,
                lighting.diffuse_coefficient,
                lighting.specular_coefficient,
                lighting.shininess,
            ],
            ambient_color: lighting.ambient_color.extend(1.0).to_array(),
            diffuse_color: lighting.diffuse_color.extend(1.0).to_array(),
            specular_color: lighting.specular_color.extend(1.0).to_array(),
        }
    }
}

/// Flat-colored lines for the debug overlay.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DebugUniform {
    pub mvp: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl DebugUniform {
    pub fn new(matrices: &FrameMatrices, color: Vec4) -> Self {
        Self {
            mvp: matrices.mvp.to_cols_array_2d(),
            color: color.to_array(),
        }
    }
}

pub const WIREFRAME_COLOR: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);
pub const NORMAL_COLOR: Vec4 = Vec4::new(1.0, 0.3, 0.1, 1.0);

#[cfg(test)]
mod tests {
    use std::mem::size_of;

    use corelib::{Mat4, camera::Camera, transform::Transform};

    use super::*;

    #[test]
    fn uniform_sizes_are_16_byte_multiples() {
        assert_eq!(size_of::<ShadingUniform>(), 272);
        assert_eq!(size_of::<DebugUniform>(), 80);
        assert_eq!(size_of::<ShadingUniform>() % 16, 0);
    }

    #[test]
    fn light_is_moved_into_view_space() {
        let camera = Camera::orbit_default(1.0);
        let matrices = FrameMatrices::new(&camera, &Transform::identity());
        let lighting = Lighting {
            light_position: camera.eye,
            ..Lighting::default()
        };
        let u = ShadingUniform::new(&matrices, &lighting);
        // A light at the eye sits at the view-space origin.
        let [x, y, z, w] = u.light_position;
        assert!(x.abs() < 1e-4 && y.abs() < 1e-4 && z.abs() < 1e-4);
        assert_eq!(w, 1.0);
        assert_eq!(u.coefficients, [1.0, 1.0, 1.0, 80.0]);
    }

    #[test]
    fn debug_uniform_copies_mvp() {
        let matrices = FrameMatrices {
            mvp: Mat4::from_scale(Vec3::splat(3.0)),
            model_view: Mat4::IDENTITY,
            normal: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
        };
        let u = DebugUniform::new(&matrices, NORMAL_COLOR);
        assert_eq!(u.mvp[0][0], 3.0);
        assert_eq!(u.color, NORMAL_COLOR.to_array());
    }
}
