//! Core types: math re-exports, Transform, Camera, per-frame matrices.

pub use glam::{EulerRot, Mat4, Quat, Vec3, Vec4, vec3};

pub mod camera;
pub mod frame;
pub mod transform;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_transform_is_identity_matrix() {
        let t = transform::Transform::identity();
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn translate_then_scale_matrix() {
        let t = transform::Transform::from_trs(
            vec3(1.0, 2.0, 3.0),
            vec3(0.0, 0.0, 0.0),
            vec3(2.0, 2.0, 2.0),
        );
        // Last column is the translation; the diagonal is the scale.
        let m = t.matrix().to_cols_array();
        assert!((m[12] - 1.0).abs() < 1e-6);
        assert!((m[13] - 2.0).abs() < 1e-6);
        assert!((m[14] - 3.0).abs() < 1e-6);
        assert!((m[0] - 2.0).abs() < 1e-6);
        assert!((m[5] - 2.0).abs() < 1e-6);
        assert!((m[10] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn turntable_scales_then_spins_about_y() {
        let t = transform::Transform::turntable(2.0, std::f32::consts::FRAC_PI_2);
        let p = t.matrix().transform_point3(vec3(1.0, 0.0, 0.0));
        // +X rotated a quarter turn about +Y lands on -Z.
        assert!((p - vec3(0.0, 0.0, -2.0)).length() < 1e-5);
    }

    #[test]
    fn camera_pv_is_finite() {
        let cam = camera::Camera::orbit_default(16.0 / 9.0);
        let pv = cam.proj_view();
        let a = pv.to_cols_array();
        assert!(a.iter().all(|f| f.is_finite()));
    }

    #[test]
    fn origin_projects_inside_clip_volume() {
        let cam = camera::Camera::orbit_default(1.0);
        let clip = cam.proj_view() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn normal_matrix_keeps_normals_perpendicular() {
        let cam = camera::Camera::orbit_default(1.0);
        let model =
            transform::Transform::from_trs(Vec3::ZERO, Vec3::ZERO, vec3(4.0, 1.0, 1.0));
        let m = frame::FrameMatrices::new(&cam, &model);

        // A surface along the (1, 1, 0) diagonal has normal (1, -1, 0).
        let tangent = m.model_view.transform_vector3(vec3(1.0, 1.0, 0.0));
        let normal = m.normal.transform_vector3(vec3(1.0, -1.0, 0.0));
        assert!(tangent.dot(normal).abs() < 1e-4);
        assert_eq!(m.mvp, cam.proj() * m.model_view);
    }
}
