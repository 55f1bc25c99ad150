//! Per-frame matrices derived from the camera and model transform.

use crate::{Mat4, camera::Camera, transform::Transform};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameMatrices {
    pub mvp: Mat4,
    pub model_view: Mat4,
    /// Inverse-transpose of `model_view`, for transforming normals.
    pub normal: Mat4,
    pub view: Mat4,
}

impl FrameMatrices {
    pub fn new(camera: &Camera, model: &Transform) -> Self {
        let view = camera.view();
        let model_view = view * model.matrix();
        Self {
            mvp: camera.proj() * model_view,
            model_view,
            normal: model_view.inverse().transpose(),
            view,
        }
    }
}
