//! Viewer settings collected by the binary and consumed by the event loop.

use renderer::{Lighting, RenderMode};

#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub backends: wgpu::Backends,
    pub width: u32,
    pub height: u32,
    pub show_fps: bool,
    pub initial_mode: RenderMode,
    pub lighting: Lighting,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            width: 1280,
            height: 720,
            show_fps: false,
            initial_mode: RenderMode::Shaded,
            lighting: Lighting::default(),
        }
    }
}
