use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats for this adapter")]
    UnsupportedSurface,

    #[error("shader '{label}' failed to compile: {message}")]
    Shader { label: String, message: String },

    #[error("pipeline '{label}' is invalid: {message}")]
    Pipeline { label: String, message: String },

    #[error("{what} count {count} does not fit a 32-bit draw range")]
    DrawRangeOverflow { what: &'static str, count: usize },

    #[error("mesh has no triangles to draw")]
    EmptyMesh,
}
