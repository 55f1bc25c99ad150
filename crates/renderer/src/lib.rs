//! Renderer: wgpu init + depth + lit mesh with an optional debug overlay.
//! wgpu = 26.x, winit = 0.30.x

pub mod error;
pub mod geometry;
pub mod mode;
pub mod pipeline;
pub mod uniforms;

use std::sync::Arc;
use std::time::Instant;

use asset::Mesh;
use bytemuck::Zeroable;
use corelib::{camera::Camera, frame::FrameMatrices, transform::Transform};
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, BufferUsages, CommandEncoderDescriptor, CompositeAlphaMode,
    Device, DeviceDescriptor, Extent3d, Features, Instance, InstanceDescriptor, Limits, LoadOp,
    Operations, PowerPreference, PresentMode, PrimitiveTopology, Queue, RenderPass,
    RenderPassColorAttachment, RenderPassDescriptor, RenderPipeline, StoreOp, Surface,
    SurfaceConfiguration, SurfaceError, TextureDescriptor, TextureDimension, TextureUsages,
    TextureView, TextureViewDescriptor, util::DeviceExt,
};
use winit::{dpi::PhysicalSize, window::Window};

pub use error::{RenderError, RenderResult};
pub use geometry::GpuMesh;
pub use mode::RenderMode;
pub use uniforms::Lighting;

use pipeline::{DEPTH_FORMAT, PipelineDesc, create_pipeline, create_shader, uniform_layout};
use uniforms::{DebugUniform, NORMAL_COLOR, ShadingUniform, WIREFRAME_COLOR};

/// Meshes are scaled so their bounding radius matches this.
pub const FIT_RADIUS: f32 = 10.0;

/// Uniform buffer plus the bind group that exposes it.
struct UniformSlot {
    buffer: Buffer,
    bind_group: BindGroup,
}

impl UniformSlot {
    fn new<T: bytemuck::Pod>(device: &Device, layout: &BindGroupLayout, label: &str, init: &T) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(init),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }

    fn write<T: bytemuck::Pod>(&self, queue: &Queue, value: &T) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(value));
    }
}

pub struct GpuState {
    // Surface
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,

    // Device/queue
    device: Device,
    queue: Queue,

    // Pipelines
    shaded_pipeline: RenderPipeline,
    wire_pipeline: RenderPipeline,
    normal_pipeline: RenderPipeline,

    // Geometry
    mesh: GpuMesh,

    // Uniforms
    shading: UniformSlot,
    wire: UniformSlot,
    normals: UniformSlot,
    lighting: Lighting,
    start: Instant,

    // Depth
    depth_view: TextureView,

    // Size cache
    width: u32,
    height: u32,
}

impl GpuState {
    /// Create GPU state bound to an Arc<Window> and upload `mesh`.
    pub async fn new(
        window: Arc<Window>,
        backends: wgpu::Backends,
        mesh: &Mesh,
        lighting: Lighting,
    ) -> RenderResult<Self> {
        let PhysicalSize { width, height } = window.inner_size();
        let width = width.max(1);
        let height = height.max(1);

        // Instance & surface
        let instance = Instance::new(&InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        let info = adapter.get_info();
        log::info!("Adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Meshview Device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                ..Default::default()
            })
            .await?;
        device.on_uncaptured_error(Box::new(log_uncaptured));

        // Surface format (prefer sRGB)
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(RenderError::UnsupportedSurface)?;

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = create_depth_view(&device, &surface_config);

        // ==== Shaders ====
        let mesh_shader = create_shader(&device, "Mesh WGSL", include_str!("shaders/mesh.wgsl"))?;
        let debug_shader =
            create_shader(&device, "Debug WGSL", include_str!("shaders/debug.wgsl"))?;

        // ==== Uniforms ====
        let shading_bgl = uniform_layout(
            &device,
            "Shading BGL",
            std::mem::size_of::<ShadingUniform>(),
        );
        let debug_bgl = uniform_layout(&device, "Debug BGL", std::mem::size_of::<DebugUniform>());

        let shading = UniformSlot::new(
            &device,
            &shading_bgl,
            "Shading UBO",
            &ShadingUniform::zeroed(),
        );
        let wire = UniformSlot::new(
            &device,
            &debug_bgl,
            "Wireframe UBO",
            &DebugUniform::zeroed(),
        );
        let normals = UniformSlot::new(
            &device,
            &debug_bgl,
            "Normals UBO",
            &DebugUniform::zeroed(),
        );

        // ==== Pipelines ====
        let shaded_pipeline = create_pipeline(
            &device,
            PipelineDesc {
                label: "Shaded Pipeline",
                shader: &mesh_shader,
                layout: &shading_bgl,
                vertex: geometry::MESH_LAYOUT,
                topology: PrimitiveTopology::TriangleList,
                depth_write: true,
                surface_format,
            },
        )?;
        let wire_pipeline = create_pipeline(
            &device,
            PipelineDesc {
                label: "Wireframe Pipeline",
                shader: &debug_shader,
                layout: &debug_bgl,
                vertex: geometry::MESH_POSITION_LAYOUT,
                topology: PrimitiveTopology::LineList,
                depth_write: false,
                surface_format,
            },
        )?;
        let normal_pipeline = create_pipeline(
            &device,
            PipelineDesc {
                label: "Normals Pipeline",
                shader: &debug_shader,
                layout: &debug_bgl,
                vertex: geometry::LINE_LAYOUT,
                topology: PrimitiveTopology::LineList,
                depth_write: false,
                surface_format,
            },
        )?;

        // ==== Geometry ====
        let mesh = GpuMesh::upload(&device, mesh, FIT_RADIUS)?;

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            shaded_pipeline,
            wire_pipeline,
            normal_pipeline,
            mesh,
            shading,
            wire,
            normals,
            lighting,
            start: Instant::now(),
            depth_view,
            width,
            height,
        })
    }

    /// Resize: reconfigure surface & recreate depth view.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.surface_config.width = self.width;
        self.surface_config.height = self.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, &self.surface_config);
    }

    /// Render one frame: update uniforms, clear, draw the mesh and, in
    /// debug mode, the overlay on top.
    pub fn render(&mut self, mode: RenderMode) -> Result<(), SurfaceError> {
        let t = self.start.elapsed().as_secs_f32();
        let aspect = self.width as f32 / self.height as f32;
        let camera = Camera::orbit_default(aspect);
        let model = Transform::turntable(self.mesh.fit_scale, t);
        let matrices = FrameMatrices::new(&camera, &model);

        self.shading
            .write(&self.queue, &ShadingUniform::new(&matrices, &self.lighting));
        if mode.draws_overlay() {
            self.wire
                .write(&self.queue, &DebugUniform::new(&matrices, WIREFRAME_COLOR));
            self.normals
                .write(&self.queue, &DebugUniform::new(&matrices, NORMAL_COLOR));
        }

        // --- frame & pass
        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("MainPass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color::BLACK),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.draw_shaded(&mut rpass);
            if mode.draws_overlay() {
                self.draw_overlay(&mut rpass);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn draw_shaded(&self, rpass: &mut RenderPass<'_>) {
        rpass.set_pipeline(&self.shaded_pipeline);
        rpass.set_bind_group(0, &self.shading.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.mesh.vertex_buf.slice(..));
        rpass.set_index_buffer(self.mesh.index_buf.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.mesh.index_count, 0, 0..1);
    }

    fn draw_overlay(&self, rpass: &mut RenderPass<'_>) {
        rpass.set_pipeline(&self.wire_pipeline);
        rpass.set_bind_group(0, &self.wire.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.mesh.vertex_buf.slice(..));
        rpass.set_index_buffer(self.mesh.wire_index_buf.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.mesh.wire_index_count, 0, 0..1);

        rpass.set_pipeline(&self.normal_pipeline);
        rpass.set_bind_group(0, &self.normals.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.mesh.normal_buf.slice(..));
        rpass.draw(0..self.mesh.normal_vertex_count, 0..1);
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        matches!(err, SurfaceError::Lost | SurfaceError::Outdated)
    }

    pub fn recreate_surface(&mut self) {
        self.resize(self.width, self.height);
    }
}

/// Device errors raised outside any error scope (per-frame encoding and
/// submission) are logged instead of aborting the process.
fn log_uncaptured(err: wgpu::Error) {
    log::error!("GPU error: {err}");
}

/// Create a depth texture view matching the surface config.
fn create_depth_view(device: &Device, sc: &SurfaceConfiguration) -> TextureView {
    let tex = device.create_texture(&TextureDescriptor {
        label: Some("DepthTex"),
        size: Extent3d {
            width: sc.width.max(1),
            height: sc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&TextureViewDescriptor::default())
}
