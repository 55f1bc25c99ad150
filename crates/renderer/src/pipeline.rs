//! Shader modules and render pipelines for the shaded and debug passes.

use std::num::NonZeroU64;

use wgpu::{
    BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType, BlendState,
    BufferBindingType, ColorTargetState, ColorWrites, CompareFunction, DepthBiasState,
    DepthStencilState, Device, FragmentState, PipelineLayoutDescriptor, PrimitiveState,
    PrimitiveTopology, RenderPipeline, RenderPipelineDescriptor, ShaderModule,
    ShaderModuleDescriptor, ShaderSource, ShaderStages, TextureFormat, VertexBufferLayout,
    VertexState,
};

use crate::error::{RenderError, RenderResult};

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Run `create` inside a validation scope; an error caught by the scope
/// is turned into a `RenderError` by `wrap`.
fn scoped<T>(
    device: &Device,
    create: impl FnOnce() -> T,
    wrap: impl FnOnce(String) -> RenderError,
) -> RenderResult<T> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    scope_outcome(value, pollster::block_on(device.pop_error_scope()), wrap)
}

fn scope_outcome<T>(
    value: T,
    caught: Option<wgpu::Error>,
    wrap: impl FnOnce(String) -> RenderError,
) -> RenderResult<T> {
    match caught {
        Some(err) => Err(wrap(err.to_string())),
        None => Ok(value),
    }
}

/// Compile WGSL inside a validation scope so errors come back as values.
pub fn create_shader(device: &Device, label: &str, source: &str) -> RenderResult<ShaderModule> {
    log::debug!("Compiling shader '{}'", label);
    scoped(
        device,
        || {
            device.create_shader_module(ShaderModuleDescriptor {
                label: Some(label),
                source: ShaderSource::Wgsl(source.into()),
            })
        },
        |message| RenderError::Shader {
            label: label.to_owned(),
            message,
        },
    )
}

/// Single uniform buffer at binding 0, visible to both stages.
pub fn uniform_layout(device: &Device, label: &str, size: usize) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(size as u64),
            },
            count: None,
        }],
    })
}

pub struct PipelineDesc<'a> {
    pub label: &'a str,
    pub shader: &'a ShaderModule,
    pub layout: &'a BindGroupLayout,
    pub vertex: VertexBufferLayout<'static>,
    pub topology: PrimitiveTopology,
    pub depth_write: bool,
    pub surface_format: TextureFormat,
}

pub fn create_pipeline(device: &Device, desc: PipelineDesc<'_>) -> RenderResult<RenderPipeline> {
    log::debug!("Building pipeline '{}'", desc.label);
    scoped(
        device,
        || build_pipeline(device, &desc),
        |message| RenderError::Pipeline {
            label: desc.label.to_owned(),
            message,
        },
    )
}

fn build_pipeline(device: &Device, desc: &PipelineDesc<'_>) -> RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some(desc.label),
        bind_group_layouts: &[desc.layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: desc.shader,
            entry_point: Some("vs_main"),
            buffers: std::slice::from_ref(&desc.vertex),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(FragmentState {
            module: desc.shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format: desc.surface_format,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: PrimitiveState {
            topology: desc.topology,
            // OBJ winding is not guaranteed to be consistent.
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: desc.depth_write,
            depth_compare: CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
