//! Command-line surface of the viewer.

use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueHint;
use log::LevelFilter;
use platform::ViewerConfig;
use renderer::RenderMode;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, clap::ValueEnum)]
pub enum GpuBackend {
    Auto,
    #[value(alias = "vk")]
    Vulkan,
    #[value(alias = "d3d12")]
    Dx12,
    #[value(alias = "mtl")]
    Metal,
    #[value(aliases = ["opengl", "gles"])]
    Gl,
}

impl GpuBackend {
    pub fn backends(self) -> wgpu::Backends {
        match self {
            GpuBackend::Auto => wgpu::Backends::all(),
            GpuBackend::Vulkan => wgpu::Backends::VULKAN,
            GpuBackend::Dx12 => wgpu::Backends::DX12,
            GpuBackend::Metal => wgpu::Backends::METAL,
            GpuBackend::Gl => wgpu::Backends::GL,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl FromStr for WindowSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| format!("invalid window dimension '{v}'"))
        };
        Ok(Self {
            width: parse(w)?,
            height: parse(h)?,
        })
    }
}

#[derive(Debug, clap::Parser)]
#[command(author, version, about = "Minimal real-time viewer for OBJ triangle meshes")]
pub struct Cli {
    /// Mesh to load
    #[arg(default_value = "test.obj", value_hint = ValueHint::FilePath)]
    pub mesh: PathBuf,
    /// Increase log verbosity (-v warn, -vv info, -vvv debug, -vvvv trace)
    #[arg(short, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Write log output to this file instead of stderr
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,
    /// Graphics backend
    #[arg(long, value_enum, default_value_t = GpuBackend::Auto)]
    pub gpu_backend: GpuBackend,
    /// Initial window size
    #[arg(long, default_value = "1280x720", value_name = "WxH")]
    pub size: WindowSize,
    /// Report frames per second once a second
    #[arg(long)]
    pub show_fps: bool,
    /// Start with the wireframe and normal overlay enabled
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    pub fn viewer_config(&self) -> ViewerConfig {
        ViewerConfig {
            backends: self.gpu_backend.backends(),
            width: self.size.width,
            height: self.size.height,
            show_fps: self.show_fps,
            initial_mode: if self.debug {
                RenderMode::Debug
            } else {
                RenderMode::Shaded
            },
            ..ViewerConfig::default()
        }
    }
}
