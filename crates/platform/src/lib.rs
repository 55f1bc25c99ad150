//! Platform layer: windowing & event loop driving the renderer.
//!
//! - Window and GPU state are created on `resumed`.
//! - Redraws continuously; the model spins with elapsed time.
//! - `Escape` closes, `D` toggles the debug overlay.

pub mod config;
pub mod fps;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use asset::Mesh;
use renderer::{GpuState, RenderMode};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

pub use config::ViewerConfig;
use fps::FpsCounter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Exit,
    ToggleRenderMode,
}

pub fn key_action(code: KeyCode) -> Option<KeyAction> {
    match code {
        KeyCode::Escape => Some(KeyAction::Exit),
        KeyCode::KeyD => Some(KeyAction::ToggleRenderMode),
        _ => None,
    }
}

fn window_title(mesh: &Mesh) -> String {
    match mesh.name() {
        Some(name) => format!("Meshview - {name}"),
        None => "Meshview".to_owned(),
    }
}

struct ViewerApp<'a> {
    mesh: &'a Mesh,
    config: ViewerConfig,
    mode: RenderMode,
    title: String,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    fps: FpsCounter,
    /// First fatal error; returned once the loop exits.
    error: Option<anyhow::Error>,
}

impl<'a> ViewerApp<'a> {
    fn new(mesh: &'a Mesh, config: ViewerConfig) -> Self {
        Self {
            mesh,
            mode: config.initial_mode,
            title: window_title(mesh),
            config,
            window: None,
            gpu: None,
            fps: FpsCounter::new(Instant::now()),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error.get_or_insert(err);
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|e| anyhow!("Failed to create window: {e}"))?,
        );
        log::info!(
            "Window created: {}x{}",
            window.inner_size().width,
            window.inner_size().height
        );

        let gpu = pollster::block_on(GpuState::new(
            window.clone(),
            self.config.backends,
            self.mesh,
            self.config.lighting,
        ))
        .context("Failed to initialize GPU")?;

        window.request_redraw();
        self.gpu = Some(gpu);
        self.window = Some(window);
        Ok(())
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode) {
        match key_action(code) {
            Some(KeyAction::Exit) => {
                log::info!("Escape pressed. Exiting event loop.");
                event_loop.exit();
            }
            Some(KeyAction::ToggleRenderMode) => {
                self.mode = self.mode.toggled();
                log::debug!("Render mode = {:?}", self.mode);
            }
            None => {}
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        match gpu.render(self.mode) {
            Ok(()) => {}
            Err(err) if GpuState::is_surface_lost(&err) => {
                log::warn!("Surface {err}; reconfiguring");
                gpu.recreate_surface();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, anyhow!("GPU out of memory while rendering"));
                return;
            }
            Err(err) => log::warn!("Skipping frame: {err}"),
        }

        if let Some(rate) = self.fps.tick(Instant::now()) {
            if self.config.show_fps {
                log::info!("{rate:.1} fps");
                if let Some(window) = &self.window {
                    window.set_title(&format!("{} ({rate:.0} fps)", self.title));
                }
            }
        }
    }
}

impl ApplicationHandler for ViewerApp<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                log::debug!("Resized: {}x{}", new_size.width, new_size.height);
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                log::debug!("Scale factor changed: {:.3}", scale_factor);
                if let (Some(gpu), Some(window)) = (self.gpu.as_mut(), &self.window) {
                    let size = window.inner_size();
                    gpu.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, code),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Open a window showing `mesh`; returns when the window is closed.
pub fn run_viewer(mesh: &Mesh, config: ViewerConfig) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|e| anyhow!("Failed to create event loop: {e}"))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(mesh, config);
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow!("Event loop error: {e:?}"))?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
