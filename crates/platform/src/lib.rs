//! Platform layer: windowing, input and the frame loop.
//!
//! Models are loaded once the window and GPU exist (textures need the
//! device), then every frame advances the fly camera and draws the scene.

pub mod input;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use asset::{LoadOptions, load_model};
use corelib::{
    Vec3,
    camera::FlyCamera,
    scene::{Scene, Transform},
};
use renderer::GpuState;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use input::InputState;

/// One model to place in the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelPlacement {
    pub path: PathBuf,
    pub position: Vec3,
}

/// Everything the viewer needs from the outside world.
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub backends: wgpu::Backends,
    pub shader_src: String,
    pub models: Vec<ModelPlacement>,
    pub load: LoadOptions,
}

struct Viewer {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    scene: Scene,
    camera: FlyCamera,
    input: InputState,
    mouse_captured: bool,
    last_frame: Instant,
    error: Option<anyhow::Error>,
}

impl Viewer {
    fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            window: None,
            gpu: None,
            scene: Scene::new(),
            camera: FlyCamera::default(),
            input: InputState::default(),
            mouse_captured: false,
            last_frame: Instant::now(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("Failed to create window")?,
        );
        log::info!(
            "Window created: {}x{}",
            window.inner_size().width,
            window.inner_size().height
        );

        let mut gpu = pollster::block_on(GpuState::new(
            window.clone(),
            self.config.backends,
            &self.config.shader_src,
        ))?;

        for model in &self.config.models {
            let mesh = {
                let mut uploader = gpu.texture_uploader();
                load_model(&model.path, &self.config.load, &mut uploader)
                    .with_context(|| format!("Failed to load {}", model.path.display()))?
            };
            match gpu.add_mesh(&mesh) {
                Ok(slot) => {
                    self.scene.spawn(slot, Transform::at(model.position));
                }
                Err(e) => log::warn!("Skipping {}: {:#}", model.path.display(), e),
            }
        }
        if self.scene.is_empty() {
            log::warn!("No drawable models; rendering an empty scene");
        }

        self.capture_mouse(&window, true);
        self.window = Some(window);
        self.gpu = Some(gpu);
        self.last_frame = Instant::now();
        Ok(())
    }

    fn capture_mouse(&mut self, window: &Window, capture: bool) {
        if capture {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                log::warn!("Cursor grab unavailable: {e}");
            }
        } else if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
            log::warn!("Cursor release failed: {e}");
        }
        window.set_cursor_visible(!capture);
        self.mouse_captured = capture;
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.camera.advance(self.input.movement(), dt);

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        match gpu.render(&self.camera, &self.scene) {
            Ok(()) => {}
            Err(err) if GpuState::is_surface_lost(&err) => gpu.recreate_surface(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, anyhow!("GPU out of memory"));
            }
            Err(err) => log::warn!("Frame skipped: {err:?}"),
        }
    }
}

impl ApplicationHandler for Viewer {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                log::info!("Resized: {}x{}", size.width, size.height);
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let pressed = event.state == ElementState::Pressed;
                if code == KeyCode::Escape && pressed {
                    if self.mouse_captured {
                        if let Some(window) = self.window.clone() {
                            self.capture_mouse(&window, false);
                        }
                    } else {
                        event_loop.exit();
                    }
                    return;
                }
                if let Some(id) = input::visibility_toggle(code) {
                    if pressed && !event.repeat {
                        match self.scene.toggle_visible(id) {
                            Ok(visible) => log::info!("Object {} visible={}", id, visible),
                            Err(e) => log::debug!("{}", e),
                        }
                    }
                    return;
                }
                self.input.set_key(code, pressed);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                ..
            } if !self.mouse_captured => {
                if let Some(window) = self.window.clone() {
                    self.capture_mouse(&window, true);
                }
            }
            WindowEvent::Focused(false) => self.input.clear(),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if self.mouse_captured {
                self.camera.look(dx as f32, dy as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

/// Open the window and run until it is closed.
pub fn run_viewer(config: ViewerConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut viewer = Viewer::new(config);
    event_loop
        .run_app(&mut viewer)
        .map_err(|e| anyhow!("Event loop error: {e:?}"))?;

    match viewer.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
