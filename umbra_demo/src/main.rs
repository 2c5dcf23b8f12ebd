//! Umbra demo
//!
//! Opens a window, builds a procedural scene and renders it with the
//! deferred strategy on the Vulkan backend.
//!
//! Keys: Tab cycles the displayed G-buffer channel, Space pauses the camera
//! orbit, Escape quits.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use umbra_engine::glam::{Mat4, Vec3, Vec4};
use umbra_engine::umbra::device::Extent2D;
use umbra_engine::umbra::render::{CameraMatrices, DebugTarget, WindowSurface};
use umbra_engine::umbra::scene::{SceneBuilder, SceneData, StaticAssetSource};
use umbra_engine::umbra::{Config, DeferredStrategy, Error, Renderer, Result};
use umbra_engine::{engine_error, engine_info};
use umbra_engine_renderer_vulkan::VulkanGraphicsDevice;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

const SOURCE: &str = "umbra::demo";

type DemoRenderer = Renderer<VulkanGraphicsDevice, DeferredStrategy<VulkanGraphicsDevice>>;

/// Size query for the renderer; winit delivers events through the
/// application handler, so there is nothing to pump here
struct WinitSurface<'a>(&'a Window);

impl WindowSurface for WinitSurface<'_> {
    fn framebuffer_extent(&self) -> Extent2D {
        let size = self.0.inner_size();
        Extent2D::new(size.width, size.height)
    }

    fn pump_events(&mut self) {}
}

/// Floor, a pedestal with a box stacked on it, and a ring of pillars
fn demo_scene() -> Result<SceneData> {
    let mut builder = SceneBuilder::new();
    let floor = builder.add_material("floor", Vec4::new(0.6, 0.6, 0.6, 1.0), 0.9, 0.1);
    let stone = builder.add_material("stone", Vec4::new(0.8, 0.75, 0.7, 1.0), 0.7, 0.2);
    let metal = builder.add_material("metal", Vec4::new(0.9, 0.85, 0.6, 1.0), 0.2, 0.9);
    let paint = builder.add_material("paint", Vec4::new(0.8, 0.25, 0.2, 1.0), 0.5, 0.4);

    let root = builder.add_node("root", None, Mat4::IDENTITY)?;
    let ground = builder.add_node("ground", Some(root), Mat4::IDENTITY)?;
    builder.add_plane(ground, 8.0, floor)?;

    let pedestal = builder.add_node("pedestal", Some(root), Mat4::from_translation(Vec3::new(0.0, 0.5, 0.0)))?;
    builder.add_box(pedestal, Vec3::new(1.0, 0.5, 1.0), stone)?;
    let crate_node = builder.add_node(
        "crate",
        Some(pedestal),
        Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)) * Mat4::from_rotation_y(0.6),
    )?;
    builder.add_box(crate_node, Vec3::splat(0.5), metal)?;

    const PILLARS: usize = 6;
    for i in 0..PILLARS {
        let angle = i as f32 / PILLARS as f32 * std::f32::consts::TAU;
        let pillar = builder.add_node(
            &format!("pillar{}", i),
            Some(root),
            Mat4::from_translation(Vec3::new(angle.cos() * 4.5, 1.25, angle.sin() * 4.5)),
        )?;
        builder.add_box(pillar, Vec3::new(0.3, 1.25, 0.3), paint)?;
    }

    builder.build()
}

/// Orbiting camera; Vulkan clip space has y pointing down
fn orbit_camera(angle: f32, aspect_ratio: f32) -> CameraMatrices {
    let eye = Vec3::new(angle.sin() * 9.0, 4.0, angle.cos() * 9.0);
    let mut projection = Mat4::perspective_rh(60f32.to_radians(), aspect_ratio, 0.1, 256.0);
    projection.y_axis.y *= -1.0;
    CameraMatrices {
        view: Mat4::look_at_rh(eye, Vec3::new(0.0, 1.0, 0.0), Vec3::Y),
        projection,
    }
}

struct DemoApp {
    config: Config,
    // Declared before the window: the surface must go first
    renderer: Option<DemoRenderer>,
    window: Option<Window>,
    debug_target: DebugTarget,
    orbit_paused: bool,
    orbit_angle: f32,
    last_tick: Instant,
    error: Option<Error>,
}

impl DemoApp {
    fn new(config: Config) -> Self {
        Self {
            config,
            renderer: None,
            window: None,
            debug_target: DebugTarget::default(),
            orbit_paused: false,
            orbit_angle: 0.0,
            last_tick: Instant::now(),
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let extent = self.config.initial_extent;
        let attributes = Window::default_attributes()
            .with_title(self.config.app_name.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(extent.width, extent.height));
        let window = event_loop
            .create_window(attributes)
            .map_err(|e| Error::InitializationFailed(format!("Failed to create window: {}", e)))?;

        let device = VulkanGraphicsDevice::new(&window, &self.config)?;
        engine_info!(SOURCE, "Rendering on {}", device.device_name());

        let assets = StaticAssetSource::new(demo_scene()?);
        let strategy = DeferredStrategy::new(Box::new(assets));
        let mut renderer = Renderer::new(device, strategy, self.config.clone())?;
        renderer.init(&mut WinitSurface(&window))?;

        self.renderer = Some(renderer);
        self.window = Some(window);
        self.last_tick = Instant::now();
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let (Some(renderer), Some(window)) = (self.renderer.as_mut(), self.window.as_ref()) else {
            return Ok(());
        };

        let now = Instant::now();
        if !self.orbit_paused {
            self.orbit_angle += now.duration_since(self.last_tick).as_secs_f32() * 0.3;
        }
        self.last_tick = now;

        renderer.set_camera(orbit_camera(self.orbit_angle, renderer.aspect_ratio()));
        renderer.draw_frame(&mut WinitSurface(window))?;
        Ok(())
    }

    /// Log the error and leave the loop; `main` turns it into the exit code
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Error) {
        engine_error!(SOURCE, "Fatal: {}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, key: Key) {
        match key {
            Key::Named(NamedKey::Escape) => event_loop.exit(),
            Key::Named(NamedKey::Tab) => {
                self.debug_target = self.debug_target.next();
                engine_info!(SOURCE, "Displaying {:?}", self.debug_target);
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.set_debug_target(self.debug_target);
                }
            }
            Key::Named(NamedKey::Space) => self.orbit_paused = !self.orbit_paused,
            _ => {}
        }
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() || self.error.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.notify_resized(Extent2D::new(size.width, size.height));
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed && !event.repeat => {
                self.on_key(event_loop, event.logical_key);
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        let Some(mut renderer) = self.renderer.take() else {
            return;
        };
        let stats = renderer.stats();
        if let Err(e) = renderer.shutdown() {
            engine_error!(SOURCE, "Shutdown failed: {}", e);
            self.error.get_or_insert(e);
        }
        engine_info!(
            SOURCE,
            "{} frames presented, {} skipped, {} resizes",
            stats.frames_presented,
            stats.frames_skipped,
            stats.resizes
        );
        let validation = renderer.device().validation_stats();
        if validation.errors > 0 {
            engine_error!(SOURCE, "{} validation errors reported", validation.errors);
        }
    }
}

fn main() -> ExitCode {
    let config = Config::default()
        .with_app_name("Umbra Demo")
        .with_shader_dir(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../shaders"));

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            engine_error!(SOURCE, "Failed to create event loop: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut app = DemoApp::new(config);
    if let Err(e) = event_loop.run_app(&mut app) {
        engine_error!(SOURCE, "Event loop error: {}", e);
        return ExitCode::FAILURE;
    }

    match app.error {
        Some(_) => ExitCode::FAILURE,
        None => ExitCode::SUCCESS,
    }
}
