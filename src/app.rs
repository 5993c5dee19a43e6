//! Window, event loop and per-frame orchestration.
//!
//! Each redraw runs, in order: clock tick, input, controller, panel,
//! commit (regenerate and reinstall the field), render.

use std::path::PathBuf;
use std::sync::Arc;

use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::{CameraConfig, GalaxyConfig};
use crate::context::SimulationContext;
use crate::error::AppError;
use crate::gpu::GpuState;
use crate::input::{Input, KeyCode};
use crate::params::GalaxyParameters;
use crate::textures::SpriteTexture;
use crate::time::FrameClock;
use crate::visuals::BlendMode;

#[cfg(feature = "egui")]
use crate::config::DEFAULT_PRESET_FILE;
#[cfg(feature = "egui")]
use crate::panel::{GalaxyPanel, PanelResponse, PanelStats};

/// Builder for the galaxy viewer.
///
/// ```ignore
/// use spiral_galaxy::prelude::*;
///
/// Galaxy::new()
///     .with_parameters(GalaxyParameters { branches: 6, ..Default::default() })
///     .with_seed(42)
///     .run()?;
/// ```
pub struct Galaxy {
    config: GalaxyConfig,
    title: String,
}

impl Galaxy {
    pub fn new() -> Self {
        Self::from_config(GalaxyConfig::default())
    }

    /// Start from a loaded preset.
    pub fn from_config(config: GalaxyConfig) -> Self {
        Self {
            config,
            title: "Spiral Galaxy".into(),
        }
    }

    /// Values outside the panel bounds are pinned into them.
    pub fn with_parameters(mut self, parameters: GalaxyParameters) -> Self {
        self.config.parameters = parameters.clamped();
        self
    }

    /// Fix the random seed so every regeneration is reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.config.blend_mode = blend_mode;
        self
    }

    /// Use an image file as the point sprite.
    pub fn with_sprite(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.sprite = Some(path.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Camera height above the galaxy plane, before zoom.
    pub fn with_y_offset(mut self, y_offset: f32) -> Self {
        self.config.camera.y_offset = y_offset;
        self
    }

    pub fn config(&self) -> &GalaxyConfig {
        &self.config
    }

    /// Open the window and run until it is closed.
    pub fn run(self) -> Result<(), AppError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self.config, self.title);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for Galaxy {
    fn default() -> Self {
        Self::new()
    }
}

/// Current state as a preset, for saving.
#[cfg_attr(not(feature = "egui"), allow(dead_code))]
fn snapshot_config(base: &GalaxyConfig, sim: &SimulationContext) -> GalaxyConfig {
    GalaxyConfig {
        name: base.name.clone(),
        parameters: sim.params().clone(),
        seed: sim.seed(),
        camera: CameraConfig::from_controller(sim.controller()),
        blend_mode: base.blend_mode,
        sprite: base.sprite.clone(),
    }
}

struct App {
    config: GalaxyConfig,
    title: String,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    sim: SimulationContext,
    input: Input,
    clock: FrameClock,
    #[cfg(feature = "egui")]
    panel: GalaxyPanel,
    error: Option<AppError>,
}

impl App {
    fn new(config: GalaxyConfig, title: String) -> Self {
        let sim = SimulationContext::new(
            config.parameters.clone(),
            config.camera.to_controller(),
            config.seed,
        )
        .with_blend_mode(config.blend_mode);
        info!(
            "Generated {} points (radius {:.2}, {} branches)",
            sim.field().len(),
            sim.field().bounds_radius(),
            sim.params().branches
        );

        Self {
            #[cfg(feature = "egui")]
            panel: GalaxyPanel::new(sim.params()),
            config,
            title,
            window: None,
            gpu: None,
            sim,
            input: Input::new(),
            clock: FrameClock::new(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let sprite = match &self.config.sprite {
            Some(path) => {
                info!("Loading sprite {}", path.display());
                SpriteTexture::from_file(path)?
            }
            None => SpriteTexture::default(),
        };

        let mut gpu = pollster::block_on(GpuState::new(
            window.clone(),
            &sprite,
            self.sim.material(),
        ))?;
        self.sim.install_into(&mut gpu);

        window.request_redraw();
        self.window = Some(window);
        self.gpu = Some(gpu);
        Ok(())
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(gpu)) = (self.window.clone(), self.gpu.as_mut()) else {
            return;
        };

        let delta = self.clock.tick();

        if self.input.key_pressed(KeyCode::Escape) {
            event_loop.exit();
            return;
        }
        if self.input.key_pressed(KeyCode::Space) {
            self.sim.controller_mut().toggle_pause();
        }
        if self.input.key_pressed(KeyCode::C) {
            self.sim.controller_mut().toggle_mode();
            info!("Camera mode: {:?}", self.sim.controller().mode());
        }
        let mut reinstall = false;
        if self.input.key_pressed(KeyCode::R) {
            self.sim.regenerate();
            reinstall = true;
        }

        #[cfg(feature = "egui")]
        if gpu.egui().wants_pointer() {
            self.input.release_pointer();
        }

        let controller = self.sim.controller_mut();
        controller.zoom_by(self.input.wheel_delta());
        let drag = self.input.drag_delta();
        controller.drag(drag.x, drag.y);

        let pose = self.sim.tick(delta);

        #[cfg(feature = "egui")]
        let ui = {
            let stats = PanelStats {
                fps: self.clock.fps(),
                points: gpu.installed_points() as usize,
                generation: self.sim.generation(),
            };
            let panel = &mut self.panel;
            let controller = self.sim.controller_mut();
            let mut response = PanelResponse::default();
            let output = gpu.egui_mut().run(&window, |ctx| {
                response = panel.show(ctx, controller, stats);
            });

            if let Some(params) = response.commit {
                info!("Applying parameters: {} points, {} branches", params.count, params.branches);
                self.sim.apply_parameters(params);
                reinstall = true;
            }
            if response.regenerate {
                self.sim.regenerate();
                reinstall = true;
            }
            if response.save {
                let preset = snapshot_config(&self.config, &self.sim);
                match preset.save(DEFAULT_PRESET_FILE) {
                    Ok(()) => {
                        info!("Saved preset to {}", DEFAULT_PRESET_FILE);
                        self.panel.set_status(format!("Saved {}", DEFAULT_PRESET_FILE));
                    }
                    Err(e) => {
                        warn!("Failed to save preset: {}", e);
                        self.panel.set_status(format!("Save failed: {}", e));
                    }
                }
            }
            output
        };

        if reinstall {
            self.sim.install_into(gpu);
        }

        #[cfg(feature = "egui")]
        let result = gpu.render(&pose, Some(&ui));
        #[cfg(not(feature = "egui"))]
        let result = gpu.render(&pose);

        match result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => warn!("Render error: {:?}", e),
        }

        self.input.begin_frame();
        window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                error!("Startup failed: {}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        #[cfg(feature = "egui")]
        let consumed = match (&self.window, &mut self.gpu) {
            (Some(window), Some(gpu)) => gpu.egui_mut().on_window_event(window, &event),
            _ => false,
        };
        #[cfg(not(feature = "egui"))]
        let consumed = false;

        if !consumed {
            self.input.handle_event(&event);
        } else if let WindowEvent::MouseInput {
            state: ElementState::Released,
            button: MouseButton::Left,
            ..
        } = event
        {
            self.input.set_dragging(false);
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraMode;

    #[test]
    fn test_builder_fills_config() {
        let galaxy = Galaxy::new()
            .with_seed(9)
            .with_blend_mode(BlendMode::Alpha)
            .with_sprite("star.png")
            .with_y_offset(1.25)
            .with_title("Test");
        assert_eq!(galaxy.config().seed, Some(9));
        assert_eq!(galaxy.config().blend_mode, BlendMode::Alpha);
        assert_eq!(galaxy.config().sprite, Some(PathBuf::from("star.png")));
        assert_eq!(galaxy.config().camera.y_offset, 1.25);
        assert_eq!(galaxy.title, "Test");
    }

    #[test]
    fn test_builder_clamps_point_count() {
        let galaxy = Galaxy::new().with_parameters(GalaxyParameters {
            count: 50_000_000,
            ..Default::default()
        });
        assert_eq!(
            galaxy.config().parameters.count,
            crate::params::ParamBounds::COUNT.max
        );
    }

    #[test]
    fn test_snapshot_captures_live_state() {
        let base = GalaxyConfig {
            name: "Base".into(),
            seed: Some(3),
            ..Default::default()
        };
        let mut sim = SimulationContext::new(
            GalaxyParameters {
                count: 200,
                ..Default::default()
            },
            base.camera.to_controller(),
            base.seed,
        );
        sim.controller_mut().set_zoom(2.0);
        sim.controller_mut().set_mode(CameraMode::Free);
        sim.apply_parameters(GalaxyParameters {
            count: 300,
            branches: 7,
            ..Default::default()
        });

        let snapshot = snapshot_config(&base, &sim);
        assert_eq!(snapshot.name, "Base");
        assert_eq!(snapshot.seed, Some(3));
        assert_eq!(snapshot.parameters.count, 300);
        assert_eq!(snapshot.parameters.branches, 7);
        assert_eq!(snapshot.camera.zoom, 2.0);
        assert_eq!(snapshot.camera.mode, CameraMode::Free);
    }
}
