use std::any::Any;
use std::fmt::Write as _;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, error, info, trace};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Fullscreen, Window, WindowId};

use crate::config::AppConfig;
use crate::error::WindowInitError;
use crate::frame::FramePlan;
use crate::gui::TuningPanel;
use crate::input::{InputState, KeyCode, NamedKey};
use crate::render::{OverlayFrame, Renderer};
use crate::scene::Scene;
use crate::time::FrameClock;

/// Frames between window title refreshes.
const TITLE_INTERVAL: u64 = 15;

/// The running demo: renderer plus everything the frame loop mutates.
pub struct Application {
    renderer: Renderer,
    scene: Scene,
    panel: TuningPanel,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    /// Texture uploads from frames that never reached the GPU.
    pending_textures: egui::TexturesDelta,
    input: InputState,
    clock: FrameClock,
    title: String,
}

impl Application {
    pub fn new(renderer: Renderer, scene: Scene, title: String) -> Self {
        let egui_ctx = egui::Context::default();
        let window = renderer.window();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            window.theme(),
            None,
        );
        Self {
            renderer,
            scene,
            panel: TuningPanel::new(),
            egui_ctx,
            egui_state,
            pending_textures: egui::TexturesDelta::default(),
            input: InputState::new(),
            clock: FrameClock::new(),
            title,
        }
    }

    pub fn window(&self) -> &Window {
        self.renderer.window()
    }

    /// Forwards a window event to egui. Returns true when the panel consumed it.
    fn ui_event(&mut self, event: &WindowEvent) -> bool {
        self.egui_state
            .on_window_event(self.renderer.window(), event)
            .consumed
    }

    /// Tracks held keys. Presses egui consumed are dropped; releases always
    /// land so no key sticks.
    fn handle_key(&mut self, event: &KeyEvent, consumed: bool) -> Option<KeyCode> {
        let PhysicalKey::Code(code) = event.physical_key else {
            return None;
        };
        let key = KeyCode::from_winit(code)?;
        match event.state {
            ElementState::Pressed if consumed => None,
            ElementState::Pressed => {
                let first = self.input.set_key_down(key);
                (first && !event.repeat).then_some(key)
            }
            ElementState::Released => {
                self.input.set_key_up(key);
                None
            }
        }
    }

    fn toggle_fullscreen(&self) {
        let window = self.window();
        let next = match window.fullscreen() {
            Some(_) => None,
            None => Some(Fullscreen::Borderless(None)),
        };
        info!("fullscreen {}", if next.is_some() { "on" } else { "off" });
        window.set_fullscreen(next);
    }

    /// Runs the panel for this frame and tessellates it for the overlay pass.
    fn run_ui(&mut self, fps: f32) -> OverlayFrame {
        let raw_input = self.egui_state.take_egui_input(self.renderer.window());
        let mut changed = false;
        let output = self.egui_ctx.run(raw_input, |ctx| {
            changed = self.panel.show(ctx, &mut self.scene, fps);
        });
        if changed {
            debug!("tuning changed | {}", self.panel.status_line(&self.scene, fps));
        }

        let (mut frame, platform_output) = OverlayFrame::tessellate(&self.egui_ctx, output);
        self.egui_state
            .handle_platform_output(self.renderer.window(), platform_output);
        if !self.pending_textures.is_empty() {
            let mut textures = std::mem::take(&mut self.pending_textures);
            textures.append(frame.textures_delta);
            frame.textures_delta = textures;
        }
        frame
    }

    /// Advances one frame: camera, panel edits, GPU work, then the title bar.
    fn redraw(&mut self) -> Result<()> {
        let time = self.clock.tick();
        self.scene.camera.update(&self.input, time.dt);

        let overlay = self.run_ui(time.fps);
        if self.scene.tunables.wireframe() && !self.renderer.supports_wireframe() {
            self.scene.tunables.set_wireframe(false);
        }

        match self.renderer.render(&mut self.scene, &time, &overlay) {
            Ok(plan) => trace!("frame {} ran {} passes", time.frame_index, plan.passes.len()),
            Err(err) => {
                self.pending_textures = overlay.textures_delta;
                self.renderer.handle_surface_error(err)?;
                self.clock.reset();
            }
        }

        if time.frame_index % TITLE_INTERVAL == 0 {
            let status = self.panel.status_line(&self.scene, time.fps);
            self.window().set_title(&format!("{} | {status}", self.title));
        }
        Ok(())
    }
}

/// winit front end. The scene waits in `pending` until the first `resumed`
/// creates the window and renderer.
pub struct DemoApp {
    config: AppConfig,
    pending: Option<Scene>,
    app: Option<Application>,
    error: Option<anyhow::Error>,
}

impl DemoApp {
    pub fn new(config: AppConfig, scene: Scene) -> Self {
        Self {
            config,
            pending: Some(scene),
            app: None,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:#}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn create_application(&mut self, event_loop: &ActiveEventLoop) -> Result<Option<Application>> {
        let Some(scene) = self.pending.take() else {
            return Ok(None);
        };
        let attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height))
            .with_fullscreen(self.config.fullscreen.then_some(Fullscreen::Borderless(None)));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(WindowInitError::from)?,
        );
        let renderer = pollster::block_on(Renderer::new(window, &self.config))
            .context("failed to initialize renderer")?;
        info!("renderer ready");
        Ok(Some(Application::new(renderer, scene, self.config.title.clone())))
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }
        match self.create_application(event_loop) {
            Ok(app) => self.app = app,
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(app) = self.app.as_mut() else {
            return;
        };
        if app.window().id() != window_id {
            return;
        }
        let consumed = app.ui_event(&event);
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => app.renderer.resize(size.width, size.height),
            WindowEvent::Focused(false) => app.input.clear(),
            WindowEvent::KeyboardInput { event, .. } => match app.handle_key(&event, consumed) {
                Some(KeyCode::Named(NamedKey::Escape)) => event_loop.exit(),
                Some(KeyCode::Function(11)) => app.toggle_fullscreen(),
                _ => {}
            },
            WindowEvent::RedrawRequested => {
                if let Err(err) = app.redraw() {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(app) = &self.app {
            app.window().request_redraw();
        }
    }
}

/// Opens the window and runs until it closes. Display problems surface as
/// [`WindowInitError`] so the caller can fall back to the headless summary.
pub fn run_interactive(config: AppConfig, scene: Scene) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| WindowInitError::Panicked {
            stage: "event loop",
            message: panic_message(panic),
        })?
        .map_err(WindowInitError::from)?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DemoApp::new(config, scene);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated with an error")?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

/// Scene, light table and frame plan as printed by `--summary-only`.
pub fn summary(scene: &Scene) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        "Loaded scene with {} objects ({} lights)",
        scene.objects.len(),
        scene.lights.len()
    );
    for object in &scene.objects {
        let _ = writeln!(
            out,
            " - {} ({}, texture {})",
            object.name,
            format!("{:?}", object.mesh).to_lowercase(),
            object.texture
        );
    }

    let _ = writeln!(out, "Lights:");
    for (index, light) in scene.lights.iter().enumerate() {
        let position = light.position();
        let diffuse = light.diffuse();
        let shadow = light.shadow();
        let _ = writeln!(
            out,
            " {}. {:<11} {:<3} pos=({:.1}, {:.1}, {:.1}) diffuse=({:.2}, {:.2}, {:.2}) shadow={} near={:.1} far={:.1}{}",
            index + 1,
            light.kind(),
            if light.is_enabled() { "on" } else { "off" },
            position.x,
            position.y,
            position.z,
            diffuse.x,
            diffuse.y,
            diffuse.z,
            shadow.projection.label(),
            shadow.near_plane,
            shadow.far_plane,
            if shadow.soften {
                format!(" soft r={}", shadow.soften_radius)
            } else {
                String::new()
            },
        );
    }

    let tunables = &scene.tunables;
    let _ = writeln!(
        out,
        "Bloom {}, shadows {}, grass {}, render mode {}",
        if tunables.bloom_enabled() { "on" } else { "off" },
        if tunables.shadows_enabled() { "on" } else { "off" },
        if tunables.grass_enabled() { "on" } else { "off" },
        tunables.render_mode()
    );
    let _ = writeln!(out, "Frame plan:");
    let _ = write!(out, "{}", FramePlan::build(&scene.tunables, &scene.lights));
    out
}

pub fn print_summary(scene: &Scene) {
    print!("{}", summary(scene));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_objects_lights_and_plan() {
        let scene = Scene::demo(&AppConfig::default());
        let text = summary(&scene);
        assert!(text.starts_with("Loaded scene with 4 objects (4 lights)\n"));
        assert!(text.contains(" - terrain (terrain, texture dirt)"));
        assert!(text.contains(" 1. directional on  pos=(0.0, 15.0, 0.0)"));
        assert!(text.contains("shadow=perspective"));
        assert!(text.contains(" soft r=3"));
        assert!(text.contains(" 5. shadow[3] -> shadow-map-3 [clear]"));
        assert!(text.contains(" final -> back-buffer\n"));
        assert!(text.trim_end().ends_with("overlay -> back-buffer"));
    }

    #[test]
    fn summary_follows_tunables() {
        let mut scene = Scene::demo(&AppConfig::default());
        scene.tunables.set_bloom_enabled(true);
        scene.tunables.set_shadows_enabled(false);
        let text = summary(&scene);
        assert!(text.contains("Bloom on, shadows off"));
        assert!(!text.contains("shadow["));
        assert!(text.contains("final <- bloom-composite -> back-buffer [clear]"));
    }

    #[test]
    fn panic_payloads_become_messages() {
        assert_eq!(panic_message(Box::new("no display")), "no display");
        assert_eq!(panic_message(Box::new(String::from("boom"))), "boom");
        assert_eq!(panic_message(Box::new(7_u32)), "unknown panic");
    }
}
