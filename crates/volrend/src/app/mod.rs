//! Application window and event loop management.

mod input;
mod render;

use std::sync::Arc;
use std::time::Instant;

use winit::event_loop::EventLoop;
use winit::window::Window;

use volrend_core::{Result, VolrendError};
use volrend_render::RenderEngine;
use volrend_ui::EguiIntegration;

use crate::config::ViewerConfig;
use crate::scene::Scene;

/// The interactive viewer.
pub struct App {
    pub(super) config: ViewerConfig,
    pub(super) scene: Scene,
    pub(super) window: Option<Arc<Window>>,
    pub(super) engine: Option<RenderEngine>,
    pub(super) egui: Option<EguiIntegration>,
    // Physical button state, tracked even when egui consumes the event
    pub(super) mouse_pos: (f64, f64),
    pub(super) left_mouse_down: bool,
    pub(super) right_mouse_down: bool,
    pub(super) shift_down: bool,
    pub(super) screenshot_pending: Option<String>,
    pub(super) screenshot_counter: u32,
    pub(super) last_frame_time: Option<Instant>,
    pub(super) frame_ms: f32,
}

impl App {
    /// Creates the viewer for `scene`. The window opens when the event loop
    /// resumes.
    pub fn new(config: ViewerConfig, scene: Scene) -> Self {
        Self {
            config,
            scene,
            window: None,
            engine: None,
            egui: None,
            mouse_pos: (0.0, 0.0),
            left_mouse_down: false,
            right_mouse_down: false,
            shift_down: false,
            screenshot_pending: None,
            screenshot_counter: 0,
            last_frame_time: None,
            frame_ms: 0.0,
        }
    }

    /// Requests a screenshot with an auto-generated filename.
    pub fn request_auto_screenshot(&mut self) {
        let filename = format!(
            "{}_{:04}.png",
            self.scene.renderer().abbreviation(),
            self.screenshot_counter
        );
        self.screenshot_counter += 1;
        self.screenshot_pending = Some(filename);
    }
}

/// Runs the viewer until the window is closed.
pub fn run_app(config: ViewerConfig, scene: Scene) -> Result<()> {
    let event_loop = EventLoop::new()
        .map_err(|e| VolrendError::RenderError(format!("failed to create event loop: {e}")))?;
    let mut app = App::new(config, scene);
    event_loop
        .run_app(&mut app)
        .map_err(|e| VolrendError::RenderError(format!("event loop error: {e}")))
}
