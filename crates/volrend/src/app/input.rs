use std::sync::Arc;
use std::time::Instant;

use pollster::FutureExt;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use volrend_render::RenderEngine;
use volrend_ui::EguiIntegration;

use super::App;

const ORBIT_SPEED: f32 = 0.01;
const PAN_SPEED: f32 = 0.002;

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("volrend-rs")
            .with_inner_size(LogicalSize::new(
                self.config.window_width,
                self.config.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        let engine = match RenderEngine::new_windowed(window.clone()).block_on() {
            Ok(engine) => engine,
            Err(err) => {
                log::error!("Failed to create render engine: {err}");
                event_loop.exit();
                return;
            }
        };

        let egui = EguiIntegration::new(&engine.device, engine.surface_config.format, &window);

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
        self.egui = Some(egui);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match &event {
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.left_mouse_down = pressed,
                    MouseButton::Right => self.right_mouse_down = pressed,
                    _ => {}
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.shift_down = modifiers.state().shift_key();
            }
            _ => {}
        }

        let egui_consumed = if let (Some(egui), Some(window)) = (&mut self.egui, &self.window) {
            egui.handle_event(window, &event)
        } else {
            false
        };
        let egui_wants_pointer = self.egui.as_ref().is_some_and(EguiIntegration::wants_pointer);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
                self.scene.renderer_mut().set_outdated();
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                if let Some(last) = self.last_frame_time {
                    self.frame_ms = now.duration_since(last).as_secs_f32() * 1000.0;
                }
                self.last_frame_time = Some(now);

                self.render();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let delta_x = (position.x - self.mouse_pos.0) as f32;
                let delta_y = (position.y - self.mouse_pos.1) as f32;
                self.mouse_pos = (position.x, position.y);
                if egui_wants_pointer {
                    return;
                }

                let is_pan = self.right_mouse_down || (self.left_mouse_down && self.shift_down);
                if is_pan {
                    let camera = self.scene.camera_mut();
                    let scale = camera.position.distance(camera.target) * PAN_SPEED;
                    camera.pan(-delta_x * scale, delta_y * scale);
                } else if self.left_mouse_down {
                    self.scene
                        .camera_mut()
                        .orbit(delta_x * ORBIT_SPEED, delta_y * ORBIT_SPEED);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if egui_wants_pointer {
                    return;
                }
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                let camera = self.scene.camera_mut();
                let distance = camera.position.distance(camera.target);
                camera.zoom(scroll * distance * 0.1);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if egui_consumed || event.state != ElementState::Pressed {
                    return;
                }
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
                    PhysicalKey::Code(KeyCode::F5) => self.reload_shaders(),
                    PhysicalKey::Code(KeyCode::F12) => self.request_auto_screenshot(),
                    _ => {}
                }
            }
            _ => {}
        }
    }
}
