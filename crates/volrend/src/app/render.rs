use volrend_render::{submit_checked, FrameTarget};

use crate::scene::UiRequests;

use super::App;

impl App {
    pub(super) fn render(&mut self) {
        let (Some(window), Some(engine), Some(egui)) =
            (self.window.as_ref(), self.engine.as_ref(), self.egui.as_mut())
        else {
            return;
        };
        let Some(surface) = engine.surface.as_ref() else {
            return;
        };
        let (width, height) = engine.dimensions();

        if let Err(err) = self.scene.prepare(&engine.device, &engine.queue, width, height) {
            log::error!("Failed to prepare frame: {err}");
        }

        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                surface.configure(&engine.device, &engine.surface_config);
                return;
            }
            Err(err) => {
                log::warn!("Surface error: {err:?}");
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = engine
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        {
            let mut target = FrameTarget {
                encoder: &mut encoder,
                view: &view,
                format: engine.surface_config.format,
            };
            if let Err(err) = self.scene.render(&engine.device, &engine.queue, &mut target) {
                log::error!("Failed to render frame: {err}");
            }
        }

        let scene = &mut self.scene;
        let frame_ms = self.frame_ms;
        let mut requests = UiRequests::default();
        let output = egui.run_frame(window, |ctx| {
            requests = scene.build_ui(ctx, &engine.device, &engine.queue, frame_ms);
        });
        let screen_descriptor = egui.screen_descriptor(window, width, height);
        egui.render(
            &engine.device,
            &engine.queue,
            &mut encoder,
            &view,
            &screen_descriptor,
            output,
        );

        // errors are logged with their tag; the frame is still presented
        let _ = submit_checked(&engine.device, &engine.queue, "frame submit", encoder);
        frame.present();

        if requests.reload_shaders {
            self.reload_shaders();
        }
        if requests.screenshot {
            self.request_auto_screenshot();
        }
        if let Some(filename) = self.screenshot_pending.take() {
            self.capture_screenshot(&filename);
        }
    }

    pub(super) fn reload_shaders(&mut self) {
        let Some(engine) = self.engine.as_ref() else {
            return;
        };
        match self.scene.reload_shaders(&engine.device, &engine.queue) {
            Ok(()) => log::info!("Shaders reloaded"),
            Err(err) => log::error!("Shader reload failed: {err}"),
        }
    }

    /// Renders the volume (without UI) into an offscreen target and saves
    /// it.
    fn capture_screenshot(&mut self, filename: &str) {
        let Some(engine) = self.engine.as_ref() else {
            return;
        };
        let (width, height) = engine.dimensions();
        let target = engine.create_offscreen_target(width, height);

        let mut encoder = engine
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("screenshot encoder"),
            });
        {
            let mut frame_target = FrameTarget {
                encoder: &mut encoder,
                view: target.view(),
                format: target.format(),
            };
            if let Err(err) = self
                .scene
                .render(&engine.device, &engine.queue, &mut frame_target)
            {
                log::error!("Screenshot render failed: {err}");
                return;
            }
        }
        if submit_checked(&engine.device, &engine.queue, "screenshot submit", encoder).is_err() {
            return;
        }

        let saved = target
            .read_rgba(&engine.device, &engine.queue)
            .map_err(|e| e.to_string())
            .and_then(|pixels| {
                volrend_render::save_image(filename, &pixels, width, height)
                    .map_err(|e| e.to_string())
            });
        if let Err(err) = saved {
            log::error!("Failed to save screenshot '{filename}': {err}");
        }
    }
}
