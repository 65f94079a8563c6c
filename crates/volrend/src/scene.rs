//! The state a host drives: data, camera, lighting and the active renderer.

use volrend_core::{
    AdaptiveIsoParameters, DataManager, RenderingParameters, Result, StructuredVolume,
};
use volrend_render::{Camera, FrameTarget, RenderContext, RenderResult, VolumeTextures};
use volrend_renderers::{RedrawStats, RendererKind, VolumeRenderer};
use volrend_ui::{
    build_frame_stats, build_left_panel, build_lighting_section, build_renderer_selector,
    build_volume_section, VolumeInfo,
};

use crate::config::ViewerConfig;

/// Actions the UI asks the host to perform after the frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiRequests {
    pub reload_shaders: bool,
    pub screenshot: bool,
}

/// Owns everything a renderer reads, plus the renderer itself.
///
/// Hosts call [`Scene::prepare`] once per frame with the current viewport,
/// then [`Scene::render`]. GPU copies of the data are uploaded lazily and
/// the renderer is initialized as soon as a volume is present.
pub struct Scene {
    data: DataManager,
    rendering: RenderingParameters,
    camera: Camera,
    iso_preset: AdaptiveIsoParameters,
    kind: RendererKind,
    renderer: Box<dyn VolumeRenderer>,
    textures: Option<VolumeTextures>,
    last_stats: RedrawStats,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new(config: &ViewerConfig) -> Self {
        let mut rendering = config.rendering.clone();
        rendering.set_screen_size(config.window_width, config.window_height);
        let kind = config.renderer_kind();
        Self {
            camera: Camera::new(rendering.aspect_ratio()),
            rendering,
            data: DataManager::new(),
            iso_preset: config.iso.clone(),
            kind,
            renderer: kind.create_with_parameters(&config.iso),
            textures: None,
            last_stats: RedrawStats::default(),
        }
    }

    /// Creates a scene holding the configured raw volume, or the built-in
    /// Marschner-Lobb field when none is configured.
    pub fn from_config(config: &ViewerConfig) -> Result<Self> {
        let volume = match &config.volume {
            Some(source) => source.load()?,
            None => StructuredVolume::marschner_lobb(config.synthetic_resolution)?,
        };
        Self::with_volume(config, volume)
    }

    /// Creates a scene holding the built-in Marschner-Lobb volume of the
    /// configured resolution.
    pub fn with_synthetic_volume(config: &ViewerConfig) -> Result<Self> {
        Self::with_volume(
            config,
            StructuredVolume::marschner_lobb(config.synthetic_resolution)?,
        )
    }

    /// Creates a scene holding `volume`.
    pub fn with_volume(config: &ViewerConfig, volume: StructuredVolume) -> Result<Self> {
        let mut scene = Self::new(config);
        scene.set_volume(volume);
        if config.generate_gradient {
            scene.generate_gradient()?;
        }
        Ok(scene)
    }

    /// Replaces the volume and frames it with the camera.
    pub fn set_volume(&mut self, volume: StructuredVolume) {
        let half = volume.physical_extent() * 0.5;
        self.camera.look_at_box(-half, half);
        self.data.set_volume(volume);
        self.renderer.set_outdated();
    }

    /// Computes the gradient field of the current volume.
    pub fn generate_gradient(&mut self) -> Result<()> {
        self.data.generate_gradient()?;
        self.renderer.set_outdated();
        Ok(())
    }

    pub fn data(&self) -> &DataManager {
        &self.data
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable camera; the next frame is outdated.
    pub fn camera_mut(&mut self) -> &mut Camera {
        self.renderer.set_outdated();
        &mut self.camera
    }

    pub fn rendering(&self) -> &RenderingParameters {
        &self.rendering
    }

    /// Mutable rendering parameters; the next frame is outdated.
    pub fn rendering_mut(&mut self) -> &mut RenderingParameters {
        self.renderer.set_outdated();
        &mut self.rendering
    }

    pub fn renderer(&self) -> &dyn VolumeRenderer {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> &mut dyn VolumeRenderer {
        self.renderer.as_mut()
    }

    pub fn renderer_kind(&self) -> RendererKind {
        self.kind
    }

    /// Statistics of the last recorded frame.
    pub fn last_stats(&self) -> RedrawStats {
        self.last_stats
    }

    pub fn textures(&self) -> Option<&VolumeTextures> {
        self.textures.as_ref()
    }

    /// Replaces the active renderer. The new one is initialized by the next
    /// [`Scene::prepare`].
    pub fn switch_renderer(&mut self, kind: RendererKind) {
        if kind == self.kind {
            return;
        }
        self.renderer.clean();
        self.renderer = kind.create_with_parameters(&self.iso_preset);
        self.kind = kind;
        log::info!("Switched renderer to {}", self.renderer.name());
    }

    /// Sets a sweepable parameter of the active renderer.
    pub fn set_parameter(&mut self, name: &str, value: f32) -> Result<()> {
        self.renderer.set_parameter(name, value)
    }

    /// Read-only facts about the current volume.
    pub fn volume_info(&self) -> Option<VolumeInfo> {
        self.data.current_volume().map(|volume| VolumeInfo {
            name: volume.name().to_string(),
            resolution: volume.resolution().to_array(),
            voxel_size: volume.voxel_size().to_array(),
            value_range: volume.value_range(),
            has_gradient: self.data.current_gradient().is_some(),
        })
    }

    /// Uploads changed data, then initializes or reshapes the renderer for
    /// a `width x height` viewport. Without a volume the renderer is
    /// released.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
    ) -> RenderResult<()> {
        self.rendering.set_screen_size(width, height);
        self.camera.set_aspect_ratio(self.rendering.aspect_ratio());

        if VolumeTextures::sync(&mut self.textures, device, queue, &self.data)? {
            self.renderer.set_outdated();
        }
        if self.textures.is_none() {
            self.renderer.clean();
            return Ok(());
        }

        let ctx = RenderContext {
            device,
            queue,
            data: &self.data,
            volume_textures: self.textures.as_ref(),
            rendering: &self.rendering,
        };
        if self.renderer.state().is_built() {
            self.renderer.reshape(&ctx, width, height);
        } else {
            self.renderer.init(&ctx, width, height)?;
        }
        Ok(())
    }

    /// Records one frame into `target`. Without a built renderer the
    /// target is cleared to the background color and `None` is returned.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &mut FrameTarget<'_>,
    ) -> RenderResult<Option<RedrawStats>> {
        if !self.renderer.state().is_built() {
            clear_target(target, self.rendering.background_color);
            return Ok(None);
        }

        let ctx = RenderContext {
            device,
            queue,
            data: &self.data,
            volume_textures: self.textures.as_ref(),
            rendering: &self.rendering,
        };
        self.renderer.update(&ctx, &self.camera)?;
        let stats = self.renderer.redraw(&ctx, target)?;
        self.renderer.mark_up_to_date();
        self.last_stats = stats;
        Ok(Some(stats))
    }

    /// Recompiles the active renderer's shaders.
    pub fn reload_shaders(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> RenderResult<()> {
        let ctx = RenderContext {
            device,
            queue,
            data: &self.data,
            volume_textures: self.textures.as_ref(),
            rendering: &self.rendering,
        };
        self.renderer.reload_shaders(&ctx)
    }

    /// Builds the side panel.
    pub fn build_ui(
        &mut self,
        egui_ctx: &egui::Context,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame_ms: f32,
    ) -> UiRequests {
        let mut requests = UiRequests::default();
        let mut switch_to = None;
        let mut gradient_requested = false;
        let names: Vec<&str> = RendererKind::ALL.iter().map(|k| k.abbreviation()).collect();
        let info = self.volume_info();
        let current = self.kind.index();

        build_left_panel(egui_ctx, |ui| {
            if let Some(index) = build_renderer_selector(ui, &names, current) {
                switch_to = RendererKind::ALL.get(index).copied();
            }

            build_volume_section(ui, info.as_ref());
            if info.as_ref().is_some_and(|i| !i.has_gradient)
                && ui.button("Compute gradient").clicked()
            {
                gradient_requested = true;
            }

            ui.separator();
            ui.strong(self.renderer.name());
            {
                let ctx = RenderContext {
                    device,
                    queue,
                    data: &self.data,
                    volume_textures: self.textures.as_ref(),
                    rendering: &self.rendering,
                };
                self.renderer.ui(ui, &ctx);
            }

            let mut state = self.renderer.state();
            if build_lighting_section(ui, &mut self.rendering, &mut state) {
                self.renderer.set_outdated();
            }

            ui.horizontal(|ui| {
                requests.reload_shaders = ui.button("Reload shaders").clicked();
                requests.screenshot = ui.button("Screenshot").clicked();
            });
            build_frame_stats(ui, frame_ms, self.last_stats.dispatches);
        });

        if gradient_requested {
            if let Err(err) = self.generate_gradient() {
                log::error!("Gradient generation failed: {err}");
            }
        }
        if let Some(kind) = switch_to {
            self.switch_renderer(kind);
        }
        requests
    }
}

fn clear_target(target: &mut FrameTarget<'_>, color: glam::Vec4) {
    let _pass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("background clear"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target.view,
            resolve_target: None,
            depth_slice: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color {
                    r: f64::from(color.x),
                    g: f64::from(color.y),
                    b: f64::from(color.z),
                    a: f64::from(color.w),
                }),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use volrend_core::RendererState;

    fn small_config() -> ViewerConfig {
        ViewerConfig {
            synthetic_resolution: 8,
            ..ViewerConfig::default()
        }
    }

    #[test]
    fn test_new_scene_is_empty() {
        let scene = Scene::new(&small_config());
        assert!(scene.data().current_volume().is_none());
        assert!(scene.volume_info().is_none());
        assert_eq!(scene.renderer().state(), RendererState::Uninitialized);
        assert_eq!(scene.renderer_kind(), RendererKind::AdaptiveIso);
    }

    #[test]
    fn test_synthetic_volume_is_framed() {
        let scene = Scene::with_synthetic_volume(&small_config()).unwrap();
        let info = scene.volume_info().unwrap();
        assert_eq!(info.resolution, [8, 8, 8]);
        assert!(info.has_gradient);
        assert_eq!(scene.camera().target, glam::Vec3::ZERO);
        assert!(scene.camera().position.z > 4.0);
    }

    #[test]
    fn test_switch_renderer() {
        let mut scene = Scene::new(&small_config());
        scene.switch_renderer(RendererKind::SinglePassIso);
        assert_eq!(scene.renderer_kind(), RendererKind::SinglePassIso);
        assert_eq!(scene.renderer().abbreviation(), "1PassIso");
    }

    #[test]
    fn test_set_parameter_routes_to_renderer() {
        let mut scene = Scene::new(&small_config());
        scene.set_parameter("StepSize", 0.25).unwrap();
        assert!(scene.set_parameter("Nope", 1.0).is_err());
    }
}
