//! Headless rendering API.
//!
//! Renders a [`Scene`] into an offscreen target without opening a window.
//! Used by the integration tests, the sweep runner and batch screenshot
//! generation.

use std::path::{Path, PathBuf};

use pollster::FutureExt;
use volrend_core::{ParameterSample, ParameterSpace, Result, VolrendError};
use volrend_render::{submit_checked, FrameTarget, OffscreenTarget, RenderEngine};
use volrend_renderers::RedrawStats;

use crate::scene::Scene;

fn render_error(err: impl std::fmt::Display) -> VolrendError {
    VolrendError::RenderError(err.to_string())
}

/// One rendered frame, RGBA8, top row first.
#[derive(Debug, Clone)]
pub struct HeadlessFrame {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// `None` when nothing was rendered (no volume loaded).
    pub stats: Option<RedrawStats>,
}

/// A headless device plus a fixed-size offscreen target.
pub struct HeadlessRenderer {
    engine: RenderEngine,
    target: OffscreenTarget,
}

impl HeadlessRenderer {
    /// Creates a headless GPU context. Fails when no adapter is available.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let engine = RenderEngine::new_headless(width, height)
            .block_on()
            .map_err(|e| render_error(format!("failed to create headless engine: {e}")))?;
        let target = engine.create_offscreen_target(width, height);
        Ok(Self { engine, target })
    }

    pub fn engine(&self) -> &RenderEngine {
        &self.engine
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.target.dimensions()
    }

    /// Prepares `scene` for the target size, records one frame and reads
    /// it back.
    pub fn render_frame(&mut self, scene: &mut Scene) -> Result<HeadlessFrame> {
        let (width, height) = self.target.dimensions();
        let device = &self.engine.device;
        let queue = &self.engine.queue;

        scene
            .prepare(device, queue, width, height)
            .map_err(render_error)?;

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("headless frame encoder"),
        });
        let stats = {
            let mut target = FrameTarget {
                encoder: &mut encoder,
                view: self.target.view(),
                format: self.target.format(),
            };
            scene
                .render(device, queue, &mut target)
                .map_err(render_error)?
        };
        submit_checked(device, queue, "headless frame submit", encoder).map_err(render_error)?;

        let pixels = self.target.read_rgba(device, queue).map_err(render_error)?;
        Ok(HeadlessFrame {
            pixels,
            width,
            height,
            stats,
        })
    }
}

/// Renders one frame of `scene` to a raw RGBA buffer of
/// `width * height * 4` bytes.
///
/// # Example
/// ```no_run
/// use volrend::{Scene, ViewerConfig};
///
/// let mut scene = Scene::with_synthetic_volume(&ViewerConfig::default()).unwrap();
/// let pixels = volrend::render_to_image(&mut scene, 800, 600).unwrap();
/// assert_eq!(pixels.len(), 800 * 600 * 4);
/// ```
pub fn render_to_image(scene: &mut Scene, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut renderer = HeadlessRenderer::new(width, height)?;
    Ok(renderer.render_frame(scene)?.pixels)
}

/// Renders one frame of `scene` and saves it as PNG or JPEG.
pub fn render_to_file(
    scene: &mut Scene,
    filename: impl AsRef<Path>,
    width: u32,
    height: u32,
) -> Result<()> {
    let mut renderer = HeadlessRenderer::new(width, height)?;
    let frame = renderer.render_frame(scene)?;
    volrend_render::save_image(filename, &frame.pixels, frame.width, frame.height)
        .map_err(|e| render_error(format!("failed to save image: {e}")))
}

/// One sweep point and the frame rendered for it.
#[derive(Debug, Clone)]
pub struct SweepFrame {
    pub sample: ParameterSample,
    pub frame: HeadlessFrame,
}

/// Renders one frame per point of the active renderer's parameter space.
///
/// Parameters are applied through the renderer's named setters, so the
/// clamp ranges hold. The renderer keeps the values of the last sample.
pub fn run_parameter_sweep(
    scene: &mut Scene,
    width: u32,
    height: u32,
) -> Result<Vec<SweepFrame>> {
    let mut space = ParameterSpace::new();
    scene.renderer().fill_parameter_space(&mut space);
    log::info!(
        "Sweeping {} sample(s) over {} dimension(s) with {}",
        space.sample_count(),
        space.dimensions().len(),
        scene.renderer().abbreviation()
    );

    let mut renderer = HeadlessRenderer::new(width, height)?;
    let mut frames = Vec::with_capacity(space.sample_count());
    for sample in space.samples() {
        for (name, value) in &sample {
            scene.set_parameter(name, *value)?;
        }
        let frame = renderer.render_frame(scene)?;
        frames.push(SweepFrame { sample, frame });
    }
    Ok(frames)
}

/// File name of a sweep image, e.g. `Adaptive_StepSize_0.150.png`.
pub fn sweep_file_name(abbreviation: &str, sample: &ParameterSample) -> String {
    let mut name = abbreviation.to_string();
    for (param, value) in sample {
        name.push_str(&format!("_{param}_{value:.3}"));
    }
    name.push_str(".png");
    name
}

/// Runs [`run_parameter_sweep`] and writes every frame into `dir`.
/// Returns the written paths in sweep order.
pub fn write_parameter_sweep(
    scene: &mut Scene,
    dir: impl AsRef<Path>,
    width: u32,
    height: u32,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let abbreviation = scene.renderer().abbreviation();

    let mut paths = Vec::new();
    for sweep in run_parameter_sweep(scene, width, height)? {
        let path = dir.join(sweep_file_name(abbreviation, &sweep.sample));
        volrend_render::save_image(&path, &sweep.frame.pixels, sweep.frame.width, sweep.frame.height)
            .map_err(|e| render_error(format!("failed to save {}: {e}", path.display())))?;
        paths.push(path);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_file_name() {
        let sample = vec![("StepSize".to_string(), 0.15)];
        assert_eq!(sweep_file_name("Adaptive", &sample), "Adaptive_StepSize_0.150.png");
        assert_eq!(sweep_file_name("1PassIso", &Vec::new()), "1PassIso.png");
    }
}
