//! Conventional isosurface raycaster: one ray per pixel, one dispatch.

use volrend_core::iso_parameters::{PARAM_ISOVALUE, PARAM_STEP_SIZE, STEP_SIZE_RANGE};
use volrend_core::{AdaptiveIsoParameters, ParameterRange, ParameterSpace, RendererState};
use volrend_render::{
    checked, Camera, FrameTarget, FrameToScreen, RenderContext, RenderError, RenderResult,
    StorageImage,
};
use volrend_ui::build_single_pass_iso_panel;

use crate::iso_resources::IsoResources;
use crate::redraw_plan::{execute_plan, plan_redraw, RedrawStats};
use crate::renderer::{kernel_resolution, VolumeRenderer};

/// Baseline raycaster sharing the adaptive kernel with interpolation off.
///
/// Supports pixel multi-scaling: the kernel runs at the reduced resolution
/// and the blit upsamples to the viewport.
#[derive(Default)]
pub struct SinglePassIsoRenderer {
    params: AdaptiveIsoParameters,
    state: RendererState,
    resources: Option<IsoResources>,
    frame: Option<FrameToScreen>,
    // bound in the sampled slot, never read
    placeholder: Option<StorageImage>,
    viewport: (u32, u32),
}

impl SinglePassIsoRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a renderer with preset parameters.
    pub fn with_parameters(mut params: AdaptiveIsoParameters) -> Self {
        params.clamp_all();
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn parameters(&self) -> &AdaptiveIsoParameters {
        &self.params
    }

    /// Edits the parameters, re-clamps them and requests a new frame.
    /// Interpolation settings are ignored by this renderer.
    pub fn edit_parameters(&mut self, edit: impl FnOnce(&mut AdaptiveIsoParameters)) {
        edit(&mut self.params);
        self.params.clamp_all();
        self.state.set_outdated();
    }

    fn resolution(&self, ctx: &RenderContext<'_>) -> (u32, u32) {
        kernel_resolution(
            self.supports_pixel_multiscaling(),
            ctx.rendering,
            self.viewport.0,
            self.viewport.1,
        )
    }
}

impl VolumeRenderer for SinglePassIsoRenderer {
    fn name(&self) -> &'static str {
        "Single-pass Isosurface Raycaster"
    }

    fn abbreviation(&self) -> &'static str {
        "1PassIso"
    }

    fn supports_pixel_multiscaling(&self) -> bool {
        true
    }

    fn state(&self) -> RendererState {
        self.state
    }

    fn set_outdated(&mut self) {
        self.state.set_outdated();
    }

    fn mark_up_to_date(&mut self) {
        self.state.mark_up_to_date();
    }

    fn init(&mut self, ctx: &RenderContext<'_>, width: u32, height: u32) -> RenderResult<()> {
        if self.state.is_built() {
            self.clean();
        }

        self.resources = Some(IsoResources::build(
            ctx,
            self.params.apply_gradient_shading(),
        )?);
        self.placeholder = Some(StorageImage::new(ctx.device, "unused sampled image", 1, 1));
        self.reshape(ctx, width, height);
        self.state.mark_built();

        log::info!(
            "{} initialized at {}x{}",
            self.name(),
            self.viewport.0,
            self.viewport.1
        );
        Ok(())
    }

    fn reshape(&mut self, ctx: &RenderContext<'_>, width: u32, height: u32) -> bool {
        self.viewport = (width.max(1), height.max(1));
        let (kernel_width, kernel_height) = self.resolution(ctx);

        let changed = match self.frame.as_mut() {
            Some(frame) => frame.resize(ctx.device, kernel_width, kernel_height),
            None => {
                self.frame = Some(FrameToScreen::new(ctx.device, kernel_width, kernel_height));
                true
            }
        };
        if changed {
            self.state.set_outdated();
        }
        changed
    }

    fn reload_shaders(&mut self, ctx: &RenderContext<'_>) -> RenderResult<()> {
        let resources = self.resources.as_mut().ok_or(RenderError::NotInitialized)?;
        resources.reload(ctx.device)?;
        if let Some(frame) = self.frame.as_mut() {
            frame.clear_shaders();
        }
        self.state.set_outdated();
        Ok(())
    }

    fn update(&mut self, ctx: &RenderContext<'_>, camera: &Camera) -> RenderResult<()> {
        let resolution = self.resolution(ctx);
        let resources = self.resources.as_mut().ok_or(RenderError::NotInitialized)?;
        resources.update(ctx, camera, &self.params, resolution, false)
    }

    fn redraw(
        &mut self,
        ctx: &RenderContext<'_>,
        target: &mut FrameTarget<'_>,
    ) -> RenderResult<RedrawStats> {
        let (Some(resources), Some(placeholder), Some(frame)) = (
            self.resources.as_ref(),
            self.placeholder.as_ref(),
            self.frame.as_mut(),
        ) else {
            return Err(RenderError::NotInitialized);
        };

        frame.set_background(ctx.queue, ctx.rendering.background_color);
        let plan = plan_redraw(false, false);
        checked(ctx.device, "single-pass iso redraw", || {
            execute_plan(&plan, resources, frame, placeholder, ctx.device, target)
        })
    }

    fn clean(&mut self) {
        if !self.state.is_built() && self.resources.is_none() {
            return;
        }
        self.resources = None;
        self.frame = None;
        self.placeholder = None;
        self.state.reset();
        log::info!("{} cleaned", self.name());
    }

    fn ui(&mut self, ui: &mut egui::Ui, ctx: &RenderContext<'_>) -> bool {
        let has_gradient = ctx.volume_textures.is_some_and(|t| t.has_gradient());
        let response =
            build_single_pass_iso_panel(ui, &mut self.params, &mut self.state, has_gradient);

        if response.gradient_toggled {
            if let (Some(resources), Some(textures)) =
                (self.resources.as_mut(), ctx.volume_textures)
            {
                resources.sync_inputs(ctx.device, textures, self.params.apply_gradient_shading());
            }
        }
        response.changed
    }

    fn fill_parameter_space(&self, space: &mut ParameterSpace) {
        space.clear_dimensions();
        let step_size = ParameterRange::new(
            PARAM_STEP_SIZE,
            *STEP_SIZE_RANGE.start(),
            *STEP_SIZE_RANGE.end(),
            0.1,
        );
        match step_size {
            Ok(range) => space.add_dimension(range),
            Err(err) => log::error!("Cannot register step size dimension: {err}"),
        }
    }

    fn set_parameter(&mut self, name: &str, value: f32) -> volrend_core::Result<()> {
        if name != PARAM_ISOVALUE && name != PARAM_STEP_SIZE {
            return Err(volrend_core::VolrendError::UnknownParameter(name.to_string()));
        }
        self.params.set_named(name, value)?;
        self.state.set_outdated();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let renderer = SinglePassIsoRenderer::new();
        assert_eq!(renderer.abbreviation(), "1PassIso");
        assert!(renderer.supports_pixel_multiscaling());
    }

    #[test]
    fn test_interval_is_not_a_parameter() {
        let mut renderer = SinglePassIsoRenderer::new();
        assert!(renderer.set_parameter("Interval", 4.0).is_err());
        renderer.set_parameter("Isovalue", 0.25).unwrap();
        assert_eq!(renderer.parameters().isovalue(), 0.25);
    }

    #[test]
    fn test_parameter_space() {
        let renderer = SinglePassIsoRenderer::new();
        let mut space = ParameterSpace::new();
        renderer.fill_parameter_space(&mut space);
        assert_eq!(space.sample_count(), 30);
    }
}
