//! Adaptive-resolution isosurface raycaster.
//!
//! With interpolation enabled, a sparse first pass ray-marches one pixel
//! per `interval x interval` block into the auxiliary image; a second pass
//! fills the remaining pixels by bilinear interpolation of the four
//! surrounding sparse samples. No pixel is ray-marched twice.

use volrend_core::iso_parameters::{PARAM_STEP_SIZE, STEP_SIZE_RANGE};
use volrend_core::{AdaptiveIsoParameters, ParameterRange, ParameterSpace, RendererState};
use volrend_render::{
    checked, AuxiliaryBuffer, Camera, FrameTarget, FrameToScreen, RenderContext, RenderError,
    RenderResult,
};
use volrend_ui::build_adaptive_iso_panel;

use crate::iso_resources::IsoResources;
use crate::redraw_plan::{execute_plan, plan_redraw, RedrawStats};
use crate::renderer::{kernel_resolution, VolumeRenderer};

/// Sweep step of the step-size dimension.
const STEP_SIZE_SWEEP_STEP: f32 = 0.1;

/// The adaptive-resolution isosurface raycaster.
#[derive(Default)]
pub struct AdaptiveIsoRenderer {
    params: AdaptiveIsoParameters,
    state: RendererState,
    resources: Option<IsoResources>,
    aux: Option<AuxiliaryBuffer>,
    frame: Option<FrameToScreen>,
    viewport: (u32, u32),
}

impl AdaptiveIsoRenderer {
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
    pub fn edit_parameters(&mut self, edit: impl FnOnce(&mut AdaptiveIsoParameters)) {
        edit(&mut self.params);
        self.params.clamp_all();
        self.state.set_outdated();
    }

    /// Size of the auxiliary image, if allocated.
    pub fn auxiliary_dimensions(&self) -> Option<(u32, u32)> {
        self.aux.as_ref().map(AuxiliaryBuffer::dimensions)
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

impl VolumeRenderer for AdaptiveIsoRenderer {
    fn name(&self) -> &'static str {
        "Adaptive resolution - Isosurface Raycaster"
    }

    fn abbreviation(&self) -> &'static str {
        "Adaptive"
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

        let resources = IsoResources::build(ctx, self.params.apply_gradient_shading())?;
        self.resources = Some(resources);
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

        let aux_changed =
            AuxiliaryBuffer::ensure_size(&mut self.aux, ctx.device, kernel_width, kernel_height);
        let frame_changed = match self.frame.as_mut() {
            Some(frame) => frame.resize(ctx.device, kernel_width, kernel_height),
            None => {
                self.frame = Some(FrameToScreen::new(ctx.device, kernel_width, kernel_height));
                true
            }
        };

        if aux_changed || frame_changed {
            log::debug!("{} reshaped to {kernel_width}x{kernel_height}", self.abbreviation());
            self.state.set_outdated();
        }
        aux_changed || frame_changed
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
        resources.update(
            ctx,
            camera,
            &self.params,
            resolution,
            self.params.do_interpolation(),
        )
    }

    fn redraw(
        &mut self,
        ctx: &RenderContext<'_>,
        target: &mut FrameTarget<'_>,
    ) -> RenderResult<RedrawStats> {
        let (Some(resources), Some(aux), Some(frame)) =
            (self.resources.as_ref(), self.aux.as_ref(), self.frame.as_mut())
        else {
            return Err(RenderError::NotInitialized);
        };

        frame.set_background(ctx.queue, ctx.rendering.background_color);
        let plan = plan_redraw(
            self.params.do_interpolation(),
            self.params.debug_temp_texture(),
        );
        checked(ctx.device, "adaptive iso redraw", || {
            execute_plan(&plan, resources, frame, aux.image(), ctx.device, target)
        })
    }

    fn clean(&mut self) {
        if !self.state.is_built() && self.resources.is_none() {
            return;
        }
        self.resources = None;
        self.aux = None;
        self.frame = None;
        self.state.reset();
        log::info!("{} cleaned", self.name());
    }

    fn ui(&mut self, ui: &mut egui::Ui, ctx: &RenderContext<'_>) -> bool {
        let has_gradient = ctx.volume_textures.is_some_and(|t| t.has_gradient());
        let response =
            build_adaptive_iso_panel(ui, &mut self.params, &mut self.state, has_gradient);

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
        match ParameterRange::new(
            PARAM_STEP_SIZE,
            *STEP_SIZE_RANGE.start(),
            *STEP_SIZE_RANGE.end(),
            STEP_SIZE_SWEEP_STEP,
        ) {
            Ok(range) => space.add_dimension(range),
            Err(err) => log::error!("Cannot register step size dimension: {err}"),
        }
    }

    fn set_parameter(&mut self, name: &str, value: f32) -> volrend_core::Result<()> {
        self.params.set_named(name, value)?;
        self.state.set_outdated();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use volrend_core::VolrendError;

    #[test]
    fn test_identity() {
        let renderer = AdaptiveIsoRenderer::new();
        assert_eq!(renderer.name(), "Adaptive resolution - Isosurface Raycaster");
        assert_eq!(renderer.abbreviation(), "Adaptive");
        assert!(!renderer.supports_pixel_multiscaling());
        assert_eq!(renderer.state(), RendererState::Uninitialized);
    }

    #[test]
    fn test_step_size_sweep() {
        let renderer = AdaptiveIsoRenderer::new();
        let mut space = ParameterSpace::new();
        space.add_dimension(ParameterRange::new("Stale", 0.0, 1.0, 0.5).unwrap());

        renderer.fill_parameter_space(&mut space);
        assert_eq!(space.dimensions().len(), 1);
        let dim = &space.dimensions()[0];
        assert_eq!(dim.name(), "StepSize");
        assert_eq!((dim.min(), dim.max(), dim.step()), (0.05, 3.0, 0.1));
        assert_eq!(space.sample_count(), 30);
    }

    #[test]
    fn test_set_parameter_clamps() {
        let mut renderer = AdaptiveIsoRenderer::new();
        renderer.set_parameter("StepSize", 10.0).unwrap();
        assert_eq!(renderer.parameters().step_size(), 3.0);
        assert!(matches!(
            renderer.set_parameter("Opacity", 1.0),
            Err(VolrendError::UnknownParameter(_))
        ));
        // unbuilt renderers stay unbuilt
        assert_eq!(renderer.state(), RendererState::Uninitialized);
    }

    #[test]
    fn test_preset_parameters_are_clamped() {
        let mut params = AdaptiveIsoParameters::new();
        params.set_do_interpolation(true);
        let mut renderer = AdaptiveIsoRenderer::with_parameters(params);
        assert!(renderer.parameters().do_interpolation());

        renderer.edit_parameters(|p| p.set_interval(40));
        assert_eq!(renderer.parameters().interval(), 16);
    }

    #[test]
    fn test_clean_without_init_is_noop() {
        let mut renderer = AdaptiveIsoRenderer::new();
        renderer.clean();
        assert_eq!(renderer.state(), RendererState::Uninitialized);
        assert_eq!(renderer.auxiliary_dimensions(), None);
    }
}
