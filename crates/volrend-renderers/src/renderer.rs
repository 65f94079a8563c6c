//! The volume renderer lifecycle.

use volrend_core::{GridDataType, ParameterSpace, RendererState, RenderingParameters};
use volrend_render::{Camera, FrameTarget, RenderContext, RenderResult};

use crate::redraw_plan::RedrawStats;

/// Resolution the kernel runs at: the multi-scaled render resolution when
/// the renderer supports pixel multi-scaling and it is active, else the
/// viewport size.
#[must_use]
pub fn kernel_resolution(
    supports_multiscaling: bool,
    rendering: &RenderingParameters,
    width: u32,
    height: u32,
) -> (u32, u32) {
    if supports_multiscaling && rendering.multi_scaling_active() {
        rendering.scaled_resolution(width, height)
    } else {
        (width.max(1), height.max(1))
    }
}

/// A pluggable volume rendering strategy.
///
/// Lifecycle: `init` builds GPU resources (or fails without allocating),
/// `reshape` follows viewport changes, `update` stages per-frame uniforms,
/// `redraw` records the frame, `clean` releases everything. `update` and
/// `redraw` fail with `NotInitialized` before a successful `init`.
pub trait VolumeRenderer {
    /// Human-readable name.
    fn name(&self) -> &'static str;

    /// Short name for UI lists and file names.
    fn abbreviation(&self) -> &'static str;

    /// Grid layout this renderer consumes.
    fn data_type_support(&self) -> GridDataType {
        GridDataType::Structured
    }

    /// Whether the kernel may run at a reduced, multi-scaled resolution.
    fn supports_pixel_multiscaling(&self) -> bool {
        false
    }

    fn state(&self) -> RendererState;

    /// Flags that a new frame is needed.
    fn set_outdated(&mut self);

    /// Records that the last frame reflects the current parameters.
    fn mark_up_to_date(&mut self);

    /// Builds GPU resources for a `width x height` viewport.
    fn init(&mut self, ctx: &RenderContext<'_>, width: u32, height: u32) -> RenderResult<()>;

    /// Follows a viewport resize. Returns whether any image was
    /// reallocated.
    fn reshape(&mut self, ctx: &RenderContext<'_>, width: u32, height: u32) -> bool;

    /// Recompiles shaders from their sources.
    fn reload_shaders(&mut self, ctx: &RenderContext<'_>) -> RenderResult<()>;

    /// Stages and uploads per-frame uniforms.
    fn update(&mut self, ctx: &RenderContext<'_>, camera: &Camera) -> RenderResult<()>;

    /// Records the frame into `target`.
    fn redraw(
        &mut self,
        ctx: &RenderContext<'_>,
        target: &mut FrameTarget<'_>,
    ) -> RenderResult<RedrawStats>;

    /// Releases all GPU resources.
    fn clean(&mut self);

    /// Draws the renderer's parameter widgets. Returns whether anything
    /// changed.
    fn ui(&mut self, ui: &mut egui::Ui, ctx: &RenderContext<'_>) -> bool;

    /// Registers the sweepable parameters.
    fn fill_parameter_space(&self, space: &mut ParameterSpace);

    /// Sets a sweepable parameter by name.
    fn set_parameter(&mut self, name: &str, value: f32) -> volrend_core::Result<()>;
}
