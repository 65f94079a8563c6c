//! Frame sequencing for the isosurface raycasters.
//!
//! [`plan_redraw`] turns the interpolation and debug switches into a list of
//! steps; [`execute_plan`] records those steps on the GPU. Keeping the
//! sequencing pure lets the dispatch counts be checked without a device.

use volrend_render::{FrameTarget, FrameToScreen, StorageImage};

use crate::iso_resources::IsoResources;

/// The two images a frame can write to or blit from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    /// The frame-to-screen output image.
    Output,
    /// The auxiliary image holding the sparse samples.
    Auxiliary,
}

/// One step of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawStep {
    /// Clear an image to transparent black.
    Clear(ImageSlot),
    /// Select the first-pass (`true`) or second-pass uniforms for the
    /// following dispatches.
    SetFirstPass(bool),
    /// Dispatch the kernel writing into the given image. The other image is
    /// bound as the sampled input.
    Dispatch(ImageSlot),
    /// Writes of the previous dispatch must be visible to the next one.
    Barrier,
    /// Draw an image to the frame target.
    Blit(ImageSlot),
}

/// What a recorded frame did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedrawStats {
    pub dispatches: u32,
    pub barriers: u32,
}

/// Plans one frame.
///
/// Without interpolation every pixel is ray-marched in one dispatch. With
/// interpolation a sparse pass writes the auxiliary image; in debug mode
/// that image is shown directly, otherwise a second pass interpolates it
/// into the output image.
#[must_use]
pub fn plan_redraw(do_interpolation: bool, debug_temp_texture: bool) -> Vec<RedrawStep> {
    use ImageSlot::{Auxiliary, Output};
    use RedrawStep::{Barrier, Blit, Clear, Dispatch, SetFirstPass};

    if !do_interpolation {
        return vec![Clear(Output), Dispatch(Output), Blit(Output)];
    }

    let mut steps = vec![Clear(Auxiliary), SetFirstPass(true), Dispatch(Auxiliary)];
    if debug_temp_texture {
        steps.push(Blit(Auxiliary));
    } else {
        steps.extend([
            Barrier,
            Clear(Output),
            SetFirstPass(false),
            Dispatch(Output),
            Blit(Output),
        ]);
    }
    steps
}

/// Number of dispatches in a plan.
#[must_use]
pub fn dispatch_count(plan: &[RedrawStep]) -> u32 {
    plan.iter()
        .filter(|step| matches!(step, RedrawStep::Dispatch(_)))
        .count() as u32
}

/// Records `plan`. Each dispatch gets its own compute pass, so a
/// [`RedrawStep::Barrier`] is satisfied by the pass boundary that precedes
/// the next dispatch.
pub(crate) fn execute_plan(
    plan: &[RedrawStep],
    resources: &IsoResources,
    frame: &mut FrameToScreen,
    aux: &StorageImage,
    device: &wgpu::Device,
    target: &mut FrameTarget<'_>,
) -> RedrawStats {
    let mut stats = RedrawStats::default();
    let mut first_pass = false;

    for step in plan {
        match *step {
            RedrawStep::Clear(ImageSlot::Output) => frame.clear_texture(target.encoder),
            RedrawStep::Clear(ImageSlot::Auxiliary) => aux.clear(target.encoder),
            RedrawStep::SetFirstPass(value) => first_pass = value,
            RedrawStep::Dispatch(slot) => {
                let (written, sampled) = match slot {
                    ImageSlot::Output => (frame.output().view(), aux.view()),
                    ImageSlot::Auxiliary => (aux.view(), frame.output().view()),
                };
                let targets = resources.kernel().create_targets_bind_group(
                    device,
                    written,
                    sampled,
                    first_pass,
                );
                let label = if first_pass {
                    "iso kernel sparse pass"
                } else {
                    "iso kernel pass"
                };
                resources
                    .kernel()
                    .dispatch(target.encoder, label, resources.inputs(), &targets);
                stats.dispatches += 1;
            }
            RedrawStep::Barrier => stats.barriers += 1,
            RedrawStep::Blit(ImageSlot::Output) => {
                frame.draw(device, target.encoder, target.view, target.format);
            }
            RedrawStep::Blit(ImageSlot::Auxiliary) => {
                frame.draw_texture(device, target.encoder, aux.view(), target.view, target.format);
            }
        }
    }

    log::debug!(
        "redraw: {} dispatch(es), {} barrier(s)",
        stats.dispatches,
        stats.barriers
    );
    stats
}
