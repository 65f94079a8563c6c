//! Tagged GPU validation checks.

use pollster::FutureExt;

use crate::error::{RenderError, RenderResult};

/// Runs `f` inside a validation error scope.
///
/// Any validation error raised by the GPU calls inside `f` is logged with
/// `tag` and returned as [`RenderError::Gpu`].
pub fn checked<T>(
    device: &wgpu::Device,
    tag: &'static str,
    f: impl FnOnce() -> T,
) -> RenderResult<T> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = f();
    match device.pop_error_scope().block_on() {
        None => Ok(value),
        Some(err) => {
            let message = err.to_string();
            log::error!("GPU error in {tag}: {message}");
            Err(RenderError::Gpu { tag, message })
        }
    }
}

/// Finishes `encoder` and submits it inside a validation error scope.
///
/// wgpu validates recorded commands at `finish`, so errors in passes
/// recorded earlier surface here rather than while recording.
pub fn submit_checked(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    tag: &'static str,
    encoder: wgpu::CommandEncoder,
) -> RenderResult<wgpu::SubmissionIndex> {
    checked(device, tag, || queue.submit(std::iter::once(encoder.finish())))
}
