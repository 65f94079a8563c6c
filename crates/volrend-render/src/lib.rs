//! Rendering backend for volrend-rs.
//!
//! This crate provides the wgpu-based rendering engine, including:
//! - Device, surface and offscreen target management
//! - Compute kernels assembled from WGSL fragments, with staged uniforms
//! - GPU mirrors of volume and gradient data
//! - The output image and its blit to the screen
//! - Camera and view management

// Texture and dispatch sizes convert between u32 and usize
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod aux_buffer;
pub mod camera;
pub mod engine;
pub mod error;
pub mod error_scope;
pub mod frame_to_screen;
pub mod iso_kernel;
pub mod kernel;
pub mod screenshot;
pub mod shader;
pub mod storage_image;
pub mod volume_texture;

pub use aux_buffer::{needs_reallocation, AuxiliaryBuffer};
pub use camera::Camera;
pub use engine::{aligned_bytes_per_row, OffscreenTarget, RenderEngine};
pub use error::{RenderError, RenderResult};
pub use error_scope::{checked, submit_checked};
pub use frame_to_screen::FrameToScreen;
pub use iso_kernel::{iso_kernel_source, IsoKernel, IsoKernelUniforms, ISO_WORKGROUP_SIZE};
pub use kernel::{workgroup_count, ComputeKernel};
pub use screenshot::{save_image, save_to_buffer, ScreenshotError};
pub use shader::{KernelSource, ShaderFragment};
pub use storage_image::{StorageImage, STORAGE_IMAGE_FORMAT};
pub use volume_texture::VolumeTextures;

use volrend_core::{DataManager, RenderingParameters};

/// Everything a volume renderer reads from its host during a lifecycle call.
pub struct RenderContext<'a> {
    /// The wgpu device.
    pub device: &'a wgpu::Device,
    /// The wgpu queue.
    pub queue: &'a wgpu::Queue,
    /// The field data provider.
    pub data: &'a DataManager,
    /// GPU copies of the data, if uploaded.
    pub volume_textures: Option<&'a VolumeTextures>,
    /// Screen and lighting parameters.
    pub rendering: &'a RenderingParameters,
}

/// Where a renderer draws its final image.
pub struct FrameTarget<'a> {
    /// The command encoder for this frame.
    pub encoder: &'a mut wgpu::CommandEncoder,
    /// The target texture view.
    pub view: &'a wgpu::TextureView,
    /// Format of `view`.
    pub format: wgpu::TextureFormat,
}
