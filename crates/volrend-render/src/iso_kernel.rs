//! The isosurface ray-marching kernel and its uniform block.
//!
//! Bind groups:
//! - group 0 (inputs): uniforms, volume texture, gradient texture, sampler
//! - group 1 (targets): output storage image, auxiliary sampled image,
//!   per-pass uniforms
//!
//! The first-pass flag lives in group 1 with one small buffer per pass, so
//! both dispatches of an interpolated frame can be recorded in the same
//! command buffer.

use std::path::PathBuf;

use glam::Vec4;
use wgpu::util::DeviceExt;
use volrend_core::RenderingParameters;

use crate::camera::Camera;
use crate::error::RenderResult;
use crate::kernel::ComputeKernel;
use crate::shader::KernelSource;
use crate::storage_image::STORAGE_IMAGE_FORMAT;
use crate::volume_texture::VolumeTextures;

/// Local workgroup size of the kernel (must match the WGSL).
pub const ISO_WORKGROUP_SIZE: [u32; 3] = [16, 16, 1];

/// Environment variable naming a directory to load kernel sources from
/// instead of the embedded copies.
pub const SHADER_DIR_ENV: &str = "VOLREND_SHADER_DIR";

const RAY_BBOX_FILE: &str = "ray_bbox_intersection.wgsl";
const ISO_KERNEL_FILE: &str = "ray_marching_1p_iso_adaptive.wgsl";

/// GPU representation of the kernel uniforms (256 bytes, WGSL layout).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct IsoKernelUniforms {
    pub projection: [[f32; 4]; 4],
    pub camera_eye: [f32; 3],
    pub tan_camera_fov_y: f32,
    pub camera_look_at: [f32; 3],
    pub camera_aspect_ratio: f32,
    pub camera_up: [f32; 3],
    pub isovalue: f32,
    pub volume_grid_resolution: [f32; 3],
    pub step_size: f32,
    pub volume_voxel_size: [f32; 3],
    pub interval: u32,
    pub volume_grid_size: [f32; 3],
    pub do_interpolation: u32,
    pub color: [f32; 4],
    pub light_source_position: [f32; 3],
    pub apply_gradient_shading: u32,
    pub blinn_phong_ispecular: [f32; 3],
    _pad0: u32,
    /// ka, kd, ks, shininess
    pub blinn_phong: [f32; 4],
    pub world_eye_pos: [f32; 3],
    _pad1: u32,
    pub output_size: [u32; 2],
    _pad2: [u32; 2],
}

impl Default for IsoKernelUniforms {
    fn default() -> Self {
        Self {
            projection: glam::Mat4::IDENTITY.to_cols_array_2d(),
            camera_eye: [0.0, 0.0, 3.0],
            tan_camera_fov_y: 1.0,
            camera_look_at: [0.0; 3],
            camera_aspect_ratio: 1.0,
            camera_up: [0.0, 1.0, 0.0],
            isovalue: 0.5,
            volume_grid_resolution: [1.0; 3],
            step_size: 0.5,
            volume_voxel_size: [1.0; 3],
            interval: 1,
            volume_grid_size: [1.0; 3],
            do_interpolation: 0,
            color: [1.0; 4],
            light_source_position: [0.0; 3],
            apply_gradient_shading: 0,
            blinn_phong_ispecular: [1.0; 3],
            _pad0: 0,
            blinn_phong: [0.5, 0.5, 0.8, 50.0],
            world_eye_pos: [0.0, 0.0, 3.0],
            _pad1: 0,
            output_size: [1, 1],
            _pad2: [0; 2],
        }
    }
}

impl IsoKernelUniforms {
    /// Camera eye, look-at, up, FOV, aspect ratio and projection.
    pub fn set_camera(&mut self, camera: &Camera) {
        self.projection = camera.projection_matrix().to_cols_array_2d();
        self.camera_eye = camera.position.to_array();
        self.world_eye_pos = camera.position.to_array();
        self.camera_look_at = camera.target.to_array();
        self.camera_up = camera.up.to_array();
        self.tan_camera_fov_y = camera.tan_half_fov_y();
        self.camera_aspect_ratio = camera.aspect_ratio;
    }

    /// Blinn-Phong coefficients, specular intensity and light position.
    pub fn set_lighting(&mut self, params: &RenderingParameters) {
        self.blinn_phong = [
            params.blinn_phong_ka,
            params.blinn_phong_kd,
            params.blinn_phong_ks,
            params.blinn_phong_shininess,
        ];
        self.blinn_phong_ispecular = params.light_source_specular.to_array();
        self.light_source_position = params.light_position.to_array();
    }

    /// Grid resolution, voxel size and world-space size.
    pub fn set_grid(&mut self, textures: &VolumeTextures) {
        self.volume_grid_resolution = textures.resolution().as_vec3().to_array();
        self.volume_voxel_size = textures.voxel_size().to_array();
        self.volume_grid_size = textures.grid_size().to_array();
    }

    /// Isosurface appearance.
    pub fn set_surface(&mut self, isovalue: f32, step_size: f32, color: Vec4, gradient_shading: bool) {
        self.isovalue = isovalue;
        self.step_size = step_size;
        self.color = color.to_array();
        self.apply_gradient_shading = u32::from(gradient_shading);
    }

    /// Subsampling interval and interpolation switch.
    pub fn set_adaptive(&mut self, interval: u32, do_interpolation: bool) {
        self.interval = interval.max(1);
        self.do_interpolation = u32::from(do_interpolation);
    }

    /// Size of the image the kernel writes.
    pub fn set_output_size(&mut self, width: u32, height: u32) {
        self.output_size = [width, height];
    }
}

/// Per-pass uniforms (group 1, binding 2).
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PassUniforms {
    pub is_first_pass: u32,
    _padding: [u32; 3],
}

/// Kernel source: ray/box intersection helper plus the ray marcher.
///
/// When [`SHADER_DIR_ENV`] is set, both fragments are read from that
/// directory so a shader reload picks up edits.
#[must_use]
pub fn iso_kernel_source() -> KernelSource {
    let source = KernelSource::new().with_label("Isosurface Ray Marching Kernel");
    match std::env::var_os(SHADER_DIR_ENV) {
        Some(dir) => {
            let dir = PathBuf::from(dir);
            log::info!("Loading isosurface kernel from {}", dir.display());
            source
                .with_fragment_file(dir.join(RAY_BBOX_FILE))
                .with_fragment_file(dir.join(ISO_KERNEL_FILE))
        }
        None => source
            .with_fragment(include_str!("shaders/ray_bbox_intersection.wgsl"))
            .with_fragment(include_str!("shaders/ray_marching_1p_iso_adaptive.wgsl")),
    }
}

fn input_layout_entries() -> [wgpu::BindGroupLayoutEntry; 4] {
    let texture_3d = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D3,
            multisampled: false,
        },
        count: None,
    };
    [
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        },
        texture_3d(1),
        texture_3d(2),
        wgpu::BindGroupLayoutEntry {
            binding: 3,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
    ]
}

fn target_layout_entries() -> [wgpu::BindGroupLayoutEntry; 3] {
    [
        // Output image
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::StorageTexture {
                access: wgpu::StorageTextureAccess::WriteOnly,
                format: STORAGE_IMAGE_FORMAT,
                view_dimension: wgpu::TextureViewDimension::D2,
            },
            count: None,
        },
        // Sparse samples read by the interpolation pass
        wgpu::BindGroupLayoutEntry {
            binding: 1,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: 2,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        },
    ]
}

/// The compiled isosurface kernel plus its per-pass buffers.
pub struct IsoKernel {
    kernel: ComputeKernel<IsoKernelUniforms>,
    first_pass: wgpu::Buffer,
    second_pass: wgpu::Buffer,
}

impl IsoKernel {
    /// Compiles the kernel from [`iso_kernel_source`].
    pub fn new(device: &wgpu::Device) -> RenderResult<Self> {
        Self::with_source(device, iso_kernel_source())
    }

    /// Compiles the kernel from an explicit source.
    pub fn with_source(device: &wgpu::Device, source: KernelSource) -> RenderResult<Self> {
        let inputs = input_layout_entries();
        let targets = target_layout_entries();
        let kernel = ComputeKernel::new(
            device,
            source,
            &[&inputs, &targets],
            IsoKernelUniforms::default(),
            ISO_WORKGROUP_SIZE,
        )?;

        let pass_buffer = |label, is_first_pass| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::bytes_of(&PassUniforms {
                    is_first_pass,
                    _padding: [0; 3],
                }),
                usage: wgpu::BufferUsages::UNIFORM,
            })
        };

        Ok(Self {
            kernel,
            first_pass: pass_buffer("Iso Kernel First Pass Uniforms", 1),
            second_pass: pass_buffer("Iso Kernel Second Pass Uniforms", 0),
        })
    }

    #[must_use]
    pub fn uniforms(&self) -> &IsoKernelUniforms {
        self.kernel.uniforms()
    }

    /// Staged uniforms; changes reach the GPU on [`IsoKernel::push_uniforms`].
    pub fn uniforms_mut(&mut self) -> &mut IsoKernelUniforms {
        self.kernel.uniforms_mut()
    }

    pub fn push_uniforms(&mut self, queue: &wgpu::Queue) -> bool {
        self.kernel.push_uniforms(queue)
    }

    pub fn recompute_number_of_groups(&mut self, width: u32, height: u32) {
        self.kernel.recompute_number_of_groups(width, height, 1);
    }

    #[must_use]
    pub fn number_of_groups(&self) -> [u32; 3] {
        self.kernel.number_of_groups()
    }

    /// Recompiles from source, keeping the previous pipeline on failure.
    pub fn reload(&mut self, device: &wgpu::Device) -> RenderResult<()> {
        self.kernel.reload(device)
    }

    /// Binds uniforms, volume, gradient (or its placeholder) and sampler.
    #[must_use]
    pub fn create_inputs_bind_group(
        &self,
        device: &wgpu::Device,
        textures: &VolumeTextures,
        use_gradient: bool,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Iso Kernel Inputs"),
            layout: self.kernel.bind_group_layout(0),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.kernel.uniform_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(textures.volume_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(
                        textures.gradient_or_placeholder(use_gradient),
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(textures.sampler()),
                },
            ],
        })
    }

    /// Binds the image to write, the image to read, and the pass flag.
    /// `output` and `sampled` must be different textures.
    #[must_use]
    pub fn create_targets_bind_group(
        &self,
        device: &wgpu::Device,
        output: &wgpu::TextureView,
        sampled: &wgpu::TextureView,
        first_pass: bool,
    ) -> wgpu::BindGroup {
        let pass_buffer = if first_pass {
            &self.first_pass
        } else {
            &self.second_pass
        };
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Iso Kernel Targets"),
            layout: self.kernel.bind_group_layout(1),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(output),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(sampled),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: pass_buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// Records one dispatch in its own compute pass.
    pub fn dispatch(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        inputs: &wgpu::BindGroup,
        targets: &wgpu::BindGroup,
    ) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(label),
            timestamp_writes: None,
        });
        self.kernel.dispatch(&mut pass, &[inputs, targets]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_uniform_layout_matches_wgsl() {
        assert_eq!(size_of::<IsoKernelUniforms>(), 256);
        assert_eq!(offset_of!(IsoKernelUniforms, camera_eye), 64);
        assert_eq!(offset_of!(IsoKernelUniforms, isovalue), 108);
        assert_eq!(offset_of!(IsoKernelUniforms, interval), 140);
        assert_eq!(offset_of!(IsoKernelUniforms, color), 160);
        assert_eq!(offset_of!(IsoKernelUniforms, blinn_phong), 208);
        assert_eq!(offset_of!(IsoKernelUniforms, output_size), 240);
        assert_eq!(size_of::<PassUniforms>(), 16);
    }

    #[test]
    fn test_set_camera() {
        let mut camera = Camera::new(2.0);
        camera.position = Vec3::new(1.0, 2.0, 3.0);
        let mut uniforms = IsoKernelUniforms::default();
        uniforms.set_camera(&camera);
        assert_eq!(uniforms.camera_eye, [1.0, 2.0, 3.0]);
        assert_eq!(uniforms.world_eye_pos, uniforms.camera_eye);
        assert_eq!(uniforms.camera_aspect_ratio, 2.0);
        assert!((uniforms.tan_camera_fov_y - camera.tan_half_fov_y()).abs() < 1e-6);
    }

    #[test]
    fn test_set_lighting() {
        let params = RenderingParameters::default();
        let mut uniforms = IsoKernelUniforms::default();
        uniforms.set_lighting(&params);
        assert_eq!(uniforms.blinn_phong, [0.5, 0.5, 0.8, 50.0]);
        assert_eq!(uniforms.light_source_position, [0.0, 1000.0, 1000.0]);
    }

    #[test]
    fn test_interval_never_zero() {
        let mut uniforms = IsoKernelUniforms::default();
        uniforms.set_adaptive(0, true);
        assert_eq!(uniforms.interval, 1);
        assert_eq!(uniforms.do_interpolation, 1);
    }

    #[test]
    fn test_embedded_source_has_both_fragments() {
        if std::env::var_os(SHADER_DIR_ENV).is_some() {
            return;
        }
        let source = iso_kernel_source().combined_source().unwrap();
        assert!(source.contains("fn ray_aabb_intersection"));
        assert!(source.contains("@workgroup_size(16, 16, 1)"));
    }
}
