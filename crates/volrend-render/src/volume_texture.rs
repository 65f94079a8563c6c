//! GPU mirrors of the scalar volume and its gradient field.

use glam::{UVec3, Vec3};
use volrend_core::{DataManager, GradientField, StructuredVolume};

use crate::error::{RenderError, RenderResult};
use crate::error_scope::checked;

/// Scalar volume as a 3D `R16Float` texture, the gradient as a 3D
/// `Rgba16Float` texture (xyz = gradient, w = magnitude), and a shared
/// trilinear sampler.
pub struct VolumeTextures {
    volume: wgpu::Texture,
    volume_view: wgpu::TextureView,
    gradient: Option<(wgpu::Texture, wgpu::TextureView)>,
    placeholder: (wgpu::Texture, wgpu::TextureView),
    sampler: wgpu::Sampler,
    resolution: UVec3,
    voxel_size: Vec3,
    generation: u64,
}

fn extent(resolution: UVec3) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: resolution.x,
        height: resolution.y,
        depth_or_array_layers: resolution.z,
    }
}

fn create_3d_texture(
    device: &wgpu::Device,
    label: &str,
    resolution: UVec3,
    format: wgpu::TextureFormat,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: extent(resolution),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D3,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

/// Writes f16 texels; `channels` values per texel.
fn write_half_texels(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    resolution: UVec3,
    channels: u32,
    values: impl Iterator<Item = f32>,
) {
    let half_data: Vec<u16> = values.map(|v| half::f16::from_f32(v).to_bits()).collect();
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        bytemuck::cast_slice(&half_data),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(resolution.x * channels * 2), // 2 bytes per f16
            rows_per_image: Some(resolution.y),
        },
        extent(resolution),
    );
}

fn gradient_texels(gradient: &GradientField) -> impl Iterator<Item = f32> + '_ {
    gradient
        .gradients()
        .iter()
        .flat_map(|g| [g.x, g.y, g.z, g.length()])
}

impl VolumeTextures {
    /// Uploads the current volume (and gradient, if generated).
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &DataManager,
    ) -> RenderResult<Self> {
        let volume = data.current_volume().ok_or(RenderError::MissingVolumeData)?;
        let textures = checked(device, "volume texture upload", || {
            Self::create(device, queue, volume, data.current_gradient(), data.generation())
        })?;
        log::info!(
            "Uploaded volume '{}' ({}x{}x{}), gradient: {}",
            volume.name(),
            volume.width(),
            volume.height(),
            volume.depth(),
            textures.gradient.is_some()
        );
        Ok(textures)
    }

    fn create(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        volume: &StructuredVolume,
        gradient: Option<&GradientField>,
        generation: u64,
    ) -> Self {
        let resolution = volume.resolution();
        let (volume_texture, volume_view) = create_3d_texture(
            device,
            "volume texture",
            resolution,
            wgpu::TextureFormat::R16Float,
        );
        write_half_texels(queue, &volume_texture, resolution, 1, volume.samples().iter().copied());

        let gradient = gradient.map(|field| {
            let (texture, view) = create_3d_texture(
                device,
                "gradient texture",
                field.resolution(),
                wgpu::TextureFormat::Rgba16Float,
            );
            write_half_texels(queue, &texture, field.resolution(), 4, gradient_texels(field));
            (texture, view)
        });

        let placeholder = create_3d_texture(
            device,
            "gradient placeholder",
            UVec3::ONE,
            wgpu::TextureFormat::Rgba16Float,
        );
        write_half_texels(queue, &placeholder.0, UVec3::ONE, 4, [0.0; 4].into_iter());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Volume Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            volume: volume_texture,
            volume_view,
            gradient,
            placeholder,
            sampler,
            resolution,
            voxel_size: volume.voxel_size(),
            generation,
        }
    }

    /// Brings `slot` in line with `data`. Returns whether anything changed.
    ///
    /// An empty data manager empties the slot; an unchanged generation is a
    /// no-op.
    pub fn sync(
        slot: &mut Option<VolumeTextures>,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &DataManager,
    ) -> RenderResult<bool> {
        if data.current_volume().is_none() {
            return Ok(slot.take().is_some());
        }
        if slot
            .as_ref()
            .is_some_and(|textures| textures.generation == data.generation())
        {
            return Ok(false);
        }
        *slot = Some(Self::upload(device, queue, data)?);
        Ok(true)
    }

    #[must_use]
    pub fn volume_texture(&self) -> &wgpu::Texture {
        &self.volume
    }

    #[must_use]
    pub fn volume_view(&self) -> &wgpu::TextureView {
        &self.volume_view
    }

    /// The gradient view, if a gradient was uploaded.
    #[must_use]
    pub fn gradient_view(&self) -> Option<&wgpu::TextureView> {
        self.gradient.as_ref().map(|(_, view)| view)
    }

    #[must_use]
    pub fn has_gradient(&self) -> bool {
        self.gradient.is_some()
    }

    /// The gradient view when `use_gradient` is set and a gradient exists,
    /// otherwise a 1x1x1 zero texture.
    #[must_use]
    pub fn gradient_or_placeholder(&self, use_gradient: bool) -> &wgpu::TextureView {
        match self.gradient_view() {
            Some(view) if use_gradient => view,
            _ => &self.placeholder.1,
        }
    }

    #[must_use]
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    #[must_use]
    pub fn resolution(&self) -> UVec3 {
        self.resolution
    }

    #[must_use]
    pub fn voxel_size(&self) -> Vec3 {
        self.voxel_size
    }

    /// World-space size of the grid.
    #[must_use]
    pub fn grid_size(&self) -> Vec3 {
        self.resolution.as_vec3() * self.voxel_size
    }

    /// World-space bounds; the grid is centered on the origin.
    #[must_use]
    pub fn bounding_box(&self) -> (Vec3, Vec3) {
        let half = self.grid_size() * 0.5;
        (-half, half)
    }

    /// Data generation these textures were built from.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
