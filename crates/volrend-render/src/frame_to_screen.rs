//! The renderer's output image and the pass that puts it on screen.

use wgpu::util::DeviceExt;

use crate::storage_image::StorageImage;

/// GPU representation of the blit uniforms.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlitUniforms {
    pub background: [f32; 4],
}

struct BlitPipeline {
    pipeline: wgpu::RenderPipeline,
    format: wgpu::TextureFormat,
}

/// Owns the image a renderer writes into and draws it (or any other
/// sampled texture) to a color target with a fullscreen triangle.
///
/// The output image may be smaller than the target when pixel
/// multi-scaling is active; drawing upsamples it with linear filtering.
pub struct FrameToScreen {
    output: StorageImage,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    blit: Option<BlitPipeline>,
}

impl FrameToScreen {
    /// Creates the output image and blit resources.
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame To Screen Bind Group Layout"),
            entries: &[
                // Source image
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                // Uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Frame To Screen Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame To Screen Uniform Buffer"),
            contents: bytemuck::bytes_of(&BlitUniforms {
                background: [0.0, 0.0, 0.0, 1.0],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            output: StorageImage::new(device, "frame to screen output", width, height),
            bind_group_layout,
            sampler,
            uniform_buffer,
            blit: None,
        }
    }

    /// The image kernels write into.
    #[must_use]
    pub fn output(&self) -> &StorageImage {
        &self.output
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.output.dimensions()
    }

    /// Reallocates the output image if the size changed. Returns whether it
    /// was reallocated.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        if self.output.dimensions() == (width.max(1), height.max(1)) {
            return false;
        }
        self.output = StorageImage::new(device, "frame to screen output", width, height);
        true
    }

    /// Sets the color shown where the output image is transparent.
    pub fn set_background(&self, queue: &wgpu::Queue, color: glam::Vec4) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&BlitUniforms {
                background: color.to_array(),
            }),
        );
    }

    /// Records a clear of the output image.
    pub fn clear_texture(&self, encoder: &mut wgpu::CommandEncoder) {
        self.output.clear(encoder);
    }

    /// Drops the cached blit pipeline; it is rebuilt on the next draw.
    pub fn clear_shaders(&mut self) {
        self.blit = None;
    }

    /// Draws the output image to `target`.
    pub fn draw(
        &mut self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        target_format: wgpu::TextureFormat,
    ) {
        self.ensure_pipeline(device, target_format);
        self.record_blit(device, encoder, self.output.view(), target);
    }

    /// Draws an arbitrary sampled texture to `target`.
    pub fn draw_texture(
        &mut self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        source: &wgpu::TextureView,
        target: &wgpu::TextureView,
        target_format: wgpu::TextureFormat,
    ) {
        self.ensure_pipeline(device, target_format);
        self.record_blit(device, encoder, source, target);
    }

    fn ensure_pipeline(&mut self, device: &wgpu::Device, format: wgpu::TextureFormat) {
        if self.blit.as_ref().is_none_or(|b| b.format != format) {
            self.blit = Some(BlitPipeline {
                pipeline: Self::create_pipeline(device, &self.bind_group_layout, format),
                format,
            });
        }
    }

    fn record_blit(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        source: &wgpu::TextureView,
        target: &wgpu::TextureView,
    ) {
        let Some(blit) = self.blit.as_ref() else {
            log::warn!("Frame to screen pipeline missing, skipping blit");
            return;
        };

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame To Screen Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        });

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Frame To Screen Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });

        render_pass.set_pipeline(&blit.pipeline);
        render_pass.set_bind_group(0, &bind_group, &[]);
        render_pass.draw(0..3, 0..1); // Fullscreen triangle
    }

    fn create_pipeline(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Frame To Screen Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/frame_to_screen.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Frame To Screen Pipeline Layout"),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Frame To Screen Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}
