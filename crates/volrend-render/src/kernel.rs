//! Generic compute kernel with staged uniforms.

use bytemuck::Pod;
use pollster::FutureExt;
use wgpu::util::DeviceExt;

use crate::error::{RenderError, RenderResult};
use crate::shader::KernelSource;

/// Number of workgroups needed to cover `extent` invocations.
#[must_use]
pub fn workgroup_count(extent: u32, local_size: u32) -> u32 {
    extent.div_ceil(local_size.max(1))
}

/// A compute pipeline plus a uniform block of type `U`.
///
/// Uniform writes are staged on the CPU and flagged dirty; nothing reaches
/// the GPU until [`ComputeKernel::push_uniforms`]. The uniform buffer is
/// created by the kernel; callers bind it through
/// [`ComputeKernel::uniform_buffer`].
pub struct ComputeKernel<U: Pod> {
    source: KernelSource,
    bind_group_layouts: Vec<wgpu::BindGroupLayout>,
    pipeline_layout: wgpu::PipelineLayout,
    pipeline: wgpu::ComputePipeline,
    uniform_buffer: wgpu::Buffer,
    uniforms: U,
    dirty: bool,
    workgroup_size: [u32; 3],
    groups: [u32; 3],
}

impl<U: Pod> ComputeKernel<U> {
    /// Compiles the kernel.
    ///
    /// `layouts` holds the bind group layout entries of every group, in
    /// group order. `workgroup_size` must match the `@workgroup_size` of the
    /// entry point.
    pub fn new(
        device: &wgpu::Device,
        source: KernelSource,
        layouts: &[&[wgpu::BindGroupLayoutEntry]],
        uniforms: U,
        workgroup_size: [u32; 3],
    ) -> RenderResult<Self> {
        let label = source.label().unwrap_or("Compute Kernel").to_string();
        let bind_group_layouts: Vec<wgpu::BindGroupLayout> = layouts
            .iter()
            .enumerate()
            .map(|(group, entries)| {
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(&format!("{label} Bind Group Layout {group}")),
                    entries,
                })
            })
            .collect();
        let layout_refs: Vec<&wgpu::BindGroupLayout> = bind_group_layouts.iter().collect();
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label} Pipeline Layout")),
            bind_group_layouts: &layout_refs,
            push_constant_ranges: &[],
        });

        let pipeline = Self::compile(device, &source, &pipeline_layout)?;

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Uniform Buffer")),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Ok(Self {
            source,
            bind_group_layouts,
            pipeline_layout,
            pipeline,
            uniform_buffer,
            uniforms,
            dirty: false,
            workgroup_size,
            groups: [0; 3],
        })
    }

    fn compile(
        device: &wgpu::Device,
        source: &KernelSource,
        pipeline_layout: &wgpu::PipelineLayout,
    ) -> RenderResult<wgpu::ComputePipeline> {
        let combined = source.combined_source()?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: source.label(),
            source: wgpu::ShaderSource::Wgsl(combined.into()),
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: source.label(),
            layout: Some(pipeline_layout),
            module: &module,
            entry_point: Some(source.entry_point()),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });
        if let Some(err) = device.pop_error_scope().block_on() {
            return Err(RenderError::ShaderCompilationFailed(err.to_string()));
        }
        Ok(pipeline)
    }

    /// Recompiles the kernel from its sources. On failure the previous
    /// pipeline stays in use.
    pub fn reload(&mut self, device: &wgpu::Device) -> RenderResult<()> {
        match Self::compile(device, &self.source, &self.pipeline_layout) {
            Ok(pipeline) => {
                self.pipeline = pipeline;
                log::info!(
                    "Reloaded kernel '{}'",
                    self.source.label().unwrap_or("unnamed")
                );
                Ok(())
            }
            Err(err) => {
                log::error!("Kernel reload failed, keeping previous pipeline: {err}");
                Err(err)
            }
        }
    }

    /// Bind group layout of `group`.
    #[must_use]
    pub fn bind_group_layout(&self, group: usize) -> &wgpu::BindGroupLayout {
        &self.bind_group_layouts[group]
    }

    #[must_use]
    pub fn uniform_buffer(&self) -> &wgpu::Buffer {
        &self.uniform_buffer
    }

    /// Staged uniform values.
    #[must_use]
    pub fn uniforms(&self) -> &U {
        &self.uniforms
    }

    /// Mutable access to the staged uniforms; marks them dirty.
    pub fn uniforms_mut(&mut self) -> &mut U {
        self.dirty = true;
        &mut self.uniforms
    }

    /// Uploads staged uniforms if they changed. Returns whether an upload
    /// happened.
    pub fn push_uniforms(&mut self, queue: &wgpu::Queue) -> bool {
        if !self.dirty {
            return false;
        }
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));
        self.dirty = false;
        true
    }

    /// Recomputes the dispatch size for a `width x height x depth` domain.
    pub fn recompute_number_of_groups(&mut self, width: u32, height: u32, depth: u32) {
        self.groups = [
            workgroup_count(width, self.workgroup_size[0]),
            workgroup_count(height, self.workgroup_size[1]),
            workgroup_count(depth, self.workgroup_size[2]),
        ];
    }

    #[must_use]
    pub fn number_of_groups(&self) -> [u32; 3] {
        self.groups
    }

    /// Records one dispatch into `pass` with the given bind groups.
    pub fn dispatch(&self, pass: &mut wgpu::ComputePass<'_>, bind_groups: &[&wgpu::BindGroup]) {
        pass.set_pipeline(&self.pipeline);
        for (index, group) in bind_groups.iter().enumerate() {
            pass.set_bind_group(index as u32, Some(*group), &[]);
        }
        let [x, y, z] = self.groups;
        pass.dispatch_workgroups(x, y, z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_workgroup_count() {
        assert_eq!(workgroup_count(1280, 16), 80);
        assert_eq!(workgroup_count(1281, 16), 81);
        assert_eq!(workgroup_count(1, 16), 1);
        assert_eq!(workgroup_count(0, 16), 0);
        assert_eq!(workgroup_count(7, 0), 7);
    }

    proptest! {
        #[test]
        fn prop_workgroups_cover_extent(extent in 1u32..10_000, local in 1u32..64) {
            let groups = workgroup_count(extent, local);
            prop_assert!(groups * local >= extent);
            prop_assert!((groups - 1) * local < extent);
        }
    }
}
