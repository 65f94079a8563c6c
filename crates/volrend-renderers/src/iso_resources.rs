//! GPU state shared by the isosurface raycasters.

use volrend_core::AdaptiveIsoParameters;
use volrend_render::{Camera, IsoKernel, RenderContext, RenderError, RenderResult, VolumeTextures};

/// The compiled kernel and its input bindings.
pub(crate) struct IsoResources {
    kernel: IsoKernel,
    inputs: wgpu::BindGroup,
    bound_generation: u64,
    bound_gradient: bool,
}

impl IsoResources {
    /// Compiles the kernel and binds the current volume.
    ///
    /// Fails with [`RenderError::MissingVolumeData`] before touching the
    /// device when there is nothing to render.
    pub fn build(ctx: &RenderContext<'_>, gradient_requested: bool) -> RenderResult<Self> {
        let textures = uploaded_textures(ctx)?;

        let mut kernel = IsoKernel::new(ctx.device)?;
        kernel.uniforms_mut().set_grid(textures);
        kernel.push_uniforms(ctx.queue);

        let use_gradient = gradient_requested && textures.has_gradient();
        let inputs = kernel.create_inputs_bind_group(ctx.device, textures, use_gradient);

        Ok(Self {
            kernel,
            inputs,
            bound_generation: textures.generation(),
            bound_gradient: use_gradient,
        })
    }

    pub fn kernel(&self) -> &IsoKernel {
        &self.kernel
    }

    pub fn inputs(&self) -> &wgpu::BindGroup {
        &self.inputs
    }

    /// Re-binds the inputs when the textures were re-uploaded or the
    /// gradient binding changed. Returns whether a new bind group was made.
    pub fn sync_inputs(
        &mut self,
        device: &wgpu::Device,
        textures: &VolumeTextures,
        gradient_requested: bool,
    ) -> bool {
        let use_gradient = gradient_requested && textures.has_gradient();
        if textures.generation() == self.bound_generation && use_gradient == self.bound_gradient {
            return false;
        }
        log::debug!(
            "Re-binding iso kernel inputs (generation {}, gradient {use_gradient})",
            textures.generation()
        );
        self.inputs = self
            .kernel
            .create_inputs_bind_group(device, textures, use_gradient);
        self.bound_generation = textures.generation();
        self.bound_gradient = use_gradient;
        true
    }

    /// Stages every uniform for a `width x height` kernel run and uploads
    /// them.
    pub fn update(
        &mut self,
        ctx: &RenderContext<'_>,
        camera: &Camera,
        params: &AdaptiveIsoParameters,
        resolution: (u32, u32),
        do_interpolation: bool,
    ) -> RenderResult<()> {
        let textures = uploaded_textures(ctx)?;
        self.sync_inputs(ctx.device, textures, params.apply_gradient_shading());

        let (width, height) = resolution;
        self.kernel.recompute_number_of_groups(width, height);

        let gradient_shading = self.bound_gradient;
        let uniforms = self.kernel.uniforms_mut();
        uniforms.set_camera(camera);
        uniforms.set_lighting(ctx.rendering);
        uniforms.set_grid(textures);
        uniforms.set_surface(
            params.isovalue(),
            params.step_size(),
            params.color(),
            gradient_shading,
        );
        uniforms.set_adaptive(params.interval(), do_interpolation);
        uniforms.set_output_size(width, height);

        self.kernel.push_uniforms(ctx.queue);
        Ok(())
    }

    /// Recompiles the kernel; the bind groups stay valid since the layouts
    /// do not change.
    pub fn reload(&mut self, device: &wgpu::Device) -> RenderResult<()> {
        self.kernel.reload(device)
    }
}

fn uploaded_textures<'a>(ctx: &RenderContext<'a>) -> RenderResult<&'a VolumeTextures> {
    if ctx.data.current_volume().is_none() {
        return Err(RenderError::MissingVolumeData);
    }
    ctx.volume_textures.ok_or(RenderError::MissingVolumeData)
}
