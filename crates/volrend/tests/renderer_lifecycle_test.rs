//! Renderer lifecycle against a real device.
//!
//! Skipped (early return) when no GPU adapter is available.

use pollster::FutureExt;
use volrend::*;

fn engine() -> Option<RenderEngine> {
    match RenderEngine::new_headless(64, 64).block_on() {
        Ok(engine) => Some(engine),
        Err(e) => {
            eprintln!("Skipping lifecycle test: no GPU adapter available ({e})");
            None
        }
    }
}

fn sphere_data() -> DataManager {
    let mut data = DataManager::new();
    data.set_volume(StructuredVolume::sphere(16).unwrap());
    data
}

/// Runs update + redraw into an offscreen target and returns the stats.
fn draw(
    renderer: &mut dyn VolumeRenderer,
    engine: &RenderEngine,
    ctx: &RenderContext<'_>,
) -> RedrawStats {
    let target = engine.create_offscreen_target(64, 64);
    let mut encoder = engine
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    let stats = {
        let mut frame = FrameTarget {
            encoder: &mut encoder,
            view: target.view(),
            format: target.format(),
        };
        renderer.update(ctx, &Camera::new(1.0)).unwrap();
        renderer.redraw(ctx, &mut frame).unwrap()
    };
    submit_checked(&engine.device, &engine.queue, "lifecycle test frame", encoder)
        .expect("recorded frame failed validation");
    stats
}

#[test]
fn init_without_volume_fails_and_allocates_nothing() {
    let Some(engine) = engine() else {
        return;
    };
    let data = DataManager::new();
    let rendering = RenderingParameters::new();
    let ctx = RenderContext {
        device: &engine.device,
        queue: &engine.queue,
        data: &data,
        volume_textures: None,
        rendering: &rendering,
    };

    let mut renderer = AdaptiveIsoRenderer::new();
    assert!(matches!(
        renderer.init(&ctx, 64, 64),
        Err(RenderError::MissingVolumeData)
    ));
    assert_eq!(renderer.state(), RendererState::Uninitialized);
    assert_eq!(renderer.auxiliary_dimensions(), None);
}

#[test]
fn update_and_redraw_require_init() {
    let Some(engine) = engine() else {
        return;
    };
    let data = sphere_data();
    let rendering = RenderingParameters::new();
    let ctx = RenderContext {
        device: &engine.device,
        queue: &engine.queue,
        data: &data,
        volume_textures: None,
        rendering: &rendering,
    };

    let mut renderer = AdaptiveIsoRenderer::new();
    assert!(matches!(
        renderer.update(&ctx, &Camera::new(1.0)),
        Err(RenderError::NotInitialized)
    ));
    assert!(matches!(
        renderer.reload_shaders(&ctx),
        Err(RenderError::NotInitialized)
    ));
}

#[test]
fn reshape_reallocates_only_on_size_change() {
    let Some(engine) = engine() else {
        return;
    };
    let data = sphere_data();
    let textures = VolumeTextures::upload(&engine.device, &engine.queue, &data).unwrap();
    let rendering = RenderingParameters::new();
    let ctx = RenderContext {
        device: &engine.device,
        queue: &engine.queue,
        data: &data,
        volume_textures: Some(&textures),
        rendering: &rendering,
    };

    let mut renderer = AdaptiveIsoRenderer::new();
    renderer.init(&ctx, 64, 64).unwrap();
    assert_eq!(renderer.state(), RendererState::Outdated);
    assert_eq!(renderer.auxiliary_dimensions(), Some((64, 64)));

    assert!(!renderer.reshape(&ctx, 64, 64));
    assert!(renderer.reshape(&ctx, 80, 60));
    assert_eq!(renderer.auxiliary_dimensions(), Some((80, 60)));
    assert!(!renderer.reshape(&ctx, 80, 60));

    renderer.clean();
    assert_eq!(renderer.state(), RendererState::Uninitialized);
    assert_eq!(renderer.auxiliary_dimensions(), None);
}

#[test]
fn interpolation_toggles_dispatch_count() {
    let Some(engine) = engine() else {
        return;
    };
    let data = sphere_data();
    let textures = VolumeTextures::upload(&engine.device, &engine.queue, &data).unwrap();
    let rendering = RenderingParameters::new();
    let ctx = RenderContext {
        device: &engine.device,
        queue: &engine.queue,
        data: &data,
        volume_textures: Some(&textures),
        rendering: &rendering,
    };

    let mut renderer = AdaptiveIsoRenderer::new();
    renderer.init(&ctx, 64, 64).unwrap();
    assert_eq!(draw(&mut renderer, &engine, &ctx).dispatches, 1);

    renderer.edit_parameters(|p| {
        p.set_do_interpolation(true);
        p.set_interval(3);
    });
    assert_eq!(draw(&mut renderer, &engine, &ctx).dispatches, 2);

    renderer.edit_parameters(|p| p.set_debug_temp_texture(true));
    assert_eq!(draw(&mut renderer, &engine, &ctx).dispatches, 1);

    // reinitializing a built renderer cleans it first
    renderer.init(&ctx, 32, 32).unwrap();
    assert_eq!(renderer.auxiliary_dimensions(), Some((32, 32)));
    renderer.reload_shaders(&ctx).unwrap();
}
