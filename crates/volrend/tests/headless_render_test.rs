//! Headless rendering integration tests.
//!
//! These tests need a GPU adapter (real or software fallback). Without one,
//! engine creation fails and each test returns early with a note on stderr.

use volrend::*;

/// Checks that a pixel buffer is neither all black nor a single color.
fn has_nontrivial_content(pixels: &[u8], width: u32, height: u32) -> bool {
    let total = (width * height) as usize;
    assert_eq!(pixels.len(), total * 4, "pixel buffer size mismatch");

    let all_black = pixels.chunks(4).all(|px| px[0] == 0 && px[1] == 0 && px[2] == 0);
    let first = &pixels[0..4];
    let all_uniform = pixels.chunks(4).all(|px| px == first);

    !all_black && !all_uniform
}

fn pixel(frame: &HeadlessFrame, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.pixels[i],
        frame.pixels[i + 1],
        frame.pixels[i + 2],
        frame.pixels[i + 3],
    ]
}

fn rgb_distance(a: [u8; 4], b: [u8; 4]) -> u8 {
    (0..3).map(|c| a[c].abs_diff(b[c])).max().unwrap_or(0)
}

fn mean_abs_diff(a: &HeadlessFrame, b: &HeadlessFrame) -> f64 {
    let total: u64 = a
        .pixels
        .iter()
        .zip(&b.pixels)
        .map(|(x, y)| u64::from(x.abs_diff(*y)))
        .sum();
    total as f64 / a.pixels.len() as f64
}

fn headless(width: u32, height: u32) -> Option<HeadlessRenderer> {
    match HeadlessRenderer::new(width, height) {
        Ok(renderer) => Some(renderer),
        Err(e) => {
            eprintln!("Skipping headless test: no GPU adapter available ({e})");
            None
        }
    }
}

fn small_config() -> ViewerConfig {
    let mut config = ViewerConfig {
        synthetic_resolution: 32,
        ..ViewerConfig::default()
    };
    config.iso.set_isovalue(0.5);
    config
}

/// Unshaded surface over a black background, so every pixel is either
/// exactly the background or visibly the surface color.
fn flat_config() -> ViewerConfig {
    let mut config = small_config();
    config.rendering.background_color = Vec4::new(0.0, 0.0, 0.0, 1.0);
    config.iso.set_apply_gradient_shading(false);
    config
}

const BLACK: [u8; 4] = [0, 0, 0, 255];

/// A single smooth surface, so the silhouette is one closed curve.
fn sphere_scene(config: &ViewerConfig) -> Scene {
    Scene::with_volume(config, StructuredVolume::sphere(32).unwrap()).unwrap()
}

#[test]
fn headless_empty_scene_is_background() {
    let Some(mut renderer) = headless(96, 64) else {
        return;
    };
    let mut scene = Scene::new(&small_config());
    let frame = renderer.render_frame(&mut scene).expect("empty render failed");

    assert!(frame.stats.is_none());
    let first = &frame.pixels[0..4];
    assert!(
        frame.pixels.chunks(4).all(|px| px == first),
        "empty scene should be uniform background color"
    );
}

#[test]
fn headless_full_resolution_isosurface() {
    let Some(mut renderer) = headless(128, 96) else {
        return;
    };
    let mut scene = Scene::with_synthetic_volume(&small_config()).unwrap();
    let frame = renderer.render_frame(&mut scene).expect("render failed");

    assert_eq!(frame.stats.map(|s| s.dispatches), Some(1));
    assert!(has_nontrivial_content(&frame.pixels, 128, 96));
    assert_eq!(scene.renderer().state(), RendererState::UpToDate);
}

#[test]
fn headless_interpolated_isosurface() {
    let Some(mut renderer) = headless(128, 96) else {
        return;
    };
    let mut config = small_config();
    config.iso.set_do_interpolation(true);
    config.iso.set_interval(4);
    let mut scene = Scene::with_synthetic_volume(&config).unwrap();

    let frame = renderer.render_frame(&mut scene).expect("render failed");
    assert_eq!(
        frame.stats,
        Some(RedrawStats {
            dispatches: 2,
            barriers: 1
        })
    );
    assert!(has_nontrivial_content(&frame.pixels, 128, 96));
}

#[test]
fn headless_interpolated_frame_matches_full_resolution() {
    let Some(mut renderer) = headless(128, 96) else {
        return;
    };
    let interval = 2;
    let full_config = flat_config();
    let mut adaptive_config = flat_config();
    adaptive_config.iso.set_do_interpolation(true);
    adaptive_config.iso.set_interval(interval);

    let mut full_scene = sphere_scene(&full_config);
    let mut adaptive_scene = sphere_scene(&adaptive_config);
    let full = renderer.render_frame(&mut full_scene).expect("full render failed");
    let adaptive = renderer
        .render_frame(&mut adaptive_scene)
        .expect("adaptive render failed");

    // sparse samples are copied through unchanged
    for y in (0..96).step_by(interval as usize) {
        for x in (0..128).step_by(interval as usize) {
            let (a, b) = (pixel(&full, x, y), pixel(&adaptive, x, y));
            assert!(rgb_distance(a, b) <= 2, "sample ({x}, {y}): {a:?} vs {b:?}");
        }
    }
    // only the silhouette band is approximated
    let diff = mean_abs_diff(&full, &adaptive);
    assert!(diff < 10.0, "mean abs diff {diff}");
}

#[test]
fn headless_sparse_debug_view() {
    let Some(mut renderer) = headless(64, 64) else {
        return;
    };
    let interval = 4;
    let mut config = flat_config();
    config.iso.set_do_interpolation(true);
    config.iso.set_debug_temp_texture(true);
    config.iso.set_interval(interval);
    let mut scene = sphere_scene(&config);

    let frame = renderer.render_frame(&mut scene).expect("render failed");
    assert_eq!(frame.stats.map(|s| s.dispatches), Some(1));

    let mut surface_samples = 0;
    for y in 0..64 {
        for x in 0..64 {
            let px = pixel(&frame, x, y);
            if x % interval == 0 && y % interval == 0 {
                if rgb_distance(px, BLACK) > 2 {
                    surface_samples += 1;
                }
            } else {
                assert!(
                    rgb_distance(px, BLACK) <= 2,
                    "off-grid pixel ({x}, {y}) was written: {px:?}"
                );
            }
        }
    }
    assert!(surface_samples > 0, "no sparse sample hit the surface");
}

#[test]
fn headless_single_pass_with_multiscaling() {
    let Some(mut renderer) = headless(128, 96) else {
        return;
    };
    let mut config = small_config();
    config.renderer = "1PassIso".to_string();
    config.rendering.multi_scaling_mode = 1;
    let mut scene = Scene::with_synthetic_volume(&config).unwrap();
    assert_eq!(scene.renderer_kind(), RendererKind::SinglePassIso);

    let frame = renderer.render_frame(&mut scene).expect("render failed");
    assert_eq!(frame.stats.map(|s| s.dispatches), Some(1));
    assert!(has_nontrivial_content(&frame.pixels, 128, 96));
}

#[test]
fn headless_switching_renderers() {
    let Some(mut renderer) = headless(64, 48) else {
        return;
    };
    let mut scene = Scene::with_synthetic_volume(&small_config()).unwrap();
    renderer.render_frame(&mut scene).expect("first render failed");

    scene.switch_renderer(RendererKind::SinglePassIso);
    assert_eq!(scene.renderer().state(), RendererState::Uninitialized);
    let frame = renderer.render_frame(&mut scene).expect("second render failed");
    assert!(frame.stats.is_some());
    assert!(scene.renderer().state().is_built());
}

#[test]
fn headless_step_size_sweep() {
    if headless(32, 32).is_none() {
        return;
    }
    let mut scene = Scene::with_synthetic_volume(&small_config()).unwrap();
    let frames = run_parameter_sweep(&mut scene, 32, 32).expect("sweep failed");

    assert_eq!(frames.len(), 30);
    assert_eq!(frames[0].sample, vec![("StepSize".to_string(), 0.05)]);
    assert!(frames
        .iter()
        .all(|f| f.sample[0].1 <= 3.0 && f.frame.pixels.len() == 32 * 32 * 4));
}
