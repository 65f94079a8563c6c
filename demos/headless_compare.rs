//! Compares full-resolution ray marching with the interpolated result for
//! several subsampling intervals.
//!
//! Run with `cargo run --example headless_compare`.

use std::time::Instant;

use volrend::*;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

fn mean_abs_difference(a: &[u8], b: &[u8]) -> f64 {
    let total: u64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| u64::from(x.abs_diff(*y)))
        .sum();
    total as f64 / a.len().max(1) as f64
}

fn timed_frame(renderer: &mut HeadlessRenderer, scene: &mut Scene) -> Result<(HeadlessFrame, f64)> {
    let start = Instant::now();
    let frame = renderer.render_frame(scene)?;
    Ok((frame, start.elapsed().as_secs_f64() * 1000.0))
}

fn main() -> Result<()> {
    init_logging();
    let mut renderer = HeadlessRenderer::new(WIDTH, HEIGHT)?;

    let config = ViewerConfig::default();
    let mut scene = Scene::with_synthetic_volume(&config)?;
    let (reference, ms) = timed_frame(&mut renderer, &mut scene)?;
    println!("full resolution      {ms:8.2} ms");

    for interval in [2, 4, 8] {
        let mut adaptive_config = config.clone();
        adaptive_config.iso.set_do_interpolation(true);
        adaptive_config.iso.set_interval(interval);
        let mut scene = Scene::with_synthetic_volume(&adaptive_config)?;

        let (frame, ms) = timed_frame(&mut renderer, &mut scene)?;
        println!(
            "interval {interval:2}          {ms:8.2} ms   mean |diff| {:.3}",
            mean_abs_difference(&reference.pixels, &frame.pixels)
        );
    }
    Ok(())
}
