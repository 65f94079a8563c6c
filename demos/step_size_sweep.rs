//! Renders the step-size sweep of the adaptive raycaster to PNG files.
//!
//! Run with `cargo run --example step_size_sweep [output_dir]`.

use volrend::*;

fn main() -> Result<()> {
    init_logging();
    let out_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sweep_output".to_string());

    let mut config = ViewerConfig::default();
    config.iso.set_do_interpolation(true);
    config.iso.set_interval(2);
    let mut scene = Scene::with_synthetic_volume(&config)?;

    let paths = write_parameter_sweep(&mut scene, &out_dir, 512, 512)?;
    println!("Wrote {} images to {out_dir}", paths.len());
    Ok(())
}
