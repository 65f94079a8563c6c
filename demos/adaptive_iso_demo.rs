//! Interactive adaptive-resolution isosurface viewer.
//!
//! Run with `cargo run --example adaptive_iso_demo [config.json]`.
//! Left drag orbits, right drag (or shift + left drag) pans, the wheel
//! zooms, F5 reloads shaders and F12 saves a screenshot.

use volrend::*;

fn main() -> Result<()> {
    init_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => ViewerConfig::from_json_file(path)?,
        None => {
            let mut config = ViewerConfig::default();
            config.iso.set_isovalue(0.5);
            config.iso.set_do_interpolation(true);
            config.iso.set_interval(4);
            config
        }
    };

    let scene = Scene::from_config(&config)?;
    show(config, scene)
}
