//! volrend-rs: adaptive-resolution isosurface raycasting on wgpu.
//!
//! A [`Scene`] owns a structured volume, the camera, the lighting
//! parameters and the active [`VolumeRenderer`]. Hosts either open the
//! interactive viewer with [`show`] or render frames offscreen with the
//! [`headless`] API.
//!
//! # Quick Start
//!
//! ```no_run
//! use volrend::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!     let config = ViewerConfig::default();
//!     let scene = Scene::with_synthetic_volume(&config)?;
//!     show(config, scene)
//! }
//! ```
//!
//! # Renderers
//!
//! - [`AdaptiveIsoRenderer`] ray-marches a sparse subset of pixels and
//!   fills the rest by interpolation when interpolation is enabled
//! - [`SinglePassIsoRenderer`] ray-marches every pixel in one dispatch

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// Cursor and scroll deltas arrive as f64
#![allow(clippy::cast_possible_truncation)]

mod app;
pub mod config;
pub mod headless;
pub mod scene;

pub use volrend_core::{
    AdaptiveIsoParameters, DataManager, GradientField, ParameterRange, ParameterSample,
    ParameterSpace, RawFormat, RendererState, RenderingParameters, Result, StructuredVolume,
    VolrendError,
};
pub use volrend_core::{Mat4, UVec3, Vec3, Vec4};
pub use volrend_render::{
    submit_checked, Camera, FrameTarget, RenderContext, RenderEngine, RenderError,
    VolumeTextures,
};
pub use volrend_renderers::{
    plan_redraw, AdaptiveIsoRenderer, ImageSlot, RedrawStats, RedrawStep, RendererKind,
    SinglePassIsoRenderer, VolumeRenderer,
};

pub use config::{RawVolumeSource, ViewerConfig};
pub use headless::{
    render_to_file, render_to_image, run_parameter_sweep, write_parameter_sweep,
    HeadlessFrame, HeadlessRenderer, SweepFrame,
};
pub use scene::{Scene, UiRequests};

/// Initializes `env_logger` at `info` level unless `RUST_LOG` says
/// otherwise. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Opens the viewer window and blocks until it is closed.
pub fn show(config: ViewerConfig, scene: Scene) -> Result<()> {
    init_logging();
    app::run_app(config, scene)
}
