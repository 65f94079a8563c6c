//! Volume renderer implementations for volrend-rs.
//!
//! This crate provides the renderer lifecycle trait and its strategies:
//! - [`AdaptiveIsoRenderer`], the adaptive-resolution isosurface raycaster
//!   (sparse first pass plus bilinear interpolation pass)
//! - [`SinglePassIsoRenderer`], the conventional one-pass raycaster
//! - [`RendererKind`], the registry used to instantiate them by name

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]

pub mod adaptive_iso;
mod iso_resources;
pub mod redraw_plan;
pub mod registry;
pub mod renderer;
pub mod single_pass_iso;

pub use adaptive_iso::AdaptiveIsoRenderer;
pub use redraw_plan::{plan_redraw, ImageSlot, RedrawStats, RedrawStep};
pub use registry::RendererKind;
pub use renderer::{kernel_resolution, VolumeRenderer};
pub use single_pass_iso::SinglePassIsoRenderer;
