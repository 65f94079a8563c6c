//! Core abstractions for volrend-rs.
//!
//! This crate provides the GPU-independent pieces used throughout volrend-rs:
//! - [`StructuredVolume`] and [`GradientField`] scalar/gradient grids
//! - [`DataManager`], the field data provider handed to renderers
//! - [`RenderingParameters`] (screen + Blinn-Phong lighting) and
//!   [`AdaptiveIsoParameters`] (per-renderer tunables with clamp ranges)
//! - [`RendererState`] lifecycle tracking
//! - [`ParameterSpace`] sweepable parameter dimensions

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Parameter structs legitimately have many boolean flags
#![allow(clippy::struct_excessive_bools)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Grid index math converts between u32 dimensions and usize indices
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

pub mod data_manager;
pub mod error;
pub mod gradient;
pub mod iso_parameters;
pub mod lifecycle;
pub mod parameter_space;
pub mod rendering_parameters;
pub mod volume;

pub use data_manager::DataManager;
pub use error::{Result, VolrendError};
pub use gradient::GradientField;
pub use iso_parameters::AdaptiveIsoParameters;
pub use lifecycle::{GridDataType, RendererState};
pub use parameter_space::{ParameterRange, ParameterSample, ParameterSpace};
pub use rendering_parameters::RenderingParameters;
pub use volume::{RawFormat, StructuredVolume};

// Re-export glam types for convenience
pub use glam::{Mat4, UVec3, Vec3, Vec4};
