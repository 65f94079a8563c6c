//! Tunable parameters of the isosurface raycasters.

use std::ops::RangeInclusive;

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VolrendError};

/// Valid isovalue range.
pub const ISOVALUE_RANGE: RangeInclusive<f32> = 0.01..=100.0;
/// Valid ray-marching step size range.
pub const STEP_SIZE_RANGE: RangeInclusive<f32> = 0.05..=3.0;
/// Valid subsampling interval range (pixels).
pub const INTERVAL_RANGE: RangeInclusive<u32> = 1..=16;

/// Sweepable parameter names.
pub const PARAM_ISOVALUE: &str = "Isovalue";
pub const PARAM_STEP_SIZE: &str = "StepSize";
pub const PARAM_INTERVAL: &str = "Interval";

/// Parameters of the adaptive-resolution isosurface raycaster.
///
/// Every setter clamps into the valid range, so the invariants hold no
/// matter where a value comes from (drag widget, keyboard entry, sweep,
/// JSON preset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveIsoParameters {
    isovalue: f32,
    step_size: f32,
    color: Vec4,
    apply_gradient_shading: bool,
    do_interpolation: bool,
    interval: u32,
    debug_temp_texture: bool,
}

impl Default for AdaptiveIsoParameters {
    fn default() -> Self {
        Self {
            isovalue: 0.5,
            step_size: 0.5,
            color: Vec4::new(0.66, 0.6, 0.05, 1.0),
            apply_gradient_shading: false,
            do_interpolation: false,
            interval: 1,
            debug_temp_texture: false,
        }
    }
}

fn clamp_f32(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}

impl AdaptiveIsoParameters {
    /// Creates parameters with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON preset and clamps every field into range.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut params: Self = serde_json::from_str(json)?;
        params.clamp_all();
        Ok(params)
    }

    /// Re-applies all clamp ranges.
    pub fn clamp_all(&mut self) {
        self.set_isovalue(self.isovalue);
        self.set_step_size(self.step_size);
        self.set_interval(self.interval);
        self.set_color(self.color);
    }

    pub fn isovalue(&self) -> f32 {
        self.isovalue
    }

    /// Sets the isovalue, clamped to [`ISOVALUE_RANGE`].
    pub fn set_isovalue(&mut self, value: f32) {
        self.isovalue = clamp_f32(value, &ISOVALUE_RANGE);
    }

    pub fn step_size(&self) -> f32 {
        self.step_size
    }

    /// Sets the step size, clamped to [`STEP_SIZE_RANGE`].
    pub fn set_step_size(&mut self, value: f32) {
        self.step_size = clamp_f32(value, &STEP_SIZE_RANGE);
    }

    pub fn color(&self) -> Vec4 {
        self.color
    }

    /// Sets the RGBA color; channels are clamped to [0, 1].
    pub fn set_color(&mut self, color: Vec4) {
        self.color = color.clamp(Vec4::ZERO, Vec4::ONE);
    }

    /// Whether gradient shading was requested (it only takes effect when a
    /// gradient field exists).
    pub fn apply_gradient_shading(&self) -> bool {
        self.apply_gradient_shading
    }

    pub fn set_apply_gradient_shading(&mut self, value: bool) {
        self.apply_gradient_shading = value;
    }

    pub fn do_interpolation(&self) -> bool {
        self.do_interpolation
    }

    pub fn set_do_interpolation(&mut self, value: bool) {
        self.do_interpolation = value;
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Sets the subsampling interval, clamped to [`INTERVAL_RANGE`].
    pub fn set_interval(&mut self, value: u32) {
        self.interval = value.clamp(*INTERVAL_RANGE.start(), *INTERVAL_RANGE.end());
    }

    /// Sets the interval from a signed value (keyboard entry in a drag
    /// widget can go negative).
    pub fn set_interval_i32(&mut self, value: i32) {
        self.set_interval(u32::try_from(value.max(0)).unwrap_or(0));
    }

    pub fn debug_temp_texture(&self) -> bool {
        self.debug_temp_texture
    }

    pub fn set_debug_temp_texture(&mut self, value: bool) {
        self.debug_temp_texture = value;
    }

    /// Sets a numeric parameter by its sweep name.
    pub fn set_named(&mut self, name: &str, value: f32) -> Result<()> {
        match name {
            PARAM_ISOVALUE => self.set_isovalue(value),
            PARAM_STEP_SIZE => self.set_step_size(value),
            PARAM_INTERVAL => self.set_interval_i32(value.round() as i32),
            _ => return Err(VolrendError::UnknownParameter(name.to_string())),
        }
        Ok(())
    }

    /// Reads a numeric parameter by its sweep name.
    pub fn get_named(&self, name: &str) -> Option<f32> {
        match name {
            PARAM_ISOVALUE => Some(self.isovalue),
            PARAM_STEP_SIZE => Some(self.step_size),
            PARAM_INTERVAL => Some(self.interval as f32),
            _ => None,
        }
    }
}
