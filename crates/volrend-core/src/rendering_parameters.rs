//! Screen and lighting parameters shared by every renderer.

use std::ops::RangeInclusive;

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Valid pixel multi-scaling modes.
pub const MULTI_SCALING_RANGE: RangeInclusive<u32> = 0..=3;

/// Screen resolution and Blinn-Phong lighting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingParameters {
    /// Screen width in pixels.
    pub screen_width: u32,
    /// Screen height in pixels.
    pub screen_height: u32,
    /// Ambient reflection coefficient.
    pub blinn_phong_ka: f32,
    /// Diffuse reflection coefficient.
    pub blinn_phong_kd: f32,
    /// Specular reflection coefficient.
    pub blinn_phong_ks: f32,
    /// Specular exponent.
    pub blinn_phong_shininess: f32,
    /// Specular intensity of the light source.
    pub light_source_specular: Vec3,
    /// Light position in world space.
    pub light_position: Vec3,
    /// Clear color for the output image.
    pub background_color: Vec4,
    /// Pixel multi-scaling mode (0 = off, n = render at 1/(n+1) resolution).
    pub multi_scaling_mode: u32,
}

impl Default for RenderingParameters {
    fn default() -> Self {
        Self {
            screen_width: 1280,
            screen_height: 720,
            blinn_phong_ka: 0.5,
            blinn_phong_kd: 0.5,
            blinn_phong_ks: 0.8,
            blinn_phong_shininess: 50.0,
            light_source_specular: Vec3::ONE,
            light_position: Vec3::new(0.0, 1000.0, 1000.0),
            background_color: Vec4::new(0.1, 0.1, 0.1, 1.0),
            multi_scaling_mode: 0,
        }
    }
}

impl RenderingParameters {
    /// Creates rendering parameters with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the screen size. Zero sizes are raised to 1.
    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        self.screen_width = width.max(1);
        self.screen_height = height.max(1);
    }

    /// Sets the light position.
    pub fn with_light_position(mut self, position: Vec3) -> Self {
        self.light_position = position;
        self
    }

    /// Sets the multi-scaling mode, clamped to [`MULTI_SCALING_RANGE`].
    pub fn with_multi_scaling_mode(mut self, mode: u32) -> Self {
        self.set_multi_scaling_mode(mode);
        self
    }

    /// Sets the multi-scaling mode, clamped to [`MULTI_SCALING_RANGE`].
    pub fn set_multi_scaling_mode(&mut self, mode: u32) {
        self.multi_scaling_mode =
            mode.clamp(*MULTI_SCALING_RANGE.start(), *MULTI_SCALING_RANGE.end());
    }

    /// Re-applies the clamp ranges. Needed after editing the public fields
    /// directly or deserializing.
    pub fn clamp_all(&mut self) {
        self.set_multi_scaling_mode(self.multi_scaling_mode);
        self.set_screen_size(self.screen_width, self.screen_height);
    }

    /// Returns width / height of the screen.
    pub fn aspect_ratio(&self) -> f32 {
        self.screen_width.max(1) as f32 / self.screen_height.max(1) as f32
    }

    /// Whether pixel multi-scaling is active.
    pub fn multi_scaling_active(&self) -> bool {
        self.multi_scaling_mode > 0
    }

    /// A `width` x `height` viewport after multi-scaling.
    pub fn scaled_resolution(&self, width: u32, height: u32) -> (u32, u32) {
        let div = self.multi_scaling_mode.saturating_add(1);
        (width.div_ceil(div).max(1), height.div_ceil(div).max(1))
    }

    /// Parses rendering parameters from JSON; missing fields take defaults
    /// and out-of-range values are clamped.
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        let mut params: Self = serde_json::from_str(json)?;
        params.clamp_all();
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = RenderingParameters::default();
        assert_eq!(params.blinn_phong_ka, 0.5);
        assert_eq!(params.blinn_phong_shininess, 50.0);
        assert!(!params.multi_scaling_active());
        assert_eq!(params.scaled_resolution(1280, 720), (1280, 720));
    }

    #[test]
    fn test_scaled_resolution_with_multi_scaling() {
        let params = RenderingParameters::new().with_multi_scaling_mode(1);
        assert!(params.multi_scaling_active());
        assert_eq!(params.scaled_resolution(101, 50), (51, 25));
    }

    #[test]
    fn test_multi_scaling_mode_is_clamped() {
        let params = RenderingParameters::new().with_multi_scaling_mode(u32::MAX);
        assert_eq!(params.multi_scaling_mode, 3);
        assert_eq!(params.scaled_resolution(100, 100), (25, 25));
    }

    #[test]
    fn test_huge_multi_scaling_mode_in_json() {
        let params =
            RenderingParameters::from_json_str(r#"{ "multi_scaling_mode": 4294967295 }"#).unwrap();
        assert_eq!(params.multi_scaling_mode, 3);
        assert_eq!(params.scaled_resolution(1280, 720), (320, 180));
    }

    #[test]
    fn test_scaled_resolution_survives_unclamped_field() {
        let mut params = RenderingParameters::new();
        params.multi_scaling_mode = u32::MAX;
        assert_eq!(params.scaled_resolution(1280, 720), (1, 1));
    }

    #[test]
    fn test_partial_json() {
        let params =
            RenderingParameters::from_json_str(r#"{ "screen_width": 640, "blinn_phong_kd": 0.9 }"#)
                .unwrap();
        assert_eq!(params.screen_width, 640);
        assert_eq!(params.screen_height, 720);
        assert_eq!(params.blinn_phong_kd, 0.9);
    }

    #[test]
    fn test_zero_screen_size_is_raised() {
        let mut params = RenderingParameters::new();
        params.set_screen_size(0, 0);
        assert_eq!((params.screen_width, params.screen_height), (1, 1));
        assert_eq!(params.aspect_ratio(), 1.0);
    }
}
