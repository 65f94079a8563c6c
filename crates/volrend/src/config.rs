//! Viewer configuration loaded from JSON.

use std::path::{Path, PathBuf};

use glam::{UVec3, Vec3};
use serde::{Deserialize, Serialize};
use volrend_core::{
    AdaptiveIsoParameters, RawFormat, RenderingParameters, Result, StructuredVolume,
};
use volrend_renderers::RendererKind;

/// A raw volume file on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawVolumeSource {
    pub path: PathBuf,
    pub resolution: [u32; 3],
    #[serde(default = "unit_voxel")]
    pub voxel_size: [f32; 3],
    #[serde(default)]
    pub format: RawFormat,
}

fn unit_voxel() -> [f32; 3] {
    [1.0; 3]
}

impl RawVolumeSource {
    /// Reads and decodes the file.
    pub fn load(&self) -> Result<StructuredVolume> {
        StructuredVolume::from_raw_file(
            &self.path,
            UVec3::from_array(self.resolution),
            Vec3::from_array(self.voxel_size),
            self.format,
        )
    }
}

/// Startup configuration of the viewer and the headless renderer.
///
/// Every field has a default, so a config file only lists what it changes:
///
/// ```json
/// { "window_width": 800, "iso": { "isovalue": 0.3, "do_interpolation": true } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window_width: u32,
    pub window_height: u32,
    /// Lighting, background and multi-scaling.
    pub rendering: RenderingParameters,
    /// Initial isosurface parameters.
    pub iso: AdaptiveIsoParameters,
    /// Abbreviation of the initial renderer ("Adaptive" or "1PassIso").
    pub renderer: String,
    /// Volume to load; the built-in field is used when absent.
    pub volume: Option<RawVolumeSource>,
    /// Resolution of the built-in volume used when no raw file is given.
    pub synthetic_resolution: u32,
    /// Compute the gradient field on load.
    pub generate_gradient: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            rendering: RenderingParameters::default(),
            iso: AdaptiveIsoParameters::default(),
            renderer: RendererKind::default().abbreviation().to_string(),
            volume: None,
            synthetic_resolution: 64,
            generate_gradient: true,
        }
    }
}

impl ViewerConfig {
    /// Parses a config and clamps the iso and rendering parameters into
    /// range.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        config.iso.clamp_all();
        config.rendering.clamp_all();
        config
            .rendering
            .set_screen_size(config.window_width, config.window_height);
        Ok(config)
    }

    /// Loads a config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Self::from_json_str(&json)
    }

    /// The renderer named by [`ViewerConfig::renderer`], falling back to the
    /// default with a warning.
    pub fn renderer_kind(&self) -> RendererKind {
        RendererKind::from_abbreviation(&self.renderer).unwrap_or_else(|| {
            log::warn!(
                "Unknown renderer '{}', using {}",
                self.renderer,
                RendererKind::default().abbreviation()
            );
            RendererKind::default()
        })
    }
}
