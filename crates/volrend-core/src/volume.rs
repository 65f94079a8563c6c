//! Structured (regular grid) scalar volumes.

use std::path::Path;

use glam::{UVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VolrendError};

/// Sample encoding of a raw volume file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RawFormat {
    /// 8-bit unsigned, normalized to [0, 1].
    #[default]
    U8,
    /// 16-bit unsigned little-endian, normalized to [0, 1].
    U16,
    /// 32-bit float little-endian, kept as-is.
    F32,
}

impl RawFormat {
    /// Returns the number of bytes per sample.
    #[must_use]
    pub fn bytes_per_sample(self) -> usize {
        match self {
            RawFormat::U8 => 1,
            RawFormat::U16 => 2,
            RawFormat::F32 => 4,
        }
    }
}

/// A scalar field sampled on a regular grid.
///
/// Samples are stored x-fastest, then y, then z.
#[derive(Debug, Clone)]
pub struct StructuredVolume {
    name: String,
    resolution: UVec3,
    voxel_size: Vec3,
    samples: Vec<f32>,
}

impl StructuredVolume {
    /// Creates a volume from already decoded samples.
    pub fn new(
        name: impl Into<String>,
        resolution: UVec3,
        voxel_size: Vec3,
        samples: Vec<f32>,
    ) -> Result<Self> {
        if resolution.x == 0 || resolution.y == 0 || resolution.z == 0 {
            return Err(VolrendError::InvalidDimensions(
                resolution.x,
                resolution.y,
                resolution.z,
            ));
        }
        let expected = Self::count(resolution);
        if samples.len() != expected {
            return Err(VolrendError::SizeMismatch {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            resolution,
            voxel_size,
            samples,
        })
    }

    /// Creates a volume by evaluating `f` at every voxel.
    ///
    /// `f` receives normalized coordinates in [0, 1] per axis (voxel centers
    /// at the grid nodes, so the first and last node map to 0 and 1).
    pub fn from_fn(
        name: impl Into<String>,
        resolution: UVec3,
        voxel_size: Vec3,
        f: impl Fn(Vec3) -> f32,
    ) -> Result<Self> {
        let denom = (resolution.as_vec3() - Vec3::ONE).max(Vec3::ONE);
        let mut samples = Vec::with_capacity(Self::count(resolution));
        for z in 0..resolution.z {
            for y in 0..resolution.y {
                for x in 0..resolution.x {
                    let p = Vec3::new(x as f32, y as f32, z as f32) / denom;
                    samples.push(f(p));
                }
            }
        }
        Self::new(name, resolution, voxel_size, samples)
    }

    /// Decodes a raw byte buffer.
    pub fn from_raw_bytes(
        name: impl Into<String>,
        bytes: &[u8],
        resolution: UVec3,
        voxel_size: Vec3,
        format: RawFormat,
    ) -> Result<Self> {
        let count = Self::count(resolution);
        let expected = count * format.bytes_per_sample();
        if bytes.len() != expected {
            return Err(VolrendError::SizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }

        let samples: Vec<f32> = match format {
            RawFormat::U8 => bytes.iter().map(|&b| f32::from(b) / 255.0).collect(),
            RawFormat::U16 => bytes
                .chunks_exact(2)
                .map(|c| f32::from(u16::from_le_bytes([c[0], c[1]])) / 65535.0)
                .collect(),
            RawFormat::F32 => bytes
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        };

        Self::new(name, resolution, voxel_size, samples)
    }

    /// Loads a raw volume file. The volume is named after the file stem.
    pub fn from_raw_file(
        path: impl AsRef<Path>,
        resolution: UVec3,
        voxel_size: Vec3,
        format: RawFormat,
    ) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("volume")
            .to_string();
        log::info!(
            "loaded raw volume '{name}' ({}x{}x{}, {format:?})",
            resolution.x,
            resolution.y,
            resolution.z
        );
        Self::from_raw_bytes(name, &bytes, resolution, voxel_size, format)
    }

    /// A radial field: 1 at the center falling linearly to 0 at distance 0.5.
    ///
    /// The isosurface at value `v` is a sphere of radius `(1 - v) / 2` in
    /// normalized coordinates.
    pub fn sphere(resolution: u32) -> Result<Self> {
        Self::from_fn(
            "sphere",
            UVec3::splat(resolution),
            Vec3::ONE,
            |p| (1.0 - 2.0 * (p - Vec3::splat(0.5)).length()).max(0.0),
        )
    }

    /// The Marschner-Lobb test signal (f_M = 6, alpha = 0.25).
    pub fn marschner_lobb(resolution: u32) -> Result<Self> {
        const FM: f32 = 6.0;
        const ALPHA: f32 = 0.25;
        use std::f32::consts::PI;

        Self::from_fn("marschner_lobb", UVec3::splat(resolution), Vec3::ONE, |p| {
            let q = p * 2.0 - Vec3::ONE;
            let r = (q.x * q.x + q.y * q.y).sqrt();
            let rho = (2.0 * PI * FM * (PI * r / 2.0).cos()).cos();
            (1.0 - (PI * q.z / 2.0).sin() + ALPHA * (1.0 + rho)) / (2.0 * (1.0 + ALPHA))
        })
    }

    fn count(resolution: UVec3) -> usize {
        resolution.x as usize * resolution.y as usize * resolution.z as usize
    }

    /// Returns the volume name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of voxels along each axis.
    pub fn resolution(&self) -> UVec3 {
        self.resolution
    }

    /// Returns the grid width (x resolution).
    pub fn width(&self) -> u32 {
        self.resolution.x
    }

    /// Returns the grid height (y resolution).
    pub fn height(&self) -> u32 {
        self.resolution.y
    }

    /// Returns the grid depth (z resolution).
    pub fn depth(&self) -> u32 {
        self.resolution.z
    }

    /// Returns the per-axis voxel scale.
    pub fn voxel_size(&self) -> Vec3 {
        self.voxel_size
    }

    /// Returns the physical extent of the volume (voxel count times voxel size).
    pub fn physical_extent(&self) -> Vec3 {
        self.resolution.as_vec3() * self.voxel_size
    }

    /// Returns the raw samples, x-fastest.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Returns the linear index of a voxel.
    pub fn index(&self, x: u32, y: u32, z: u32) -> usize {
        let r = self.resolution;
        (z as usize * r.y as usize + y as usize) * r.x as usize + x as usize
    }

    /// Returns the sample at a voxel.
    pub fn value(&self, x: u32, y: u32, z: u32) -> f32 {
        self.samples[self.index(x, y, z)]
    }

    /// Returns the (min, max) of all samples.
    pub fn value_range(&self) -> (f32, f32) {
        self.samples
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_extent() {
        let volume = StructuredVolume::new(
            "v",
            UVec3::new(4, 2, 8),
            Vec3::new(0.5, 1.0, 2.0),
            vec![0.0; 64],
        )
        .unwrap();
        assert_eq!(volume.physical_extent(), Vec3::new(2.0, 2.0, 16.0));
    }

    #[test]
    fn test_rejects_zero_dimension() {
        let result = StructuredVolume::new("v", UVec3::new(4, 0, 1), Vec3::ONE, vec![]);
        assert!(matches!(result, Err(VolrendError::InvalidDimensions(4, 0, 1))));
    }

    #[test]
    fn test_rejects_sample_count_mismatch() {
        let result = StructuredVolume::new("v", UVec3::splat(2), Vec3::ONE, vec![0.0; 7]);
        assert!(matches!(
            result,
            Err(VolrendError::SizeMismatch {
                expected: 8,
                actual: 7
            })
        ));
    }

    #[test]
    fn test_raw_u8_normalized() {
        let bytes = [0u8, 255, 51, 102, 0, 0, 0, 0];
        let volume =
            StructuredVolume::from_raw_bytes("v", &bytes, UVec3::splat(2), Vec3::ONE, RawFormat::U8)
                .unwrap();
        assert_eq!(volume.value(0, 0, 0), 0.0);
        assert_eq!(volume.value(1, 0, 0), 1.0);
        assert!((volume.value(0, 1, 0) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_raw_u16_little_endian() {
        let mut bytes = Vec::new();
        for v in [0u16, 65535] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let volume = StructuredVolume::from_raw_bytes(
            "v",
            &bytes,
            UVec3::new(2, 1, 1),
            Vec3::ONE,
            RawFormat::U16,
        )
        .unwrap();
        assert_eq!(volume.samples(), &[0.0, 1.0]);
    }

    #[test]
    fn test_raw_size_mismatch() {
        let result = StructuredVolume::from_raw_bytes(
            "v",
            &[0u8; 7],
            UVec3::splat(2),
            Vec3::ONE,
            RawFormat::F32,
        );
        assert!(matches!(
            result,
            Err(VolrendError::SizeMismatch {
                expected: 32,
                actual: 7
            })
        ));
    }

    #[test]
    fn test_raw_file_round_trip() {
        let path = std::env::temp_dir().join("volrend_core_raw_file_test.raw");
        std::fs::write(&path, [10u8; 27]).unwrap();
        let volume =
            StructuredVolume::from_raw_file(&path, UVec3::splat(3), Vec3::ONE, RawFormat::U8)
                .unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(volume.name(), "volrend_core_raw_file_test");
        assert_eq!(volume.samples().len(), 27);
    }

    #[test]
    fn test_index_is_x_fastest() {
        let volume = StructuredVolume::from_fn("v", UVec3::new(3, 4, 5), Vec3::ONE, |_| 0.0)
            .unwrap();
        assert_eq!(volume.index(1, 0, 0), 1);
        assert_eq!(volume.index(0, 1, 0), 3);
        assert_eq!(volume.index(0, 0, 1), 12);
    }

    #[test]
    fn test_sphere_center_and_corner() {
        let volume = StructuredVolume::sphere(33).unwrap();
        assert!((volume.value(16, 16, 16) - 1.0).abs() < 1e-6);
        assert_eq!(volume.value(0, 0, 0), 0.0);
    }

    #[test]
    fn test_marschner_lobb_range() {
        let volume = StructuredVolume::marschner_lobb(16).unwrap();
        let (lo, hi) = volume.value_range();
        assert!(lo >= -1e-5);
        assert!(hi <= 1.0 + 1e-5);
    }
}
