//! Precomputed gradient fields.

use glam::{UVec3, Vec3};

use crate::volume::StructuredVolume;

/// Per-voxel gradient of a [`StructuredVolume`].
#[derive(Debug, Clone)]
pub struct GradientField {
    resolution: UVec3,
    gradients: Vec<Vec3>,
}

impl GradientField {
    /// Computes the gradient with central differences.
    ///
    /// Border voxels use one-sided differences; axes with a single voxel
    /// have a zero derivative. Derivatives are taken in physical units, so
    /// the voxel size scales each component.
    #[must_use]
    pub fn from_volume(volume: &StructuredVolume) -> Self {
        let r = volume.resolution();
        let h = volume.voxel_size();
        let mut gradients = Vec::with_capacity(volume.samples().len());

        for z in 0..r.z {
            for y in 0..r.y {
                for x in 0..r.x {
                    let gx = axis_derivative(r.x, x, h.x, |i| volume.value(i, y, z));
                    let gy = axis_derivative(r.y, y, h.y, |i| volume.value(x, i, z));
                    let gz = axis_derivative(r.z, z, h.z, |i| volume.value(x, y, i));
                    gradients.push(Vec3::new(gx, gy, gz));
                }
            }
        }

        Self {
            resolution: r,
            gradients,
        }
    }

    /// Returns the grid resolution.
    pub fn resolution(&self) -> UVec3 {
        self.resolution
    }

    /// Returns all gradients, x-fastest.
    pub fn gradients(&self) -> &[Vec3] {
        &self.gradients
    }

    /// Returns the gradient at a voxel.
    pub fn gradient(&self, x: u32, y: u32, z: u32) -> Vec3 {
        let r = self.resolution;
        self.gradients[(z as usize * r.y as usize + y as usize) * r.x as usize + x as usize]
    }

    /// Returns the largest gradient magnitude.
    pub fn max_magnitude(&self) -> f32 {
        self.gradients
            .iter()
            .map(|g| g.length())
            .fold(0.0, f32::max)
    }
}

fn axis_derivative(n: u32, i: u32, spacing: f32, sample: impl Fn(u32) -> f32) -> f32 {
    if n < 2 || spacing <= 0.0 {
        return 0.0;
    }
    if i == 0 {
        (sample(1) - sample(0)) / spacing
    } else if i == n - 1 {
        (sample(i) - sample(i - 1)) / spacing
    } else {
        (sample(i + 1) - sample(i - 1)) / (2.0 * spacing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_field_has_constant_gradient() {
        // f = 2x + 3y - z in voxel units, voxel size 1
        let volume = StructuredVolume::from_fn("ramp", UVec3::splat(5), Vec3::ONE, |p| {
            let v = p * 4.0;
            2.0 * v.x + 3.0 * v.y - v.z
        })
        .unwrap();
        let gradient = GradientField::from_volume(&volume);
        for g in gradient.gradients() {
            assert!((*g - Vec3::new(2.0, 3.0, -1.0)).length() < 1e-4);
        }
    }

    #[test]
    fn test_voxel_size_scales_gradient() {
        let volume = StructuredVolume::from_fn("ramp", UVec3::new(4, 1, 1), Vec3::splat(2.0), |p| {
            p.x * 3.0
        })
        .unwrap();
        let gradient = GradientField::from_volume(&volume);
        // one unit per voxel over a 2.0 spacing
        assert!((gradient.gradient(1, 0, 0).x - 0.5).abs() < 1e-6);
        assert_eq!(gradient.gradient(1, 0, 0).y, 0.0);
    }

    #[test]
    fn test_max_magnitude() {
        let volume =
            StructuredVolume::from_fn("flat", UVec3::splat(3), Vec3::ONE, |_| 1.0).unwrap();
        assert_eq!(GradientField::from_volume(&volume).max_magnitude(), 0.0);
    }
}
