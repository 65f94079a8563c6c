//! Field data provider shared by all renderers.

use crate::error::{Result, VolrendError};
use crate::gradient::GradientField;
use crate::volume::StructuredVolume;

/// Owns the active scalar field and its optional precomputed gradient.
///
/// Renderers receive it by reference; nothing in volrend-rs keeps it in a
/// global.
#[derive(Debug, Default)]
pub struct DataManager {
    volume: Option<StructuredVolume>,
    gradient: Option<GradientField>,
    generation: u64,
}

impl DataManager {
    /// Creates an empty data manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current volume. Any previous gradient is discarded.
    pub fn set_volume(&mut self, volume: StructuredVolume) {
        log::info!(
            "data manager: volume '{}' ({}x{}x{})",
            volume.name(),
            volume.width(),
            volume.height(),
            volume.depth()
        );
        self.volume = Some(volume);
        self.gradient = None;
        self.generation += 1;
    }

    /// Removes the current volume and gradient.
    pub fn clear(&mut self) {
        self.volume = None;
        self.gradient = None;
        self.generation += 1;
    }

    /// Returns the current volume, if any.
    pub fn current_volume(&self) -> Option<&StructuredVolume> {
        self.volume.as_ref()
    }

    /// Returns the current gradient field, if one was generated.
    pub fn current_gradient(&self) -> Option<&GradientField> {
        self.gradient.as_ref()
    }

    /// Computes (or recomputes) the gradient of the current volume.
    pub fn generate_gradient(&mut self) -> Result<&GradientField> {
        let volume = self.volume.as_ref().ok_or(VolrendError::NoVolumeData)?;
        let gradient = GradientField::from_volume(volume);
        log::debug!(
            "data manager: gradient generated, max magnitude {:.3}",
            gradient.max_magnitude()
        );
        self.generation += 1;
        Ok(self.gradient.insert(gradient))
    }

    /// Monotonic counter bumped on every data change. GPU mirrors compare it
    /// to decide whether to re-upload.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_manager() {
        let mut dm = DataManager::new();
        assert!(dm.current_volume().is_none());
        assert!(matches!(
            dm.generate_gradient(),
            Err(VolrendError::NoVolumeData)
        ));
    }

    #[test]
    fn test_set_volume_drops_gradient() {
        let mut dm = DataManager::new();
        dm.set_volume(StructuredVolume::sphere(8).unwrap());
        dm.generate_gradient().unwrap();
        assert!(dm.current_gradient().is_some());

        dm.set_volume(StructuredVolume::sphere(4).unwrap());
        assert!(dm.current_gradient().is_none());
        assert_eq!(dm.current_volume().unwrap().width(), 4);
    }

    #[test]
    fn test_generation_increments() {
        let mut dm = DataManager::new();
        let g0 = dm.generation();
        dm.set_volume(StructuredVolume::sphere(4).unwrap());
        let g1 = dm.generation();
        dm.generate_gradient().unwrap();
        let g2 = dm.generation();
        dm.clear();
        assert!(g0 < g1 && g1 < g2 && g2 < dm.generation());
    }
}
