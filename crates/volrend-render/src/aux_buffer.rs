//! Auxiliary image holding the sparse first-pass samples.

use crate::storage_image::StorageImage;

/// Whether an auxiliary image of size `current` must be reallocated to
/// serve a `width x height` viewport.
#[must_use]
pub fn needs_reallocation(current: Option<(u32, u32)>, width: u32, height: u32) -> bool {
    current != Some((width.max(1), height.max(1)))
}

/// The auxiliary image written by the sparse pass and read by the
/// interpolation pass.
pub struct AuxiliaryBuffer {
    image: StorageImage,
}

impl AuxiliaryBuffer {
    /// Allocates a `width x height` auxiliary image.
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        log::debug!("Allocating auxiliary image {width}x{height}");
        Self {
            image: StorageImage::new(device, "auxiliary image", width, height),
        }
    }

    /// Makes `slot` hold an image of exactly `width x height`, reallocating
    /// only when the size changed. Returns whether a new image was created.
    pub fn ensure_size(
        slot: &mut Option<AuxiliaryBuffer>,
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> bool {
        let current = slot.as_ref().map(|aux| aux.image.dimensions());
        if !needs_reallocation(current, width, height) {
            return false;
        }
        *slot = Some(Self::new(device, width, height));
        true
    }

    #[must_use]
    pub fn image(&self) -> &StorageImage {
        &self.image
    }

    #[must_use]
    pub fn view(&self) -> &wgpu::TextureView {
        self.image.view()
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Records a clear to transparent black.
    pub fn clear(&self, encoder: &mut wgpu::CommandEncoder) {
        self.image.clear(encoder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_allocation() {
        assert!(needs_reallocation(None, 640, 480));
    }

    #[test]
    fn test_same_size_keeps_image() {
        assert!(!needs_reallocation(Some((640, 480)), 640, 480));
        assert!(needs_reallocation(Some((640, 480)), 641, 480));
        assert!(needs_reallocation(Some((640, 480)), 640, 479));
    }

    #[test]
    fn test_zero_size_maps_to_one() {
        assert!(!needs_reallocation(Some((1, 1)), 0, 0));
    }

    proptest! {
        #[test]
        fn prop_reshape_is_idempotent(w in 0u32..4096, h in 0u32..4096) {
            // after one reallocation the image has the requested size, and
            // asking again for the same size must not reallocate
            let allocated = (w.max(1), h.max(1));
            prop_assert!(!needs_reallocation(Some(allocated), w, h));
        }
    }
}
