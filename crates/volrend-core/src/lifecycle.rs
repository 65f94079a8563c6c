//! Renderer lifecycle state.

/// Lifecycle of a volume renderer.
///
/// `Uninitialized -> Outdated <-> UpToDate -> Uninitialized`. A renderer is
/// "built" in both `Outdated` and `UpToDate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RendererState {
    /// No GPU resources exist.
    #[default]
    Uninitialized,
    /// Built, and a fresh frame must be produced.
    Outdated,
    /// Built, and the last frame reflects the current parameters.
    UpToDate,
}

impl RendererState {
    /// Whether GPU resources have been built.
    pub fn is_built(self) -> bool {
        !matches!(self, RendererState::Uninitialized)
    }

    /// Whether the surrounding framework must produce a new frame.
    pub fn is_outdated(self) -> bool {
        matches!(self, RendererState::Outdated)
    }

    /// Transition after a successful build.
    pub fn mark_built(&mut self) {
        *self = RendererState::Outdated;
    }

    /// Flags that a new frame is needed. No-op while uninitialized.
    pub fn set_outdated(&mut self) {
        if self.is_built() {
            *self = RendererState::Outdated;
        }
    }

    /// Transition after a frame was presented. No-op while uninitialized.
    pub fn mark_up_to_date(&mut self) {
        if self.is_built() {
            *self = RendererState::UpToDate;
        }
    }

    /// Transition after resources were released.
    pub fn reset(&mut self) {
        *self = RendererState::Uninitialized;
    }
}

/// Grid layouts a renderer can consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridDataType {
    /// Regular grid with per-axis voxel size.
    Structured,
    /// Tetrahedral or other cell-based meshes.
    Unstructured,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_transitions() {
        let mut state = RendererState::default();
        assert!(!state.is_built());

        state.set_outdated();
        assert_eq!(state, RendererState::Uninitialized);

        state.mark_built();
        assert!(state.is_built());
        assert!(state.is_outdated());

        state.mark_up_to_date();
        assert!(!state.is_outdated());
        state.set_outdated();
        assert!(state.is_outdated());

        state.reset();
        assert_eq!(state, RendererState::Uninitialized);
        state.mark_up_to_date();
        assert_eq!(state, RendererState::Uninitialized);
    }
}
