//! Renderer registry.

use volrend_core::AdaptiveIsoParameters;

use crate::adaptive_iso::AdaptiveIsoRenderer;
use crate::renderer::VolumeRenderer;
use crate::single_pass_iso::SinglePassIsoRenderer;

/// The available renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RendererKind {
    #[default]
    AdaptiveIso,
    SinglePassIso,
}

impl RendererKind {
    /// Every renderer, in UI order.
    pub const ALL: [RendererKind; 2] = [RendererKind::AdaptiveIso, RendererKind::SinglePassIso];

    /// Instantiates an uninitialized renderer.
    #[must_use]
    pub fn create(self) -> Box<dyn VolumeRenderer> {
        match self {
            RendererKind::AdaptiveIso => Box::new(AdaptiveIsoRenderer::new()),
            RendererKind::SinglePassIso => Box::new(SinglePassIsoRenderer::new()),
        }
    }

    /// Instantiates an uninitialized renderer with preset parameters.
    #[must_use]
    pub fn create_with_parameters(self, params: &AdaptiveIsoParameters) -> Box<dyn VolumeRenderer> {
        match self {
            RendererKind::AdaptiveIso => {
                Box::new(AdaptiveIsoRenderer::with_parameters(params.clone()))
            }
            RendererKind::SinglePassIso => {
                Box::new(SinglePassIsoRenderer::with_parameters(params.clone()))
            }
        }
    }

    #[must_use]
    pub fn abbreviation(self) -> &'static str {
        match self {
            RendererKind::AdaptiveIso => "Adaptive",
            RendererKind::SinglePassIso => "1PassIso",
        }
    }

    /// Case-insensitive lookup by abbreviation.
    #[must_use]
    pub fn from_abbreviation(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.abbreviation().eq_ignore_ascii_case(name))
    }

    /// Position in [`RendererKind::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|k| *k == self).unwrap_or(0)
    }
}
