//! Surface dimensions and the resize lifecycle.

use tracing::debug;

use crate::field::ParticleField;
use crate::surface::{Surface, SurfaceDimensions};

/// Sole writer of the surface dimensions.
///
/// A resize reallocates the surface (which clears it) and reseeds the whole
/// field at the new density; no particle survives a resize.
#[derive(Debug, Clone, Default)]
pub struct SurfaceController {
    dimensions: SurfaceDimensions,
    resizes: u64,
}

impl SurfaceController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimensions(&self) -> SurfaceDimensions {
        self.dimensions
    }

    /// Resize events handled so far, initialization included.
    pub fn resizes(&self) -> u64 {
        self.resizes
    }

    pub fn resize<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        field: &mut ParticleField,
        width: u32,
        height: u32,
    ) {
        self.dimensions = SurfaceDimensions::from((width, height));
        self.resizes += 1;
        surface.resize(width, height);
        field.seed(self.dimensions);
        debug!(width, height, particles = field.len(), "surface resized");
    }
}
