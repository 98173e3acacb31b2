//! The single owned context shared by the frame loop and the resize path.

use serde_json::Value;

use crate::config::BackdropConfig;
use crate::controller::SurfaceController;
use crate::error::BackdropError;
use crate::field::{ParticleField, SpawnParams};
use crate::linker::ProximityLinker;
use crate::particle::Particle;
use crate::surface::{Surface, SurfaceDimensions};

/// Dimensions, particles and link settings for one drawing surface.
///
/// Nothing is seeded until the host reports its first size through
/// [`Backdrop::resize`].
#[derive(Debug, Clone)]
pub struct Backdrop {
    config: BackdropConfig,
    controller: SurfaceController,
    field: ParticleField,
    linker: ProximityLinker,
}

impl Backdrop {
    pub fn new(config: BackdropConfig, seed: u64) -> Self {
        Self {
            controller: SurfaceController::new(),
            field: ParticleField::new(SpawnParams::from(&config), seed),
            linker: ProximityLinker::from(&config),
            config,
        }
    }

    /// Builds from a JSON params object (see [`BackdropConfig::from_json`]).
    pub fn from_json(params: &Value, seed: u64) -> Result<Self, BackdropError> {
        Ok(Self::new(BackdropConfig::from_json(params)?, seed))
    }

    /// Viewport changed (or first became known): resize the surface and reseed.
    pub fn resize<S: Surface + ?Sized>(&mut self, surface: &mut S, width: u32, height: u32) {
        self.controller
            .resize(surface, &mut self.field, width, height);
    }

    pub fn dimensions(&self) -> SurfaceDimensions {
        self.controller.dimensions()
    }

    pub fn config(&self) -> &BackdropConfig {
        &self.config
    }

    pub fn controller(&self) -> &SurfaceController {
        &self.controller
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut ParticleField {
        &mut self.field
    }

    pub fn linker(&self) -> &ProximityLinker {
        &self.linker
    }

    pub fn particles(&self) -> &[Particle] {
        self.field.particles()
    }
}
