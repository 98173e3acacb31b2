//! The particle population: sizing, seeding and per-frame advance.
//!
//! The population is never adjusted incrementally. Every [`ParticleField::seed`]
//! throws the old particles away and builds `floor(area / density_divisor)`
//! new ones for the given dimensions.

use glam::DVec2;
use tracing::debug;

use crate::color::Srgb;
use crate::config::BackdropConfig;
use crate::particle::Particle;
use crate::prng::Xorshift64;
use crate::surface::{Surface, SurfaceDimensions};

/// Spawn ranges for new particles.
///
/// Split from [`BackdropConfig`] so the field does not carry rendering knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnParams {
    pub density_divisor: f64,
    pub min_radius: f64,
    pub max_radius: f64,
    pub max_speed: f64,
    pub colors: Vec<Srgb>,
}

impl From<&BackdropConfig> for SpawnParams {
    fn from(config: &BackdropConfig) -> Self {
        Self {
            density_divisor: config.density_divisor,
            min_radius: config.min_radius,
            max_radius: config.max_radius,
            max_speed: config.max_speed,
            colors: config.particle_colors.clone(),
        }
    }
}

impl Default for SpawnParams {
    fn default() -> Self {
        Self::from(&BackdropConfig::default())
    }
}

/// `floor(area / density_divisor)`; 0 for a degenerate surface or divisor.
pub fn population_target(dims: SurfaceDimensions, density_divisor: f64) -> usize {
    if !(density_divisor.is_finite() && density_divisor > 0.0) {
        return 0;
    }
    let target = (dims.area() / density_divisor).floor();
    if target.is_finite() && target > 0.0 {
        target as usize
    } else {
        0
    }
}

/// Owns every particle and the random source that creates them.
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    spawn: SpawnParams,
    rng: Xorshift64,
    generation: u64,
}

impl ParticleField {
    /// An empty field. Nothing exists until the first [`ParticleField::seed`].
    pub fn new(spawn: SpawnParams, seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            spawn,
            rng: Xorshift64::new(seed),
            generation: 0,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Number of seeds performed so far; particles carry the value they were born with.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn spawn_params(&self) -> &SpawnParams {
        &self.spawn
    }

    /// Population the field would hold for `dims`.
    pub fn population_target(&self, dims: SurfaceDimensions) -> usize {
        population_target(dims, self.spawn.density_divisor)
    }

    /// Replaces the whole population with fresh particles sized for `dims`.
    pub fn seed(&mut self, dims: SurfaceDimensions) {
        let target = self.population_target(dims);
        self.generation += 1;
        let generation = self.generation;

        let mut particles = Vec::with_capacity(target);
        for _ in 0..target {
            particles.push(self.spawn_one(dims, generation));
        }
        self.particles = particles;

        debug!(
            width = dims.width,
            height = dims.height,
            population = target,
            generation,
            "reseeded particle field"
        );
    }

    /// Advances and draws every particle once.
    pub fn tick<S: Surface + ?Sized>(&mut self, dims: SurfaceDimensions, surface: &mut S) {
        for particle in &mut self.particles {
            particle.update(dims, surface);
        }
    }

    /// Mutable access for hosts and tests that place particles by hand.
    pub fn particles_mut(&mut self) -> &mut Vec<Particle> {
        &mut self.particles
    }

    fn spawn_one(&mut self, dims: SurfaceDimensions, generation: u64) -> Particle {
        let radius = self.rng.range(self.spawn.min_radius, self.spawn.max_radius);
        let x = self.spawn_coordinate(dims.width, radius);
        let y = self.spawn_coordinate(dims.height, radius);
        let velocity = DVec2::new(
            self.rng.symmetric(self.spawn.max_speed),
            self.rng.symmetric(self.spawn.max_speed),
        );
        let color = self
            .rng
            .choose(&self.spawn.colors)
            .copied()
            .unwrap_or(Srgb::from_rgb8(0x3b, 0x82, 0xf6));
        Particle::new(DVec2::new(x, y), velocity, radius, color, generation)
    }

    /// Uniform in `[2r, extent - 2r)` so the whole disc starts inside;
    /// centred when the surface is too thin for that interval.
    fn spawn_coordinate(&mut self, extent: f64, radius: f64) -> f64 {
        let margin = radius * 2.0;
        if extent - margin < margin {
            extent / 2.0
        } else {
            self.rng.range(margin, extent - margin)
        }
    }
}
