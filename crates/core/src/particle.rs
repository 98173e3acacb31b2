//! A single drifting point.

use glam::DVec2;

use crate::color::Srgb;
use crate::surface::{Surface, SurfaceDimensions};

/// A point with constant speed that bounces off the surface edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: DVec2,
    pub velocity: DVec2,
    pub radius: f64,
    pub color: Srgb,
    /// Seed generation that created this particle.
    pub generation: u64,
}

impl Particle {
    pub fn new(position: DVec2, velocity: DVec2, radius: f64, color: Srgb, generation: u64) -> Self {
        Self {
            position,
            velocity,
            radius,
            color,
            generation,
        }
    }

    /// Flips each velocity component whose coordinate lies outside `[0, dim]`.
    ///
    /// The position is not clamped: a particle may sit just past an edge for
    /// one frame and walks back in on the next step.
    pub fn reflect(&mut self, dims: SurfaceDimensions) {
        if self.position.x > dims.width || self.position.x < 0.0 {
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y > dims.height || self.position.y < 0.0 {
            self.velocity.y = -self.velocity.y;
        }
    }

    /// Reflects, moves by one tick of velocity, then draws.
    pub fn update<S: Surface + ?Sized>(&mut self, dims: SurfaceDimensions, surface: &mut S) {
        self.reflect(dims);
        self.position += self.velocity;
        self.draw(surface);
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.fill_circle(self.position, self.radius, self.color);
    }
}
