//! Proximity lines between nearby particles.
//!
//! Distances stay squared throughout. The threshold `(w/7) * (h/7)` and the
//! opacity falloff `1 - d2/20000` are both expressed on the squared scale,
//! so no square root is taken per pair.

use crate::color::Srgb;
use crate::config::BackdropConfig;
use crate::particle::Particle;
use crate::surface::{Surface, SurfaceDimensions};
use glam::DVec2;

/// Squared Euclidean distance between two points.
pub fn squared_distance(a: DVec2, b: DVec2) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Squared distance below which two particles link: `(w/divisor) * (h/divisor)`.
pub fn link_threshold(dims: SurfaceDimensions, link_divisor: f64) -> f64 {
    (dims.width / link_divisor) * (dims.height / link_divisor)
}

/// `1 - d2/falloff`, clamped to [0, 1].
pub fn link_opacity(squared_distance: f64, falloff: f64) -> f64 {
    (1.0 - squared_distance / falloff).clamp(0.0, 1.0)
}

/// A connectable pair, by index into the particle slice (`a < b`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub squared_distance: f64,
    pub opacity: f64,
}

/// Draws a line for every pair of particles closer than the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityLinker {
    pub link_divisor: f64,
    pub opacity_falloff: f64,
    pub line_width: f64,
    pub color: Srgb,
}

impl Default for ProximityLinker {
    fn default() -> Self {
        Self::from(&BackdropConfig::default())
    }
}

impl From<&BackdropConfig> for ProximityLinker {
    fn from(config: &BackdropConfig) -> Self {
        Self {
            link_divisor: config.link_divisor,
            opacity_falloff: config.opacity_falloff,
            line_width: config.line_width,
            color: config.link_color,
        }
    }
}

impl ProximityLinker {
    pub fn threshold(&self, dims: SurfaceDimensions) -> f64 {
        link_threshold(dims, self.link_divisor)
    }

    /// Every unordered pair `(a, b)`, `a < b`, with squared distance strictly
    /// below the threshold. Self-pairs are never visited.
    pub fn links<'a>(
        &'a self,
        particles: &'a [Particle],
        dims: SurfaceDimensions,
    ) -> impl Iterator<Item = Link> + 'a {
        let threshold = self.threshold(dims);
        let falloff = self.opacity_falloff;
        particles.iter().enumerate().flat_map(move |(a, pa)| {
            particles[a + 1..]
                .iter()
                .enumerate()
                .filter_map(move |(offset, pb)| {
                    let d2 = squared_distance(pa.position, pb.position);
                    (d2 < threshold).then(|| Link {
                        a,
                        b: a + 1 + offset,
                        squared_distance: d2,
                        opacity: link_opacity(d2, falloff),
                    })
                })
        })
    }

    /// Strokes every link with visible opacity and returns how many were drawn.
    ///
    /// Links whose clamped opacity is 0 are connectable but skipped, since a
    /// fully transparent stroke changes nothing.
    pub fn connect<S: Surface + ?Sized>(
        &self,
        particles: &[Particle],
        dims: SurfaceDimensions,
        surface: &mut S,
    ) -> usize {
        let mut drawn = 0;
        for link in self.links(particles, dims) {
            if link.opacity <= 0.0 {
                continue;
            }
            surface.stroke_line(
                particles[link.a].position,
                particles[link.b].position,
                self.color,
                link.opacity,
                self.line_width,
            );
            drawn += 1;
        }
        drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};

    fn at(x: f64, y: f64) -> Particle {
        Particle::new(
            DVec2::new(x, y),
            DVec2::ZERO,
            1.0,
            Srgb::from_rgb8(59, 130, 246),
            1,
        )
    }

    fn dims(w: f64, h: f64) -> SurfaceDimensions {
        SurfaceDimensions::new(w, h)
    }

    #[test]
    fn squared_distance_has_no_square_root() {
        assert_eq!(squared_distance(DVec2::ZERO, DVec2::new(10.0, 10.0)), 200.0);
        assert_eq!(squared_distance(DVec2::new(3.0, 4.0), DVec2::ZERO), 25.0);
    }

    #[test]
    fn threshold_for_700_square_is_10000() {
        assert_eq!(link_threshold(dims(700.0, 700.0), 7.0), 10000.0);
    }

    #[test]
    fn opacity_endpoints_and_clamping() {
        assert_eq!(link_opacity(0.0, 20000.0), 1.0);
        assert_eq!(link_opacity(20000.0, 20000.0), 0.0);
        assert_eq!(link_opacity(35000.0, 20000.0), 0.0);
        assert!((link_opacity(200.0, 20000.0) - 0.99).abs() < 1e-12);
    }

    #[test]
    fn two_close_particles_on_700_surface_link_at_0_99() {
        let linker = ProximityLinker::default();
        let particles = [at(0.0, 0.0), at(10.0, 10.0)];
        let mut s = RecordingSurface::new(700, 700);
        let drawn = linker.connect(&particles, dims(700.0, 700.0), &mut s);
        assert_eq!(drawn, 1);
        match &s.commands()[0] {
            DrawCommand::Line {
                from,
                to,
                alpha,
                width,
                color,
            } => {
                assert_eq!(*from, DVec2::new(0.0, 0.0));
                assert_eq!(*to, DVec2::new(10.0, 10.0));
                assert!((alpha - 0.99).abs() < 1e-12);
                assert_eq!(*width, 1.0);
                assert_eq!(*color, Srgb::from_rgb8(59, 130, 246));
            }
            other => panic!("expected a line, got {other:?}"),
        }
    }

    #[test]
    fn distance_equal_to_threshold_does_not_link() {
        // 700x700 threshold is 10000; (100, 0) is exactly that far squared.
        let linker = ProximityLinker::default();
        let particles = [at(0.0, 0.0), at(100.0, 0.0)];
        assert_eq!(linker.links(&particles, dims(700.0, 700.0)).count(), 0);

        let closer = [at(0.0, 0.0), at(99.999, 0.0)];
        assert_eq!(linker.links(&closer, dims(700.0, 700.0)).count(), 1);
    }

    #[test]
    fn self_pairs_are_never_visited() {
        let linker = ProximityLinker::default();
        let particles = [at(5.0, 5.0)];
        assert_eq!(linker.links(&particles, dims(700.0, 700.0)).count(), 0);
    }

    #[test]
    fn coincident_particles_link_at_full_opacity() {
        let linker = ProximityLinker::default();
        let particles = [at(5.0, 5.0), at(5.0, 5.0)];
        let links: Vec<Link> = linker.links(&particles, dims(700.0, 700.0)).collect();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].opacity, 1.0);
    }

    #[test]
    fn connectable_but_fully_faded_links_are_not_drawn() {
        // 1400x1400 threshold is 40000, falloff reaches zero at 20000.
        let linker = ProximityLinker::default();
        let particles = [at(0.0, 0.0), at(150.0, 0.0)];
        let d = dims(1400.0, 1400.0);
        let links: Vec<Link> = linker.links(&particles, d).collect();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].opacity, 0.0);

        let mut s = RecordingSurface::new(1400, 1400);
        assert_eq!(linker.connect(&particles, d, &mut s), 0);
        assert_eq!(s.line_count(), 0);
    }

    #[test]
    fn pairs_are_reported_once_in_index_order() {
        let linker = ProximityLinker::default();
        let particles = [at(0.0, 0.0), at(1.0, 0.0), at(2.0, 0.0)];
        let pairs: Vec<(usize, usize)> = linker
            .links(&particles, dims(700.0, 700.0))
            .map(|l| (l.a, l.b))
            .collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn empty_surface_threshold_links_nothing() {
        let linker = ProximityLinker::default();
        let particles = [at(0.0, 0.0), at(0.0, 0.0)];
        assert_eq!(linker.links(&particles, dims(0.0, 0.0)).count(), 0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn point() -> impl Strategy<Value = (f64, f64)> {
            (0.0_f64..500.0, 0.0_f64..500.0)
        }

        proptest! {
            #[test]
            fn links_match_brute_force_definition(
                points in proptest::collection::vec(point(), 0..30),
                w in 1.0_f64..1000.0,
                h in 1.0_f64..1000.0,
            ) {
                let linker = ProximityLinker::default();
                let particles: Vec<Particle> = points.iter().map(|&(x, y)| at(x, y)).collect();
                let d = dims(w, h);
                let threshold = (w / 7.0) * (h / 7.0);

                let mut expected = Vec::new();
                for a in 0..particles.len() {
                    for b in (a + 1)..particles.len() {
                        let d2 = squared_distance(particles[a].position, particles[b].position);
                        if d2 < threshold {
                            expected.push((a, b));
                        }
                    }
                }
                let actual: Vec<(usize, usize)> = linker.links(&particles, d).map(|l| (l.a, l.b)).collect();
                prop_assert_eq!(actual, expected);
            }

            #[test]
            fn opacity_always_in_unit_interval(d2 in 0.0_f64..1e6) {
                let o = link_opacity(d2, 20000.0);
                prop_assert!((0.0..=1.0).contains(&o));
            }
        }
    }
}
