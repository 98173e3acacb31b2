#![deny(unsafe_code)]
//! CPU-side drawing surface for headless runs.
//!
//! [`Raster`] implements [`Surface`] over a premultiplied RGBA `f32` buffer
//! with anti-aliased discs and lines. The CLI renders into it and writes
//! PNG snapshots through [`snapshot::write_png`].

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use glam::DVec2;
use plexus_core::{check_surface_size, BackdropError, Srgb, Surface};
use tracing::warn;

/// Premultiplied RGBA pixel.
pub type Rgba = [f32; 4];

const TRANSPARENT: Rgba = [0.0; 4];

/// Premultiplied RGBA buffer, row-major, origin top left.
///
/// Pixel `(x, y)` covers `[x, x+1) x [y, y+1)`; coverage is measured at the
/// pixel centre.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<Rgba>,
}

impl Raster {
    /// A transparent raster. Zero sides are allowed (nothing is drawn).
    ///
    /// Returns `BackdropError::InvalidDimensions` if the buffer size overflows.
    pub fn new(width: u32, height: u32) -> Result<Self, BackdropError> {
        let len = pixel_count(width, height).ok_or(BackdropError::InvalidDimensions)?;
        Ok(Self {
            width,
            height,
            data: vec![TRANSPARENT; len],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[Rgba] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(self.index(x, y)).copied()
    }

    /// Flattens over an opaque background; see [`pixel::to_rgba8`].
    pub fn to_rgba8(&self, background: Srgb) -> Vec<u8> {
        pixel::to_rgba8(self, background)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Source-over of `color` at `coverage` onto pixel `(x, y)`.
    fn blend(&mut self, x: u32, y: u32, color: Srgb, coverage: f64) {
        let a = coverage.clamp(0.0, 1.0) as f32;
        if a <= 0.0 {
            return;
        }
        let i = self.index(x, y);
        let src = [color.r as f32 * a, color.g as f32 * a, color.b as f32 * a, a];
        let dst = &mut self.data[i];
        for (d, s) in dst.iter_mut().zip(src) {
            *d = s + *d * (1.0 - a);
        }
    }

    /// Pixel columns/rows touched by `[lo, hi]`, clipped to `[0, limit)`.
    fn span(lo: f64, hi: f64, limit: u32) -> Option<(u32, u32)> {
        if !(lo.is_finite() && hi.is_finite()) || limit == 0 {
            return None;
        }
        let first = lo.floor().max(0.0);
        let last = hi.floor().min(limit as f64 - 1.0);
        (first <= last).then(|| (first as u32, last as u32))
    }

    /// Visits every pixel centre in the clipped box, handing it to `coverage`.
    fn cover(
        &mut self,
        min: DVec2,
        max: DVec2,
        color: Srgb,
        coverage: impl Fn(DVec2) -> f64,
    ) {
        let Some((x0, x1)) = Self::span(min.x, max.x, self.width) else {
            return;
        };
        let Some((y0, y1)) = Self::span(min.y, max.y, self.height) else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let centre = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                self.blend(x, y, color, coverage(centre));
            }
        }
    }
}

fn pixel_count(width: u32, height: u32) -> Option<usize> {
    check_surface_size(width, height).ok()?;
    (width as usize)
        .checked_mul(height as usize)
        .filter(|n| n.checked_mul(std::mem::size_of::<Rgba>()).is_some())
}

/// Distance from `p` to the segment `a`-`b`.
pub fn segment_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

impl Surface for Raster {
    fn resize(&mut self, width: u32, height: u32) {
        match pixel_count(width, height) {
            Some(len) => {
                self.width = width;
                self.height = height;
                self.data.clear();
                self.data.resize(len, TRANSPARENT);
            }
            None => {
                warn!(width, height, "raster size out of range, keeping an empty buffer");
                self.width = 0;
                self.height = 0;
                self.data.clear();
            }
        }
    }

    fn clear(&mut self) {
        self.data.fill(TRANSPARENT);
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Srgb) {
        if !(radius > 0.0) {
            return;
        }
        let reach = DVec2::splat(radius + 1.0);
        self.cover(center - reach, center + reach, color, |p| {
            (radius + 0.5 - p.distance(center)).clamp(0.0, 1.0)
        });
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, color: Srgb, alpha: f64, width: f64) {
        if !(alpha > 0.0 && width > 0.0) {
            return;
        }
        let half = width / 2.0;
        let reach = DVec2::splat(half + 1.0);
        self.cover(from.min(to) - reach, from.max(to) + reach, color, |p| {
            (half + 0.5 - segment_distance(p, from, to)).clamp(0.0, 1.0) * alpha
        });
    }
}
