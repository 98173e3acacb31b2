//! The render target abstraction and its dimensions.
//!
//! Everything the backdrop draws goes through [`Surface`]: particles and
//! links never reach for a global canvas. The surface is only written,
//! never read back, by the simulation.

use glam::DVec2;

use crate::color::Srgb;
use crate::error::BackdropError;

/// Largest accepted width or height, in pixels. Matches the common browser
/// canvas limit and bounds a premultiplied `f32` raster at 4 GiB.
pub const MAX_SURFACE_SIDE: u32 = 16_384;

/// Rejects a surface size with either side above [`MAX_SURFACE_SIDE`].
///
/// Zero sides pass: an empty surface is valid and holds no particles.
pub fn check_surface_size(width: u32, height: u32) -> Result<(), BackdropError> {
    if width > MAX_SURFACE_SIDE || height > MAX_SURFACE_SIDE {
        return Err(BackdropError::InvalidDimensions);
    }
    Ok(())
}

/// Pixel dimensions of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceDimensions {
    pub width: f64,
    pub height: f64,
}

impl SurfaceDimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// `width * height`, or 0 when either side is non-positive or not finite.
    pub fn area(&self) -> f64 {
        let area = self.width * self.height;
        if self.width > 0.0 && self.height > 0.0 && area.is_finite() {
            area
        } else {
            0.0
        }
    }

    /// Pixel buffer size, rounding each side to the nearest whole pixel.
    pub fn to_pixels(&self) -> (u32, u32) {
        let px = |v: f64| {
            if v.is_finite() && v > 0.0 {
                v.round().min(u32::MAX as f64) as u32
            } else {
                0
            }
        };
        (px(self.width), px(self.height))
    }
}

impl From<(u32, u32)> for SurfaceDimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as f64, height as f64)
    }
}

/// 2D drawing primitives the backdrop needs from a host.
pub trait Surface {
    /// Reallocates the pixel buffer. Contents are discarded.
    fn resize(&mut self, width: u32, height: u32);

    /// Clears the whole surface to transparent.
    fn clear(&mut self);

    /// Fills an opaque disc.
    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Srgb);

    /// Strokes a straight segment. `alpha` is already clamped to [0, 1].
    fn stroke_line(&mut self, from: DVec2, to: DVec2, color: Srgb, alpha: f64, width: f64);
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn resize(&mut self, width: u32, height: u32) {
        (**self).resize(width, height);
    }

    fn clear(&mut self) {
        (**self).clear();
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Srgb) {
        (**self).fill_circle(center, radius, color);
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, color: Srgb, alpha: f64, width: f64) {
        (**self).stroke_line(from, to, color, alpha, width);
    }
}

/// A single recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Circle {
        center: DVec2,
        radius: f64,
        color: Srgb,
    },
    Line {
        from: DVec2,
        to: DVec2,
        color: Srgb,
        alpha: f64,
        width: f64,
    },
}

/// A surface that records commands instead of rasterizing them.
///
/// Like a real surface, `clear` wipes what was drawn, so the log always
/// holds the commands of the current frame only.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
    clears: u64,
    resizes: u64,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Commands issued since the last clear or resize.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn circle_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count()
    }

    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count()
    }

    /// Number of times the surface was cleared (one per rendered frame).
    pub fn clears(&self) -> u64 {
        self.clears
    }

    pub fn resizes(&self) -> u64 {
        self.resizes
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.commands.clear();
        self.resizes += 1;
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.clears += 1;
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Srgb) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, color: Srgb, alpha: f64, width: f64) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            alpha,
            width,
        });
    }
}
