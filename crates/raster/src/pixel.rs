//! Flattening a premultiplied [`Raster`] into opaque RGBA8 bytes.

use plexus_core::Srgb;

use crate::Raster;

/// Composites every pixel over `background` and returns `width * height * 4`
/// bytes (R, G, B, 255).
pub fn to_rgba8(raster: &Raster, background: Srgb) -> Vec<u8> {
    let bg = [background.r as f32, background.g as f32, background.b as f32];
    raster
        .data()
        .iter()
        .flat_map(|&[r, g, b, a]| {
            let q = |src: f32, bg: f32| ((src + bg * (1.0 - a)).clamp(0.0, 1.0) * 255.0).round() as u8;
            [q(r, bg[0]), q(g, bg[1]), q(b, bg[2]), 255u8]
        })
        .collect()
}
