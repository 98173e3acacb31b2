//! PNG snapshots of a [`Raster`].
//!
//! Feature-gated behind `png` (default on) so builds that only need the
//! in-memory surface skip the `image` crate.

use plexus_core::{BackdropError, Srgb};
use std::path::Path;

use crate::pixel::to_rgba8;
use crate::Raster;

/// Writes the raster flattened over `background` as a PNG image.
///
/// Returns `BackdropError::InvalidDimensions` for an empty raster, or
/// `BackdropError::Io` on write failure.
pub fn write_png(raster: &Raster, background: Srgb, path: &Path) -> Result<(), BackdropError> {
    if raster.width() == 0 || raster.height() == 0 {
        return Err(BackdropError::InvalidDimensions);
    }
    let rgba = to_rgba8(raster, background);
    let img = image::RgbaImage::from_raw(raster.width(), raster.height(), rgba)
        .ok_or_else(|| BackdropError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path)
        .map_err(|e| BackdropError::Io(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use plexus_core::Surface;

    #[test]
    fn write_png_round_trip() {
        let mut raster = Raster::new(16, 12).unwrap();
        raster.fill_circle(DVec2::new(8.0, 6.0), 3.0, Srgb::from_rgb8(59, 130, 246));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");

        write_png(&raster, Srgb::from_rgb8(5, 5, 7), &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 16);
        assert_eq!(img.height(), 12);
        assert_eq!(img.get_pixel(0, 0).0, [5, 5, 7, 255]);
        assert_eq!(img.get_pixel(8, 6).0, [59, 130, 246, 255]);
    }

    #[test]
    fn empty_raster_is_rejected() {
        let raster = Raster::new(0, 10).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let result = write_png(&raster, Srgb::from_rgb8(0, 0, 0), &dir.path().join("x.png"));
        assert!(matches!(result, Err(BackdropError::InvalidDimensions)));
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let raster = Raster::new(2, 2).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("x.png");
        let result = write_png(&raster, Srgb::from_rgb8(0, 0, 0), &path);
        assert!(matches!(result, Err(BackdropError::Io(_))));
    }
}
