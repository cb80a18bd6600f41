use std::io::Cursor;

use image::{GrayImage, ImageFormat, Luma, RgbImage};

use crate::error::CompareError;

/// Mask value for a changed pixel.
pub const CHANGED: u8 = 255;
/// Mask value for an unchanged pixel.
pub const UNCHANGED: u8 = 0;

/// Single-channel per-pixel difference magnitude, `0..=255`.
pub type IntensityMap = GrayImage;

/// Three-channel, 8-bit RGB grid with positive width and height.
///
/// Alpha is never carried: decoders flatten to RGB before constructing one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorGrid(RgbImage);

impl ColorGrid {
    pub fn new(image: RgbImage) -> Result<Self, CompareError> {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return Err(CompareError::InvalidImage(format!("zero-sized image: {w}x{h}")));
        }
        Ok(Self(image))
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.0
    }

    pub fn into_image(self) -> RgbImage {
        self.0
    }

    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut buf = Vec::new();
        self.0.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        Ok(buf)
    }
}

/// Binary change mask. Every value is either [`CHANGED`] or [`UNCHANGED`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask(GrayImage);

impl Mask {
    /// Build a mask from a predicate; `true` marks a pixel as changed.
    pub fn from_fn(width: u32, height: u32, mut changed: impl FnMut(u32, u32) -> bool) -> Self {
        Self(GrayImage::from_fn(width, height, |x, y| {
            Luma([if changed(x, y) { CHANGED } else { UNCHANGED }])
        }))
    }

    /// Caller guarantees every value is `CHANGED` or `UNCHANGED`.
    pub(crate) fn from_binary(image: GrayImage) -> Self {
        debug_assert!(image.pixels().all(|p| p.0[0] == CHANGED || p.0[0] == UNCHANGED));
        Self(image)
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    pub fn is_changed(&self, x: u32, y: u32) -> bool {
        self.0.get_pixel(x, y).0[0] == CHANGED
    }

    pub fn changed_pixels(&self) -> u64 {
        self.0.pixels().filter(|p| p.0[0] == CHANGED).count() as u64
    }

    pub fn total_pixels(&self) -> u64 {
        self.0.width() as u64 * self.0.height() as u64
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.0
    }

    pub fn into_image(self) -> GrayImage {
        self.0
    }

    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut buf = Vec::new();
        self.0.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use image::Rgb;

    #[test]
    fn zero_width_grid_rejected() {
        let err = ColorGrid::new(RgbImage::new(0, 10)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidImage);
    }

    #[test]
    fn zero_height_grid_rejected() {
        let err = ColorGrid::new(RgbImage::new(10, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidImage);
    }

    #[test]
    fn mask_from_fn_is_binary() {
        let mask = Mask::from_fn(4, 3, |x, y| x == y);
        assert_eq!(mask.changed_pixels(), 3);
        assert_eq!(mask.total_pixels(), 12);
        assert!(mask.as_image().pixels().all(|p| p.0[0] == CHANGED || p.0[0] == UNCHANGED));
    }

    #[test]
    fn png_encoding_decodes_back() {
        let grid = ColorGrid::new(RgbImage::from_pixel(5, 7, Rgb([1, 2, 3]))).unwrap();
        let png = grid.to_png().unwrap();
        let back = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(&back, grid.as_image());
    }
}
