use image::{Rgb, RgbImage};

use super::grid::{ColorGrid, Mask};
use crate::error::CompareError;

/// Colour blended over changed pixels.
pub const HIGHLIGHT: Rgb<u8> = Rgb([255, 0, 0]);

/// Highlight share of a blended pixel, in percent. The original colour keeps
/// the remaining `100 - HIGHLIGHT_PERCENT`.
pub const HIGHLIGHT_PERCENT: u32 = 30;

/// Tint changed pixels of `after` with [`HIGHLIGHT`]; unchanged pixels are
/// copied verbatim.
pub fn render_overlay(after: &ColorGrid, mask: &Mask) -> Result<ColorGrid, CompareError> {
    if after.dimensions() != mask.dimensions() {
        return Err(CompareError::dimension_mismatch(
            after.dimensions(),
            mask.dimensions(),
        ));
    }

    let src = after.as_image();
    let image = RgbImage::from_fn(src.width(), src.height(), |x, y| {
        let p = *src.get_pixel(x, y);
        if mask.is_changed(x, y) { blend(p) } else { p }
    });
    ColorGrid::new(image)
}

fn blend(p: Rgb<u8>) -> Rgb<u8> {
    let keep = 100 - HIGHLIGHT_PERCENT;
    Rgb(std::array::from_fn(|i| {
        ((p.0[i] as u32 * keep + HIGHLIGHT.0[i] as u32 * HIGHLIGHT_PERCENT + 50) / 100) as u8
    }))
}
