use image::{GrayImage, Luma, Rgb};

use super::grid::{ColorGrid, IntensityMap};
use crate::error::CompareError;

/// Rec.601 luma weights in thousandths (R, G, B).
const LUMA_WEIGHTS: [u32; 3] = [299, 587, 114];

/// Per-pixel difference magnitude between two equally sized grids.
///
/// Channel differences are combined with [`LUMA_WEIGHTS`] and rounded up, so
/// an identical pixel yields 0 and any channel difference yields at least 1.
pub fn intensity(before: &ColorGrid, after: &ColorGrid) -> Result<IntensityMap, CompareError> {
    if before.dimensions() != after.dimensions() {
        return Err(CompareError::dimension_mismatch(
            before.dimensions(),
            after.dimensions(),
        ));
    }

    let (a, b) = (before.as_image(), after.as_image());
    Ok(GrayImage::from_fn(a.width(), a.height(), |x, y| {
        Luma([pixel_intensity(a.get_pixel(x, y), b.get_pixel(x, y))])
    }))
}

fn pixel_intensity(a: &Rgb<u8>, b: &Rgb<u8>) -> u8 {
    let weighted: u32 = a
        .0
        .iter()
        .zip(b.0.iter())
        .zip(LUMA_WEIGHTS)
        .map(|((&ca, &cb), w)| ca.abs_diff(cb) as u32 * w)
        .sum();
    // Weights sum to 1000, so the ceiling never exceeds 255.
    weighted.div_ceil(1000) as u8
}
