use image::Luma;

use super::grid::{Mask, UNCHANGED};
use super::params::IgnoreRegion;

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

/// Convert a normalized region to pixel bounds on a `width x height` image,
/// rounding each edge and clamping to the image.
pub fn pixel_rect(region: &IgnoreRegion, width: u32, height: u32) -> PixelRect {
    let px = |v: f64, extent: u32| ((v * extent as f64).round().max(0.0) as u32).min(extent);
    PixelRect {
        x0: px(region.x(), width),
        y0: px(region.y(), height),
        x1: px(region.x() + region.w(), width),
        y1: px(region.y() + region.h(), height),
    }
}

/// Clear every pixel covered by any of `regions`.
///
/// Each region only ever clears pixels, so the outcome does not depend on
/// order or repetition.
pub fn apply_ignore_regions(mask: Mask, regions: &[IgnoreRegion]) -> Mask {
    if regions.is_empty() {
        return mask;
    }

    let (w, h) = mask.dimensions();
    let mut image = mask.into_image();
    for region in regions {
        let r = pixel_rect(region, w, h);
        for y in r.y0..r.y1 {
            for x in r.x0..r.x1 {
                image.put_pixel(x, y, Luma([UNCHANGED]));
            }
        }
    }
    Mask::from_binary(image)
}
