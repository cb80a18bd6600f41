use image::{GrayImage, Luma};

use super::grid::{CHANGED, IntensityMap, Mask, UNCHANGED};
use super::params::SensitivityThreshold;

/// Binarize an intensity map: a pixel is changed when its intensity is
/// strictly greater than the threshold.
pub fn binarize(intensity: &IntensityMap, threshold: SensitivityThreshold) -> Mask {
    let t = threshold.value();
    Mask::from_binary(GrayImage::from_fn(
        intensity.width(),
        intensity.height(),
        |x, y| {
            let v = intensity.get_pixel(x, y).0[0];
            Luma([if v > t { CHANGED } else { UNCHANGED }])
        },
    ))
}
