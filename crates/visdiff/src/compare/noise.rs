//! Speckle suppression by a single 3x3 morphological opening.
//!
//! Erosion and dilation only look at neighbours inside the image. A pixel on
//! the border is therefore judged by its in-bounds neighbourhood, which is
//! the same as replicating the border, so changed regions touching an edge
//! survive the opening intact.

use image::GrayImage;

use super::grid::Mask;

/// Half-width of the square structuring element (3x3).
const RADIUS: u32 = 1;

/// Erode then dilate. Removes changed features narrower than the kernel
/// while keeping regions of at least 3x3 pixels.
pub fn open(mask: Mask) -> Mask {
    let eroded = extremum(mask.as_image(), u8::min);
    Mask::from_binary(extremum(&eroded, u8::max))
}

/// Square-window min or max, done as a row pass followed by a column pass.
fn extremum(src: &GrayImage, pick: fn(u8, u8) -> u8) -> GrayImage {
    let rows = sweep(src, pick, Axis::Horizontal);
    sweep(&rows, pick, Axis::Vertical)
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

fn sweep(src: &GrayImage, pick: fn(u8, u8) -> u8, axis: Axis) -> GrayImage {
    let (w, h) = src.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        let (pos, len) = match axis {
            Axis::Horizontal => (x, w),
            Axis::Vertical => (y, h),
        };
        let lo = pos.saturating_sub(RADIUS);
        let hi = (pos + RADIUS).min(len - 1);
        let v = (lo..=hi)
            .map(|i| match axis {
                Axis::Horizontal => src.get_pixel(i, y).0[0],
                Axis::Vertical => src.get_pixel(x, i).0[0],
            })
            .fold(src.get_pixel(x, y).0[0], pick);
        image::Luma([v])
    })
}
