use image::{Rgb, RgbImage};
use tracing::debug;

use super::grid::ColorGrid;
use crate::error::CompareError;

/// Resample `candidate` onto `reference`'s width and height.
///
/// Returns `candidate` untouched when the dimensions already match.
/// Otherwise every output pixel is the area-weighted mean of the source
/// pixels its footprint covers, which avoids aliasing on downscaled
/// screenshots.
pub fn align(reference: &ColorGrid, candidate: ColorGrid) -> Result<ColorGrid, CompareError> {
    let target = reference.dimensions();
    let source = candidate.dimensions();
    if source == target {
        return Ok(candidate);
    }

    debug!(
        from_w = source.0,
        from_h = source.1,
        to_w = target.0,
        to_h = target.1,
        "resampling after image"
    );
    let resized = resize_area(candidate.as_image(), target.0, target.1);
    let aligned = ColorGrid::new(resized)?;

    if aligned.dimensions() != target {
        return Err(CompareError::dimension_mismatch(target, aligned.dimensions()));
    }
    Ok(aligned)
}

/// Per destination index, the source indices it overlaps and the fraction
/// of the destination footprint each one covers. Weights sum to 1.
fn axis_weights(src: u32, dst: u32) -> Vec<Vec<(u32, f64)>> {
    let scale = src as f64 / dst as f64;
    (0..dst)
        .map(|d| {
            let start = d as f64 * scale;
            let end = (d + 1) as f64 * scale;
            let first = start.floor() as u32;
            let last = (end.ceil() as u32).min(src);
            (first..last)
                .filter_map(|s| {
                    let overlap = end.min((s + 1) as f64) - start.max(s as f64);
                    (overlap > 0.0).then_some((s, overlap / scale))
                })
                .collect()
        })
        .collect()
}

fn resize_area(src: &RgbImage, width: u32, height: u32) -> RgbImage {
    let xs = axis_weights(src.width(), width);
    let ys = axis_weights(src.height(), height);

    RgbImage::from_fn(width, height, |x, y| {
        let mut acc = [0.0f64; 3];
        for &(sy, wy) in &ys[y as usize] {
            for &(sx, wx) in &xs[x as usize] {
                let p = src.get_pixel(sx, sy);
                let w = wy * wx;
                for (a, &c) in acc.iter_mut().zip(p.0.iter()) {
                    *a += w * c as f64;
                }
            }
        }
        Rgb(acc.map(|a| a.round().clamp(0.0, 255.0) as u8))
    })
}
