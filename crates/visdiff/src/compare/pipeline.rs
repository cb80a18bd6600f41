use tracing::{debug, debug_span};

use super::align::align;
use super::decode::decode;
use super::diff::intensity;
use super::grid::{ColorGrid, Mask};
use super::ignore::apply_ignore_regions;
use super::noise;
use super::overlay::render_overlay;
use super::params::{IgnoreRegion, SensitivityThreshold};
use super::score::difference_percent;
use super::threshold::binarize;
use crate::error::CompareError;

/// Outcome of one comparison. Every grid has the "before" image's
/// dimensions; `after` is the aligned candidate the mask was computed on.
#[derive(Clone, Debug)]
pub struct ComparisonResult {
    difference_percent: f64,
    mask: Mask,
    overlay: ColorGrid,
    before: ColorGrid,
    after: ColorGrid,
}

/// Owned pieces of a [`ComparisonResult`].
#[derive(Clone, Debug)]
pub struct ComparisonParts {
    pub difference_percent: f64,
    pub changed_pixels: u64,
    pub mask: Mask,
    pub overlay: ColorGrid,
    pub before: ColorGrid,
    pub after: ColorGrid,
}

impl ComparisonResult {
    /// Changed share of the image in percent, rounded to 4 decimals.
    pub fn difference_percent(&self) -> f64 {
        self.difference_percent
    }

    pub fn changed_pixels(&self) -> u64 {
        self.mask.changed_pixels()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.mask.dimensions()
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn overlay(&self) -> &ColorGrid {
        &self.overlay
    }

    pub fn before(&self) -> &ColorGrid {
        &self.before
    }

    /// "after" resampled onto the "before" dimensions.
    pub fn after(&self) -> &ColorGrid {
        &self.after
    }

    pub fn into_parts(self) -> ComparisonParts {
        ComparisonParts {
            difference_percent: self.difference_percent,
            changed_pixels: self.mask.changed_pixels(),
            mask: self.mask,
            overlay: self.overlay,
            before: self.before,
            after: self.after,
        }
    }
}

/// Compare two encoded images.
///
/// The threshold is validated before either buffer is decoded. The first
/// failing stage aborts the comparison and its error is returned as is.
/// Synchronous and CPU-bound; async callers should use `spawn_blocking`.
pub fn compare(
    before: &[u8],
    after: &[u8],
    threshold: i64,
    ignore_regions: &[IgnoreRegion],
) -> Result<ComparisonResult, CompareError> {
    let threshold = SensitivityThreshold::new(threshold)?;
    let before = decode(before)?;
    let after = decode(after)?;
    compare_grids(before, after, threshold, ignore_regions)
}

/// Compare two already decoded grids. "after" is resampled onto "before"
/// when their dimensions differ.
pub fn compare_grids(
    before: ColorGrid,
    after: ColorGrid,
    threshold: SensitivityThreshold,
    ignore_regions: &[IgnoreRegion],
) -> Result<ComparisonResult, CompareError> {
    let span = debug_span!(
        "compare",
        threshold = threshold.value(),
        regions = ignore_regions.len()
    );
    let _guard = span.enter();

    let after = align(&before, after)?;
    let mask = binarize(&intensity(&before, &after)?, threshold);
    let mask = noise::open(mask);
    let mask = apply_ignore_regions(mask, ignore_regions);

    let difference_percent = difference_percent(&mask)?;
    let overlay = render_overlay(&after, &mask)?;
    debug!(
        width = before.width(),
        height = before.height(),
        difference_percent,
        "comparison done"
    );

    Ok(ComparisonResult {
        difference_percent,
        mask,
        overlay,
        before,
        after,
    })
}
