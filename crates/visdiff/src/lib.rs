//! Visual difference between a "before" and an "after" raster image.
//!
//! The [`compare`] entry point decodes both inputs, aligns "after" onto
//! "before", thresholds the per-pixel difference, suppresses speckle noise,
//! blanks out ignore regions and returns the score, the binary mask and a
//! highlighted overlay.

pub mod compare;
pub mod error;

pub use self::compare::{
    ColorGrid, ComparisonParts, ComparisonResult, IgnoreRegion, Mask, SensitivityThreshold,
    compare, compare_grids,
};
pub use self::error::{CompareError, ErrorKind};
