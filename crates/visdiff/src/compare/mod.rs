//! Comparison stages, leaf-first: decode, align, diff, threshold, noise,
//! ignore, score, overlay. [`pipeline`] sequences them.

pub mod align;
pub mod decode;
pub mod diff;
pub mod grid;
pub mod ignore;
pub mod noise;
pub mod overlay;
pub mod params;
pub mod pipeline;
pub mod score;
pub mod threshold;

pub use self::grid::{ColorGrid, IntensityMap, Mask};
pub use self::params::{IgnoreRegion, SensitivityThreshold};
pub use self::pipeline::{ComparisonParts, ComparisonResult, compare, compare_grids};
