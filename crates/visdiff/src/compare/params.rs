use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CompareError;

/// Intensity a pixel must exceed to count as changed.
///
/// Lower values are more sensitive: 0 flags every non-identical pixel,
/// 255 flags none.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SensitivityThreshold(u8);

impl SensitivityThreshold {
    pub const DEFAULT: Self = Self(25);

    pub fn new(raw: i64) -> Result<Self, CompareError> {
        u8::try_from(raw).map(Self).map_err(|_| {
            CompareError::InvalidParameter(format!("threshold must be in [0, 255], got {raw}"))
        })
    }

    /// Map a slider percentage (`0..=100`) linearly onto `0..=255`.
    pub fn from_percent(percent: f64) -> Result<Self, CompareError> {
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(CompareError::InvalidParameter(format!(
                "threshold percent must be in [0, 100], got {percent}"
            )));
        }
        Ok(Self((percent * 255.0 / 100.0).round() as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for SensitivityThreshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for SensitivityThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Rectangle excluded from change detection, in coordinates normalized to
/// the image size.
///
/// All components lie in `[0, 1]` and `w`, `h` are positive. A rectangle
/// that runs past the right or bottom edge is clamped to it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawIgnoreRegion")]
pub struct IgnoreRegion {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

#[derive(Deserialize)]
struct RawIgnoreRegion {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

impl IgnoreRegion {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Result<Self, CompareError> {
        for (name, v) in [("x", x), ("y", y), ("w", w), ("h", h)] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(CompareError::InvalidParameter(format!(
                    "ignore region {name} must be in [0, 1], got {v}"
                )));
            }
        }

        let w = w.min(1.0 - x);
        let h = h.min(1.0 - y);
        if w <= 0.0 || h <= 0.0 {
            return Err(CompareError::InvalidParameter(format!(
                "ignore region must have positive size, got {w}x{h} at ({x}, {y})"
            )));
        }

        Ok(Self { x, y, w, h })
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn w(&self) -> f64 {
        self.w
    }

    pub fn h(&self) -> f64 {
        self.h
    }
}

impl TryFrom<RawIgnoreRegion> for IgnoreRegion {
    type Error = CompareError;

    fn try_from(raw: RawIgnoreRegion) -> Result<Self, Self::Error> {
        Self::new(raw.x, raw.y, raw.w, raw.h)
    }
}

/// Parses `x,y,w,h`.
impl FromStr for IgnoreRegion {
    type Err = CompareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CompareError::InvalidParameter(format!("ignore region '{s}': {e}")))?;

        match parts.as_slice() {
            &[x, y, w, h] => Self::new(x, y, w, h),
            _ => Err(CompareError::InvalidParameter(format!(
                "ignore region '{s}' must have four components x,y,w,h"
            ))),
        }
    }
}
