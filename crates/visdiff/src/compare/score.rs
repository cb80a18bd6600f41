use super::grid::Mask;
use crate::error::CompareError;

/// Share of changed pixels, as a percentage rounded to 4 decimal places.
pub fn difference_percent(mask: &Mask) -> Result<f64, CompareError> {
    let total = mask.total_pixels();
    if total == 0 {
        return Err(CompareError::InvalidImage(format!(
            "cannot score empty mask: {}x{}",
            mask.width(),
            mask.height()
        )));
    }
    let percent = mask.changed_pixels() as f64 / total as f64 * 100.0;
    Ok((percent * 10_000.0).round() / 10_000.0)
}
