use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use super::PairStatus;
use crate::config::ResolvedRunConfig;
use crate::report::terminal;
use crate::store::{self, ComparisonRecord};

/// Read, compare and store one pair under `id`.
///
/// Runs synchronously — call via `spawn_blocking` from async code.
pub(super) fn compare_files(
    config: &ResolvedRunConfig,
    before: &Path,
    after: &Path,
    id: &str,
) -> Result<(PairStatus, ComparisonRecord)> {
    let before_bytes =
        std::fs::read(before).with_context(|| format!("Failed to read {}", before.display()))?;
    let after_bytes =
        std::fs::read(after).with_context(|| format!("Failed to read {}", after.display()))?;

    let result = visdiff::compare(
        &before_bytes,
        &after_bytes,
        i64::from(config.threshold.value()),
        &config.ignore_regions,
    )
    .with_context(|| format!("Failed to compare {} with {}", before.display(), after.display()))?;
    let score = result.difference_percent();
    let changed_pixels = result.changed_pixels();
    debug!(id, score, "compared");

    let record = store::write_comparison(
        &config.output_dir,
        id,
        config.threshold,
        &config.ignore_regions,
        result,
    )?;

    let status = if config.passes(score) {
        PairStatus::Pass { score }
    } else {
        PairStatus::Fail {
            changed_pixels,
            score,
        }
    };
    Ok((status, record))
}

/// `visdiff compare` — compare one pair, store outputs, report.
/// Returns exit code: 0 = within max difference, 1 = exceeds it.
pub fn compare(config: ResolvedRunConfig, before: &Path, after: &Path, json: bool) -> Result<i32> {
    let id = store::new_comparison_id();
    let start = Instant::now();
    let (status, record) = compare_files(&config, before, after, &id)?;

    if json {
        let out = serde_json::to_string_pretty(&record).context("Failed to serialize record")?;
        println!("{out}");
    } else {
        terminal::print_line(&id, &status, start.elapsed());
        println!("        before {}", record.assets.before.display());
        println!("        after  {}", record.assets.after.display());
        println!("        mask   {}", record.assets.mask.display());
        println!("        diff   {}", record.assets.diff.display());
    }

    Ok(match status {
        PairStatus::Pass { .. } => 0,
        _ => 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use visdiff::{IgnoreRegion, SensitivityThreshold};

    fn write_png(path: &Path, img: &RgbImage) {
        img.save_with_format(path, ImageFormat::Png).unwrap();
    }

    fn config(output: &Path, max_difference: f64, ignore: Vec<IgnoreRegion>) -> ResolvedRunConfig {
        ResolvedRunConfig {
            threshold: SensitivityThreshold::new(10).unwrap(),
            ignore_regions: ignore,
            max_difference,
            output_dir: output.to_path_buf(),
        }
    }

    fn pair(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
        let before = dir.join("before.png");
        let after = dir.join("after.png");
        write_png(&before, &RgbImage::from_pixel(100, 100, Rgb([255, 255, 255])));
        write_png(
            &after,
            &RgbImage::from_fn(100, 100, |x, y| {
                if (20..30).contains(&x) && (20..30).contains(&y) {
                    Rgb([0, 0, 0])
                } else {
                    Rgb([255, 255, 255])
                }
            }),
        );
        (before, after)
    }

    #[test]
    fn change_above_max_difference_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let (before, after) = pair(tmp.path());
        let cfg = config(&tmp.path().join("out"), 0.0, vec![]);
        let (status, record) = compare_files(&cfg, &before, &after, "one").unwrap();
        assert!(matches!(status, PairStatus::Fail { changed_pixels: 100, .. }));
        assert_eq!(record.difference_percent, Some(1.0));
        assert!(record.assets.diff.exists());
    }

    #[test]
    fn change_within_max_difference_passes() {
        let tmp = tempfile::tempdir().unwrap();
        let (before, after) = pair(tmp.path());
        let cfg = config(&tmp.path().join("out"), 1.0, vec![]);
        let (status, _) = compare_files(&cfg, &before, &after, "one").unwrap();
        assert!(matches!(status, PairStatus::Pass { .. }));
    }

    #[test]
    fn ignored_change_passes() {
        let tmp = tempfile::tempdir().unwrap();
        let (before, after) = pair(tmp.path());
        let region = IgnoreRegion::new(0.2, 0.2, 0.1, 0.1).unwrap();
        let cfg = config(&tmp.path().join("out"), 0.0, vec![region]);
        assert_eq!(compare(cfg, &before, &after, true).unwrap(), 0);
    }

    #[test]
    fn missing_input_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = config(&tmp.path().join("out"), 0.0, vec![]);
        let missing = tmp.path().join("nope.png");
        assert!(compare_files(&cfg, &missing, &missing, "x").is_err());
    }
}
