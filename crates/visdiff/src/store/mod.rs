//! On-disk layout of comparison outputs:
//! `<output>/<id>/{before.png, after.png, mask.png, diff.png, result.json}`.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use visdiff::{ComparisonResult, IgnoreRegion, SensitivityThreshold};

pub const BEFORE_FILE: &str = "before.png";
pub const AFTER_FILE: &str = "after.png";
pub const MASK_FILE: &str = "mask.png";
pub const DIFF_FILE: &str = "diff.png";
pub const RECORD_FILE: &str = "result.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assets {
    pub before: PathBuf,
    /// "after" as compared, i.e. resampled to the "before" size.
    pub after: PathBuf,
    pub mask: PathBuf,
    pub diff: PathBuf,
}

impl Assets {
    fn in_dir(dir: &Path) -> Self {
        Self {
            before: dir.join(BEFORE_FILE),
            after: dir.join(AFTER_FILE),
            mask: dir.join(MASK_FILE),
            diff: dir.join(DIFF_FILE),
        }
    }

    fn all_exist(&self) -> bool {
        [&self.before, &self.after, &self.mask, &self.diff]
            .iter()
            .all(|p| p.exists())
    }
}

/// Metadata written next to the images. Fields are optional because a
/// record can be rebuilt from the images alone when `result.json` is gone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub id: String,
    pub threshold: Option<u8>,
    pub difference_percent: Option<f64>,
    pub changed_pixels: Option<u64>,
    pub dimensions: Option<(u32, u32)>,
    #[serde(default)]
    pub ignore_regions: Vec<IgnoreRegion>,
    pub created_at: Option<u64>,
    pub assets: Assets,
}

fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).with_context(|| format!("Failed to create {}", path.display()))
}

fn write_png(path: &Path, png: Result<Vec<u8>, image::ImageError>) -> Result<()> {
    let png = png.with_context(|| format!("Failed to encode {}", path.display()))?;
    std::fs::write(path, png).with_context(|| format!("Failed to write {}", path.display()))
}

fn unix_now() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

/// Time-derived id for a one-off comparison.
pub fn new_comparison_id() -> String {
    let now = unix_now();
    format!("{}-{:09}", now.as_secs(), now.subsec_nanos())
}

/// Directory for `id` under `root`. Only plain relative ids are accepted so
/// a lookup can never leave the output directory.
fn comparison_dir(root: &Path, id: &str) -> Result<PathBuf> {
    let rel = Path::new(id);
    let plain = rel.components().next().is_some()
        && rel.components().all(|c| matches!(c, Component::Normal(_)));
    if !plain {
        bail!("invalid comparison id '{id}'");
    }
    Ok(root.join(rel))
}

/// Write inputs, mask, overlay and record for `id` under `root`.
pub fn write_comparison(
    root: &Path,
    id: &str,
    threshold: SensitivityThreshold,
    ignore_regions: &[IgnoreRegion],
    result: ComparisonResult,
) -> Result<ComparisonRecord> {
    let dir = comparison_dir(root, id)?;
    ensure_dir(&dir)?;
    let assets = Assets::in_dir(&dir);

    let dimensions = result.dimensions();
    let parts = result.into_parts();
    write_png(&assets.before, parts.before.to_png())?;
    write_png(&assets.after, parts.after.to_png())?;
    write_png(&assets.mask, parts.mask.to_png())?;
    write_png(&assets.diff, parts.overlay.to_png())?;

    let record = ComparisonRecord {
        id: id.to_owned(),
        threshold: Some(threshold.value()),
        difference_percent: Some(parts.difference_percent),
        changed_pixels: Some(parts.changed_pixels),
        dimensions: Some(dimensions),
        ignore_regions: ignore_regions.to_vec(),
        created_at: Some(unix_now().as_secs()),
        assets,
    };
    let path = dir.join(RECORD_FILE);
    let json = serde_json::to_string_pretty(&record).context("Failed to serialize record")?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(record)
}

/// Read the record for `id`. Falls back to a bare record when all four
/// images survive; `None` when the comparison does not exist.
pub fn read_comparison(root: &Path, id: &str) -> Result<Option<ComparisonRecord>> {
    let dir = comparison_dir(root, id)?;
    let path = dir.join(RECORD_FILE);
    if path.exists() {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let record = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        return Ok(Some(record));
    }

    let assets = Assets::in_dir(&dir);
    if assets.all_exist() {
        return Ok(Some(ComparisonRecord {
            id: id.to_owned(),
            threshold: None,
            difference_percent: None,
            changed_pixels: None,
            dimensions: None,
            ignore_regions: Vec::new(),
            created_at: None,
            assets,
        }));
    }
    Ok(None)
}

/// All `.png` files under `dir` as ids (relative path without extension).
pub fn list_png_ids(dir: &Path) -> Result<BTreeSet<String>> {
    let pattern = dir.join("**").join("*.png");
    let pattern = pattern.to_string_lossy();
    let mut ids = BTreeSet::new();
    for entry in glob::glob(&pattern).with_context(|| format!("Invalid pattern {pattern}"))? {
        let path = entry.context("Failed to read directory entry")?;
        if let Ok(rel) = path.strip_prefix(dir) {
            ids.insert(rel.with_extension("").to_string_lossy().into_owned());
        }
    }
    Ok(ids)
}

pub fn png_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{id}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn png(img: &RgbImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn sample_result() -> ComparisonResult {
        let before = png(&RgbImage::from_pixel(20, 20, Rgb([255, 255, 255])));
        let after = png(&RgbImage::from_fn(20, 20, |x, y| {
            if x < 5 && y < 5 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        }));
        visdiff::compare(&before, &after, 10, &[]).unwrap()
    }

    #[test]
    fn write_then_read_record() {
        let tmp = tempfile::tempdir().unwrap();
        let result = sample_result();
        let region = IgnoreRegion::new(0.5, 0.5, 0.25, 0.25).unwrap();
        let written = write_comparison(
            tmp.path(),
            "abc",
            SensitivityThreshold::new(10).unwrap(),
            &[region],
            result.clone(),
        )
        .unwrap();
        assert!(written.assets.all_exist());

        let read = read_comparison(tmp.path(), "abc").unwrap().unwrap();
        assert_eq!(read.threshold, Some(10));
        assert_eq!(read.difference_percent, Some(6.25));
        assert_eq!(read.changed_pixels, Some(25));
        assert_eq!(read.dimensions, Some((20, 20)));
        assert_eq!(read.ignore_regions, vec![region]);

        let mask = image::open(&read.assets.mask).unwrap().to_luma8();
        assert_eq!(&mask, result.mask().as_image());
    }

    #[test]
    fn record_rebuilt_from_images() {
        let tmp = tempfile::tempdir().unwrap();
        let result = sample_result();
        write_comparison(tmp.path(), "xyz", SensitivityThreshold::DEFAULT, &[], result).unwrap();
        std::fs::remove_file(tmp.path().join("xyz").join(RECORD_FILE)).unwrap();

        let read = read_comparison(tmp.path(), "xyz").unwrap().unwrap();
        assert_eq!(read.id, "xyz");
        assert!(read.difference_percent.is_none());
    }

    #[test]
    fn all_four_images_stored() {
        let tmp = tempfile::tempdir().unwrap();
        let before = png(&RgbImage::from_pixel(20, 20, Rgb([255, 255, 255])));
        let after = png(&RgbImage::from_pixel(10, 30, Rgb([0, 0, 0])));
        let result = visdiff::compare(&before, &after, 10, &[]).unwrap();
        write_comparison(tmp.path(), "four", SensitivityThreshold::DEFAULT, &[], result).unwrap();

        let dir = tmp.path().join("four");
        for file in [BEFORE_FILE, AFTER_FILE, MASK_FILE, DIFF_FILE, RECORD_FILE] {
            assert!(dir.join(file).exists(), "{file} not stored");
        }
        // "after" is stored as compared, at the "before" size.
        let stored_after = image::open(dir.join(AFTER_FILE)).unwrap().to_rgb8();
        assert_eq!(stored_after.dimensions(), (20, 20));
    }

    #[test]
    fn fallback_needs_every_image() {
        let tmp = tempfile::tempdir().unwrap();
        write_comparison(tmp.path(), "part", SensitivityThreshold::DEFAULT, &[], sample_result())
            .unwrap();
        let dir = tmp.path().join("part");
        std::fs::remove_file(dir.join(RECORD_FILE)).unwrap();
        std::fs::remove_file(dir.join(BEFORE_FILE)).unwrap();

        assert!(read_comparison(tmp.path(), "part").unwrap().is_none());
    }

    #[test]
    fn ids_escaping_output_dir_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("out");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(tmp.path().join(RECORD_FILE), "{}").unwrap();

        for id in ["..", "../out", "", "./x"] {
            assert!(read_comparison(&root, id).is_err(), "id {id:?}");
        }
        let absolute = tmp.path().to_string_lossy().into_owned();
        assert!(read_comparison(&root, &absolute).is_err());
        assert!(read_comparison(&root, "nested/ok").unwrap().is_none());
    }

    #[test]
    fn unknown_id_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(read_comparison(tmp.path(), "missing").unwrap().is_none());
    }

    #[test]
    fn lists_nested_png_ids() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("pages/home")).unwrap();
        std::fs::write(tmp.path().join("login.png"), b"x").unwrap();
        std::fs::write(tmp.path().join("pages/home/hero.png"), b"x").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), b"x").unwrap();

        let ids = list_png_ids(tmp.path()).unwrap();
        let expected: BTreeSet<String> = [
            "login".to_string(),
            Path::new("pages").join("home").join("hero").to_string_lossy().into_owned(),
        ]
        .into_iter()
        .collect();
        assert_eq!(ids, expected);
    }
}
