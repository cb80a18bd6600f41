pub mod resolve;
pub mod template;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use visdiff::{IgnoreRegion, SensitivityThreshold};

pub use self::resolve::{CliOverrides, ResolvedRunConfig};
pub use self::template::{config_file_exists, write_gitignore, write_template};

pub(crate) const CONFIG_DIR: &str = ".visdiff";
const CONFIG_FILE: &str = "config.toml";
const OUTPUT_DIR: &str = "output";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Raw sensitivity threshold (0-255).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<i64>,
    /// Sensitivity threshold as a percentage (0-100). Exclusive with `threshold`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_percent: Option<f64>,
    /// Max allowed difference percent (0-100). Comparisons with score <= it pass.
    #[serde(default)]
    pub max_difference: f64,
}

impl CompareConfig {
    pub fn threshold(&self) -> Result<Option<SensitivityThreshold>> {
        match (self.threshold, self.threshold_percent) {
            (Some(_), Some(_)) => {
                bail!("compare.threshold and compare.threshold_percent are mutually exclusive")
            }
            (Some(raw), None) => Ok(Some(
                SensitivityThreshold::new(raw).context("compare.threshold")?,
            )),
            (None, Some(pct)) => Ok(Some(
                SensitivityThreshold::from_percent(pct).context("compare.threshold_percent")?,
            )),
            (None, None) => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    Path::new(CONFIG_DIR).join(OUTPUT_DIR)
}

pub fn validate_max_difference(v: f64) -> Result<f64, String> {
    if !v.is_finite() || !(0.0..=100.0).contains(&v) {
        return Err(format!("max_difference must be between 0 and 100, got {v}"));
    }
    Ok(v)
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub compare: CompareConfig,
    /// Regions ignored by every comparison unless `--ignore` is given.
    #[serde(default)]
    pub ignore: Vec<IgnoreRegion>,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Validate semantic constraints that serde cannot express.
    fn validate(&self) -> Result<()> {
        self.compare.threshold()?;
        validate_max_difference(self.compare.max_difference)
            .map_err(|e| anyhow::anyhow!("compare.{e}"))?;
        if self.output.dir.as_os_str().is_empty() {
            bail!("output.dir must not be empty");
        }
        Ok(())
    }
}

/// Load `<dir>/config.toml`. A missing file yields the defaults.
pub fn load_from(dir: &Path) -> Result<Config> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    config.validate()?;
    Ok(config)
}
