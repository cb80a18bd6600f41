use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use visdiff::{IgnoreRegion, SensitivityThreshold};

use super::{CONFIG_DIR, load_from, validate_max_difference};

/// Values extracted from the CLI that participate in the merge.
#[derive(Default)]
pub struct CliOverrides {
    pub threshold: Option<SensitivityThreshold>,
    /// Non-empty replaces the config file's regions.
    pub ignore: Vec<IgnoreRegion>,
    pub max_difference: Option<f64>,
    pub output: Option<PathBuf>,
}

/// Fully resolved config after CLI > env > file > defaults merge.
#[derive(Debug)]
pub struct ResolvedRunConfig {
    pub threshold: SensitivityThreshold,
    pub ignore_regions: Vec<IgnoreRegion>,
    pub max_difference: f64,
    pub output_dir: PathBuf,
}

impl ResolvedRunConfig {
    pub fn new(cli: CliOverrides) -> Result<Self> {
        Self::resolve(cli, Path::new(CONFIG_DIR), |key| std::env::var(key).ok())
    }

    fn resolve(
        cli: CliOverrides,
        config_dir: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        // 1. File layer
        let file_config = load_from(config_dir)?;

        // 2. Env layer
        let env_threshold = env("VISDIFF_THRESHOLD")
            .map(|v| {
                let raw = v.parse::<i64>().context("VISDIFF_THRESHOLD must be an integer")?;
                SensitivityThreshold::new(raw).context("VISDIFF_THRESHOLD")
            })
            .transpose()?;
        let env_max_difference: Option<f64> = env("VISDIFF_MAX_DIFFERENCE")
            .map(|v| v.parse::<f64>())
            .transpose()
            .context("VISDIFF_MAX_DIFFERENCE must be a valid float")?;

        // 3. CLI > env > file > default
        let threshold = match cli.threshold.or(env_threshold) {
            Some(t) => t,
            None => file_config.compare.threshold()?.unwrap_or_default(),
        };

        let max_difference = cli
            .max_difference
            .or(env_max_difference)
            .unwrap_or(file_config.compare.max_difference);
        validate_max_difference(max_difference).map_err(|e| anyhow::anyhow!("{e}"))?;

        let ignore_regions = if cli.ignore.is_empty() {
            file_config.ignore
        } else {
            cli.ignore
        };

        let output_dir = cli.output.unwrap_or(file_config.output.dir);

        Ok(Self {
            threshold,
            ignore_regions,
            max_difference,
            output_dir,
        })
    }

    /// Whether a comparison with this score counts as passing.
    pub fn passes(&self, difference_percent: f64) -> bool {
        difference_percent <= self.max_difference
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn with_file(content: &str) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("config.toml"), content).unwrap();
        tmp
    }

    #[test]
    fn defaults_without_any_layer() {
        let tmp = tempfile::tempdir().unwrap();
        let c = ResolvedRunConfig::resolve(CliOverrides::default(), tmp.path(), env_of(&[]))
            .unwrap();
        assert_eq!(c.threshold, SensitivityThreshold::DEFAULT);
        assert_eq!(c.max_difference, 0.0);
        assert!(c.ignore_regions.is_empty());
    }

    #[test]
    fn env_overrides_file() {
        let tmp = with_file("[compare]\nthreshold = 40\nmax_difference = 1.0\n");
        let env = env_of(&[("VISDIFF_THRESHOLD", "12"), ("VISDIFF_MAX_DIFFERENCE", "2.5")]);
        let c = ResolvedRunConfig::resolve(CliOverrides::default(), tmp.path(), env).unwrap();
        assert_eq!(c.threshold.value(), 12);
        assert_eq!(c.max_difference, 2.5);
    }

    #[test]
    fn cli_overrides_env_and_file() {
        let tmp = with_file("[compare]\nthreshold = 40\n\n[[ignore]]\nx = 0.0\ny = 0.0\nw = 0.5\nh = 0.5\n");
        let cli = CliOverrides {
            threshold: Some(SensitivityThreshold::new(3).unwrap()),
            ignore: vec![IgnoreRegion::new(0.1, 0.1, 0.1, 0.1).unwrap()],
            max_difference: Some(5.0),
            output: Some(PathBuf::from("out")),
        };
        let env = env_of(&[("VISDIFF_THRESHOLD", "12")]);
        let c = ResolvedRunConfig::resolve(cli, tmp.path(), env).unwrap();
        assert_eq!(c.threshold.value(), 3);
        assert_eq!(c.ignore_regions.len(), 1);
        assert_eq!(c.ignore_regions[0].x(), 0.1);
        assert_eq!(c.max_difference, 5.0);
        assert_eq!(c.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn file_regions_used_without_cli_regions() {
        let tmp = with_file("[[ignore]]\nx = 0.0\ny = 0.0\nw = 0.5\nh = 0.5\n");
        let c = ResolvedRunConfig::resolve(CliOverrides::default(), tmp.path(), env_of(&[]))
            .unwrap();
        assert_eq!(c.ignore_regions.len(), 1);
    }

    #[test]
    fn invalid_env_threshold_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        for bad in ["abc", "256"] {
            let env = env_of(&[("VISDIFF_THRESHOLD", bad)]);
            assert!(
                ResolvedRunConfig::resolve(CliOverrides::default(), tmp.path(), env).is_err(),
                "{bad}"
            );
        }
    }

    #[test]
    fn passes_within_max_difference() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = CliOverrides {
            max_difference: Some(1.0),
            ..Default::default()
        };
        let c = ResolvedRunConfig::resolve(cli, tmp.path(), env_of(&[])).unwrap();
        assert!(c.passes(0.0));
        assert!(c.passes(1.0));
        assert!(!c.passes(1.0001));
    }
}
