use std::path::PathBuf;

use clap::{Parser, Subcommand};
use visdiff::{IgnoreRegion, SensitivityThreshold};

use crate::config;

fn parse_threshold(s: &str) -> Result<SensitivityThreshold, String> {
    let v: i64 = s.parse().map_err(|e| format!("{e}"))?;
    SensitivityThreshold::new(v).map_err(|e| e.to_string())
}

fn parse_threshold_percent(s: &str) -> Result<SensitivityThreshold, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    SensitivityThreshold::from_percent(v).map_err(|e| e.to_string())
}

fn parse_region(s: &str) -> Result<IgnoreRegion, String> {
    s.parse().map_err(|e: visdiff::CompareError| e.to_string())
}

fn parse_max_difference(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    config::validate_max_difference(v)
}

#[derive(Parser)]
#[command(
    name = "visdiff",
    about = "Score and highlight visual differences between two images"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Comparison knobs shared by `compare` and `batch`. `None` / empty means
/// "fall back to env, then config file".
#[derive(Clone, Debug, Default, clap::Args)]
pub struct CompareArgs {
    /// Sensitivity threshold (0-255). Lower flags more pixels as changed.
    #[arg(long, value_parser = parse_threshold, conflicts_with = "threshold_percent")]
    pub threshold: Option<SensitivityThreshold>,
    /// Sensitivity threshold as a slider percentage (0-100), mapped onto 0-255
    #[arg(long, value_parser = parse_threshold_percent)]
    pub threshold_percent: Option<SensitivityThreshold>,
    /// Region to ignore, normalized to the image size. Repeatable.
    #[arg(long = "ignore", value_name = "X,Y,W,H", value_parser = parse_region)]
    pub ignore: Vec<IgnoreRegion>,
    /// Max allowed difference percent (0-100). Comparisons within it pass.
    #[arg(long, value_parser = parse_max_difference)]
    pub max_difference: Option<f64>,
    /// Directory that receives mask, overlay and result record
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create .visdiff/config.toml with default settings
    Init {
        /// Overwrite existing config and gitignore
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Compare one before/after pair (exit 0 = within max difference, 1 = not)
    Compare {
        /// Reference image
        #[arg(long)]
        before: PathBuf,
        /// Candidate image; resampled to the reference size if it differs
        #[arg(long)]
        after: PathBuf,
        /// Print the stored result record as JSON instead of a status line
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        args: CompareArgs,
    },

    /// Compare every PNG under BEFORE_DIR with its namesake under AFTER_DIR
    Batch {
        #[arg(long)]
        before_dir: PathBuf,
        #[arg(long)]
        after_dir: PathBuf,
        /// Only compare pairs whose name contains PATTERN (case-insensitive)
        #[arg(long, short = 'f')]
        filter: Option<String>,
        /// Number of comparisons run concurrently
        #[arg(long, short = 'p', default_value_t = 4)]
        parallel: usize,
        #[command(flatten)]
        args: CompareArgs,
    },

    /// Print the stored result record of a previous comparison
    Show {
        /// Comparison id (directory name under the output dir)
        id: String,
        /// Output directory (overrides config)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}
