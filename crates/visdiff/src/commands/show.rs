use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::store;

/// `visdiff show` — print the stored record of a previous comparison.
pub fn show(output_dir: &Path, id: &str) -> Result<()> {
    let Some(record) = store::read_comparison(output_dir, id)? else {
        bail!("comparison '{id}' not found under {}", output_dir.display());
    };
    let json = serde_json::to_string_pretty(&record).context("Failed to serialize record")?;
    println!("{json}");
    Ok(())
}
