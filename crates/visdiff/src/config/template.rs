use std::path::Path;

use anyhow::{Context, Result};

use super::{CONFIG_DIR, CONFIG_FILE, OUTPUT_DIR};

/// Hand-crafted config template with commented-out keys, so users can see
/// the available knobs without uncommenting section headers.
const CONFIG_TEMPLATE: &str = r#"# ─────────────────────────────────────────────────────────
# Comparison — all fields optional.
# ─────────────────────────────────────────────────────────
[compare]
# threshold = 25                    # 0-255, lower flags more pixels as changed
# threshold_percent = 10.0          # 0-100 slider form (exclusive with threshold)
# max_difference = 0.0              # max allowed difference percent (0.0 = exact)

# ─────────────────────────────────────────────────────────
# Ignored regions, normalized to the image size. Repeatable.
# ─────────────────────────────────────────────────────────
# [[ignore]]
# x = 0.0
# y = 0.0
# w = 1.0
# h = 0.05

[output]
# dir = ".visdiff/output"
"#;

pub fn config_file_exists() -> bool {
    Path::new(CONFIG_DIR).join(CONFIG_FILE).exists()
}

pub fn write_gitignore(force: bool) -> Result<()> {
    let path = Path::new(CONFIG_DIR).join(".gitignore");
    if !force && path.exists() {
        return Ok(());
    }
    std::fs::write(&path, format!("{OUTPUT_DIR}/\n"))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Write the hand-crafted config template (with commented-out sections).
pub fn write_template() -> Result<()> {
    let dir = Path::new(CONFIG_DIR);
    std::fs::create_dir_all(dir).context("Failed to create .visdiff directory")?;
    let path = dir.join(CONFIG_FILE);
    std::fs::write(&path, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
