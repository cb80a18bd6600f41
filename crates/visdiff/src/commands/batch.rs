use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

use super::PairStatus;
use super::compare::compare_files;
use crate::config::ResolvedRunConfig;
use crate::report::terminal;
use crate::store;

/// `visdiff batch` — compare every PNG under `before_dir` with the file of
/// the same relative path under `after_dir`, `parallel` at a time.
/// Returns exit code: 0 = all pass, 1 = any fail, missing or error.
pub async fn batch(
    config: ResolvedRunConfig,
    before_dir: &Path,
    after_dir: &Path,
    filter: Option<&str>,
    parallel: usize,
) -> Result<i32> {
    let mut ids = store::list_png_ids(before_dir)?;
    if let Some(pattern) = filter {
        let pattern = pattern.to_lowercase();
        ids.retain(|id| id.to_lowercase().contains(&pattern));
    }

    let total = ids.len();
    if total == 0 {
        println!("No PNG files found under {}", before_dir.display());
        return Ok(0);
    }

    let run_start = Instant::now();
    let config = Arc::new(config);
    let permits = Arc::new(Semaphore::new(parallel.max(1)));
    debug!(total, parallel, "starting batch");

    let mut set = JoinSet::new();
    for id in ids {
        let before = store::png_path(before_dir, &id);
        let after = store::png_path(after_dir, &id);
        let config = config.clone();
        let permits = permits.clone();
        set.spawn(async move {
            if !after.exists() {
                return (id, PairStatus::Missing, Duration::ZERO);
            }
            let _permit = match permits.acquire_owned().await {
                Ok(p) => p,
                Err(e) => return (id, PairStatus::Error(e.to_string()), Duration::ZERO),
            };

            let start = Instant::now();
            let task_id = id.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                compare_files(&config, &before, &after, &task_id)
            })
            .await
            .context("Compare task panicked")
            .and_then(|r| r);

            let status = match outcome {
                Ok((status, _)) => status,
                Err(e) => PairStatus::Error(format!("{e:#}")),
            };
            (id, status, start.elapsed())
        });
    }

    let mut done = 0usize;
    let mut passed = 0usize;
    let mut failed_names: Vec<String> = Vec::new();
    let mut missing_names: Vec<String> = Vec::new();
    let mut errored_names: Vec<String> = Vec::new();

    while let Some(joined) = set.join_next().await {
        let (name, status, elapsed) = joined.context("Batch task panicked")?;
        done += 1;
        debug!(done, total, name = %name, "received result");

        match &status {
            PairStatus::Pass { .. } => passed += 1,
            PairStatus::Fail { .. } => failed_names.push(name.clone()),
            PairStatus::Missing => missing_names.push(name.clone()),
            PairStatus::Error(_) => errored_names.push(name.clone()),
        }

        terminal::print_line(&name, &status, elapsed);
        terminal::show_progress(done, total);
    }

    // Completion order is nondeterministic; keep the summary stable.
    failed_names.sort();
    missing_names.sort();
    errored_names.sort();

    terminal::print_actionable_summary(&failed_names, &missing_names, &errored_names);
    terminal::print_summary(
        total,
        passed,
        failed_names.len(),
        missing_names.len(),
        errored_names.len(),
        run_start.elapsed(),
    );

    if failed_names.is_empty() && missing_names.is_empty() && errored_names.is_empty() {
        Ok(0)
    } else {
        Ok(1)
    }
}
