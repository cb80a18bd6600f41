use std::io::Write;
use std::time::Duration;

use crate::commands::PairStatus;

/// Clear the current terminal line (wipes progress indicator).
pub fn clear_line() {
    print!("\r\x1b[2K");
}

pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}

/// Print a single comparison result line.
pub fn print_line(name: &str, status: &PairStatus, elapsed: Duration) {
    clear_line();
    let time_suffix = format!("  \x1b[2m{}\x1b[0m", format_duration(elapsed));

    match status {
        PairStatus::Pass { score } => {
            println!("  \x1b[32mPASS\x1b[0m  {name}  ({score:.4}%){time_suffix}");
        }
        PairStatus::Fail {
            changed_pixels,
            score,
        } => {
            println!(
                "  \x1b[31mFAIL\x1b[0m  {name}  ({changed_pixels} pixels, {score:.4}%){time_suffix}"
            );
        }
        PairStatus::Missing => {
            println!("  \x1b[33mMISS\x1b[0m  {name}  (no after image)");
        }
        PairStatus::Error(msg) => {
            println!("  \x1b[31m ERR\x1b[0m  {name}  ({msg}){time_suffix}");
        }
    }
}

/// Show batch progress indicator.
pub fn show_progress(done: usize, total: usize) {
    if done < total {
        print!("  Comparing  [{done}/{total}]");
        let _ = std::io::stdout().flush();
    }
}

/// Print pair names grouped by status. Only prints non-empty sections.
pub fn print_actionable_summary(failed: &[String], missing: &[String], errored: &[String]) {
    if failed.is_empty() && missing.is_empty() && errored.is_empty() {
        return;
    }

    clear_line();
    println!();
    println!("Actionable pairs:");

    for (label, names) in [
        ("Failed", failed),
        ("Missing", missing),
        ("Errored", errored),
    ] {
        if !names.is_empty() {
            println!();
            println!("  {label} ({}):", names.len());
            for name in names {
                println!("    {name}");
            }
        }
    }
}

/// Print the final batch summary.
pub fn print_summary(
    total: usize,
    passed: usize,
    failed: usize,
    missing: usize,
    errored: usize,
    elapsed: Duration,
) {
    clear_line();
    println!();
    print!(
        "Pairs:  {total} total, \x1b[32m{passed} passed\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
    );
    if missing > 0 {
        print!(", \x1b[33m{missing} missing\x1b[0m");
    }
    if errored > 0 {
        print!(", \x1b[31m{errored} errored\x1b[0m");
    }
    println!();
    println!("Time:   {}", format_duration(elapsed));

    if failed > 0 {
        println!();
        println!("{failed} pair(s) exceed the allowed difference. Inspect diff.png under the output dir.");
    }
}
