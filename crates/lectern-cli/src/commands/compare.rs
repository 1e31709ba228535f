//! The `lectern compare` command.

use std::path::PathBuf;

use anyhow::Result;

use lectern_core::report::CheckReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    let baseline = CheckReport::load_json(&baseline_path)?;
    let current = CheckReport::load_json(&current_path)?;

    if baseline.worksheet.id != current.worksheet.id {
        eprintln!(
            "Warning: comparing different worksheets ({} vs {})",
            baseline.worksheet.id, current.worksheet.id
        );
    }

    let delta = current.compare(&baseline);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", delta.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&delta)?);
        }
        _ => {
            println!(
                "Comparison: {:+} points, {} improved, {} regressed, {} unchanged",
                delta.score_delta,
                delta.improved.len(),
                delta.regressed.len(),
                delta.unchanged
            );

            if !delta.regressed.is_empty() {
                println!("\nRegressed:");
                for c in &delta.regressed {
                    println!("  {} {} -> {}", c.key, c.before, c.after);
                }
            }

            if !delta.improved.is_empty() {
                println!("\nImproved:");
                for c in &delta.improved {
                    println!("  {} {} -> {}", c.key, c.before, c.after);
                }
            }

            if delta.new_entries > 0 {
                println!("\n{} new answer(s)", delta.new_entries);
            }
            if delta.removed_entries > 0 {
                println!("{} removed answer(s)", delta.removed_entries);
            }
        }
    }

    if fail_on_regression && delta.has_regressions() {
        anyhow::bail!("{} answer(s) regressed", delta.regressed.len());
    }

    Ok(())
}
