//! The `lectern check` command.

use std::path::PathBuf;

use anyhow::Result;

use lectern_core::config::LecternConfig;
use lectern_core::engine::{CheckEngine, ProgressReporter};
use lectern_core::grader::{Classification, GradedEntry};
use lectern_core::report::CheckReport;
use lectern_report::html::write_html_report;

use super::{answer_source, load_worksheets};

pub struct CheckArgs {
    pub worksheet: PathBuf,
    pub answers: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: String,
    pub baseline: Option<PathBuf>,
    pub primary_only: bool,
    pub fail_on_error: bool,
}

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_check_start(&self, worksheet_id: &str) {
        eprintln!("Checking {worksheet_id}...");
    }

    fn on_entry_graded(&self, _: &str, entry: &GradedEntry) {
        if entry.result.classification == Classification::Empty {
            eprintln!("  {}: {}", entry.key, entry.result.classification.feedback());
        }
    }

    fn on_check_error(&self, worksheet_id: &str, error: &str) {
        eprintln!("  ERROR: {worksheet_id}: {error}");
    }

    fn on_check_complete(&self, report: &CheckReport) {
        eprintln!(
            "  Done: {} ({} graded, {} skipped, {}ms)",
            report.worksheet.id,
            report.entries.len(),
            report.skipped,
            report.duration_ms
        );
    }
}

const FORMATS: [&str; 3] = ["json", "html", "markdown"];

fn parse_formats(format: &str) -> Result<Vec<&str>> {
    match format {
        "none" => Ok(vec![]),
        "all" => Ok(FORMATS.to_vec()),
        list => list
            .split(',')
            .map(|f| match f.trim() {
                "md" => Ok("markdown"),
                f if FORMATS.iter().any(|known| *known == f) => Ok(f),
                other => anyhow::bail!("unknown format: '{other}'"),
            })
            .collect(),
    }
}

pub async fn execute(config: &LecternConfig, args: CheckArgs) -> Result<()> {
    let formats = parse_formats(&args.format)?;

    let worksheets = load_worksheets(&args.worksheet)?;
    anyhow::ensure!(
        !worksheets.is_empty(),
        "no worksheets found in {}",
        args.worksheet.display()
    );
    tracing::debug!(
        "loaded {} worksheet(s) from {}",
        worksheets.len(),
        args.worksheet.display()
    );

    let baseline = args
        .baseline
        .as_deref()
        .map(CheckReport::load_json)
        .transpose()?;

    let answers = args.answers.unwrap_or_else(|| config.answers_dir.clone());
    tracing::debug!("answer sets from {}", answers.display());
    let mut engine_config = config.engine_config();
    if args.primary_only {
        engine_config.grade.accept_alternate_versions = false;
    }
    let engine = CheckEngine::new(answer_source(&answers), engine_config);

    let results = engine.run_all(&worksheets, &ConsoleReporter).await;

    let output = args.output.unwrap_or_else(|| config.output_dir.clone());
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
    let mut failed = 0usize;
    let mut all_correct = true;

    for (sheet, result) in worksheets.iter().zip(results) {
        let report = match result {
            Ok(report) => report,
            Err(e) => {
                eprintln!("Could not check {}: {e:#}", sheet.id);
                failed += 1;
                continue;
            }
        };

        print_summary(&report);

        if let Some(previous) = baseline
            .as_ref()
            .filter(|b| b.worksheet.id == report.worksheet.id)
        {
            println!("{}", report.compare(previous).to_markdown());
        }

        let stem = format!("{}-{timestamp}", report.worksheet.id);
        for fmt in &formats {
            match *fmt {
                "json" => {
                    let path = output.join(format!("{stem}.json"));
                    report.save_json(&path)?;
                    eprintln!("Report saved to: {}", path.display());
                }
                "html" => {
                    let path = output.join(format!("{stem}.html"));
                    write_html_report(&report, &path)?;
                    eprintln!("HTML report: {}", path.display());
                }
                _ => {
                    let path = output.join(format!("{stem}.md"));
                    std::fs::create_dir_all(&output)?;
                    std::fs::write(&path, report.to_markdown())?;
                    eprintln!("Markdown report: {}", path.display());
                }
            }
        }

        all_correct &= report.outcome.is_success();
    }

    if failed > 0 {
        anyhow::bail!("{failed} worksheet(s) could not be checked");
    }
    if args.fail_on_error && !all_correct {
        anyhow::bail!("some answers need correction");
    }

    Ok(())
}

fn print_summary(report: &CheckReport) {
    use comfy_table::{Cell, Table};

    println!("\n{}", report.worksheet.title);

    if !report.entries.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["#", "Key", "Result", "Similarity", "Reference"]);

        for entry in &report.entries {
            table.add_row(vec![
                Cell::new(entry.position + 1),
                Cell::new(&entry.key),
                Cell::new(entry.result.classification),
                Cell::new(format!("{:.0}%", entry.result.score * 100.0)),
                Cell::new(entry.revealed_reference.as_deref().unwrap_or("")),
            ]);
        }

        println!("{table}");
    }

    println!("{}", report.outcome.message());
    println!(
        "Score: {}% ({}) | Filled: {}/{}",
        report.score,
        report.band.message(),
        report.progress.filled,
        report.progress.total
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_lists() {
        assert!(parse_formats("none").unwrap().is_empty());
        assert_eq!(parse_formats("all").unwrap(), vec!["json", "html", "markdown"]);
        assert_eq!(parse_formats("json, md").unwrap(), vec!["json", "markdown"]);
        assert!(parse_formats("sarif").is_err());
    }
}
