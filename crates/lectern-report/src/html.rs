//! HTML check report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::Result;
use std::path::Path;

use lectern_core::grader::ScoreBand;
use lectern_core::report::CheckReport;

/// Escape a string for safe HTML insertion.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML page from a check report.
pub fn generate_html(report: &CheckReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>lectern check: {}</title>\n",
        html_escape(&report.worksheet.title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&report.worksheet.title)));
    html.push_str(&format!(
        "<p class=\"meta\">Worksheet: <strong>{}</strong> | {} inputs | answers from {} | {}</p>\n",
        html_escape(&report.worksheet.id),
        report.worksheet.input_count,
        html_escape(&report.answer_source),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str(&format!(
        "<p class=\"outcome {}\">{}</p>\n",
        if report.outcome.is_success() { "pass" } else { "fail" },
        html_escape(&report.outcome.message())
    ));
    html.push_str("</header>\n");

    // Summary
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Score</th><th>Correct</th><th>Partial</th><th>Needs attention</th><th>Skipped</th><th>Filled</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{}%</td><td>{}/{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}/{} ({}%)</td></tr></tbody>\n",
        report.score,
        report.correct,
        report.total,
        report.partial,
        report.needs_attention,
        report.skipped,
        report.progress.filled,
        report.progress.total,
        report.progress.percent()
    ));
    html.push_str("</table>\n");
    html.push_str(&generate_score_bar(report.score, report.band));
    html.push_str(&format!(
        "<p class=\"band\">{}</p>\n",
        html_escape(report.band.message())
    ));
    html.push_str("</section>\n");

    // Per-entry results
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Answers</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">#</th><th onclick=\"sortTable(1)\">Key</th><th onclick=\"sortTable(2)\">Result</th><th onclick=\"sortTable(3)\">Similarity</th><th>Your answer</th><th>Reference</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for entry in &report.entries {
        let class = entry.result.classification.css_class();
        html.push_str(&format!(
            "<tr class=\"{class}\"><td>{}</td><td>{}</td><td title=\"{}\">{}</td><td>{:.0}%</td><td>{}</td><td>{}</td></tr>\n",
            entry.position + 1,
            html_escape(&entry.key.to_string()),
            html_escape(entry.result.classification.feedback()),
            entry.result.classification,
            entry.result.score * 100.0,
            html_escape(&entry.answer),
            entry
                .revealed_reference
                .as_deref()
                .map(html_escape)
                .unwrap_or_default()
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML check report to a file.
pub fn write_html_report(report: &CheckReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn generate_score_bar(score: u32, band: ScoreBand) -> String {
    let bar_height = 24;
    let max_width = 400;
    let width = score.min(100) as usize * max_width / 100;

    let color = match band {
        ScoreBand::Excellent => "#22c55e",
        ScoreBand::Good => "#84cc16",
        ScoreBand::Pass => "#eab308",
        ScoreBand::KeepPracticing => "#ef4444",
    };

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        max_width + 60,
        bar_height
    );
    svg.push_str(&format!(
        "  <rect x=\"0\" y=\"0\" width=\"{max_width}\" height=\"{bar_height}\" fill=\"var(--border)\" rx=\"4\"/>\n"
    ));
    svg.push_str(&format!(
        "  <rect x=\"0\" y=\"0\" width=\"{width}\" height=\"{bar_height}\" fill=\"{color}\" rx=\"4\"/>\n"
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}%</text>\n",
        max_width + 8,
        bar_height / 2,
        score
    ));
    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --partial: #fef9c3; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --partial: #713f12; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta, .band { color: #6b7280; }
.outcome { font-size: 1.2rem; padding: 0.75rem 1rem; border-radius: 8px; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; vertical-align: top; }
th { background: var(--border); cursor: pointer; }
.pass, .correct { background: var(--pass); }
.partial { background: var(--partial); }
.fail, .incorrect { background: var(--fail); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb, undefined, { numeric: true }) : vb.localeCompare(va, undefined, { numeric: true });
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
