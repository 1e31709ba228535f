//! Check report types with JSON persistence and progress comparison.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::grader::{CheckRun, Classification, GradedEntry, Outcome, ScoreBand};
use crate::model::{FillProgress, Worksheet};

/// A complete check report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the worksheet that was checked.
    pub worksheet: WorksheetSummary,
    /// Where the reference answers came from.
    pub answer_source: String,
    /// Graded entries in document order.
    pub entries: Vec<GradedEntry>,
    /// Inputs that were not graded.
    pub skipped: usize,
    pub total: usize,
    pub correct: usize,
    pub partial: usize,
    pub needs_attention: usize,
    pub outcome: Outcome,
    /// Weighted percentage score.
    pub score: u32,
    pub band: ScoreBand,
    pub progress: FillProgress,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Summary of a worksheet (without its inputs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksheetSummary {
    pub id: String,
    pub title: String,
    pub input_count: usize,
}

impl CheckReport {
    /// Build a report from a finished grading pass.
    pub fn from_run(
        worksheet: &Worksheet,
        run: CheckRun,
        answer_source: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        let outcome = run.outcome();
        let score = run.tally.weighted_score();
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            worksheet: WorksheetSummary {
                id: worksheet.id.clone(),
                title: worksheet.title.clone(),
                input_count: worksheet.inputs.len(),
            },
            answer_source: answer_source.into(),
            skipped: run.skipped.len(),
            total: run.tally.total,
            correct: run.tally.correct,
            partial: run.tally.partial,
            needs_attention: run.tally.needs_attention.len(),
            entries: run.entries,
            outcome,
            score,
            band: ScoreBand::from_score(score),
            progress: worksheet.fill_progress(),
            duration_ms,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: CheckReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## {}\n\n", self.worksheet.title));
        md.push_str(&format!("**Result:** {}\n\n", self.outcome.message()));
        md.push_str(&format!(
            "**Score:** {}% ({}) | **Correct:** {}/{} | **Partial:** {} | **Filled:** {}%\n\n",
            self.score,
            self.band.message(),
            self.correct,
            self.total,
            self.partial,
            self.progress.percent()
        ));

        if self.entries.is_empty() {
            return md;
        }

        md.push_str("| # | Key | Result | Similarity |\n");
        md.push_str("|---|-----|--------|------------|\n");
        for entry in &self.entries {
            md.push_str(&format!(
                "| {} | {} | {} | {:.0}% |\n",
                entry.position + 1,
                entry.key,
                entry.result.classification,
                entry.result.score * 100.0
            ));
        }

        let revealed: Vec<_> = self
            .entries
            .iter()
            .filter_map(|e| e.revealed_reference.as_ref().map(|r| (e, r)))
            .collect();
        if !revealed.is_empty() {
            md.push_str("\n### Reference answers\n\n");
            for (entry, reference) in revealed {
                md.push_str(&format!("- **{}**: {}\n", entry.key, reference));
            }
        }

        md
    }

    /// Compare this report against an earlier check of the same worksheet.
    pub fn compare(&self, previous: &CheckReport) -> ProgressDelta {
        let classes = |report: &CheckReport| -> HashMap<String, Classification> {
            report
                .entries
                .iter()
                .map(|e| (e.key.to_string(), e.result.classification))
                .collect()
        };

        let before = classes(previous);
        let after = classes(self);

        let mut improved = Vec::new();
        let mut regressed = Vec::new();
        let mut unchanged = 0usize;
        let mut new_entries = 0usize;

        for entry in &self.entries {
            let key = entry.key.to_string();
            let current = entry.result.classification;
            match before.get(&key) {
                Some(&earlier) if rank(current) > rank(earlier) => improved.push(Change {
                    key,
                    before: earlier,
                    after: current,
                }),
                Some(&earlier) if rank(current) < rank(earlier) => regressed.push(Change {
                    key,
                    before: earlier,
                    after: current,
                }),
                Some(_) => unchanged += 1,
                None => new_entries += 1,
            }
        }

        let removed_entries = before.keys().filter(|k| !after.contains_key(*k)).count();

        ProgressDelta {
            score_delta: i64::from(self.score) - i64::from(previous.score),
            improved,
            regressed,
            unchanged,
            new_entries,
            removed_entries,
        }
    }
}

fn rank(c: Classification) -> u8 {
    match c {
        Classification::Empty => 0,
        Classification::Incorrect => 1,
        Classification::Partial => 2,
        Classification::Correct => 3,
    }
}

/// Result of comparing two check reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressDelta {
    /// Change in weighted score, in percentage points.
    pub score_delta: i64,
    pub improved: Vec<Change>,
    pub regressed: Vec<Change>,
    pub unchanged: usize,
    /// Entries graded now but not before.
    pub new_entries: usize,
    /// Entries graded before but not now.
    pub removed_entries: usize,
}

/// One entry whose classification changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub key: String,
    pub before: Classification,
    pub after: Classification,
}

impl ProgressDelta {
    pub fn has_regressions(&self) -> bool {
        !self.regressed.is_empty()
    }

    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Progress:** {:+} points, {} improved, {} regressed, {} unchanged\n\n",
            self.score_delta,
            self.improved.len(),
            self.regressed.len(),
            self.unchanged
        ));

        for (title, changes) in [("Improved", &self.improved), ("Regressed", &self.regressed)] {
            if changes.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Key | Before | After |\n");
            md.push_str("|-----|--------|-------|\n");
            for c in changes {
                md.push_str(&format!("| {} | {} | {} |\n", c.key, c.before, c.after));
            }
            md.push('\n');
        }

        md
    }
}
