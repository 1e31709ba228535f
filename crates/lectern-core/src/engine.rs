//! Check engine: loads reference answers and grades worksheets.
//!
//! Each worksheet check awaits exactly one answer load. Several worksheets
//! can be checked with bounded concurrency; results keep input order.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use futures::stream::{self, StreamExt};

use crate::grader::{grade_all, GradeOptions, GradedEntry};
use crate::model::Worksheet;
use crate::report::CheckReport;
use crate::traits::AnswerSource;

/// Configuration for the check engine.
#[derive(Debug, Clone)]
pub struct CheckEngineConfig {
    pub grade: GradeOptions,
    /// Maximum worksheets checked at once by [`CheckEngine::run_all`].
    pub parallelism: usize,
}

impl Default for CheckEngineConfig {
    fn default() -> Self {
        Self {
            grade: GradeOptions::default(),
            parallelism: 4,
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_check_start(&self, worksheet_id: &str);
    fn on_entry_graded(&self, worksheet_id: &str, entry: &GradedEntry);
    fn on_check_error(&self, worksheet_id: &str, error: &str);
    fn on_check_complete(&self, report: &CheckReport);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_check_start(&self, _: &str) {}
    fn on_entry_graded(&self, _: &str, _: &GradedEntry) {}
    fn on_check_error(&self, _: &str, _: &str) {}
    fn on_check_complete(&self, _: &CheckReport) {}
}

/// Grades worksheets against an answer source.
pub struct CheckEngine {
    source: Arc<dyn AnswerSource>,
    config: CheckEngineConfig,
}

impl CheckEngine {
    pub fn new(source: Arc<dyn AnswerSource>, config: CheckEngineConfig) -> Self {
        Self { source, config }
    }

    /// Check one worksheet.
    ///
    /// A failed answer load is reported to `progress` and returned; nothing is
    /// graded in that case.
    pub async fn run(
        &self,
        worksheet: &Worksheet,
        progress: &dyn ProgressReporter,
    ) -> Result<CheckReport> {
        let start = Instant::now();
        progress.on_check_start(&worksheet.id);

        let answers = match self.source.load_answers(worksheet).await {
            Ok(answers) => answers,
            Err(e) => {
                progress.on_check_error(&worksheet.id, &format!("{e:#}"));
                return Err(e);
            }
        };

        let run = grade_all(&worksheet.inputs, &answers, self.config.grade);
        for entry in &run.entries {
            progress.on_entry_graded(&worksheet.id, entry);
        }

        let elapsed = start.elapsed();
        let report = CheckReport::from_run(
            worksheet,
            run,
            self.source.name(),
            elapsed.as_millis() as u64,
        );

        tracing::info!(
            "checked {}: {}/{} correct, score {}% in {:.1}ms",
            worksheet.id,
            report.correct,
            report.total,
            report.score,
            elapsed.as_secs_f64() * 1000.0
        );
        progress.on_check_complete(&report);

        Ok(report)
    }

    /// Check several worksheets, returning one result per worksheet in order.
    pub async fn run_all(
        &self,
        worksheets: &[Worksheet],
        progress: &dyn ProgressReporter,
    ) -> Vec<Result<CheckReport>> {
        stream::iter(worksheets)
            .map(|sheet| self.run(sheet, progress))
            .buffered(self.config.parallelism.max(1))
            .collect()
            .await
    }
}
