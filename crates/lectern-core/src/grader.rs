//! Similarity-based answer grading.
//!
//! `grade` classifies a single answer; `grade_all` runs a whole worksheet
//! against an answer set and builds the tally, and `Outcome::from_tally`
//! turns the tally into the single message reported to the learner.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{AnswerInput, AnswerKey, AnswerSet};
use crate::similarity::similarity;

/// Scores at or above this are correct.
pub const CORRECT_THRESHOLD: f64 = 0.85;
/// Scores at or above this (and below [`CORRECT_THRESHOLD`]) are partial.
pub const PARTIAL_THRESHOLD: f64 = 0.60;
/// Credit a partial answer earns in the weighted score.
pub const PARTIAL_CREDIT: f64 = 0.6;

/// How an answer compares to its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Empty,
    Correct,
    Partial,
    Incorrect,
}

impl Classification {
    pub fn is_correct(self) -> bool {
        matches!(self, Classification::Correct)
    }

    /// Feedback line shown next to the answer.
    pub fn feedback(self) -> &'static str {
        match self {
            Classification::Empty => "✗ Please fill in an answer",
            Classification::Correct => "✓ Correct!",
            Classification::Partial => "△ Partially correct, compare with the reference and revise",
            Classification::Incorrect => "✗ Incorrect, compare with the reference and revise",
        }
    }

    /// Style class; an empty answer is styled as incorrect.
    pub fn css_class(self) -> &'static str {
        match self {
            Classification::Correct => "correct",
            Classification::Partial => "partial",
            Classification::Empty | Classification::Incorrect => "incorrect",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Empty => write!(f, "empty"),
            Classification::Correct => write!(f, "correct"),
            Classification::Partial => write!(f, "partial"),
            Classification::Incorrect => write!(f, "incorrect"),
        }
    }
}

/// Classification plus the similarity score that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    pub classification: Classification,
    /// Similarity in `[0, 1]`; 0 for an empty answer.
    pub score: f64,
}

/// Map a similarity score onto the fixed thresholds.
pub fn classify(score: f64) -> Classification {
    if score >= CORRECT_THRESHOLD {
        Classification::Correct
    } else if score >= PARTIAL_THRESHOLD {
        Classification::Partial
    } else {
        Classification::Incorrect
    }
}

/// Grade one answer against one reference text.
pub fn grade(user_answer: &str, reference: &str) -> GradingResult {
    let answer = user_answer.trim();
    if answer.is_empty() {
        return GradingResult {
            classification: Classification::Empty,
            score: 0.0,
        };
    }

    let score = similarity(answer, reference);
    GradingResult {
        classification: classify(score),
        score,
    }
}

/// Grade against several accepted references and keep the best score.
pub fn grade_best(user_answer: &str, references: &[&str]) -> GradingResult {
    references
        .iter()
        .map(|r| grade(user_answer, r))
        .reduce(|best, next| if next.score > best.score { next } else { best })
        .unwrap_or_else(|| grade(user_answer, ""))
}

/// Options for an aggregate grading pass.
#[derive(Debug, Clone, Copy)]
pub struct GradeOptions {
    /// Also accept a record's alternate text.
    pub accept_alternate_versions: bool,
}

impl Default for GradeOptions {
    fn default() -> Self {
        Self {
            accept_alternate_versions: true,
        }
    }
}

/// A graded worksheet input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedEntry {
    /// Index of the input in the worksheet.
    pub position: usize,
    pub key: AnswerKey,
    /// The trimmed answer as graded.
    pub answer: String,
    pub result: GradingResult,
    /// Reference text, revealed only for answers that need correction.
    #[serde(default)]
    pub revealed_reference: Option<String>,
}

/// An input that needs the learner's attention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionItem {
    pub position: usize,
    pub key: AnswerKey,
    pub classification: Classification,
}

/// Why an input was left out of grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The input does not declare a reference answer.
    NoReference,
    /// The answer set has no record for the key.
    MissingRecord,
    /// The record exists but carries no usable reference text.
    NoReferenceData,
}

/// Running counts of one grading pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tally {
    /// Answerable questions seen.
    pub total: usize,
    pub correct: usize,
    pub partial: usize,
    /// Non-correct inputs in document order.
    pub needs_attention: Vec<AttentionItem>,
}

impl Tally {
    /// Weighted percentage: correct counts 1, partial counts [`PARTIAL_CREDIT`].
    pub fn weighted_score(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let earned = self.correct as f64 + self.partial as f64 * PARTIAL_CREDIT;
        (earned / self.total as f64 * 100.0).round() as u32
    }
}

/// Result of grading a full worksheet.
#[derive(Debug, Clone, Default)]
pub struct CheckRun {
    pub entries: Vec<GradedEntry>,
    pub skipped: Vec<(usize, SkipReason)>,
    pub tally: Tally,
}

impl CheckRun {
    pub fn outcome(&self) -> Outcome {
        Outcome::from_tally(&self.tally)
    }
}

/// Grade every answerable input, in document order.
pub fn grade_all(inputs: &[AnswerInput], answers: &AnswerSet, options: GradeOptions) -> CheckRun {
    let mut run = CheckRun::default();

    for (position, input) in inputs.iter().enumerate() {
        let Some(key) = input.key() else {
            run.skipped.push((position, SkipReason::NoReference));
            continue;
        };
        let Some(record) = answers.get(&key) else {
            tracing::debug!("no answer record for {key}, skipping");
            run.skipped.push((position, SkipReason::MissingRecord));
            continue;
        };
        if !record.is_answerable() {
            tracing::debug!("answer record for {key} has no data, skipping");
            run.skipped.push((position, SkipReason::NoReferenceData));
            continue;
        }

        run.tally.total += 1;

        let references = record.reference_texts(options.accept_alternate_versions);
        let result = grade_best(&input.value, &references);

        match result.classification {
            Classification::Correct => run.tally.correct += 1,
            Classification::Partial => run.tally.partial += 1,
            Classification::Empty | Classification::Incorrect => {}
        }
        if !result.classification.is_correct() {
            run.tally.needs_attention.push(AttentionItem {
                position,
                key: key.clone(),
                classification: result.classification,
            });
        }

        let revealed_reference =
            (!result.classification.is_correct()).then(|| record.text.clone());
        run.entries.push(GradedEntry {
            position,
            key,
            answer: input.value.trim().to_string(),
            result,
            revealed_reference,
        });
    }

    run
}

/// The single message a grading pass reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Some answers need correction; jump to the first one.
    LocateFirstError { first: AttentionItem, count: usize },
    /// Every answerable question is correct.
    AllCorrect { total: usize },
    /// Nothing in the worksheet could be graded.
    NothingToCheck,
    /// Fallback count summary.
    Summary { correct: usize, total: usize },
}

/// One entry of the outcome policy: the first rule whose predicate holds wins.
struct OutcomeRule {
    applies: fn(&Tally) -> bool,
    outcome: fn(&Tally) -> Outcome,
}

fn has_errors(t: &Tally) -> bool {
    !t.needs_attention.is_empty()
}

fn locate_first_error(t: &Tally) -> Outcome {
    Outcome::LocateFirstError {
        first: t.needs_attention[0].clone(),
        count: t.needs_attention.len(),
    }
}

fn all_correct(t: &Tally) -> bool {
    t.total > 0 && t.correct == t.total
}

fn full_success(t: &Tally) -> Outcome {
    Outcome::AllCorrect { total: t.total }
}

fn nothing_answerable(t: &Tally) -> bool {
    t.total == 0
}

fn nothing_to_check(_: &Tally) -> Outcome {
    Outcome::NothingToCheck
}

fn always(_: &Tally) -> bool {
    true
}

fn summary(t: &Tally) -> Outcome {
    Outcome::Summary {
        correct: t.correct,
        total: t.total,
    }
}

/// Evaluated strictly in this order.
const OUTCOME_RULES: [OutcomeRule; 4] = [
    OutcomeRule {
        applies: has_errors,
        outcome: locate_first_error,
    },
    OutcomeRule {
        applies: all_correct,
        outcome: full_success,
    },
    OutcomeRule {
        applies: nothing_answerable,
        outcome: nothing_to_check,
    },
    OutcomeRule {
        applies: always,
        outcome: summary,
    },
];

impl Outcome {
    pub fn from_tally(tally: &Tally) -> Self {
        OUTCOME_RULES
            .iter()
            .find(|rule| (rule.applies)(tally))
            .map(|rule| (rule.outcome)(tally))
            .unwrap_or_else(|| summary(tally))
    }

    /// Notification text for this outcome.
    pub fn message(&self) -> String {
        match self {
            Outcome::LocateFirstError { first, count } => format!(
                "❌ Found {count} answer(s) needing correction, first at {}",
                first.key
            ),
            Outcome::AllCorrect { .. } => "🎉 All answers are correct!".to_string(),
            Outcome::NothingToCheck => "ℹ️ Nothing to check in this section".to_string(),
            Outcome::Summary { correct, total } => {
                format!("✓ Check complete - {correct}/{total} correct")
            }
        }
    }

    /// Whether the learner has nothing left to fix.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::AllCorrect { .. })
    }
}

/// Coarse band for a weighted score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    Pass,
    KeepPracticing,
}

impl ScoreBand {
    pub fn from_score(score: u32) -> Self {
        if score >= 90 {
            ScoreBand::Excellent
        } else if score >= 75 {
            ScoreBand::Good
        } else if score >= 60 {
            ScoreBand::Pass
        } else {
            ScoreBand::KeepPracticing
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent! You know this section very well.",
            ScoreBand::Good => "Good! Keep going.",
            ScoreBand::Pass => "Passed. A little more review will help.",
            ScoreBand::KeepPracticing => "Keep practicing, read the passages a few more times.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerRecord;

    fn record(text: &str) -> AnswerRecord {
        AnswerRecord {
            reference: String::new(),
            text: text.into(),
            has_data: true,
            ..Default::default()
        }
    }

    fn input(question: &str, reference: &str, value: &str) -> AnswerInput {
        AnswerInput {
            question: question.into(),
            reference: Some(reference.into()),
            has_answer: true,
            value: value.into(),
        }
    }

    fn answer_set(records: &[(&str, &str, AnswerRecord)]) -> AnswerSet {
        let mut set = AnswerSet::default();
        for (q, r, rec) in records {
            set.answers
                .insert(AnswerKey::new(*q, *r).to_string(), rec.clone());
        }
        set
    }

    #[test]
    fn identical_answer_is_correct() {
        let result = grade("光合作用产生氧气", "光合作用产生氧气");
        assert_eq!(result.classification, Classification::Correct);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn blank_answer_is_empty() {
        for blank in ["", "   ", "\n\t"] {
            let result = grade(blank, "光合作用产生氧气");
            assert_eq!(result.classification, Classification::Empty);
            assert!(!result.classification.is_correct());
        }
    }

    #[test]
    fn threshold_boundaries() {
        assert_eq!(classify(1.0), Classification::Correct);
        assert_eq!(classify(0.85), Classification::Correct);
        assert_eq!(classify(0.849_999), Classification::Partial);
        assert_eq!(classify(0.60), Classification::Partial);
        assert_eq!(classify(0.599_999), Classification::Incorrect);
        assert_eq!(classify(0.0), Classification::Incorrect);
    }

    #[test]
    fn threshold_boundaries_through_grade() {
        let reference = "abcdefghijklmnopqrst";
        assert_eq!(
            grade("abcdefghijklmnopq", reference).classification,
            Classification::Correct
        );
        assert_eq!(
            grade("abcdefghijkl", reference).classification,
            Classification::Partial
        );
        assert_eq!(
            grade("abcdefghijk", reference).classification,
            Classification::Incorrect
        );
    }

    #[test]
    fn grade_best_prefers_alternate() {
        let result = grade_best("the quick brown fox", &["something else", "the quick brown fox"]);
        assert_eq!(result.classification, Classification::Correct);
        assert_eq!(grade_best("x", &[]).classification, Classification::Incorrect);
    }

    #[test]
    fn grade_all_skips_unanswerable() {
        let set = answer_set(&[
            ("1", "A", record("alpha beta gamma")),
            (
                "2",
                "B",
                AnswerRecord {
                    has_data: false,
                    ..record("ignored")
                },
            ),
        ]);
        let inputs = vec![
            input("1", "A", "alpha beta gamma"),
            input("2", "B", ""),
            input("3", "C", ""),
            AnswerInput {
                has_answer: false,
                ..input("4", "D", "")
            },
        ];

        let run = grade_all(&inputs, &set, GradeOptions::default());
        assert_eq!(run.tally.total, 1);
        assert_eq!(run.tally.correct, 1);
        assert!(run.tally.needs_attention.is_empty());
        assert_eq!(
            run.skipped,
            vec![
                (1, SkipReason::NoReferenceData),
                (2, SkipReason::MissingRecord),
                (3, SkipReason::NoReference),
            ]
        );
        assert_eq!(run.outcome(), Outcome::AllCorrect { total: 1 });
    }

    #[test]
    fn empty_answer_becomes_first_error() {
        let set = answer_set(&[
            ("1", "A", record("光合作用产生氧气")),
            ("2", "B", record("植物需要阳光")),
        ]);
        let inputs = vec![input("1", "A", ""), input("2", "B", "完全不同的内容")];

        let run = grade_all(&inputs, &set, GradeOptions::default());
        assert_eq!(run.tally.total, 2);
        assert_eq!(run.tally.correct, 0);
        assert_eq!(run.tally.needs_attention.len(), 2);
        assert_eq!(
            run.tally.needs_attention[0].classification,
            Classification::Empty
        );

        match run.outcome() {
            Outcome::LocateFirstError { first, count } => {
                assert_eq!(first.position, 0);
                assert_eq!(first.key, AnswerKey::new("1", "A"));
                assert_eq!(count, 2);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn attention_list_follows_document_order() {
        let set = answer_set(&[
            ("1", "A", record("abcdefghijklmnopqrst")),
            ("2", "B", record("abcdefghijklmnopqrst")),
            ("3", "C", record("abcdefghijklmnopqrst")),
        ]);
        // partial, incorrect, empty in document order
        let inputs = vec![
            input("1", "A", "abcdefghijkl"),
            input("2", "B", "zzz"),
            input("3", "C", ""),
        ];
        let run = grade_all(&inputs, &set, GradeOptions::default());
        let classes: Vec<_> = run
            .tally
            .needs_attention
            .iter()
            .map(|a| a.classification)
            .collect();
        assert_eq!(
            classes,
            vec![
                Classification::Partial,
                Classification::Incorrect,
                Classification::Empty
            ]
        );
        assert!(run.entries[0].revealed_reference.is_some());
    }

    #[test]
    fn correct_entries_do_not_reveal_reference() {
        let set = answer_set(&[("1", "A", record("same text"))]);
        let run = grade_all(&[input("1", "A", " same text ")], &set, GradeOptions::default());
        assert_eq!(run.entries[0].answer, "same text");
        assert!(run.entries[0].revealed_reference.is_none());
    }

    #[test]
    fn alternate_versions_can_be_disabled() {
        let set = answer_set(&[(
            "1",
            "A",
            AnswerRecord {
                text_alt: Some("second translation".into()),
                ..record("first version of the verse")
            },
        )]);
        let inputs = [input("1", "A", "second translation")];

        let with_alt = grade_all(&inputs, &set, GradeOptions::default());
        assert_eq!(with_alt.tally.correct, 1);

        let without_alt = grade_all(
            &inputs,
            &set,
            GradeOptions {
                accept_alternate_versions: false,
            },
        );
        assert_eq!(without_alt.tally.correct, 0);
    }

    #[test]
    fn outcome_nothing_to_check() {
        let run = grade_all(&[], &AnswerSet::default(), GradeOptions::default());
        assert_eq!(run.outcome(), Outcome::NothingToCheck);
        assert!(!run.outcome().is_success());
    }

    #[test]
    fn outcome_summary_fallback() {
        let tally = Tally {
            total: 3,
            correct: 2,
            partial: 0,
            needs_attention: vec![],
        };
        assert_eq!(
            Outcome::from_tally(&tally),
            Outcome::Summary {
                correct: 2,
                total: 3
            }
        );
        assert_eq!(
            Outcome::from_tally(&tally).message(),
            "✓ Check complete - 2/3 correct"
        );
    }

    #[test]
    fn errors_take_priority_over_everything() {
        // A tally where correct == total would otherwise be full success.
        let tally = Tally {
            total: 1,
            correct: 1,
            partial: 0,
            needs_attention: vec![AttentionItem {
                position: 4,
                key: AnswerKey::new("5", "E"),
                classification: Classification::Partial,
            }],
        };
        assert!(matches!(
            Outcome::from_tally(&tally),
            Outcome::LocateFirstError { count: 1, .. }
        ));
    }

    #[test]
    fn weighted_score_and_band() {
        let tally = Tally {
            total: 4,
            correct: 2,
            partial: 1,
            needs_attention: vec![],
        };
        // (2 + 0.6) / 4 = 65%
        assert_eq!(tally.weighted_score(), 65);
        assert_eq!(ScoreBand::from_score(65), ScoreBand::Pass);
        assert_eq!(ScoreBand::from_score(90), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_score(75), ScoreBand::Good);
        assert_eq!(ScoreBand::from_score(59), ScoreBand::KeepPracticing);
        assert_eq!(Tally::default().weighted_score(), 0);
    }

    #[test]
    fn classification_serde_lowercase() {
        let json = serde_json::to_string(&Classification::Partial).unwrap();
        assert_eq!(json, "\"partial\"");
        assert_eq!(Classification::Empty.css_class(), "incorrect");
    }
}
