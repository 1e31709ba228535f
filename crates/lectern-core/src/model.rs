//! Core data model types for lectern.
//!
//! Worksheets hold the learner's inputs in document order; answer sets hold
//! the reference texts those inputs are graded against.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Key joining a question to one of its reference answers.
///
/// Rendered and serialized as `q{question}_{reference}`, the shape used by
/// answer set files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct AnswerKey {
    /// Question identifier within the worksheet.
    pub question: String,
    /// Reference tag (e.g. a verse reference).
    pub reference: String,
}

impl AnswerKey {
    pub fn new(question: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            reference: reference.into(),
        }
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}_{}", self.question, self.reference)
    }
}

impl FromStr for AnswerKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix('q')
            .ok_or_else(|| format!("answer key must start with 'q': {s}"))?;
        match rest.split_once('_') {
            Some((question, reference)) if !question.is_empty() && !reference.is_empty() => {
                Ok(AnswerKey::new(question, reference))
            }
            _ => Err(format!("answer key must look like q<question>_<reference>: {s}")),
        }
    }
}

impl From<AnswerKey> for String {
    fn from(key: AnswerKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for AnswerKey {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A stored reference answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Reference tag this text belongs to.
    #[serde(default)]
    pub reference: String,
    /// The canonical reference text.
    #[serde(default)]
    pub text: String,
    /// Whether reference data exists for this key.
    #[serde(default)]
    pub has_data: bool,
    /// Label of the version `text` comes from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// An alternate accepted text, usually another translation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_alt: Option<String>,
    /// Label of the version `text_alt` comes from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_alt: Option<String>,
    /// Free-form note, e.g. why data is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl AnswerRecord {
    /// A record takes part in grading only with the flag set and real text.
    pub fn is_answerable(&self) -> bool {
        self.has_data && !self.text.trim().is_empty()
    }

    /// Texts an answer may be graded against, canonical text first.
    pub fn reference_texts(&self, include_alternates: bool) -> Vec<&str> {
        let mut texts = vec![self.text.as_str()];
        if include_alternates {
            if let Some(alt) = self.text_alt.as_deref().filter(|t| !t.trim().is_empty()) {
                texts.push(alt);
            }
        }
        texts
    }
}

/// A set of reference answers for one worksheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerSet {
    /// Human-readable title of the section these answers belong to.
    #[serde(default, alias = "section_title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Records keyed by `q{question}_{reference}`.
    #[serde(default)]
    pub answers: BTreeMap<String, AnswerRecord>,
}

impl AnswerSet {
    /// Look up the record for a key.
    pub fn get(&self, key: &AnswerKey) -> Option<&AnswerRecord> {
        self.answers.get(&key.to_string())
    }

    /// Look up the record for a key, only if it is answerable.
    pub fn answerable(&self, key: &AnswerKey) -> Option<&AnswerRecord> {
        self.get(key).filter(|r| r.is_answerable())
    }

    /// Number of answerable records in the set.
    pub fn answerable_count(&self) -> usize {
        self.answers.values().filter(|r| r.is_answerable()).count()
    }
}

/// One answer field of a worksheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerInput {
    /// Question identifier.
    pub question: String,
    /// Reference tag the answer should reproduce.
    #[serde(default)]
    pub reference: Option<String>,
    /// Whether the worksheet advertises a reference answer for this field.
    #[serde(default)]
    pub has_answer: bool,
    /// What the learner typed.
    #[serde(default)]
    pub value: String,
}

impl AnswerInput {
    /// The answer key, if this input declares a gradable reference.
    pub fn key(&self) -> Option<AnswerKey> {
        if !self.has_answer {
            return None;
        }
        self.reference
            .as_deref()
            .filter(|r| !r.is_empty())
            .map(|r| AnswerKey::new(self.question.clone(), r))
    }

    pub fn is_filled(&self) -> bool {
        !self.value.trim().is_empty()
    }
}

/// A worksheet: answer inputs in document order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Worksheet {
    /// Unique identifier, also the default answer set file stem.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Explicit answer set path, relative to the worksheet file.
    #[serde(default)]
    pub answers: Option<PathBuf>,
    /// Answer inputs in document order.
    #[serde(default)]
    pub inputs: Vec<AnswerInput>,
    /// Free-text personal application field.
    #[serde(default)]
    pub application: Option<String>,
}

impl Worksheet {
    /// How much of the worksheet has been filled in.
    pub fn fill_progress(&self) -> FillProgress {
        let mut progress = FillProgress {
            filled: self.inputs.iter().filter(|i| i.is_filled()).count(),
            total: self.inputs.len(),
        };
        if let Some(application) = &self.application {
            progress.total += 1;
            if !application.trim().is_empty() {
                progress.filled += 1;
            }
        }
        progress
    }
}

/// Filled versus total fields of a worksheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillProgress {
    pub filled: usize,
    pub total: usize,
}

impl FillProgress {
    /// Rounded percentage, 0 for an empty worksheet.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.filled as f64 / self.total as f64 * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_key_display_and_parse() {
        let key = AnswerKey::new("3", "罗马书 3:23");
        assert_eq!(key.to_string(), "q3_罗马书 3:23");
        assert_eq!("q3_罗马书 3:23".parse::<AnswerKey>().unwrap(), key);
        assert!("3_John 3:16".parse::<AnswerKey>().is_err());
        assert!("q3".parse::<AnswerKey>().is_err());
        assert!("q_John".parse::<AnswerKey>().is_err());
    }

    #[test]
    fn answer_key_serializes_as_string() {
        let key = AnswerKey::new("2", "Romans 3:23");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"q2_Romans 3:23\"");
        assert_eq!(serde_json::from_str::<AnswerKey>(&json).unwrap(), key);
        assert!(serde_json::from_str::<AnswerKey>("\"Romans\"").is_err());
    }

    #[test]
    fn record_answerable_requires_flag_and_text() {
        let mut record = AnswerRecord {
            reference: "John 3:16".into(),
            text: "For God so loved the world".into(),
            has_data: true,
            ..Default::default()
        };
        assert!(record.is_answerable());

        record.has_data = false;
        assert!(!record.is_answerable());

        record.has_data = true;
        record.text = "   ".into();
        assert!(!record.is_answerable());
    }

    #[test]
    fn reference_texts_skip_blank_alternate() {
        let record = AnswerRecord {
            text: "main".into(),
            text_alt: Some(" ".into()),
            has_data: true,
            ..Default::default()
        };
        assert_eq!(record.reference_texts(true), vec!["main"]);

        let record = AnswerRecord {
            text_alt: Some("alt".into()),
            ..record
        };
        assert_eq!(record.reference_texts(true), vec!["main", "alt"]);
        assert_eq!(record.reference_texts(false), vec!["main"]);
    }

    #[test]
    fn input_key_requires_flag_and_reference() {
        let input = AnswerInput {
            question: "1".into(),
            reference: Some("John 3:16".into()),
            has_answer: true,
            value: String::new(),
        };
        assert_eq!(input.key().unwrap().to_string(), "q1_John 3:16");

        let no_flag = AnswerInput {
            has_answer: false,
            ..input.clone()
        };
        assert!(no_flag.key().is_none());

        let no_ref = AnswerInput {
            reference: Some(String::new()),
            ..input
        };
        assert!(no_ref.key().is_none());
    }

    #[test]
    fn answer_set_parses_published_shape() {
        let json = r#"{
            "lesson_id": 1,
            "section_title": "Sin separates us from God",
            "answers": {
                "q1_Isaiah 59:1,2": {
                    "reference": "Isaiah 59:1,2",
                    "text": "Surely the arm of the LORD is not too short to save",
                    "has_data": true
                },
                "q2_Tobit 1:1": {
                    "reference": "Tobit 1:1",
                    "text": "",
                    "has_data": false,
                    "note": "no data for this book"
                }
            }
        }"#;
        let set: AnswerSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.title.as_deref(), Some("Sin separates us from God"));
        assert_eq!(set.answers.len(), 2);
        assert_eq!(set.answerable_count(), 1);
        assert!(set
            .answerable(&AnswerKey::new("1", "Isaiah 59:1,2"))
            .is_some());
        assert!(set.answerable(&AnswerKey::new("2", "Tobit 1:1")).is_none());
        assert!(set.get(&AnswerKey::new("9", "Nowhere")).is_none());
    }

    #[test]
    fn fill_progress_counts_application() {
        let sheet = Worksheet {
            id: "s".into(),
            title: "S".into(),
            inputs: vec![
                AnswerInput {
                    question: "1".into(),
                    value: "filled".into(),
                    ..Default::default()
                },
                AnswerInput {
                    question: "2".into(),
                    value: "  ".into(),
                    ..Default::default()
                },
            ],
            application: Some("I will pray daily".into()),
            ..Default::default()
        };
        let progress = sheet.fill_progress();
        assert_eq!(progress, FillProgress { filled: 2, total: 3 });
        assert_eq!(progress.percent(), 67);
        assert_eq!(FillProgress { filled: 0, total: 0 }.percent(), 0);
    }
}
