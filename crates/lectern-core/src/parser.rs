//! Worksheet and answer set loading.
//!
//! Worksheets are TOML files; answer sets are JSON objects keyed by
//! `q{question}_{reference}`. Both can be validated for common authoring
//! mistakes.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{AnswerInput, AnswerKey, AnswerSet, Worksheet};

/// Intermediate TOML structure for worksheet files.
#[derive(Debug, Deserialize)]
struct TomlWorksheetFile {
    worksheet: TomlWorksheetHeader,
    #[serde(default)]
    inputs: Vec<TomlInput>,
}

#[derive(Debug, Deserialize)]
struct TomlWorksheetHeader {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    answers: Option<PathBuf>,
    #[serde(default)]
    application: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlInput {
    question: TomlQuestion,
    #[serde(default)]
    reference: Option<String>,
    #[serde(default = "default_true")]
    has_answer: bool,
    #[serde(default)]
    value: String,
}

/// Question ids may be written as `1` or `"1a"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TomlQuestion {
    Number(i64),
    Text(String),
}

impl From<TomlQuestion> for String {
    fn from(q: TomlQuestion) -> Self {
        match q {
            TomlQuestion::Number(n) => n.to_string(),
            TomlQuestion::Text(s) => s,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Parse a single worksheet file.
pub fn parse_worksheet(path: &Path) -> Result<Worksheet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read worksheet file: {}", path.display()))?;

    parse_worksheet_str(&content, path)
}

/// Parse worksheet TOML. A relative `answers` path is resolved against the
/// directory of `source_path`.
pub fn parse_worksheet_str(content: &str, source_path: &Path) -> Result<Worksheet> {
    let parsed: TomlWorksheetFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let answers = parsed.worksheet.answers.map(|path| match source_path.parent() {
        Some(base) => base.join(path),
        None => path,
    });

    let inputs = parsed
        .inputs
        .into_iter()
        .map(|i| AnswerInput {
            question: i.question.into(),
            reference: i.reference,
            has_answer: i.has_answer,
            value: i.value,
        })
        .collect();

    Ok(Worksheet {
        id: parsed.worksheet.id,
        title: parsed.worksheet.title,
        description: parsed.worksheet.description,
        answers,
        inputs,
        application: parsed.worksheet.application,
    })
}

/// Recursively load all `.toml` worksheets from a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_worksheet_directory(dir: &Path) -> Result<Vec<Worksheet>> {
    let mut sheets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            sheets.extend(load_worksheet_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_worksheet(&path) {
                Ok(sheet) => sheets.push(sheet),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(sheets)
}

/// Parse an answer set file.
pub fn parse_answer_set(path: &Path) -> Result<AnswerSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer set: {}", path.display()))?;

    parse_answer_set_str(&content, path)
}

/// Parse answer set JSON.
pub fn parse_answer_set_str(content: &str, source_path: &Path) -> Result<AnswerSet> {
    serde_json::from_str(content)
        .with_context(|| format!("failed to parse answer set JSON: {}", source_path.display()))
}

/// A warning from worksheet or answer set validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The answer key involved, if any.
    pub key: Option<String>,
    pub message: String,
}

impl ValidationWarning {
    fn new(key: Option<String>, message: impl Into<String>) -> Self {
        Self {
            key,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "[{key}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Validate a worksheet, optionally against the answer set it will be
/// graded with.
pub fn validate_worksheet(sheet: &Worksheet, answers: Option<&AnswerSet>) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if sheet.id.trim().is_empty() {
        warnings.push(ValidationWarning::new(None, "worksheet id is empty"));
    }

    if sheet.inputs.is_empty() {
        warnings.push(ValidationWarning::new(None, "worksheet has no inputs"));
    }

    let mut seen = HashSet::new();
    for (position, input) in sheet.inputs.iter().enumerate() {
        if !input.has_answer {
            continue;
        }
        let Some(key) = input.key() else {
            warnings.push(ValidationWarning::new(
                None,
                format!(
                    "input {} (question {}) expects an answer but has no reference",
                    position + 1,
                    input.question
                ),
            ));
            continue;
        };

        if !seen.insert(key.clone()) {
            warnings.push(ValidationWarning::new(
                Some(key.to_string()),
                "duplicate answer key",
            ));
        }

        if let Some(set) = answers {
            match set.get(&key) {
                None => warnings.push(ValidationWarning::new(
                    Some(key.to_string()),
                    "no reference answer in answer set; input will be skipped",
                )),
                Some(record) if !record.is_answerable() => {
                    warnings.push(ValidationWarning::new(
                        Some(key.to_string()),
                        "reference answer has no data; input will be skipped",
                    ))
                }
                Some(_) => {}
            }
        }
    }

    warnings
}

/// Validate an answer set on its own.
pub fn validate_answer_set(set: &AnswerSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for (raw_key, record) in &set.answers {
        let key = match raw_key.parse::<AnswerKey>() {
            Ok(key) => key,
            Err(e) => {
                warnings.push(ValidationWarning::new(Some(raw_key.clone()), e));
                continue;
            }
        };

        if record.has_data && record.text.trim().is_empty() {
            warnings.push(ValidationWarning::new(
                Some(raw_key.clone()),
                "has_data is true but text is empty",
            ));
        }

        if !record.reference.is_empty() && record.reference != key.reference {
            warnings.push(ValidationWarning::new(
                Some(raw_key.clone()),
                format!(
                    "reference field '{}' does not match key reference '{}'",
                    record.reference, key.reference
                ),
            ));
        }

        if record.version_alt.is_some() && record.text_alt.is_none() {
            warnings.push(ValidationWarning::new(
                Some(raw_key.clone()),
                "version_alt given without text_alt",
            ));
        }
    }

    warnings
}
