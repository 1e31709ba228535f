//! File-system and in-memory implementations of the source traits.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;

use crate::model::{AnswerSet, Worksheet};
use crate::parser::parse_answer_set_str;
use crate::traits::{AnswerSource, DocumentSource};

/// Where a [`FsAnswerSource`] looks for answer sets.
#[derive(Debug, Clone)]
enum AnswerLocation {
    /// `{dir}/{worksheet id}.json`, unless the worksheet names its own file.
    Directory(PathBuf),
    /// One fixed file for every worksheet.
    File(PathBuf),
}

/// Reads answer sets from JSON files.
#[derive(Debug, Clone)]
pub struct FsAnswerSource {
    location: AnswerLocation,
    name: String,
}

impl FsAnswerSource {
    /// Resolve answer sets inside `dir`.
    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            name: dir.display().to_string(),
            location: AnswerLocation::Directory(dir),
        }
    }

    /// Always read the answer set at `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: path.display().to_string(),
            location: AnswerLocation::File(path),
        }
    }

    /// The file an answer set for `worksheet` is read from.
    pub fn resolve(&self, worksheet: &Worksheet) -> PathBuf {
        match &self.location {
            AnswerLocation::File(path) => path.clone(),
            AnswerLocation::Directory(dir) => match &worksheet.answers {
                Some(explicit) => explicit.clone(),
                None => dir.join(format!("{}.json", worksheet.id)),
            },
        }
    }
}

#[async_trait]
impl AnswerSource for FsAnswerSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load_answers(&self, worksheet: &Worksheet) -> anyhow::Result<AnswerSet> {
        let path = self.resolve(worksheet);
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read answer set: {}", path.display()))?;
        let set = parse_answer_set_str(&content, &path)?;
        tracing::info!(
            "loaded {} answers ({} answerable) from {}",
            set.answers.len(),
            set.answerable_count(),
            path.display()
        );
        Ok(set)
    }
}

/// Serves one answer set from memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAnswerSource {
    set: AnswerSet,
}

impl InMemoryAnswerSource {
    pub fn new(set: AnswerSet) -> Self {
        Self { set }
    }
}

#[async_trait]
impl AnswerSource for InMemoryAnswerSource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load_answers(&self, _worksheet: &Worksheet) -> anyhow::Result<AnswerSet> {
        Ok(self.set.clone())
    }
}

/// Reads a markdown document from a fixed path.
#[derive(Debug, Clone)]
pub struct FsDocumentSource {
    path: PathBuf,
    name: String,
}

impl FsDocumentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: path.display().to_string(),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DocumentSource for FsDocumentSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_document(&self) -> anyhow::Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read document: {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::Block;
    use crate::traits::load_document;

    const ANSWERS: &str = r#"{
        "section_title": "Test",
        "answers": {
            "q1_John 3:16": {"reference": "John 3:16", "text": "For God so loved the world", "has_data": true}
        }
    }"#;

    fn worksheet(id: &str) -> Worksheet {
        Worksheet {
            id: id.into(),
            title: id.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn directory_source_uses_worksheet_id() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lesson-1.json"), ANSWERS).unwrap();

        let source = FsAnswerSource::directory(dir.path());
        let set = source.load_answers(&worksheet("lesson-1")).await.unwrap();
        assert_eq!(set.answers.len(), 1);

        let missing = source.load_answers(&worksheet("lesson-2")).await;
        let err = missing.unwrap_err();
        assert!(format!("{err:#}").contains("failed to read answer set"));
    }

    #[tokio::test]
    async fn explicit_worksheet_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("custom.json");
        std::fs::write(&file, ANSWERS).unwrap();

        let mut sheet = worksheet("other");
        sheet.answers = Some(file.clone());
        let source = FsAnswerSource::directory(dir.path().join("unused"));
        assert_eq!(source.resolve(&sheet), file);
        assert!(source.load_answers(&sheet).await.is_ok());
    }

    #[tokio::test]
    async fn file_source_ignores_worksheet() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("answers.json");
        std::fs::write(&file, ANSWERS).unwrap();

        let source = FsAnswerSource::file(&file);
        let set = source.load_answers(&worksheet("anything")).await.unwrap();
        assert_eq!(set.title.as_deref(), Some("Test"));
    }

    #[tokio::test]
    async fn malformed_answer_set_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("answers.json");
        std::fs::write(&file, "{ not json").unwrap();

        let source = FsAnswerSource::file(&file);
        assert!(source.load_answers(&worksheet("x")).await.is_err());
    }

    #[tokio::test]
    async fn document_source_converts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "# Title\n\nBody").unwrap();

        let source = FsDocumentSource::new(&path);
        let blocks = load_document(&source).await.unwrap();
        assert_eq!(blocks.len(), 3);
        assert!(matches!(blocks[1], Block::Spacer));

        let missing = FsDocumentSource::new(dir.path().join("absent.md"));
        assert!(load_document(&missing).await.is_err());
    }
}
