//! Async seams for loading reference answers and documents.
//!
//! Loading is the only place lectern suspends. Each load is awaited once,
//! with no timeout, cancellation or retry; failures propagate to the caller.

use async_trait::async_trait;

use crate::markdown::{self, Block};
use crate::model::{AnswerSet, Worksheet};

/// Supplies the reference answers for a worksheet.
#[async_trait]
pub trait AnswerSource: Send + Sync {
    /// Human-readable source name (e.g. a directory path).
    fn name(&self) -> &str;

    /// Load the answer set that belongs to `worksheet`.
    async fn load_answers(&self, worksheet: &Worksheet) -> anyhow::Result<AnswerSet>;
}

/// Supplies the markdown text of the document being read.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_document(&self) -> anyhow::Result<String>;
}

/// Fetch a document and convert it to blocks.
pub async fn load_document(source: &dyn DocumentSource) -> anyhow::Result<Vec<Block>> {
    let text = source.fetch_document().await?;
    let blocks = markdown::parse(&text);
    tracing::debug!("converted {} into {} blocks", source.name(), blocks.len());
    Ok(blocks)
}
