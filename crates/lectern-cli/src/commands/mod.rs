pub mod check;
pub mod compare;
pub mod goto;
pub mod grade;
pub mod init;
pub mod notes;
pub mod render;
pub mod search;
pub mod toc;
pub mod validate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use lectern_core::config::LecternConfig;
use lectern_core::markdown::Block;
use lectern_core::model::Worksheet;
use lectern_core::parser;
use lectern_core::session::ReaderContext;
use lectern_core::sources::{FsAnswerSource, FsDocumentSource};
use lectern_core::traits::{load_document, AnswerSource};

/// The document named on the command line, else the configured one.
pub(crate) fn document_path(config: &LecternConfig, document: Option<PathBuf>) -> Result<PathBuf> {
    document
        .or_else(|| config.document.clone())
        .context("no document given; pass --document or set `document` in lectern.toml")
}

/// Load and convert a markdown document.
pub(crate) async fn load_blocks(
    config: &LecternConfig,
    document: Option<PathBuf>,
) -> Result<(PathBuf, Vec<Block>)> {
    let path = document_path(config, document)?;
    let blocks = load_document(&FsDocumentSource::new(&path)).await?;
    Ok((path, blocks))
}

/// Storage context backed by the configured store files.
pub(crate) fn reader_context(config: &LecternConfig) -> ReaderContext {
    ReaderContext::new(
        Box::new(config.local_store()),
        Box::new(config.session_store()),
    )
}

/// A single worksheet file, or every worksheet under a directory.
pub(crate) fn load_worksheets(path: &Path) -> Result<Vec<Worksheet>> {
    if path.is_dir() {
        parser::load_worksheet_directory(path)
    } else {
        Ok(vec![parser::parse_worksheet(path)?])
    }
}

/// An answer source for a file or a directory of answer sets.
pub(crate) fn answer_source(path: &Path) -> Arc<dyn AnswerSource> {
    if path.is_file() {
        Arc::new(FsAnswerSource::file(path))
    } else {
        Arc::new(FsAnswerSource::directory(path))
    }
}
