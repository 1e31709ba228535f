//! The `lectern goto` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use lectern_core::config::LecternConfig;
use lectern_core::markdown::Block;
use lectern_core::reader::{ReaderState, TocEntry};

use super::{load_blocks, reader_context};

pub async fn execute(
    config: &LecternConfig,
    target: Option<String>,
    line: Option<usize>,
    document: Option<PathBuf>,
) -> Result<()> {
    let (_, blocks) = load_blocks(config, document).await?;
    let mut state = ReaderState::from_blocks(&blocks);
    anyhow::ensure!(!state.toc().is_empty(), "document has no headings");

    let mut ctx = reader_context(config);
    if let Some(last) = ctx.last_section()? {
        state.jump_to(&last);
    }

    let entry = match (target.as_deref(), line) {
        (Some("next"), _) => state.step(1),
        (Some("prev"), _) => state.step(-1),
        (Some(id), _) => Some(
            state
                .jump_to(id)
                .with_context(|| format!("no section with id '{id}'"))?,
        ),
        (None, Some(line)) => {
            let index = state.toc().entry_for_block(line.saturating_sub(1));
            let id = state.toc().get(index).map(|e| e.id.clone());
            id.and_then(|id| state.jump_to(&id))
        }
        (None, None) => {
            if state.active_index().is_none() {
                state.step(0);
            }
            state.active()
        }
    }
    .cloned()
    .context("no section to show")?;

    ctx.remember_section(&entry.id)?;

    let position = state.active_index().unwrap_or(0);
    println!("[{}/{}]", position + 1, state.toc().len());
    print_section(&blocks, &entry, state.toc().get(position + 1));

    Ok(())
}

/// Print the heading and its blocks up to the next heading entry.
fn print_section(blocks: &[Block], entry: &TocEntry, next: Option<&TocEntry>) {
    let end = next.map_or(blocks.len(), |n| n.block);
    for block in &blocks[entry.block..end] {
        match block {
            Block::Heading { level, .. } => {
                println!("{} {}", "#".repeat(usize::from(*level)), block.plain_text())
            }
            Block::Rule => println!("---"),
            Block::Spacer => println!(),
            Block::Paragraph { .. } => println!("{}", block.plain_text()),
        }
    }
}
