//! The `lectern search` command.

use std::path::PathBuf;

use anyhow::Result;

use lectern_core::config::LecternConfig;
use lectern_core::reader::{search, Toc};

use super::load_blocks;

pub async fn execute(config: &LecternConfig, query: String, document: Option<PathBuf>) -> Result<()> {
    let (_, blocks) = load_blocks(config, document).await?;
    let matches = search(&blocks, &query);

    if matches.is_empty() {
        println!("No matches for '{}'.", query.trim());
        return Ok(());
    }

    let toc = Toc::from_blocks(&blocks);
    for index in &matches {
        let section = toc
            .get(toc.entry_for_block(*index))
            .filter(|e| e.block <= *index)
            .map(|e| format!(" [{}]", e.title))
            .unwrap_or_default();
        println!("{}{section}: {}", index + 1, blocks[*index].plain_text());
    }
    println!("\n{} match(es).", matches.len());

    Ok(())
}
