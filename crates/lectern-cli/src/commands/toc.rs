//! The `lectern toc` command.

use std::path::PathBuf;

use anyhow::Result;

use lectern_core::config::LecternConfig;
use lectern_core::reader::Toc;

use super::{load_blocks, reader_context};

pub async fn execute(config: &LecternConfig, document: Option<PathBuf>, json: bool) -> Result<()> {
    let (_, blocks) = load_blocks(config, document).await?;
    let toc = Toc::from_blocks(&blocks);

    if json {
        println!("{}", serde_json::to_string_pretty(toc.entries())?);
        return Ok(());
    }

    if toc.is_empty() {
        println!("No headings.");
        return Ok(());
    }

    let current = reader_context(config).last_section()?;
    for entry in toc.entries() {
        let marker = if current.as_deref() == Some(entry.id.as_str()) {
            "*"
        } else {
            " "
        };
        let indent = "  ".repeat(usize::from(entry.level.saturating_sub(1)));
        println!("{marker} {indent}{} (line {})", entry.title, entry.block + 1);
    }

    Ok(())
}
