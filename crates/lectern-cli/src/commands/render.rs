//! The `lectern render` command.

use std::path::PathBuf;

use anyhow::Result;

use lectern_core::config::LecternConfig;
use lectern_report::document::{render_blocks, write_reader_page, ReaderPageOptions};

use super::{load_blocks, reader_context};

pub async fn execute(
    config: &LecternConfig,
    document: Option<PathBuf>,
    output: Option<PathBuf>,
    format: String,
    with_notes: bool,
) -> Result<()> {
    let (path, blocks) = load_blocks(config, document).await?;

    match format.as_str() {
        "fragment" => println!("{}", render_blocks(&blocks)),
        "json" => println!("{}", serde_json::to_string_pretty(&blocks)?),
        "page" => {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string());
            let ctx = reader_context(config);

            let mut options = ReaderPageOptions::new(&stem);
            options.header_offset = config.header_offset;
            options.active = ctx.last_section()?;
            if with_notes {
                options.notes = Some(ctx.notes()?);
            }

            let target = output.unwrap_or_else(|| config.output_dir.join(format!("{stem}.html")));
            write_reader_page(&blocks, &options, &target)?;
            println!("Reader page: {}", target.display());
        }
        other => anyhow::bail!("unknown format: '{other}' (expected page, fragment or json)"),
    }

    Ok(())
}
