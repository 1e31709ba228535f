//! The `lectern notes` command.

use anyhow::{Context, Result};

use lectern_core::config::LecternConfig;

use super::reader_context;
use crate::NotesAction;

pub async fn execute(config: &LecternConfig, action: NotesAction) -> Result<()> {
    let mut ctx = reader_context(config);

    match action {
        NotesAction::Show => {
            let notes = ctx.notes()?;
            if notes.is_empty() {
                eprintln!("No notes saved.");
            } else {
                println!("{notes}");
            }
        }
        NotesAction::Set { text, file } => {
            let notes = match (text, file) {
                (_, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read notes file: {}", path.display()))?,
                (Some(text), None) => text,
                (None, None) => anyhow::bail!("no notes given"),
            };
            ctx.save_notes(&notes)?;
            println!("Saved {} characters of notes.", notes.chars().count());
        }
        NotesAction::Export { output } => {
            let json = ctx.export_notes()?;
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Notes exported to: {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        NotesAction::Import { path } => {
            let notes = ctx.import_notes_file(&path).await?;
            println!(
                "Imported {} characters of notes from {}.",
                notes.chars().count(),
                path.display()
            );
        }
    }

    Ok(())
}
