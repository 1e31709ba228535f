//! The `lectern validate` command.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;

use lectern_core::config::LecternConfig;
use lectern_core::parser::{self, ValidationWarning};
use lectern_core::sources::FsAnswerSource;

use super::load_worksheets;

pub fn execute(config: &LecternConfig, worksheet: PathBuf, answers: Option<PathBuf>) -> Result<()> {
    let sheets = load_worksheets(&worksheet)?;
    let explicit_answers = answers.is_some();
    let answers = answers.unwrap_or_else(|| config.answers_dir.clone());
    let source = if answers.is_file() {
        FsAnswerSource::file(&answers)
    } else {
        FsAnswerSource::directory(&answers)
    };

    let mut total_warnings = 0;
    let mut checked_sets = HashSet::new();

    for sheet in &sheets {
        println!("Worksheet: {} ({} inputs)", sheet.title, sheet.inputs.len());

        let path = source.resolve(sheet);
        let mut warnings = Vec::new();
        let set = if path.exists() {
            let set = parser::parse_answer_set(&path)?;
            if checked_sets.insert(path.clone()) {
                warnings.extend(parser::validate_answer_set(&set));
            }
            Some(set)
        } else {
            if explicit_answers || sheet.answers.is_some() {
                warnings.push(ValidationWarning {
                    key: None,
                    message: format!("answer set not found: {}", path.display()),
                });
            }
            None
        };
        warnings.extend(parser::validate_worksheet(sheet, set.as_ref()));

        for w in &warnings {
            let prefix = w
                .key
                .as_ref()
                .map(|key| format!("  [{key}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All worksheets valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
