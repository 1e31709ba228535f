//! The `lectern grade` command.

use anyhow::Result;

use lectern_core::grader::grade_best;

pub fn execute(answer: String, reference: String, alternates: Vec<String>, json: bool) -> Result<()> {
    let references: Vec<&str> = std::iter::once(reference.as_str())
        .chain(alternates.iter().map(String::as_str))
        .filter(|r| !r.trim().is_empty())
        .collect();
    anyhow::ensure!(!references.is_empty(), "reference text is empty");

    let result = grade_best(&answer, &references);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{} ({:.0}%)", result.classification, result.score * 100.0);
        println!("{}", result.classification.feedback());
    }

    Ok(())
}
