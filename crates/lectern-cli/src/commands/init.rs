//! The `lectern init` command.

use std::path::Path;

use anyhow::Result;

const STARTER_FILES: [(&str, &str); 4] = [
    ("lectern.toml", SAMPLE_CONFIG),
    ("worksheets/example.toml", EXAMPLE_WORKSHEET),
    ("answers/example.json", EXAMPLE_ANSWERS),
    ("study.md", EXAMPLE_DOCUMENT),
];

pub fn execute() -> Result<()> {
    for (path, content) in STARTER_FILES {
        let path = Path::new(path);
        if path.exists() {
            println!("{} already exists, skipping.", path.display());
            continue;
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }

    println!("\nNext steps:");
    println!("  1. Fill in the `value` fields in worksheets/example.toml");
    println!("  2. Run: lectern validate --worksheet worksheets/example.toml");
    println!("  3. Run: lectern check --worksheet worksheets/example.toml");
    println!("  4. Run: lectern render");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# lectern configuration

answers_dir = "./answers"
document = "./study.md"
storage_dir = "./.lectern"
output_dir = "./lectern-results"
header_offset = 90.0
accept_alternate_versions = true
"#;

const EXAMPLE_WORKSHEET: &str = r#"[worksheet]
id = "example"
title = "Example: Memory verses"
description = "Write each verse from memory, then run `lectern check`."
application = ""

[[inputs]]
question = 1
reference = "John 3:16"
value = ""

[[inputs]]
question = 2
reference = "Psalm 23:1"
value = ""

[[inputs]]
question = 3
has_answer = false
value = ""
"#;

const EXAMPLE_ANSWERS: &str = r#"{
  "section_title": "Example: Memory verses",
  "answers": {
    "q1_John 3:16": {
      "reference": "John 3:16",
      "text": "For God so loved the world, that he gave his only begotten Son, that whosoever believeth in him should not perish, but have everlasting life.",
      "version": "KJV",
      "text_alt": "For God so loved the world that he gave his one and only Son, that whoever believes in him shall not perish but have eternal life.",
      "version_alt": "NIV",
      "has_data": true
    },
    "q2_Psalm 23:1": {
      "reference": "Psalm 23:1",
      "text": "The LORD is my shepherd; I shall not want.",
      "version": "KJV",
      "has_data": true
    }
  }
}
"#;

const EXAMPLE_DOCUMENT: &str = r#"# Study guide

## Lesson 1: God's love
Read **John 3:16** slowly.  
Notice *who* is loved and *what* is given.

---

## Lesson 2: The shepherd
### Reading
The LORD is my shepherd; I shall not want.

### Reflection
What does it mean to *lack nothing*?
"#;
