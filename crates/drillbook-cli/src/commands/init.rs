//! The `drillbook init` command.

use std::path::Path;

use anyhow::{Context, Result};

use drillbook_store::config::CONFIG_FILE_NAME;
use drillbook_store::layout::QUESTIONS_DIR;

use super::GlobalArgs;

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let root = global.root.as_deref().unwrap_or(Path::new("."));
    std::fs::create_dir_all(root)
        .with_context(|| format!("failed to create {}", root.display()))?;

    write_unless_exists(&root.join(CONFIG_FILE_NAME), SAMPLE_CONFIG)?;

    let questions = root.join(QUESTIONS_DIR);
    std::fs::create_dir_all(&questions)
        .with_context(|| format!("failed to create {}", questions.display()))?;
    write_unless_exists(&questions.join("example.txt"), EXAMPLE_BANK)?;

    println!("\nNext steps:");
    println!("  1. Add question files under {QUESTIONS_DIR}/");
    println!("  2. Run: drillbook validate");
    println!("  3. Run: drillbook quiz --tags geography");

    Ok(())
}

fn write_unless_exists(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# drillbook configuration

# Workspace holding questions/ and learners/, relative to this file.
root = "."
learner = "student"
quiz_size = 10
recent_window_days = 7
progress_bar_width = 10
"#;

const EXAMPLE_BANK: &str = "Example questions
# kind, case-insensitive (y/n), ignored characters (** for none), prompt,
# accepted answers in braces, then tags. Fields are tab-separated.
s\ty\t \tWhat is the capital of France?\t{Paris\t}\tgeography\tcapitals
s\ty\t \tWhat is the capital of Japan?\t{Tokyo\t}\tgeography\tcapitals
s\ty\t**\tWhich river flows through Cairo?\t{Nile\tThe Nile\t}\tgeography
s\tn\t**\tWhat is the chemical symbol for iron?\t{Fe\t}\tchemistry
s\ty\t .\tHow many legs does a spider have?\t{8\teight\t}\tbiology
";
