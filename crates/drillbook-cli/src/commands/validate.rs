//! The `drillbook validate` command.

use anyhow::Result;

use drillbook_core::bank::validate_bank;

use super::{load, GlobalArgs};

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let loaded = load(global)?;
    println!(
        "Workspace: {} ({} questions, {} tags)",
        loaded.workspace.root().display(),
        loaded.bank.len(),
        loaded.bank.all_tags().len()
    );
    println!(
        "Learner: {} ({} histories)",
        loaded.learner.name(),
        loaded.learner.ledger_count()
    );

    let warnings = validate_bank(&loaded.bank);
    for w in &warnings {
        println!("  [{}] WARNING: {}", w.prompt, w.message);
    }

    if warnings.is_empty() {
        println!("All questions valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
