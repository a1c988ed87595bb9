//! The `drillbook history` command.

use anyhow::Result;

use drillbook_core::report::history_report;

use super::{load, split_tags, GlobalArgs};

pub fn execute(global: &GlobalArgs, tags: Option<String>) -> Result<()> {
    let loaded = load(global)?;
    let tags = split_tags(tags.as_deref());
    print!("{}", history_report(&loaded.bank, &loaded.learner, &tags));
    Ok(())
}
