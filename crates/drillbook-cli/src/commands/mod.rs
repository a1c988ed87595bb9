pub mod history;
pub mod init;
pub mod progress;
pub mod quiz;
pub mod validate;

use std::path::PathBuf;

use anyhow::Result;

use drillbook_core::bank::QuestionBank;
use drillbook_core::learner::Learner;
use drillbook_store::config::load_config_from;
use drillbook_store::{DrillbookConfig, Workspace};

/// Flags shared by every subcommand.
pub struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub root: Option<PathBuf>,
    pub learner: Option<String>,
}

impl GlobalArgs {
    /// The config file (or defaults) with command-line overrides applied.
    pub fn settings(&self) -> Result<DrillbookConfig> {
        let mut config = load_config_from(self.config.as_deref())?;
        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if let Some(learner) = &self.learner {
            config.learner = learner.clone();
        }
        Ok(config)
    }
}

/// Everything a command needs after the workspace has been loaded.
pub struct Loaded {
    pub config: DrillbookConfig,
    pub workspace: Workspace,
    pub bank: QuestionBank,
    pub learner: Learner,
}

pub fn load(global: &GlobalArgs) -> Result<Loaded> {
    let config = global.settings()?;
    let workspace = Workspace::new(&config.root);
    let bank = workspace.load_bank()?;
    let learner = workspace
        .load_learner(&bank, &config.learner)?
        .with_window_days(config.recent_window_days);
    Ok(Loaded {
        config,
        workspace,
        bank,
        learner,
    })
}

/// Split a comma-separated tag list, dropping empty entries.
pub fn split_tags(tags: Option<&str>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}
