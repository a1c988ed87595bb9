//! drillbook-store: the flat-file side of drillbook.
//!
//! Loads question banks and learner histories from a workspace directory,
//! appends answers to history files, and reads `drillbook.toml`.

pub mod config;
pub mod history_file;
pub mod layout;

pub use config::{load_config, load_config_from, DrillbookConfig};
pub use history_file::HistoryFiles;
pub use layout::{file_stem_for, load_workspace, prompt_from_file_stem, Workspace};
