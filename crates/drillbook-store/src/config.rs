//! drillbook configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the config file looked for in the current directory.
pub const CONFIG_FILE_NAME: &str = "drillbook.toml";

/// Top-level drillbook configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillbookConfig {
    /// Workspace directory holding `questions/` and `learners/`.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Learner whose history is used when none is given on the command line.
    #[serde(default = "default_learner")]
    pub learner: String,
    /// Questions per quiz.
    #[serde(default = "default_quiz_size")]
    pub quiz_size: usize,
    /// Days of answers counted towards recent accuracy.
    #[serde(default = "default_recent_window_days")]
    pub recent_window_days: i64,
    /// Inside width of progress bars.
    #[serde(default = "default_progress_bar_width")]
    pub progress_bar_width: usize,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_learner() -> String {
    "student".to_string()
}
fn default_quiz_size() -> usize {
    10
}
fn default_recent_window_days() -> i64 {
    drillbook_core::mastery::RECENT_WINDOW_DAYS
}
fn default_progress_bar_width() -> usize {
    drillbook_core::report::DEFAULT_BAR_WIDTH
}

impl Default for DrillbookConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            learner: default_learner(),
            quiz_size: default_quiz_size(),
            recent_window_days: default_recent_window_days(),
            progress_bar_width: default_progress_bar_width(),
        }
    }
}

impl DrillbookConfig {
    /// Parse a config file's contents. Relative roots are taken relative to
    /// `base`, normally the directory the file was found in.
    pub fn from_toml_str(content: &str, base: &Path) -> Result<Self> {
        let mut config: DrillbookConfig = toml::from_str(content)?;
        config.learner = resolve_env_vars(&config.learner);
        let root = PathBuf::from(resolve_env_vars(&config.root.to_string_lossy()));
        config.root = if root.is_relative() && !base.as_os_str().is_empty() {
            base.join(root)
        } else {
            root
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.learner.trim().is_empty() {
            anyhow::bail!("learner name must not be empty");
        }
        if self.recent_window_days < 0 {
            anyhow::bail!(
                "recent_window_days must not be negative, got {}",
                self.recent_window_days
            );
        }
        Ok(())
    }

    /// Apply `DRILLBOOK_ROOT` / `DRILLBOOK_LEARNER` style overrides from
    /// `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup("DRILLBOOK_ROOT").filter(|r| !r.is_empty()) {
            tracing::debug!(%root, "root overridden from environment");
            self.root = PathBuf::from(root);
        }
        if let Some(learner) = lookup("DRILLBOOK_LEARNER").filter(|l| !l.is_empty()) {
            tracing::debug!(%learner, "learner overridden from environment");
            self.learner = learner;
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Unset variables expand to nothing.
pub fn resolve_env_vars(s: &str) -> String {
    resolve_with(s, |name| std::env::var(name).ok())
}

fn resolve_with<F>(s: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = s.to_string();
    let mut from = 0;
    while let Some(start) = result[from..].find("${").map(|i| from + i) {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let value = lookup(&result[start + 2..start + end]).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        from = start + value.len();
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `drillbook.toml` in the current directory
/// 2. `~/.config/drillbook/config.toml`
///
/// Environment variable overrides: `DRILLBOOK_ROOT`, `DRILLBOOK_LEARNER`.
pub fn load_config() -> Result<DrillbookConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<DrillbookConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let base = path.parent().unwrap_or(Path::new(""));
            let config = DrillbookConfig::from_toml_str(&content, base)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => DrillbookConfig::default(),
    };

    config.apply_overrides(|name| std::env::var(name).ok());
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("drillbook"))
}
