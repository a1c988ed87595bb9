//! Workspace directory layout.
//!
//! ```text
//! <root>/
//!   questions/<category>.txt        one question bank file per category
//!   learners/<learner>/<stem>.txt   one history file per question
//! ```
//!
//! History file names are derived from the prompt with [`file_stem_for`],
//! which is reversible, so a history file can always be matched back to its
//! question.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use drillbook_core::bank::QuestionBank;
use drillbook_core::history::{HistoryLedger, HISTORY_HEADER};
use drillbook_core::learner::Learner;
use drillbook_core::CoreError;

use crate::history_file::HistoryFiles;

/// Directory of question bank files under the root.
pub const QUESTIONS_DIR: &str = "questions";
/// Directory of per-learner history directories under the root.
pub const LEARNERS_DIR: &str = "learners";
/// Extension of bank and history files.
pub const FILE_EXTENSION: &str = "txt";

/// Characters that never appear literally in a file stem, and their tokens.
///
/// No token is a prefix of another, which keeps decoding unambiguous.
const STEM_TOKENS: &[(char, &str)] = &[
    ('@', "AT"),
    (',', "COMMA"),
    ('.', "PERIOD"),
    ('>', "GREATER"),
    ('<', "LESS"),
    ('/', "FORWARDSLASH"),
    ('?', "QUESTION"),
    ('\\', "BACKSLASH"),
    ('÷', "DIVISION"),
    ('\'', "APOSTROPHE"),
    ('"', "QUOTATION"),
    (';', "SEMICOLON"),
    (':', "COLON"),
    ('[', "OPENBRACKET"),
    (']', "CLOSEBRACKET"),
    ('^', "CARET"),
    ('%', "PERCENT"),
    ('#', "POUND"),
    ('$', "DOLLAR"),
    ('&', "AMPERSAND"),
    ('•', "BULLET"),
    ('{', "OPENBRACE"),
    ('}', "CLOSEBRACE"),
    ('|', "PIPE"),
    ('\t', "TAB"),
    ('\n', "NEWLINE"),
    ('\r', "RETURN"),
    ('*', "ASTERISK"),
    (' ', "SPACE"),
    ('-', "DASH"),
    ('–', "HYPHEN"),
];

/// Encode `prompt` as a file stem that is safe on common filesystems.
pub fn file_stem_for(prompt: &str) -> String {
    let mut stem = String::with_capacity(prompt.len());
    for c in prompt.chars() {
        match STEM_TOKENS.iter().find(|(special, _)| *special == c) {
            Some((_, token)) => {
                stem.push('@');
                stem.push_str(token);
            }
            None => stem.push(c),
        }
    }
    stem
}

/// Reverse [`file_stem_for`]. Returns `None` for a stem no prompt encodes to.
pub fn prompt_from_file_stem(stem: &str) -> Option<String> {
    let mut prompt = String::with_capacity(stem.len());
    let mut rest = stem;
    while let Some(at) = rest.find('@') {
        prompt.push_str(&rest[..at]);
        let after = &rest[at + 1..];
        let (special, token) = STEM_TOKENS
            .iter()
            .find(|(_, token)| after.starts_with(token))?;
        prompt.push(*special);
        rest = &after[token.len()..];
    }
    prompt.push_str(rest);
    Some(prompt)
}

/// A workspace rooted at a directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn questions_dir(&self) -> PathBuf {
        self.root.join(QUESTIONS_DIR)
    }

    /// History directory of one learner.
    pub fn learner_dir(&self, learner: &str) -> PathBuf {
        self.root.join(LEARNERS_DIR).join(file_stem_for(learner))
    }

    /// The sink that appends `learner`'s answers to their history files.
    pub fn history_sink(&self, learner: &str) -> HistoryFiles {
        HistoryFiles::new(self.learner_dir(learner))
    }

    /// Load every bank file under `questions/`, in file-name order.
    pub fn load_bank(&self) -> Result<QuestionBank> {
        let dir = self.questions_dir();
        let mut bank = QuestionBank::new();
        for path in text_files(&dir)
            .with_context(|| format!("failed to list question files in {}", dir.display()))?
        {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let ids = bank
                .load_category(&text)
                .with_context(|| format!("failed to load questions from {}", path.display()))?;
            tracing::debug!(path = %path.display(), questions = ids.len(), "loaded bank file");
        }
        Ok(bank)
    }

    /// Load a learner's history files against `bank`.
    ///
    /// Every history file must belong to a question in the bank. Questions
    /// without a history file get a fresh one containing only the header.
    pub fn load_learner(&self, bank: &QuestionBank, name: &str) -> Result<Learner> {
        let dir = self.learner_dir(name);
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create learner directory {}", dir.display()))?;

        let mut learner = Learner::new(name);
        for path in text_files(&dir)
            .with_context(|| format!("failed to list history files in {}", dir.display()))?
        {
            let prompt = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(prompt_from_file_stem)
                .with_context(|| format!("history file name is not valid: {}", path.display()))?;
            let id = bank
                .id_of(&prompt)
                .ok_or(CoreError::UnknownQuestion { prompt })
                .with_context(|| format!("history file {} has no question", path.display()))?;
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let ledger = HistoryLedger::load(id, text.lines())
                .with_context(|| format!("failed to load history from {}", path.display()))?;
            learner.attach(ledger);
        }

        for id in learner.ensure_ledgers(bank) {
            let Some(question) = bank.get(id) else {
                continue;
            };
            let path = dir.join(format!("{}.{FILE_EXTENSION}", file_stem_for(question.prompt())));
            create_history_file(&path)?;
        }

        tracing::debug!(learner = name, ledgers = learner.ledger_count(), "loaded learner");
        Ok(learner)
    }
}

/// Load the bank and one learner's histories from the workspace at `root`.
pub fn load_workspace(root: &Path, learner: &str) -> Result<(QuestionBank, Learner)> {
    let workspace = Workspace::new(root);
    let bank = workspace.load_bank()?;
    let learner = workspace.load_learner(&bank, learner)?;
    Ok((bank, learner))
}

/// Write a history file holding only the header. An existing file is left
/// alone.
fn create_history_file(path: &Path) -> Result<()> {
    match fs::OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            use std::io::Write;
            writeln!(file, "{HISTORY_HEADER}")
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "created history file");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e).with_context(|| format!("failed to create {}", path.display())),
    }
}

/// `.txt` files directly inside `dir`, sorted by file name.
fn text_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) == Some(FILE_EXTENSION) {
            files.push(path);
        } else {
            tracing::warn!(path = %path.display(), "skipping file without .txt extension");
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
