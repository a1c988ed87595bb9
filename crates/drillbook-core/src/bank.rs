//! Question bank: interning, category parsing, and validation.
//!
//! Every question gets a [`QuestionId`] when it enters the bank. Ledgers,
//! pools, and quizzes refer to questions by id only; the prompt text is
//! looked up once, here.

use std::collections::HashMap;

use crate::error::{CoreError, Result};
use crate::question::{self, QuestionId, QuestionRecord};

/// All questions known to a class, in load order.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<QuestionRecord>,
    by_prompt: HashMap<String, QuestionId>,
}

impl QuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a question. Prompts are unique within a bank.
    pub fn insert(&mut self, question: QuestionRecord) -> Result<QuestionId> {
        if self.by_prompt.contains_key(question.prompt()) {
            return Err(CoreError::DuplicateQuestion {
                prompt: question.prompt().to_string(),
            });
        }
        let id = QuestionId::new(self.questions.len() as u32);
        self.by_prompt.insert(question.prompt().to_string(), id);
        self.questions.push(question);
        Ok(id)
    }

    /// Parse a category file and intern every question in it.
    ///
    /// See [`parse_category`] for the file format. Errors carry the line
    /// number within `text`.
    pub fn load_category(&mut self, text: &str) -> Result<Vec<QuestionId>> {
        let mut ids = Vec::new();
        for (line_no, question) in parse_category(text)? {
            ids.push(self.insert(question).map_err(|e| e.at(line_no))?);
        }
        tracing::debug!(questions = ids.len(), "loaded category");
        Ok(ids)
    }

    pub fn get(&self, id: QuestionId) -> Option<&QuestionRecord> {
        self.questions.get(id.index())
    }

    pub fn id_of(&self, prompt: &str) -> Option<QuestionId> {
        self.by_prompt.get(prompt).copied()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Questions in load order.
    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &QuestionRecord)> {
        self.questions
            .iter()
            .enumerate()
            .map(|(i, q)| (QuestionId::new(i as u32), q))
    }

    /// Every distinct tag in the bank, implicit labels included, in the
    /// order they are first seen.
    pub fn all_tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = Vec::new();
        for question in &self.questions {
            for tag in question.tags() {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
        }
        tags
    }
}

/// Parse the text of a category file.
///
/// Blank lines and lines starting with `#` are annotations. The first
/// remaining line is a header naming the category and is skipped; every
/// later line must decode as a question. Returns each question with its
/// 1-based line number.
pub fn parse_category(text: &str) -> Result<Vec<(usize, QuestionRecord)>> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !is_annotation(line));

    let Some((_, header)) = lines.next() else {
        return Ok(Vec::new());
    };
    tracing::debug!(header = header.trim(), "parsing category");

    lines
        .map(|(line_no, line)| {
            question::decode(line)
                .map(|q| (line_no, q))
                .map_err(|e| e.at(line_no))
        })
        .collect()
}

fn is_annotation(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Prompt of the offending question.
    pub prompt: String,
    /// Warning message.
    pub message: String,
}

/// Check a bank for questions that parse but are unlikely to behave as the
/// author intended.
pub fn validate_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for (_, q) in bank.iter() {
        let warn = |message: String| ValidationWarning {
            prompt: q.prompt().to_string(),
            message,
        };

        let mut seen = Vec::new();
        for answer in q.correct_answers() {
            let normalized = q.normalize(answer);
            if normalized.is_empty() {
                warnings.push(warn(format!(
                    "answer '{answer}' is made entirely of ignored characters"
                )));
            } else if seen.contains(&normalized) {
                warnings.push(warn(format!(
                    "answer '{answer}' duplicates an earlier answer once normalised"
                )));
            } else {
                seen.push(normalized);
            }
        }

        if q.explicit_tags().is_empty() {
            warnings.push(warn(
                "question has no tags and can only be quizzed unfiltered".into(),
            ));
        }
    }

    warnings
}
