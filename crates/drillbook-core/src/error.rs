//! Core error types.
//!
//! Every failure in the review core is deterministic: bad persisted text,
//! a mismatch between the question bank and a learner's histories, or a
//! session driven past its end. None of them are worth retrying.

use thiserror::Error;

/// Convenience alias used throughout the core.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

/// Errors produced by the review core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A history line could not be decoded.
    #[error("malformed record{}: {reason}", at_line(.line))]
    MalformedRecord { line: Option<usize>, reason: String },

    /// A question bank line could not be decoded.
    #[error("malformed question{}: {reason}", at_line(.line))]
    MalformedQuestion { line: Option<usize>, reason: String },

    /// A quiz question has no ledger in the learner's history set.
    #[error("no history found for question: {prompt}")]
    NoMatchingHistory { prompt: String },

    /// The session has already delivered every question.
    #[error("quiz session exhausted after {length} question(s)")]
    SessionExhausted { length: usize },

    /// An answer was recorded before any question was presented.
    #[error("no question has been presented")]
    NotPresented,

    /// Mastery was aggregated over zero questions.
    #[error("cannot aggregate mastery over an empty set of questions")]
    EmptyAggregate,

    /// The clock went backwards between presenting and answering.
    #[error("negative elapsed time ({seconds}s) between question and answer")]
    NegativeElapsed { seconds: i64 },

    /// Two bank lines share the same prompt text.
    #[error("duplicate question prompt: {prompt}")]
    DuplicateQuestion { prompt: String },

    /// A prompt was requested that the bank does not contain.
    #[error("unknown question: {prompt}")]
    UnknownQuestion { prompt: String },

    /// The history sink failed to persist an answer.
    #[error("failed to persist answer: {0}")]
    Persistence(#[from] std::io::Error),
}

impl CoreError {
    pub(crate) fn record(reason: impl Into<String>) -> Self {
        CoreError::MalformedRecord {
            line: None,
            reason: reason.into(),
        }
    }

    pub(crate) fn question(reason: impl Into<String>) -> Self {
        CoreError::MalformedQuestion {
            line: None,
            reason: reason.into(),
        }
    }

    /// Attach a 1-based line number to a parse error.
    ///
    /// Errors that are not line-oriented pass through unchanged.
    pub fn at(self, line_no: usize) -> Self {
        match self {
            CoreError::MalformedRecord { reason, .. } => CoreError::MalformedRecord {
                line: Some(line_no),
                reason,
            },
            CoreError::MalformedQuestion { reason, .. } => CoreError::MalformedQuestion {
                line: Some(line_no),
                reason,
            },
            other => other,
        }
    }

    /// Returns `true` for errors caused by bad persisted text.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            CoreError::MalformedRecord { .. } | CoreError::MalformedQuestion { .. }
        )
    }
}

fn at_line(line: &Option<usize>) -> String {
    match line {
        Some(n) => format!(" at line {n}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_number_is_rendered() {
        let err = CoreError::record("expected 4 fields, found 3").at(7);
        assert_eq!(
            err.to_string(),
            "malformed record at line 7: expected 4 fields, found 3"
        );
        assert!(err.is_malformed());
    }

    #[test]
    fn at_leaves_other_errors_alone() {
        let err = CoreError::EmptyAggregate.at(3);
        assert!(matches!(err, CoreError::EmptyAggregate));
        assert!(!err.is_malformed());
    }
}
