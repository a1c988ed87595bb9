//! Per-question answer history.
//!
//! A [`HistoryLedger`] is the in-memory mirror of one history file. It only
//! ever grows; every statistic is recomputed from the full event list on
//! each call, so nothing derived from it can go stale after an append.

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::question::QuestionId;
use crate::record::{self, AnswerEvent};

/// Header written as the first line of every new history file.
pub const HISTORY_HEADER: &str = "Timestamp\tDuration\tCorrectness\tResponse";

/// Ordered, append-only answer history for a single question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLedger {
    question: QuestionId,
    events: Vec<AnswerEvent>,
}

impl HistoryLedger {
    /// An empty ledger: the question has never been attempted.
    pub fn new(question: QuestionId) -> Self {
        Self {
            question,
            events: Vec::new(),
        }
    }

    /// Load a ledger from the lines of a history file.
    ///
    /// The first line is a header and is discarded. Empty lines (such as the
    /// one produced by a trailing newline) are skipped; any other line that
    /// fails to decode aborts the load with its 1-based line number.
    pub fn load<'a, I>(question: QuestionId, lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut events = Vec::new();
        for (idx, line) in lines.into_iter().enumerate().skip(1) {
            if line.trim_end_matches('\r').is_empty() {
                continue;
            }
            events.push(record::decode(line).map_err(|e| e.at(idx + 1))?);
        }
        tracing::debug!(question = %question, events = events.len(), "loaded history");
        Ok(Self { question, events })
    }

    pub fn question(&self) -> QuestionId {
        self.question
    }

    pub fn events(&self) -> &[AnswerEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Add an event to the end of the history.
    pub fn append(&mut self, event: AnswerEvent) {
        self.events.push(event);
    }

    /// Whole days since the most recent correct answer, or `None` if the
    /// question has never been answered correctly.
    pub fn days_since_last_correct(&self, now: NaiveDateTime) -> Option<i64> {
        self.events
            .iter()
            .rev()
            .find(|e| e.is_correct())
            .map(|e| e.days_before(now))
    }

    /// Largest gap, in whole days, between two consecutive correct answers.
    ///
    /// Incorrect answers in between are ignored. Zero when there are fewer
    /// than two correct answers.
    pub fn longest_correct_span(&self) -> i64 {
        let mut corrects = self.events.iter().filter(|e| e.is_correct());
        let Some(mut last) = corrects.next() else {
            return 0;
        };
        let mut longest = 0;
        for event in corrects {
            let span = event
                .timestamp()
                .signed_duration_since(last.timestamp())
                .num_days()
                .abs();
            longest = longest.max(span);
            last = event;
        }
        longest
    }

    /// Days to wait before the question is due again:
    /// `floor(longest_correct_span * 1.2) + 1`, or 0 with no correct answers.
    pub fn waiting_interval_days(&self) -> i64 {
        if !self.events.iter().any(|e| e.is_correct()) {
            return 0;
        }
        (self.longest_correct_span() as f64 * 1.2).floor() as i64 + 1
    }

    /// Fraction of answers at most `window_days` old that were correct.
    ///
    /// Returns 0 when no answer falls inside the window.
    pub fn percent_correct_within(&self, now: NaiveDateTime, window_days: i64) -> f64 {
        let (right, total) = self
            .events
            .iter()
            .filter(|e| e.days_before(now) <= window_days)
            .fold((0u32, 0u32), |(right, total), e| {
                (right + u32::from(e.is_correct()), total + 1)
            });
        if total == 0 {
            0.0
        } else {
            f64::from(right) / f64::from(total)
        }
    }

    /// Whether enough time has passed since the last correct answer that the
    /// question should come up for review.
    ///
    /// Never-correct questions are always due.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        match self.days_since_last_correct(now) {
            Some(days) => days >= self.waiting_interval_days(),
            None => true,
        }
    }
}
