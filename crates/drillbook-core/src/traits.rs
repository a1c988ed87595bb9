//! Seams between the core and the outside world: persistence and time.
//!
//! The file layer implements [`HistorySink`]; the CLI uses [`SystemClock`].
//! Tests substitute [`RecordingSink`] and [`ManualClock`].

use std::cell::Cell;

use chrono::{Local, NaiveDateTime, TimeDelta};

use crate::question::QuestionRecord;
use crate::record::{self, AnswerEvent};

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Durable storage for answer events, one append per answer.
pub trait HistorySink {
    /// Persist `event` as the newest entry in `question`'s history.
    ///
    /// Implementations must have finished writing (and released any handle)
    /// by the time this returns, successfully or not.
    fn append(&mut self, question: &QuestionRecord, event: &AnswerEvent) -> std::io::Result<()>;
}

/// Keeps encoded lines in memory instead of writing them anywhere.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// `(prompt, encoded line)` in append order.
    pub lines: Vec<(String, String)>,
}

impl HistorySink for RecordingSink {
    fn append(&mut self, question: &QuestionRecord, event: &AnswerEvent) -> std::io::Result<()> {
        self.lines
            .push((question.prompt().to_string(), record::encode(event)));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Source of the current local date-time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Wall-clock local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Move the clock by `delta`, which may be negative.
    pub fn advance(&self, delta: TimeDelta) {
        self.now.set(self.now.get() + delta);
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::day;
    use std::time::Duration;

    #[test]
    fn manual_clock_moves_both_ways() {
        let clock = ManualClock::new(day(0));
        clock.advance(TimeDelta::seconds(90));
        assert_eq!(clock.now(), day(0) + TimeDelta::seconds(90));
        clock.advance(TimeDelta::seconds(-100));
        assert!(clock.now() < day(0));
        clock.set(day(3));
        assert_eq!(clock.now(), day(3));
    }

    #[test]
    fn recording_sink_encodes_lines() {
        let q = QuestionRecord::new("Q?", ["a"]).unwrap();
        let mut sink = RecordingSink::default();
        sink.append(&q, &AnswerEvent::new(day(0), Duration::from_secs(4), true, "a"))
            .unwrap();
        assert_eq!(
            sink.lines,
            vec![("Q?".to_string(), "2024-01-01T12:00:00\t4\tr\ta".to_string())]
        );
    }
}
