//! Quiz sessions.
//!
//! A session walks a [`Quiz`] one question at a time. Presenting a question
//! starts a timer; recording an answer stops it, checks the response,
//! persists the answer, appends it to the learner's ledger, and advances.

use std::time::Duration;

use chrono::NaiveDateTime;

use crate::bank::QuestionBank;
use crate::error::{CoreError, Result};
use crate::learner::Learner;
use crate::question::QuestionRecord;
use crate::record::{escape_field, AnswerEvent};
use crate::selector::Quiz;
use crate::traits::{Clock, HistorySink};

/// Where a session is in its quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing presented yet.
    Ready,
    /// Question `cursor` is the current one.
    Presenting { cursor: usize },
    /// Every question has been answered.
    Complete,
}

/// A learner working through one quiz.
pub struct QuizSession<'a> {
    bank: &'a QuestionBank,
    learner: &'a mut Learner,
    sink: &'a mut dyn HistorySink,
    clock: &'a dyn Clock,
    quiz: Quiz,
    cursor: usize,
    presented_at: Option<NaiveDateTime>,
}

impl<'a> QuizSession<'a> {
    pub fn new(
        quiz: Quiz,
        bank: &'a QuestionBank,
        learner: &'a mut Learner,
        sink: &'a mut dyn HistorySink,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            bank,
            learner,
            sink,
            clock,
            quiz,
            cursor: 0,
            presented_at: None,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.cursor >= self.quiz.len() {
            SessionState::Complete
        } else if self.cursor == 0 && self.presented_at.is_none() {
            SessionState::Ready
        } else {
            SessionState::Presenting {
                cursor: self.cursor,
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state() == SessionState::Complete
    }

    /// Number of questions in the quiz.
    pub fn len(&self) -> usize {
        self.quiz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quiz.is_empty()
    }

    /// Index of the question the next answer will be recorded against.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Read-only view of the learner, for progress display mid-quiz.
    pub fn learner(&self) -> &Learner {
        &*self.learner
    }

    /// Prompt of the current question; starts (or restarts) the answer timer.
    pub fn next_question_text(&mut self) -> Result<&'a str> {
        let question = self.current()?;
        self.presented_at = Some(self.clock.now());
        Ok(question.prompt())
    }

    /// Record the learner's response to the current question and advance.
    ///
    /// Returns whether the response was correct. The answer is persisted
    /// through the sink before it is added to the in-memory ledger, so a
    /// failed write leaves both unchanged and the cursor where it was.
    pub fn record_answer(&mut self, response: &str) -> Result<bool> {
        let question = self.current()?;
        let started = self.presented_at.ok_or(CoreError::NotPresented)?;
        let id = self.quiz.questions()[self.cursor];

        let now = self.clock.now();
        let elapsed = now.signed_duration_since(started);
        if elapsed < chrono::TimeDelta::zero() {
            return Err(CoreError::NegativeElapsed {
                seconds: elapsed.num_seconds(),
            });
        }
        let elapsed = Duration::from_secs(elapsed.num_seconds().unsigned_abs());

        let correct = question.check_answer(response);
        let event = AnswerEvent::new(now, elapsed, correct, escape_field(response));

        let ledger = self
            .learner
            .ledger_mut(id)
            .ok_or_else(|| CoreError::NoMatchingHistory {
                prompt: question.prompt().to_string(),
            })?;
        self.sink.append(question, &event)?;
        ledger.append(event);

        tracing::info!(
            question = %id,
            correct,
            elapsed_secs = elapsed.as_secs(),
            "recorded answer"
        );
        self.cursor += 1;
        self.presented_at = None;
        Ok(correct)
    }

    /// Accepted answers of the most recently answered question.
    pub fn last_correct_answers(&self) -> Option<&'a [String]> {
        let previous = self.cursor.checked_sub(1)?;
        let id = self.quiz.questions().get(previous)?;
        self.bank.get(*id).map(QuestionRecord::correct_answers)
    }

    fn current(&self) -> Result<&'a QuestionRecord> {
        let id = self
            .quiz
            .questions()
            .get(self.cursor)
            .ok_or(CoreError::SessionExhausted {
                length: self.quiz.len(),
            })?;
        self.bank.get(*id).ok_or_else(|| CoreError::UnknownQuestion {
            prompt: id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::day;
    use crate::question::QuestionId;
    use crate::traits::{ManualClock, RecordingSink};
    use chrono::TimeDelta;

    fn bank() -> QuestionBank {
        let mut bank = QuestionBank::new();
        bank.load_category(
            "Header\n\
             s\ty\t \tCapital of France?\t{Paris}\tgeo\n\
             s\tn\t**\tSymbol for iron?\t{Fe}\tchem\n\
             s\tn\t**\tOrphan?\t{x}\n",
        )
        .unwrap();
        bank
    }

    fn learner(bank: &QuestionBank) -> Learner {
        let mut learner = Learner::new("ada");
        learner.ensure_ledgers(bank);
        learner
    }

    #[test]
    fn two_question_session_runs_to_completion() {
        let bank = bank();
        let mut learner = learner(&bank);
        let mut sink = RecordingSink::default();
        let clock = ManualClock::new(day(0));
        let quiz = Quiz::from_prompts(&bank, ["Capital of France?", "Symbol for iron?"]).unwrap();
        let mut session = QuizSession::new(quiz, &bank, &mut learner, &mut sink, &clock);

        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.last_correct_answers(), None);

        assert_eq!(session.next_question_text().unwrap(), "Capital of France?");
        assert_eq!(session.state(), SessionState::Presenting { cursor: 0 });
        clock.advance(TimeDelta::seconds(12));
        assert!(session.record_answer("p a r i s").unwrap());
        assert_eq!(session.last_correct_answers().unwrap(), ["Paris"]);

        assert_eq!(session.next_question_text().unwrap(), "Symbol for iron?");
        clock.advance(TimeDelta::seconds(3));
        assert!(!session.record_answer("fe").unwrap());
        assert_eq!(session.last_correct_answers().unwrap(), ["Fe"]);

        assert!(session.is_complete());
        let err = session.next_question_text().unwrap_err();
        assert!(matches!(err, CoreError::SessionExhausted { length: 2 }));
        let err = session.record_answer("again").unwrap_err();
        assert!(matches!(err, CoreError::SessionExhausted { .. }));

        let paris = learner.ledger(QuestionId::new(0)).unwrap();
        assert_eq!(paris.len(), 1);
        assert_eq!(paris.events()[0].elapsed(), Duration::from_secs(12));
        assert!(paris.events()[0].is_correct());
        assert_eq!(
            sink.lines,
            vec![
                (
                    "Capital of France?".to_string(),
                    "2024-01-01T12:00:12\t12\tr\tp a r i s".to_string()
                ),
                (
                    "Symbol for iron?".to_string(),
                    "2024-01-01T12:00:15\t3\tw\tfe".to_string()
                ),
            ]
        );
    }

    #[test]
    fn presenting_twice_restarts_the_timer() {
        let bank = bank();
        let mut learner = learner(&bank);
        let mut sink = RecordingSink::default();
        let clock = ManualClock::new(day(0));
        let quiz = Quiz::from_prompts(&bank, ["Symbol for iron?"]).unwrap();
        let mut session = QuizSession::new(quiz, &bank, &mut learner, &mut sink, &clock);

        session.next_question_text().unwrap();
        clock.advance(TimeDelta::seconds(100));
        session.next_question_text().unwrap();
        clock.advance(TimeDelta::seconds(5));
        assert!(session.record_answer("Fe").unwrap());

        let ledger = learner.ledger(QuestionId::new(1)).unwrap();
        assert_eq!(ledger.events()[0].elapsed(), Duration::from_secs(5));
    }

    #[test]
    fn answer_without_presenting_fails() {
        let bank = bank();
        let mut learner = learner(&bank);
        let mut sink = RecordingSink::default();
        let clock = ManualClock::new(day(0));
        let quiz = Quiz::from_prompts(&bank, ["Symbol for iron?"]).unwrap();
        let mut session = QuizSession::new(quiz, &bank, &mut learner, &mut sink, &clock);

        assert!(matches!(
            session.record_answer("Fe").unwrap_err(),
            CoreError::NotPresented
        ));
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn missing_ledger_is_an_integrity_error() {
        let bank = bank();
        let mut learner = Learner::new("ada");
        learner.attach(crate::history::HistoryLedger::new(QuestionId::new(0)));
        let mut sink = RecordingSink::default();
        let clock = ManualClock::new(day(0));
        let quiz = Quiz::from_prompts(&bank, ["Orphan?"]).unwrap();
        let mut session = QuizSession::new(quiz, &bank, &mut learner, &mut sink, &clock);

        session.next_question_text().unwrap();
        let err = session.record_answer("x").unwrap_err();
        assert!(matches!(err, CoreError::NoMatchingHistory { ref prompt } if prompt == "Orphan?"));
        assert_eq!(session.cursor(), 0);
        assert!(sink.lines.is_empty());
    }

    #[test]
    fn clock_skew_fails_fast() {
        let bank = bank();
        let mut learner = learner(&bank);
        let mut sink = RecordingSink::default();
        let clock = ManualClock::new(day(0));
        let quiz = Quiz::from_prompts(&bank, ["Symbol for iron?"]).unwrap();
        let mut session = QuizSession::new(quiz, &bank, &mut learner, &mut sink, &clock);

        session.next_question_text().unwrap();
        clock.advance(TimeDelta::seconds(-30));
        let err = session.record_answer("Fe").unwrap_err();
        assert!(matches!(err, CoreError::NegativeElapsed { seconds: -30 }));
    }

    #[test]
    fn responses_are_escaped_before_storage() {
        let bank = bank();
        let mut learner = learner(&bank);
        let mut sink = RecordingSink::default();
        let clock = ManualClock::new(day(0));
        let quiz = Quiz::from_prompts(&bank, ["Symbol for iron?"]).unwrap();
        let mut session = QuizSession::new(quiz, &bank, &mut learner, &mut sink, &clock);

        session.next_question_text().unwrap();
        session.record_answer("F\te").unwrap();
        assert!(sink.lines[0].1.ends_with("\tw\tF@TABe"));
    }

    #[test]
    fn empty_quiz_is_complete_immediately() {
        let bank = bank();
        let mut learner = learner(&bank);
        let mut sink = RecordingSink::default();
        let clock = ManualClock::new(day(0));
        let mut session =
            QuizSession::new(Quiz::default(), &bank, &mut learner, &mut sink, &clock);

        assert!(session.is_empty());
        assert!(session.is_complete());
        assert!(session.next_question_text().is_err());
    }

    struct FailingSink;

    impl HistorySink for FailingSink {
        fn append(&mut self, _: &QuestionRecord, _: &AnswerEvent) -> std::io::Result<()> {
            Err(std::io::Error::other("disk full"))
        }
    }

    #[test]
    fn failed_write_leaves_ledger_and_cursor_untouched() {
        let bank = bank();
        let mut learner = learner(&bank);
        let mut sink = FailingSink;
        let clock = ManualClock::new(day(0));
        let quiz = Quiz::from_prompts(&bank, ["Symbol for iron?"]).unwrap();
        let mut session = QuizSession::new(quiz, &bank, &mut learner, &mut sink, &clock);

        session.next_question_text().unwrap();
        let err = session.record_answer("Fe").unwrap_err();
        assert!(matches!(err, CoreError::Persistence(_)));
        assert_eq!(session.cursor(), 0);
        assert!(learner.ledger(QuestionId::new(1)).unwrap().is_empty());
    }
}
