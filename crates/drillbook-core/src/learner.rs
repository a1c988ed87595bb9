//! A learner's histories and the pool they form with the bank.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::bank::QuestionBank;
use crate::error::Result;
use crate::history::HistoryLedger;
use crate::mastery;
use crate::question::{QuestionId, QuestionRecord};

/// One question paired with the learner's history for it.
#[derive(Debug, Clone, Copy)]
pub struct PoolEntry<'a> {
    pub id: QuestionId,
    pub question: &'a QuestionRecord,
    pub ledger: &'a HistoryLedger,
}

impl PoolEntry<'_> {
    pub fn mastery(&self, now: NaiveDateTime, window_days: i64) -> f64 {
        mastery::score_with_window(self.ledger, now, window_days)
    }
}

/// A named learner and one ledger per question they have a history for.
#[derive(Debug, Clone)]
pub struct Learner {
    name: String,
    ledgers: HashMap<QuestionId, HistoryLedger>,
    window_days: i64,
}

impl Learner {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ledgers: HashMap::new(),
            window_days: mastery::RECENT_WINDOW_DAYS,
        }
    }

    /// Override the accuracy window used when scoring this learner.
    pub fn with_window_days(mut self, window_days: i64) -> Self {
        self.window_days = window_days;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn window_days(&self) -> i64 {
        self.window_days
    }

    /// Add a loaded ledger, replacing any previous one for the same question.
    pub fn attach(&mut self, ledger: HistoryLedger) {
        self.ledgers.insert(ledger.question(), ledger);
    }

    pub fn ledger(&self, id: QuestionId) -> Option<&HistoryLedger> {
        self.ledgers.get(&id)
    }

    pub fn ledger_mut(&mut self, id: QuestionId) -> Option<&mut HistoryLedger> {
        self.ledgers.get_mut(&id)
    }

    pub fn ledger_count(&self) -> usize {
        self.ledgers.len()
    }

    /// Give every bank question without a ledger an empty one.
    ///
    /// Returns the ids that were added, in bank order, so the caller can
    /// create the matching history files.
    pub fn ensure_ledgers(&mut self, bank: &QuestionBank) -> Vec<QuestionId> {
        let mut added = Vec::new();
        for (id, _) in bank.iter() {
            if !self.ledgers.contains_key(&id) {
                self.ledgers.insert(id, HistoryLedger::new(id));
                added.push(id);
            }
        }
        added
    }

    /// Pool entries in bank order. Questions without a ledger are left out.
    pub fn pool<'a>(&'a self, bank: &'a QuestionBank) -> Vec<PoolEntry<'a>> {
        bank.iter()
            .filter_map(|(id, question)| {
                self.ledgers.get(&id).map(|ledger| PoolEntry {
                    id,
                    question,
                    ledger,
                })
            })
            .collect()
    }

    /// Current mastery of one question, or `None` without a ledger.
    pub fn mastery_of(&self, id: QuestionId, now: NaiveDateTime) -> Option<f64> {
        self.ledger(id)
            .map(|ledger| mastery::score_with_window(ledger, now, self.window_days))
    }

    /// Mean mastery over every question in the pool.
    pub fn overall_mastery(&self, bank: &QuestionBank, now: NaiveDateTime) -> Result<f64> {
        mastery::aggregate(
            self.pool(bank)
                .iter()
                .map(|entry| entry.mastery(now, self.window_days)),
        )
    }

    /// Mean mastery over the pool questions carrying `tag`.
    pub fn tag_mastery(&self, bank: &QuestionBank, tag: &str, now: NaiveDateTime) -> Result<f64> {
        mastery::aggregate(
            self.pool(bank)
                .iter()
                .filter(|entry| entry.question.has_tag(tag))
                .map(|entry| entry.mastery(now, self.window_days)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::history::tests::day;
    use crate::record::AnswerEvent;
    use std::time::Duration;

    fn bank() -> QuestionBank {
        let mut bank = QuestionBank::new();
        bank.load_category(
            "Header\n\
             s\tn\t**\tOne?\t{1}\tmath\n\
             s\tn\t**\tTwo?\t{2}\tmath\n\
             s\tn\t**\tRed?\t{red}\tcolours\n",
        )
        .unwrap();
        bank
    }

    fn answered(id: QuestionId, correct_days: &[i64]) -> HistoryLedger {
        let mut ledger = HistoryLedger::new(id);
        for &d in correct_days {
            ledger.append(AnswerEvent::new(day(d), Duration::from_secs(3), true, "x"));
        }
        ledger
    }

    #[test]
    fn ensure_ledgers_fills_gaps() {
        let bank = bank();
        let mut learner = Learner::new("ada");
        learner.attach(answered(QuestionId::new(1), &[0]));

        let added = learner.ensure_ledgers(&bank);
        assert_eq!(added, vec![QuestionId::new(0), QuestionId::new(2)]);
        assert_eq!(learner.ledger_count(), 3);
        assert!(learner.ensure_ledgers(&bank).is_empty());
    }

    #[test]
    fn pool_skips_questions_without_ledgers() {
        let bank = bank();
        let mut learner = Learner::new("ada");
        learner.attach(answered(QuestionId::new(2), &[]));
        let pool = learner.pool(&bank);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].question.prompt(), "Red?");
    }

    #[test]
    fn tag_mastery_averages_tagged_questions() {
        let bank = bank();
        let mut learner = Learner::new("ada");
        learner.ensure_ledgers(&bank);
        // answered today: accuracy 1, since 0 → mastery 1
        learner.attach(answered(QuestionId::new(0), &[5]));

        let math = learner.tag_mastery(&bank, "math", day(5)).unwrap();
        assert!((math - 0.5).abs() < 1e-9, "got {math}");
        let overall = learner.overall_mastery(&bank, day(5)).unwrap();
        assert!((overall - 1.0 / 3.0).abs() < 1e-9, "got {overall}");
        assert_eq!(learner.mastery_of(QuestionId::new(0), day(5)), Some(1.0));
    }

    #[test]
    fn tag_mastery_of_unknown_tag_is_an_error() {
        let bank = bank();
        let mut learner = Learner::new("ada");
        learner.ensure_ledgers(&bank);
        let err = learner.tag_mastery(&bank, "history", day(0)).unwrap_err();
        assert!(matches!(err, CoreError::EmptyAggregate));
    }
}
