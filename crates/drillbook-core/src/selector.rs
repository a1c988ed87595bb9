//! Quiz selection.
//!
//! Selection is mastery-biased, presentation is random: the pool is
//! filtered by tag, sorted by mastery with the weakest questions first,
//! cut to the quiz size, and only then shuffled.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::bank::QuestionBank;
use crate::error::{CoreError, Result};
use crate::learner::{Learner, PoolEntry};
use crate::question::QuestionId;

/// A pool entry with its mastery at ranking time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked {
    pub id: QuestionId,
    pub mastery: f64,
}

/// Filter `pool` to entries carrying every tag in `tag_filter` and sort them
/// by ascending mastery. Equal scores keep their pool order.
pub fn rank<S: AsRef<str>>(
    pool: &[PoolEntry<'_>],
    tag_filter: &[S],
    now: NaiveDateTime,
    window_days: i64,
) -> Vec<Ranked> {
    let mut ranked: Vec<Ranked> = pool
        .iter()
        .filter(|entry| entry.question.has_all_tags(tag_filter))
        .map(|entry| Ranked {
            id: entry.id,
            mastery: entry.mastery(now, window_days),
        })
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| a.mastery.total_cmp(&b.mastery));
    ranked
}

/// Pick up to `count` of the weakest tagged questions and shuffle them.
pub fn select<S, R>(
    pool: &[PoolEntry<'_>],
    tag_filter: &[S],
    count: usize,
    now: NaiveDateTime,
    window_days: i64,
    rng: &mut R,
) -> Vec<QuestionId>
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    let mut chosen: Vec<QuestionId> = rank(pool, tag_filter, now, window_days)
        .into_iter()
        .take(count)
        .map(|r| r.id)
        .collect();
    chosen.shuffle(rng);
    tracing::debug!(
        pool = pool.len(),
        chosen = chosen.len(),
        requested = count,
        "selected quiz questions"
    );
    chosen
}

/// A fixed, ordered list of questions to ask.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quiz {
    questions: Vec<QuestionId>,
}

impl Quiz {
    pub fn new(questions: Vec<QuestionId>) -> Self {
        Self { questions }
    }

    /// A hand-picked quiz, one question per prompt, in the given order.
    ///
    /// Every prompt must exist in the bank.
    pub fn from_prompts<I, S>(bank: &QuestionBank, prompts: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let questions = prompts
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                bank.id_of(p).ok_or_else(|| CoreError::UnknownQuestion {
                    prompt: p.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { questions })
    }

    pub fn questions(&self) -> &[QuestionId] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Builds quizzes from a growing, tag-filtered selection pool.
#[derive(Debug, Clone)]
pub struct QuizSelector {
    count: usize,
    members: Vec<QuestionId>,
    seen: HashSet<QuestionId>,
}

impl QuizSelector {
    /// Start a selector over the learner's questions carrying every tag in
    /// `tag_filter`.
    pub fn new<S: AsRef<str>>(
        learner: &Learner,
        bank: &QuestionBank,
        tag_filter: &[S],
        count: usize,
    ) -> Self {
        let mut selector = Self {
            count,
            members: Vec::new(),
            seen: HashSet::new(),
        };
        selector.merge(learner, bank, tag_filter);
        selector
    }

    /// Add the questions matching another tag set. Questions already in the
    /// pool are not added twice.
    pub fn extend<S: AsRef<str>>(&mut self, learner: &Learner, bank: &QuestionBank, more_tags: &[S]) {
        self.merge(learner, bank, more_tags);
    }

    fn merge<S: AsRef<str>>(&mut self, learner: &Learner, bank: &QuestionBank, tags: &[S]) {
        for entry in learner.pool(bank) {
            if entry.question.has_all_tags(tags) && self.seen.insert(entry.id) {
                self.members.push(entry.id);
            }
        }
    }

    /// Ids in the selection pool, in the order they were added.
    pub fn pool(&self) -> &[QuestionId] {
        &self.members
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Rank the current pool and draw a shuffled quiz from it.
    pub fn build<R: Rng + ?Sized>(
        &self,
        learner: &Learner,
        bank: &QuestionBank,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> Quiz {
        let entries: Vec<PoolEntry<'_>> = self
            .members
            .iter()
            .filter_map(|&id| {
                Some(PoolEntry {
                    id,
                    question: bank.get(id)?,
                    ledger: learner.ledger(id)?,
                })
            })
            .collect();
        let no_filter: [&str; 0] = [];
        Quiz::new(select(
            &entries,
            &no_filter,
            self.count,
            now,
            learner.window_days(),
            rng,
        ))
    }
}
