//! Progress and history reports.
//!
//! Reports are plain data. The CLI renders [`ProgressReport`] as a table or
//! JSON and prints [`history_report`] as-is.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::bank::QuestionBank;
use crate::error::{CoreError, Result};
use crate::learner::Learner;
use crate::record;

/// Inside width of the progress bar when none is configured.
pub const DEFAULT_BAR_WIDTH: usize = 10;

/// Mastery across every tag in the bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Learner the report was built for.
    pub learner: String,
    /// Mean mastery over all questions, as a rounded percentage.
    pub overall_percent: u32,
    /// One row per tag, in first-seen tag order.
    pub rows: Vec<ProgressRow>,
}

/// Mastery of the questions sharing one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRow {
    pub tag: String,
    /// Mean mastery as a truncated percentage.
    pub percent: u32,
    pub bar: String,
    /// Questions carrying the tag.
    pub questions: usize,
    /// How many of those are due for review.
    pub due: usize,
}

impl ProgressReport {
    /// Build the report at `now`.
    ///
    /// Tags whose questions have no ledgers are left out. A learner with no
    /// ledgers at all gets an overall score of zero.
    pub fn build(
        bank: &QuestionBank,
        learner: &Learner,
        now: NaiveDateTime,
        bar_width: usize,
    ) -> Result<Self> {
        let overall = zero_if_empty(learner.overall_mastery(bank, now))?;
        let pool = learner.pool(bank);

        let mut rows = Vec::new();
        for tag in bank.all_tags() {
            let tagged: Vec<_> = pool.iter().filter(|e| e.question.has_tag(tag)).collect();
            if tagged.is_empty() {
                continue;
            }
            let mastery = learner.tag_mastery(bank, tag, now)?;
            let percent = (mastery * 100.0) as u32;
            rows.push(ProgressRow {
                tag: tag.to_string(),
                percent,
                bar: progress_bar(bar_width, f64::from(percent) / 100.0),
                questions: tagged.len(),
                due: tagged.iter().filter(|e| e.ledger.is_due(now)).count(),
            });
        }

        Ok(Self {
            learner: learner.name().to_string(),
            overall_percent: (overall * 100.0).round() as u32,
            rows,
        })
    }
}

fn zero_if_empty(score: Result<f64>) -> Result<f64> {
    match score {
        Err(CoreError::EmptyAggregate) => Ok(0.0),
        other => other,
    }
}

/// `[`, `floor(width * fraction)` `=` signs padded with spaces to `width`, `]`.
///
/// `fraction` is clamped to `[0, 1]`.
pub fn progress_bar(width: usize, fraction: f64) -> String {
    let filled = ((width as f64) * fraction.clamp(0.0, 1.0)).floor() as usize;
    format!("[{}{}]", "=".repeat(filled), " ".repeat(width - filled))
}

/// Every response to the questions carrying all of `tags`, grouped by
/// question in bank order. An empty tag list selects everything.
pub fn history_report<S: AsRef<str>>(bank: &QuestionBank, learner: &Learner, tags: &[S]) -> String {
    let mut out = String::from("History of Responses:\n");
    for entry in learner.pool(bank) {
        if !entry.question.has_all_tags(tags) {
            continue;
        }
        out.push_str(&format!("History for [{}]\n", entry.question.prompt()));
        for event in entry.ledger.events() {
            out.push_str(&record::encode(event));
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::day;
    use crate::history::HistoryLedger;
    use crate::question::QuestionId;
    use crate::record::AnswerEvent;
    use std::time::Duration;

    fn fixture() -> (QuestionBank, Learner) {
        let mut bank = QuestionBank::new();
        bank.load_category(
            "Header\n\
             s\tn\t**\tOne?\t{1}\tmath\n\
             s\tn\t**\tTwo?\t{2}\tmath\n\
             s\tn\t**\tRed?\t{red}\tcolours\n",
        )
        .unwrap();
        let mut learner = Learner::new("ada");
        learner.ensure_ledgers(&bank);
        let mut one = HistoryLedger::new(QuestionId::new(0));
        one.append(AnswerEvent::new(day(3), Duration::from_secs(4), false, "3"));
        one.append(AnswerEvent::new(day(5), Duration::from_secs(2), true, "1"));
        learner.attach(one);
        (bank, learner)
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(10, 0.0), "[          ]");
        assert_eq!(progress_bar(10, 0.47), "[====      ]");
        assert_eq!(progress_bar(10, 1.0), "[==========]");
        assert_eq!(progress_bar(4, 3.0), "[====]");
        assert_eq!(progress_bar(4, -1.0), "[    ]");
    }

    #[test]
    fn progress_rows_per_tag() {
        let (bank, learner) = fixture();
        let report = ProgressReport::build(&bank, &learner, day(5), DEFAULT_BAR_WIDTH).unwrap();

        let tags: Vec<&str> = report.rows.iter().map(|r| r.tag.as_str()).collect();
        assert_eq!(tags, ["Question", "StaticQuestion", "math", "colours"]);

        // One? has accuracy 1/2 today and was answered correctly today.
        let math = &report.rows[2];
        assert_eq!(math.percent, 25);
        assert_eq!(math.bar, "[==        ]");
        assert_eq!(math.questions, 2);
        assert_eq!(math.due, 1);

        assert_eq!(report.rows[3].percent, 0);
        // (0.5 + 0 + 0) / 3 = 16.67%
        assert_eq!(report.overall_percent, 17);
        assert_eq!(report.learner, "ada");
    }

    #[test]
    fn progress_without_ledgers_is_zero() {
        let (bank, _) = fixture();
        let learner = Learner::new("new");
        let report = ProgressReport::build(&bank, &learner, day(0), 10).unwrap();
        assert_eq!(report.overall_percent, 0);
        assert!(report.rows.is_empty());
    }

    #[test]
    fn progress_serializes_to_json() {
        let (bank, learner) = fixture();
        let report = ProgressReport::build(&bank, &learner, day(5), 10).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"overall_percent\":17"));
        let back: ProgressReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn history_report_lists_tagged_questions() {
        let (bank, learner) = fixture();
        let text = history_report(&bank, &learner, &["math"]);
        assert_eq!(
            text,
            "History of Responses:\n\
             History for [One?]\n\
             2024-01-04T12:00:00\t4\tw\t3\n\
             2024-01-06T12:00:00\t2\tr\t1\n\
             History for [Two?]\n"
        );
        assert!(!text.contains("Red?"));

        let all = history_report::<&str>(&bank, &learner, &[]);
        assert!(all.contains("History for [Red?]"));
    }
}
