//! Mastery scoring.
//!
//! Mastery is recent accuracy discounted by how long it has been since the
//! last correct answer, relative to how widely spaced past correct answers
//! have been:
//!
//! ```text
//! mastery = accuracy(last 7 days) * (1 - days_since_correct / (2 * wait))
//! ```
//!
//! clamped to `[0, 1]`. It is a decay heuristic, not a calibrated recall
//! probability.

use chrono::NaiveDateTime;

use crate::error::{CoreError, Result};
use crate::history::HistoryLedger;

/// Accuracy window used by [`score`].
pub const RECENT_WINDOW_DAYS: i64 = 7;

/// Mastery of a single question at `now`, in `[0, 1]`.
pub fn score(ledger: &HistoryLedger, now: NaiveDateTime) -> f64 {
    score_with_window(ledger, now, RECENT_WINDOW_DAYS)
}

/// [`score`] with a configurable accuracy window.
pub fn score_with_window(ledger: &HistoryLedger, now: NaiveDateTime, window_days: i64) -> f64 {
    if ledger.is_empty() {
        return 0.0;
    }
    let recent_accuracy = ledger.percent_correct_within(now, window_days);
    let wait = ledger.waiting_interval_days();
    if wait == 0 {
        return 0.0;
    }
    let Some(since_correct) = ledger.days_since_last_correct(now) else {
        return 0.0;
    };
    decay(recent_accuracy, since_correct, wait)
}

/// The decay step on its own: `accuracy * (1 - since / (2 * wait))`, clamped.
///
/// `wait` must be positive. A negative `since` (last correct answer stamped
/// after `now`) is capped at 1 rather than rewarded.
pub fn decay(recent_accuracy: f64, since_correct: i64, wait: i64) -> f64 {
    debug_assert!(wait > 0, "waiting interval must be positive");
    let raw = recent_accuracy * (1.0 - since_correct as f64 / (2 * wait) as f64);
    raw.clamp(0.0, 1.0)
}

/// Arithmetic mean of a set of per-question scores.
///
/// Fails with [`CoreError::EmptyAggregate`] when there are no scores.
pub fn aggregate<I>(scores: I) -> Result<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = scores
        .into_iter()
        .fold((0.0f64, 0usize), |(sum, count), s| (sum + s, count + 1));
    if count == 0 {
        return Err(CoreError::EmptyAggregate);
    }
    Ok(sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::{day, ledger};

    #[test]
    fn empty_ledger_scores_zero() {
        assert_eq!(score(&ledger(&[]), day(0)), 0.0);
    }

    #[test]
    fn never_correct_scores_zero() {
        assert_eq!(score(&ledger(&[(0, false), (1, false)]), day(1)), 0.0);
    }

    #[test]
    fn worked_example() {
        // Corrects at day 0, 2 and 7: gaps 2 and 5, span 5, wait 7.
        let l = ledger(&[(0, true), (2, true), (7, true)]);
        assert_eq!(l.longest_correct_span(), 5);
        assert_eq!(l.waiting_interval_days(), 7);

        // At day 10 only the day-7 answer is inside the 7-day window, so
        // accuracy is 1.0 and since = 3.
        let s = score(&l, day(10));
        assert!((s - (1.0 - 3.0 / 14.0)).abs() < 1e-9, "got {s}");
        assert!((s - 0.786).abs() < 1e-3);
    }

    #[test]
    fn long_neglect_clamps_to_zero() {
        let l = ledger(&[(0, true), (1, true)]);
        // wait = floor(1 * 1.2) + 1 = 2; since = 30 → raw strongly negative
        assert_eq!(score(&l, day(30)), 0.0);
    }

    #[test]
    fn future_events_stay_in_bounds() {
        let l = ledger(&[(5, true), (9, true)]);
        let s = score(&l, day(0));
        assert!((0.0..=1.0).contains(&s), "got {s}");
    }

    #[test]
    fn score_is_always_in_unit_interval() {
        let histories: [&[(i64, bool)]; 5] = [
            &[(0, true)],
            &[(0, false), (3, true), (4, false)],
            &[(0, true), (20, true), (21, false), (22, true)],
            &[(0, true), (0, true), (0, true)],
            &[(10, false), (2, true)],
        ];
        for events in histories {
            let l = ledger(events);
            for now in -5..60 {
                let s = score(&l, day(now));
                assert!((0.0..=1.0).contains(&s), "{events:?} at {now}: {s}");
            }
        }
    }

    #[test]
    fn decay_never_increases_with_time() {
        for wait in 1..10 {
            let mut previous = f64::INFINITY;
            for since in 0..40 {
                let s = decay(0.8, since, wait);
                assert!(s <= previous, "wait {wait}, since {since}");
                previous = s;
            }
        }
    }

    #[test]
    fn configurable_window() {
        let l = ledger(&[(0, false), (9, true)]);
        // window 7 at day 10: only the correct answer counts
        assert!((score_with_window(&l, day(10), 7) - 0.5).abs() < 1e-9);
        // window 30: half right, same decay
        assert!((score_with_window(&l, day(10), 30) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn aggregate_is_the_mean() {
        let mean = aggregate([0.2, 0.4, 0.9]).unwrap();
        assert!((mean - 0.5).abs() < 1e-9);
    }

    #[test]
    fn aggregate_of_nothing_is_an_error() {
        let err = aggregate(std::iter::empty()).unwrap_err();
        assert!(matches!(err, CoreError::EmptyAggregate));
    }
}
