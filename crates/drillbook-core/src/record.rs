//! Answer event codec.
//!
//! One answer is stored as one tab-separated line:
//!
//! ```text
//! 2024-03-01T09:30:12	14	r	Paris
//! ```
//!
//! Fields are timestamp (local date-time, second precision), elapsed whole
//! seconds, result marker (`r` correct, `w` incorrect), and the response.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Marker written for a correct answer.
pub const CORRECT_MARKER: &str = "r";
/// Marker written for an incorrect answer.
pub const INCORRECT_MARKER: &str = "w";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Older files may carry fractional seconds, or omit seconds when they are zero.
const ACCEPTED_TIMESTAMP_FORMATS: &[&str] =
    &[TIMESTAMP_FORMAT, "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// A single recorded attempt at a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEvent {
    timestamp: NaiveDateTime,
    elapsed: Duration,
    correct: bool,
    response: String,
}

impl AnswerEvent {
    /// Build an event, truncating both the timestamp and the elapsed time to
    /// whole seconds so that it survives an encode/decode cycle unchanged.
    pub fn new(
        timestamp: NaiveDateTime,
        elapsed: Duration,
        correct: bool,
        response: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.with_nanosecond(0).unwrap_or(timestamp),
            elapsed: Duration::from_secs(elapsed.as_secs()),
            correct,
            response: response.into(),
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_correct(&self) -> bool {
        self.correct
    }

    /// The response as stored, with special characters escaped.
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Whole days from this event to `now`, truncated toward zero.
    pub fn days_before(&self, now: NaiveDateTime) -> i64 {
        now.signed_duration_since(self.timestamp).num_days()
    }
}

/// Encode an event as a history line (without the trailing newline).
pub fn encode(event: &AnswerEvent) -> String {
    debug_assert!(
        !event.response.contains(['\t', '\n', '\r']),
        "response must be escaped before encoding"
    );
    let marker = if event.correct {
        CORRECT_MARKER
    } else {
        INCORRECT_MARKER
    };
    format!(
        "{}\t{}\t{}\t{}",
        event.timestamp.format(TIMESTAMP_FORMAT),
        event.elapsed.as_secs(),
        marker,
        event.response
    )
}

/// Decode a history line into an event.
pub fn decode(line: &str) -> Result<AnswerEvent> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let fields: Vec<&str> = line.split('\t').collect();
    let [timestamp, elapsed, marker, response] = fields.as_slice() else {
        return Err(CoreError::record(format!(
            "expected 4 fields, found {}",
            fields.len()
        )));
    };

    let timestamp = parse_timestamp(timestamp)?;
    let elapsed = elapsed.parse::<u64>().map_err(|_| {
        CoreError::record(format!(
            "elapsed time must be a non-negative integer: '{elapsed}'"
        ))
    })?;
    let correct = match *marker {
        CORRECT_MARKER => true,
        INCORRECT_MARKER => false,
        other => {
            return Err(CoreError::record(format!("unknown result marker '{other}'")));
        }
    };

    Ok(AnswerEvent::new(
        timestamp,
        Duration::from_secs(elapsed),
        correct,
        *response,
    ))
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    ACCEPTED_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| CoreError::record(format!("invalid timestamp '{s}'")))
}

impl fmt::Display for AnswerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}

impl FromStr for AnswerEvent {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        decode(s)
    }
}

/// Characters that cannot appear raw in a persisted field, and their escapes.
///
/// `@` is not escaped, so unescaping text that already contained a literal
/// `@TAB` is lossy. Existing history files depend on this exact encoding.
const ESCAPES: &[(&str, &str)] = &[
    ("\t", "@TAB"),
    ("\n", "@NEWLINE"),
    ("\r", "@RETURN"),
    ("*", "@ASTERISK"),
    ("{", "@OPENBRACE"),
    ("}", "@CLOSEBRACE"),
];

/// Replace tab, newline, carriage return, `*`, and braces with `@NAME` tokens.
pub fn escape_field(raw: &str) -> String {
    ESCAPES
        .iter()
        .fold(raw.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Reverse [`escape_field`].
pub fn unescape_field(escaped: &str) -> String {
    ESCAPES
        .iter()
        .fold(escaped.to_string(), |acc, (to, from)| acc.replace(from, to))
}
