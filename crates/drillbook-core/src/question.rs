//! Question definitions and the bank line codec.
//!
//! A bank line looks like:
//!
//! ```text
//! s	y	 .	Capital of France?	{Paris	}	geography	europe
//! ```
//!
//! kind marker, case flag (`y`/`n`), ignored characters (`**` for none),
//! prompt, the accepted answers between braces, then any number of tags.
//! Empty tab-separated fields are ignored, so trailing tabs are harmless.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Label every question carries.
pub const UNIVERSAL_TAG: &str = "Question";

/// Written in place of an empty ignored-character set.
const NO_IGNORED_CHARS: &str = "**";

/// Characters that would break the line grammar if they appeared in a field.
const RESERVED: [char; 5] = ['\t', '\n', '\r', '{', '}'];

/// Interned identity of a question within a [`QuestionBank`](crate::bank::QuestionBank).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct QuestionId(u32);

impl QuestionId {
    /// Ids are normally handed out by the bank; this is for building
    /// ledgers and fixtures by hand.
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kinds of question the bank understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    /// Fixed prompt with a fixed set of accepted answers.
    Static,
}

impl QuestionKind {
    /// Leading marker of a bank line.
    pub fn marker(self) -> &'static str {
        match self {
            QuestionKind::Static => "s",
        }
    }

    /// Label implicitly attached to every question of this kind.
    pub fn type_tag(self) -> &'static str {
        match self {
            QuestionKind::Static => "StaticQuestion",
        }
    }

    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "s" => Some(QuestionKind::Static),
            _ => None,
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::Static => write!(f, "static"),
        }
    }
}

/// A reviewable prompt and the rules for checking a response to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    kind: QuestionKind,
    prompt: String,
    correct_answers: Vec<String>,
    case_insensitive: bool,
    ignored_chars: Vec<char>,
    /// Explicit tags only; the implicit labels are added by [`tags`](Self::tags).
    tags: Vec<String>,
}

impl QuestionRecord {
    /// A case-sensitive static question with no ignored characters or tags.
    pub fn new<I, S>(prompt: impl Into<String>, correct_answers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prompt = prompt.into();
        check_field("prompt", &prompt)?;
        let correct_answers: Vec<String> = correct_answers.into_iter().map(Into::into).collect();
        if correct_answers.is_empty() {
            return Err(CoreError::question(format!(
                "question '{prompt}' has no correct answers"
            )));
        }
        for answer in &correct_answers {
            check_field("answer", answer)?;
        }
        Ok(Self {
            kind: QuestionKind::Static,
            prompt,
            correct_answers,
            case_insensitive: false,
            ignored_chars: Vec::new(),
            tags: Vec::new(),
        })
    }

    pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    /// Characters stripped from both sides before comparing.
    ///
    /// Duplicates and reserved characters are dropped.
    pub fn with_ignored_chars(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.ignored_chars.clear();
        for c in chars {
            if !RESERVED.contains(&c) && !self.ignored_chars.contains(&c) {
                self.ignored_chars.push(c);
            }
        }
        self
    }

    /// Explicit tags. Implicit labels and duplicates are dropped.
    pub fn with_tags<I, S>(mut self, tags: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.clear();
        for tag in tags {
            let tag = tag.into();
            check_field("tag", &tag)?;
            if tag == UNIVERSAL_TAG || tag == self.kind.type_tag() || self.tags.contains(&tag) {
                continue;
            }
            self.tags.push(tag);
        }
        Ok(self)
    }

    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn correct_answers(&self) -> &[String] {
        &self.correct_answers
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn ignored_chars(&self) -> &[char] {
        &self.ignored_chars
    }

    /// Every tag, starting with the universal and type labels.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        [UNIVERSAL_TAG, self.kind.type_tag()]
            .into_iter()
            .chain(self.tags.iter().map(String::as_str))
    }

    /// Tags written in the bank file.
    pub fn explicit_tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().any(|t| t == tag)
    }

    /// True when the question carries every tag in `filter`. An empty
    /// filter matches everything.
    pub fn has_all_tags<S: AsRef<str>>(&self, filter: &[S]) -> bool {
        filter.iter().all(|t| self.has_tag(t.as_ref()))
    }

    /// Check a response against every accepted answer.
    ///
    /// Both sides are lowercased first (when the question is case
    /// insensitive), then stripped of the ignored characters, then compared
    /// exactly.
    pub fn check_answer(&self, response: &str) -> bool {
        let response = self.normalize(response);
        self.correct_answers
            .iter()
            .any(|correct| self.normalize(correct) == response)
    }

    /// The form both sides of a comparison are reduced to.
    pub fn normalize(&self, text: &str) -> String {
        let folded = if self.case_insensitive {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        folded
            .chars()
            .filter(|c| !self.ignored_chars.contains(c))
            .collect()
    }
}

fn check_field(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(CoreError::question(format!("{what} is empty")));
    }
    if value.contains(RESERVED) {
        return Err(CoreError::question(format!(
            "{what} '{}' contains a tab, newline, or brace",
            value.escape_debug()
        )));
    }
    Ok(())
}

/// Decode a bank line into a question.
pub fn decode(line: &str) -> Result<QuestionRecord> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let open = line
        .find('{')
        .ok_or_else(|| CoreError::question("missing '{' before the answer list"))?;
    let close = line[open + 1..]
        .find('}')
        .map(|i| open + 1 + i)
        .ok_or_else(|| CoreError::question("missing '}' after the answer list"))?;
    if line[..open].contains('}') || line[close + 1..].contains(['{', '}']) {
        return Err(CoreError::question("unmatched brace"));
    }

    let head: Vec<&str> = non_empty_fields(&line[..open]).collect();
    let [marker, flag, ignored, prompt] = head.as_slice() else {
        return Err(CoreError::question(format!(
            "expected kind, case flag, ignored characters and prompt before '{{', found {} field(s)",
            head.len()
        )));
    };

    let kind = QuestionKind::from_marker(marker)
        .ok_or_else(|| CoreError::question(format!("unknown question kind '{marker}'")))?;
    let case_insensitive = match *flag {
        "y" => true,
        "n" => false,
        other => {
            return Err(CoreError::question(format!(
                "case flag must be 'y' or 'n', found '{other}'"
            )));
        }
    };
    let ignored_chars: Vec<char> = if *ignored == NO_IGNORED_CHARS {
        Vec::new()
    } else {
        ignored.chars().collect()
    };

    let question = match kind {
        QuestionKind::Static => QuestionRecord::new(*prompt, non_empty_fields(&line[open + 1..close]))?,
    };
    question
        .with_case_insensitive(case_insensitive)
        .with_ignored_chars(ignored_chars)
        .with_tags(non_empty_fields(&line[close + 1..]))
}

fn non_empty_fields(s: &str) -> impl Iterator<Item = &str> {
    s.split('\t').filter(|f| !f.is_empty())
}

/// Encode a question as a bank line (without the trailing newline).
pub fn encode(question: &QuestionRecord) -> String {
    let flag = if question.case_insensitive { "y" } else { "n" };
    let ignored: String = if question.ignored_chars.is_empty() {
        NO_IGNORED_CHARS.to_string()
    } else {
        question.ignored_chars.iter().collect()
    };
    let answers: String = question
        .correct_answers
        .iter()
        .map(|a| format!("{a}\t"))
        .collect();
    let tags: String = question.tags.iter().map(|t| format!("{t}\t")).collect();
    format!(
        "{}\t{flag}\t{ignored}\t{}\t{{{answers}}}\t{tags}",
        question.kind.marker(),
        question.prompt
    )
}

impl fmt::Display for QuestionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}

impl FromStr for QuestionRecord {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        decode(s)
    }
}
