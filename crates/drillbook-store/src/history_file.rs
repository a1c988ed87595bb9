//! Appending answers to history files.

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use drillbook_core::history::HISTORY_HEADER;
use drillbook_core::question::QuestionRecord;
use drillbook_core::record::{self, AnswerEvent};
use drillbook_core::traits::HistorySink;

use crate::layout::{file_stem_for, FILE_EXTENSION};

/// Writes answers to one learner's history directory.
///
/// Each append opens the question's file, writes one line, flushes, and
/// closes it again before returning. No handle outlives a call.
#[derive(Debug, Clone)]
pub struct HistoryFiles {
    dir: PathBuf,
}

impl HistoryFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// History file for the question with this prompt.
    pub fn path_for(&self, prompt: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{FILE_EXTENSION}", file_stem_for(prompt)))
    }
}

impl HistorySink for HistoryFiles {
    fn append(&mut self, question: &QuestionRecord, event: &AnswerEvent) -> io::Result<()> {
        let path = self.path_for(question.prompt());
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)?;

        let len = file.metadata()?.len();
        let needs_newline = if len == 0 {
            false
        } else {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1))?;
            file.read_exact(&mut last)?;
            last[0] != b'\n'
        };

        let mut out = BufWriter::new(file);
        if len == 0 {
            writeln!(out, "{HISTORY_HEADER}")?;
        } else if needs_newline {
            writeln!(out)?;
        }
        writeln!(out, "{}", record::encode(event))?;
        out.flush()?;

        tracing::debug!(path = %path.display(), "appended answer");
        Ok(())
    }
}
