use crate::config::PROGRESS_INTERVAL;
use crate::models::PostRecord;
use crate::stats::ScanStats;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use serde_json::Value;
use std::io::BufRead;

/// Outcome of decoding one raw line
#[derive(Debug, PartialEq)]
pub enum ParsedLine {
    Record(PostRecord),
    Malformed,
    Blank,
}

/// Decodes one raw line. Only JSON objects are records; invalid UTF-8,
/// invalid JSON, and non-object JSON values are all malformed.
pub fn parse_line(line: &[u8]) -> ParsedLine {
    let trimmed = line.trim_ascii();
    if trimmed.is_empty() {
        return ParsedLine::Blank;
    }
    match serde_json::from_slice::<Value>(trimmed) {
        Ok(Value::Object(fields)) => ParsedLine::Record(PostRecord::new(fields)),
        Ok(_) | Err(_) => ParsedLine::Malformed,
    }
}

/// Iterates the records of a line-delimited JSON stream.
///
/// Malformed and blank lines are skipped and counted. A read failure is
/// yielded once as an error and ends the iteration.
pub struct PostReader<'a> {
    reader: Box<dyn BufRead + 'a>,
    buf: Vec<u8>,
    stats: ScanStats,
    progress: Option<ProgressBar>,
    done: bool,
}

impl<'a> PostReader<'a> {
    pub fn new(reader: impl BufRead + 'a) -> Self {
        Self {
            reader: Box::new(reader),
            buf: Vec::with_capacity(4096),
            stats: ScanStats::new(),
            progress: None,
            done: false,
        }
    }

    /// Tick `pb` every `PROGRESS_INTERVAL` lines
    pub fn with_progress(mut self, pb: ProgressBar) -> Self {
        self.progress = Some(pb);
        self
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut ScanStats {
        &mut self.stats
    }

    pub fn into_stats(self) -> ScanStats {
        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }
        self.stats
    }

    fn read_line(&mut self) -> Result<bool> {
        self.buf.clear();
        let n = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .with_context(|| format!("Failed to read input after line {}", self.stats.lines()))?;
        Ok(n > 0)
    }
}

impl Iterator for PostReader<'_> {
    type Item = Result<PostRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.read_line() {
                Ok(true) => {}
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }

            self.stats.inc_lines();
            if let Some(pb) = &self.progress {
                if self.stats.lines() % PROGRESS_INTERVAL == 0 {
                    pb.set_message(format!("{} lines", self.stats.lines()));
                    pb.tick();
                }
            }

            match parse_line(&self.buf) {
                ParsedLine::Record(record) => {
                    self.stats.inc_decoded();
                    return Some(Ok(record));
                }
                ParsedLine::Malformed => self.stats.inc_malformed(),
                ParsedLine::Blank => self.stats.inc_blank(),
            }
        }
        None
    }
}
