//! Result sinks.
//!
//! A sink receives the ranked rows of one (statistic, strategy) pair and
//! replaces whatever it previously held for that pair in the current
//! partition. Nothing is appended, so re-running a job is harmless.

use crate::config::WRITE_BUFFER_SIZE;
use crate::models::{ResultRow, Statistic, Strategy};
use anyhow::{Context, Result};
use chrono::Utc;
use csv::Writer;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

pub trait ResultSink {
    fn emit(&mut self, rows: &[ResultRow], statistic: Statistic, strategy: Strategy) -> Result<()>;
}

/// Writes `<dir>/<statistic>_<strategy>/<partition>.csv`, one file per run
/// date by default.
pub struct CsvSink {
    dir: PathBuf,
    partition: String,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            partition: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
        }
    }

    pub fn with_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = partition.into();
        self
    }

    pub fn partition_path(&self, statistic: Statistic, strategy: Strategy) -> PathBuf {
        self.dir
            .join(format!("{}_{}", statistic.id(), strategy.id()))
            .join(format!("{}.csv", self.partition))
    }
}

fn header(statistic: Statistic) -> [&'static str; 2] {
    match statistic {
        Statistic::TopDates => ["date", "username"],
        Statistic::TopEmojis => ["emoji", "count"],
        Statistic::TopMentions => ["username", "count"],
    }
}

fn write_rows(path: &Path, statistic: Statistic, rows: &[ResultRow]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create result file: {}", path.display()))?;
    let mut writer = Writer::from_writer(BufWriter::with_capacity(WRITE_BUFFER_SIZE, file));

    writer.write_record(header(statistic))?;
    for row in rows {
        match row {
            ResultRow::DateAuthor { date, username } => {
                writer.write_record([date.to_string().as_str(), username.as_str()])?
            }
            ResultRow::KeyCount { key, count } => {
                writer.write_record([key.as_str(), count.to_string().as_str()])?
            }
        }
    }
    writer.flush()?;
    Ok(())
}

impl ResultSink for CsvSink {
    /// Writes to a temp file and renames it over the partition file.
    fn emit(&mut self, rows: &[ResultRow], statistic: Statistic, strategy: Strategy) -> Result<()> {
        let path = self.partition_path(statistic, strategy);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let tmp_path = path.with_extension("csv.tmp");
        let written = write_rows(&tmp_path, statistic, rows).and_then(|()| {
            fs::rename(&tmp_path, &path)
                .with_context(|| format!("Failed to rename temp result file to: {:?}", path))
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        info!(
            statistic = statistic.id(),
            strategy = strategy.id(),
            rows = rows.len(),
            path = ?path,
            "Results written"
        );
        Ok(())
    }
}

/// Keeps the latest rows per (statistic, strategy) in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Vec<(Statistic, Strategy, Vec<ResultRow>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self, statistic: Statistic, strategy: Strategy) -> Option<&[ResultRow]> {
        self.entries
            .iter()
            .find(|(s, m, _)| *s == statistic && *m == strategy)
            .map(|(_, _, rows)| rows.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResultSink for MemorySink {
    fn emit(&mut self, rows: &[ResultRow], statistic: Statistic, strategy: Strategy) -> Result<()> {
        self.entries
            .retain(|(s, m, _)| !(*s == statistic && *m == strategy));
        self.entries.push((statistic, strategy, rows.to_vec()));
        Ok(())
    }
}
