use chrono::NaiveDate;
use clap::ValueEnum;
use serde_json::{Map, Value};
use std::fmt;

/// One decoded post: a JSON object from a single input line.
#[derive(Debug, Clone, PartialEq)]
pub struct PostRecord(Map<String, Value>);

impl PostRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }
}

/// The three aggregate statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Statistic {
    /// Busiest dates and the most active author on each
    #[value(name = "q1", alias = "top-dates")]
    TopDates,
    /// Most used emoji
    #[value(name = "q2", alias = "top-emojis")]
    TopEmojis,
    /// Most mentioned usernames
    #[value(name = "q3", alias = "top-mentions")]
    TopMentions,
}

impl Statistic {
    pub const ALL: [Statistic; 3] = [
        Statistic::TopDates,
        Statistic::TopEmojis,
        Statistic::TopMentions,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Statistic::TopDates => "q1",
            Statistic::TopEmojis => "q2",
            Statistic::TopMentions => "q3",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Aggregation strategy. Both produce the same ranked sets and counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Strategy {
    /// Single pass with running counts; memory bounded by distinct keys
    #[value(alias = "memory")]
    Streaming,
    /// Buffer every extracted field, then sort and group; memory bounded by input
    #[value(alias = "time")]
    Bulk,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::Streaming, Strategy::Bulk];

    pub fn id(self) -> &'static str {
        match self {
            Strategy::Streaming => "streaming",
            Strategy::Bulk => "bulk",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A grouping key with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCount {
    pub key: String,
    pub count: u64,
}

impl KeyCount {
    pub fn new(key: impl Into<String>, count: u64) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

/// Per-date post counts, broken down by author. `total` is the sum of the
/// author counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayActivity {
    pub date: NaiveDate,
    pub total: u64,
    pub authors: Vec<KeyCount>,
}

/// A selected date together with its most active author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedDay {
    pub date: NaiveDate,
    pub total: u64,
    pub top_author: KeyCount,
}

/// One output row handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultRow {
    DateAuthor { date: NaiveDate, username: String },
    KeyCount { key: String, count: u64 },
}

impl fmt::Display for ResultRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultRow::DateAuthor { date, username } => write!(f, "({date}, {username})"),
            ResultRow::KeyCount { key, count } => write!(f, "({key}, {count})"),
        }
    }
}
