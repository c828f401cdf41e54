//! Count-table construction.
//!
//! Two interchangeable strategies sit behind [`Aggregator`]:
//!
//! - [`StreamingAggregator`] keeps running counts in hash maps during a single
//!   pass; memory grows with the number of distinct keys only
//! - [`BulkAggregator`] buffers every extracted field first, then sorts the
//!   buffer and counts runs of equal keys; memory grows with the input
//!
//! Both apply the same extraction rules and return unordered tables with
//! identical contents for the same input. Ordering is the ranker's job.

mod bulk;
mod streaming;

pub use bulk::BulkAggregator;
pub use streaming::StreamingAggregator;

use crate::config::EMOJI_POLICY;
use crate::emoji::EmojiPolicy;
use crate::models::{DayActivity, KeyCount, Statistic, Strategy};
use crate::parser::PostReader;
use anyhow::Result;

/// Extraction settings shared by both strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRules {
    pub emoji_policy: EmojiPolicy,
}

impl Default for FieldRules {
    fn default() -> Self {
        Self {
            emoji_policy: EMOJI_POLICY,
        }
    }
}

/// Unordered counts for one statistic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountTable {
    Days(Vec<DayActivity>),
    Keys(Vec<KeyCount>),
}

pub trait Aggregator {
    fn strategy(&self) -> Strategy;

    /// Posts per (date, author)
    fn count_date_authors(&self, posts: &mut PostReader<'_>) -> Result<Vec<DayActivity>>;

    /// Occurrences per emoji token
    fn count_emojis(&self, posts: &mut PostReader<'_>) -> Result<Vec<KeyCount>>;

    /// Occurrences per mentioned username
    fn count_mentions(&self, posts: &mut PostReader<'_>) -> Result<Vec<KeyCount>>;

    fn count(&self, statistic: Statistic, posts: &mut PostReader<'_>) -> Result<CountTable> {
        Ok(match statistic {
            Statistic::TopDates => CountTable::Days(self.count_date_authors(posts)?),
            Statistic::TopEmojis => CountTable::Keys(self.count_emojis(posts)?),
            Statistic::TopMentions => CountTable::Keys(self.count_mentions(posts)?),
        })
    }
}

pub fn aggregator_for(strategy: Strategy, rules: FieldRules) -> Box<dyn Aggregator> {
    match strategy {
        Strategy::Streaming => Box::new(StreamingAggregator::new(rules)),
        Strategy::Bulk => Box::new(BulkAggregator::new(rules)),
    }
}
