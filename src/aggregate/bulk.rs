use super::{Aggregator, FieldRules};
use crate::emoji::emoji_tokens;
use crate::extract;
use crate::models::{DayActivity, KeyCount, Strategy};
use crate::parser::PostReader;
use anyhow::Result;
use chrono::NaiveDate;
use tracing::debug;

/// Buffers every qualifying field, then sorts once and counts runs of equal
/// keys. Faster than hashing per record, but memory is proportional to input.
pub struct BulkAggregator {
    rules: FieldRules,
}

impl BulkAggregator {
    pub fn new(rules: FieldRules) -> Self {
        Self { rules }
    }
}

/// Counts runs of equal keys in a sorted slice
fn run_lengths<S: AsRef<str> + PartialEq>(sorted: &[S]) -> Vec<KeyCount> {
    sorted
        .chunk_by(|a, b| a == b)
        .map(|run| KeyCount::new(run[0].as_ref(), run.len() as u64))
        .collect()
}

impl Aggregator for BulkAggregator {
    fn strategy(&self) -> Strategy {
        Strategy::Bulk
    }

    fn count_date_authors(&self, posts: &mut PostReader<'_>) -> Result<Vec<DayActivity>> {
        let mut rows: Vec<(NaiveDate, String)> = Vec::new();

        while let Some(record) = posts.next() {
            let record = record?;
            let row = extract::date_author(&record).map(|(date, user)| (date, user.to_owned()));
            posts.stats_mut().record_used(row.is_some());
            rows.extend(row);
        }

        debug!(rows = rows.len(), "Buffered date/author rows");
        rows.sort_unstable();

        Ok(rows
            .chunk_by(|a, b| a.0 == b.0)
            .map(|day| DayActivity {
                date: day[0].0,
                total: day.len() as u64,
                authors: day
                    .chunk_by(|a, b| a.1 == b.1)
                    .map(|run| KeyCount::new(run[0].1.as_str(), run.len() as u64))
                    .collect(),
            })
            .collect())
    }

    fn count_emojis(&self, posts: &mut PostReader<'_>) -> Result<Vec<KeyCount>> {
        let mut tokens: Vec<String> = Vec::new();

        while let Some(record) = posts.next() {
            let record = record?;
            let before = tokens.len();
            if let Some(text) = extract::text(&record) {
                tokens.extend(emoji_tokens(text, self.rules.emoji_policy).map(str::to_owned));
            }
            posts.stats_mut().record_used(tokens.len() > before);
        }

        debug!(tokens = tokens.len(), "Buffered emoji tokens");
        tokens.sort_unstable();

        Ok(run_lengths(&tokens))
    }

    fn count_mentions(&self, posts: &mut PostReader<'_>) -> Result<Vec<KeyCount>> {
        let mut usernames: Vec<String> = Vec::new();

        while let Some(record) = posts.next() {
            let record = record?;
            let before = usernames.len();
            usernames.extend(extract::mention_usernames(&record).map(str::to_owned));
            posts.stats_mut().record_used(usernames.len() > before);
        }

        debug!(mentions = usernames.len(), "Buffered mentions");
        usernames.sort_unstable();

        Ok(run_lengths(&usernames))
    }
}
