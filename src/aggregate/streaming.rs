use super::{Aggregator, FieldRules};
use crate::emoji::emoji_tokens;
use crate::extract;
use crate::models::{DayActivity, KeyCount, Strategy};
use crate::parser::PostReader;
use anyhow::Result;
use chrono::NaiveDate;
use rustc_hash::FxHashMap;

/// Single pass, running counts only. Raw records are dropped as soon as their
/// fields have been counted.
pub struct StreamingAggregator {
    rules: FieldRules,
}

impl StreamingAggregator {
    pub fn new(rules: FieldRules) -> Self {
        Self { rules }
    }
}

/// Allocates the key only on first sight
fn bump(counts: &mut FxHashMap<String, u64>, key: &str) {
    if let Some(count) = counts.get_mut(key) {
        *count += 1;
    } else {
        counts.insert(key.to_owned(), 1);
    }
}

fn into_key_counts(counts: FxHashMap<String, u64>) -> Vec<KeyCount> {
    counts
        .into_iter()
        .map(|(key, count)| KeyCount { key, count })
        .collect()
}

impl Aggregator for StreamingAggregator {
    fn strategy(&self) -> Strategy {
        Strategy::Streaming
    }

    fn count_date_authors(&self, posts: &mut PostReader<'_>) -> Result<Vec<DayActivity>> {
        let mut days: FxHashMap<NaiveDate, FxHashMap<String, u64>> = FxHashMap::default();

        while let Some(record) = posts.next() {
            let record = record?;
            let used = match extract::date_author(&record) {
                Some((date, username)) => {
                    bump(days.entry(date).or_default(), username);
                    true
                }
                None => false,
            };
            posts.stats_mut().record_used(used);
        }

        Ok(days
            .into_iter()
            .map(|(date, authors)| DayActivity {
                date,
                total: authors.values().sum(),
                authors: into_key_counts(authors),
            })
            .collect())
    }

    fn count_emojis(&self, posts: &mut PostReader<'_>) -> Result<Vec<KeyCount>> {
        let mut counts = FxHashMap::default();

        while let Some(record) = posts.next() {
            let record = record?;
            let mut used = false;
            if let Some(text) = extract::text(&record) {
                for token in emoji_tokens(text, self.rules.emoji_policy) {
                    bump(&mut counts, token);
                    used = true;
                }
            }
            posts.stats_mut().record_used(used);
        }

        Ok(into_key_counts(counts))
    }

    fn count_mentions(&self, posts: &mut PostReader<'_>) -> Result<Vec<KeyCount>> {
        let mut counts = FxHashMap::default();

        while let Some(record) = posts.next() {
            let record = record?;
            let mut used = false;
            for username in extract::mention_usernames(&record) {
                bump(&mut counts, username);
                used = true;
            }
            posts.stats_mut().record_used(used);
        }

        Ok(into_key_counts(counts))
    }
}
