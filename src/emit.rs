use crate::models::{KeyCount, RankedDay, ResultRow};

/// `(date, top author)` rows in rank order
pub fn date_rows(days: &[RankedDay]) -> Vec<ResultRow> {
    days.iter()
        .map(|day| ResultRow::DateAuthor {
            date: day.date,
            username: day.top_author.key.clone(),
        })
        .collect()
}

/// `(key, count)` rows in rank order
pub fn count_rows(counts: &[KeyCount]) -> Vec<ResultRow> {
    counts
        .iter()
        .map(|kc| ResultRow::KeyCount {
            key: kc.key.clone(),
            count: kc.count,
        })
        .collect()
}
