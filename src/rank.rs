//! Top-N selection.
//!
//! Ties are broken deterministically so both strategies rank identically:
//! equal counts order by key ascending (earlier date first, lexicographically
//! smaller username or emoji first).

use crate::models::{DayActivity, KeyCount, RankedDay};
use std::cmp::Ordering;

fn by_count_then_key(a: &KeyCount, b: &KeyCount) -> Ordering {
    b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key))
}

fn by_total_then_date(a: &DayActivity, b: &DayActivity) -> Ordering {
    b.total.cmp(&a.total).then_with(|| a.date.cmp(&b.date))
}

/// Keeps the first `n` items under `cmp`, sorted. Partial selection first so
/// only the retained prefix is fully sorted.
fn select_top<T>(items: &mut Vec<T>, n: usize, cmp: impl Fn(&T, &T) -> Ordering) {
    if n == 0 {
        items.clear();
        return;
    }
    if items.len() > n {
        items.select_nth_unstable_by(n - 1, &cmp);
        items.truncate(n);
    }
    items.sort_unstable_by(cmp);
}

/// The `top_n` most frequent keys, count descending. Fewer keys than `top_n`
/// returns all of them.
pub fn top_keys(mut counts: Vec<KeyCount>, top_n: usize) -> Vec<KeyCount> {
    select_top(&mut counts, top_n, by_count_then_key);
    counts
}

/// Most active author of one day
pub fn top_author(authors: &[KeyCount]) -> Option<&KeyCount> {
    authors.iter().min_by(|a, b| by_count_then_key(a, b))
}

/// The `top_n` dates with the most posts, each paired with its most active
/// author.
pub fn top_days(mut days: Vec<DayActivity>, top_n: usize) -> Vec<RankedDay> {
    days.retain(|day| !day.authors.is_empty());
    select_top(&mut days, top_n, by_total_then_date);

    days.into_iter()
        .filter_map(|day| {
            let top_author = top_author(&day.authors)?.clone();
            Some(RankedDay {
                date: day.date,
                total: day.total,
                top_author,
            })
        })
        .collect()
}
