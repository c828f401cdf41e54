//! Field extraction from decoded posts.
//!
//! Every extractor tolerates absent, null, and wrongly-typed fields by
//! returning nothing. The real corpus names the author `user`, the text
//! `content` and the mention list `mentionedUsers`; `author`, `text` and
//! `mentions` are accepted when the primary name is absent.

use crate::models::PostRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

const AUTHOR_FIELDS: [&str; 2] = ["user", "author"];
const TEXT_FIELDS: [&str; 2] = ["content", "text"];
const MENTION_FIELDS: [&str; 2] = ["mentionedUsers", "mentions"];

fn first_field<'r>(record: &'r PostRecord, names: &[&str]) -> Option<&'r Value> {
    names
        .iter()
        .find_map(|name| record.get(name).filter(|v| !v.is_null()))
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

/// Calendar date and author username, if both are present and the date parses.
pub fn date_author(record: &PostRecord) -> Option<(NaiveDate, &str)> {
    let date = record.get("date").and_then(Value::as_str)?;
    let username = first_field(record, &AUTHOR_FIELDS)?
        .get("username")
        .and_then(non_empty_str)?;
    Some((parse_post_date(date)?, username))
}

/// Post text, if present as a string.
pub fn text(record: &PostRecord) -> Option<&str> {
    first_field(record, &TEXT_FIELDS)?.as_str()
}

/// Usernames of every mention entry, in order. Entries without a usable
/// username are skipped; a repeated mention is yielded each time.
pub fn mention_usernames(record: &PostRecord) -> impl Iterator<Item = &str> {
    first_field(record, &MENTION_FIELDS)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|mention| mention.get("username").and_then(non_empty_str))
}

/// Parses an ISO-8601 timestamp (or bare date) and truncates it to the
/// calendar date in the timestamp's own offset.
pub fn parse_post_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    for fmt in &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.date_naive());
        }
    }

    for fmt in &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.date());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}
