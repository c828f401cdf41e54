//! End-to-end tests for the poststats pipeline.
//!
//! Each test writes a JSONL fixture to a temp file (optionally BZ2-compressed),
//! runs one or more statistics through `pipeline::run_file` with both
//! strategies, and checks the ranked rows.
//!
//! - **Scenario Tests** -- The reference date, emoji and mention fixtures
//! - **Robustness Tests** -- Malformed lines, missing fields, empty input
//! - **Ranking Tests** -- top_n larger than the key count, idempotence
//! - **Output Tests** -- CSV sink layout and overwrite semantics

use bzip2::write::BzEncoder;
use bzip2::Compression;
use chrono::NaiveDate;
use poststats::models::{ResultRow, Statistic, Strategy};
use poststats::pipeline::{
    run_all, run_file, run_reader, same_results, RunOptions, StatisticReport,
};
use poststats::sink::{CsvSink, ResultSink};
use std::io::{self, BufReader, Cursor, Read, Write};
use tempfile::{NamedTempFile, TempDir};

fn jsonl_file(lines: &[&str]) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(tmp, "{}", line).unwrap();
    }
    tmp.flush().unwrap();
    tmp
}

fn bz2_jsonl_file(lines: &[&str]) -> NamedTempFile {
    let mut encoder = BzEncoder::new(Vec::new(), Compression::fast());
    for line in lines {
        writeln!(encoder, "{}", line).unwrap();
    }
    let compressed = encoder.finish().unwrap();

    let mut tmp = tempfile::Builder::new().suffix(".jsonl.bz2").tempfile().unwrap();
    tmp.write_all(&compressed).unwrap();
    tmp.flush().unwrap();
    tmp
}

fn run(
    file: &NamedTempFile,
    statistic: Statistic,
    strategy: Strategy,
    top_n: usize,
) -> StatisticReport {
    let options = RunOptions::new(top_n, strategy).unwrap();
    run_file(file.path().to_str().unwrap(), statistic, &options).unwrap()
}

fn date_row(y: i32, m: u32, d: u32, username: &str) -> ResultRow {
    ResultRow::DateAuthor {
        date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        username: username.to_string(),
    }
}

fn count_row(key: &str, count: u64) -> ResultRow {
    ResultRow::KeyCount {
        key: key.to_string(),
        count,
    }
}

const DATE_LINES: [&str; 6] = [
    r#"{"date":"2021-02-01T12:00:00Z","user":{"username":"alice"}}"#,
    r#"{"date":"2021-02-01T15:00:00Z","user":{"username":"alice"}}"#,
    r#"{"date":"2021-02-01T18:00:00Z","user":{"username":"bob"}}"#,
    r#"{"date":"2021-02-02T09:00:00Z","user":{"username":"carol"}}"#,
    r#"{"date":"2021-02-02T10:00:00Z","user":{"username":"carol"}}"#,
    r#"{"date":"2021-02-02T11:00:00Z","user":{"username":"dan"}}"#,
];

const EMOJI_LINES: [&str; 5] = [
    r#"{"content": "Good morning! ☀️😊"}"#,
    r#"{"content": "Hello world! 😊😊"}"#,
    r#"{"content": "I love Python! 🐍😊"}"#,
    r#"{"content": "So happy! 😊"}"#,
    r#"{"content": "Just code! 🐍"}"#,
];

const MENTION_LINES: [&str; 5] = [
    r#"{"mentionedUsers": [{"username": "alice"}]}"#,
    r#"{"mentionedUsers": [{"username": "bob"}, {"username": "alice"}]}"#,
    r#"{"mentionedUsers": [{"username": "alice"}]}"#,
    r#"{"mentionedUsers": [{"username": "carol"}]}"#,
    r#"{"mentionedUsers": [{"username": "bob"}]}"#,
];

// ---------------------------------------------------------------------------
// Scenario tests
// ---------------------------------------------------------------------------

#[test]
fn busiest_dates_with_top_author() {
    let file = jsonl_file(&DATE_LINES);
    for strategy in Strategy::ALL {
        let report = run(&file, Statistic::TopDates, strategy, 2);
        assert_eq!(
            report.rows,
            [date_row(2021, 2, 1, "alice"), date_row(2021, 2, 2, "carol")],
            "strategy {strategy}"
        );
    }
}

#[test]
fn most_used_emoji_per_code_point() {
    let file = jsonl_file(&EMOJI_LINES);
    for strategy in Strategy::ALL {
        let report = run(&file, Statistic::TopEmojis, strategy, 2);
        assert_eq!(
            report.rows,
            [count_row("😊", 5), count_row("🐍", 2)],
            "strategy {strategy}"
        );
    }
}

#[test]
fn most_mentioned_usernames() {
    let file = jsonl_file(&MENTION_LINES);
    for strategy in Strategy::ALL {
        let report = run(&file, Statistic::TopMentions, strategy, 2);
        assert_eq!(
            report.rows,
            [count_row("alice", 3), count_row("bob", 2)],
            "strategy {strategy}"
        );
    }
}

#[test]
fn bz2_input_matches_plain_input() {
    let plain = jsonl_file(&MENTION_LINES);
    let compressed = bz2_jsonl_file(&MENTION_LINES);
    for strategy in Strategy::ALL {
        assert_eq!(
            run(&plain, Statistic::TopMentions, strategy, 3).rows,
            run(&compressed, Statistic::TopMentions, strategy, 3).rows
        );
    }
}

// ---------------------------------------------------------------------------
// Robustness tests
// ---------------------------------------------------------------------------

#[test]
fn malformed_lines_do_not_change_results() {
    let mut noisy: Vec<&str> = Vec::new();
    for (i, line) in DATE_LINES.into_iter().enumerate() {
        noisy.push(line);
        match i % 3 {
            0 => noisy.push(r#"{"date":"2021-02-03T12:00:00Z","user":{"username":"#),
            1 => noisy.push("this is not json"),
            _ => noisy.push("[\"an\", \"array\"]"),
        }
    }
    let clean = jsonl_file(&DATE_LINES);
    let noisy = jsonl_file(&noisy);

    for statistic in Statistic::ALL {
        for strategy in Strategy::ALL {
            let with_noise = run(&noisy, statistic, strategy, 5);
            assert_eq!(with_noise.rows, run(&clean, statistic, strategy, 5).rows);
            assert_eq!(with_noise.stats.malformed(), DATE_LINES.len() as u64);
        }
    }
}

#[test]
fn missing_fields_only_skip_their_statistic() {
    let file = jsonl_file(&[
        r#"{"date": "2021-02-01T12:00:00Z", "content": "😊", "mentionedUsers": [{"username": "bob"}]}"#,
        r#"{"user": {"username": "alice"}, "content": null, "mentionedUsers": [{"id": 1}]}"#,
        r#"{"date": "not a date", "user": {"username": "alice"}, "content": "🐍"}"#,
        r#"{"date": "2021-02-01T13:00:00Z", "user": {"username": "carol"}, "mentionedUsers": null}"#,
    ]);

    for strategy in Strategy::ALL {
        assert_eq!(
            run(&file, Statistic::TopDates, strategy, 5).rows,
            [date_row(2021, 2, 1, "carol")]
        );
        assert_eq!(
            run(&file, Statistic::TopEmojis, strategy, 5).rows,
            [count_row("🐍", 1), count_row("😊", 1)]
        );
        assert_eq!(
            run(&file, Statistic::TopMentions, strategy, 5).rows,
            [count_row("bob", 1)]
        );
    }
}

#[test]
fn empty_input_yields_empty_results() {
    let file = jsonl_file(&[]);
    for statistic in Statistic::ALL {
        for strategy in Strategy::ALL {
            let report = run(&file, statistic, strategy, 10);
            assert!(report.rows.is_empty());
            assert_eq!(report.stats.lines(), 0);
        }
    }
}

#[test]
fn fully_malformed_input_yields_empty_results() {
    let file = jsonl_file(&["{", "nope", "", "42"]);
    for statistic in Statistic::ALL {
        for strategy in Strategy::ALL {
            let report = run(&file, statistic, strategy, 10);
            assert!(report.rows.is_empty());
            assert_eq!(report.stats.malformed(), 3);
        }
    }
}

/// Delivers `data`, then fails like a pipe closed mid-transfer
struct FailingRead {
    data: Cursor<Vec<u8>>,
}

impl Read for FailingRead {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.data.read(buf)?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "connection dropped"));
        }
        Ok(n)
    }
}

#[test]
fn read_failure_mid_stream_fails_the_statistic() {
    let mut data = Vec::new();
    for line in &DATE_LINES[..3] {
        writeln!(data, "{}", line).unwrap();
    }

    for statistic in Statistic::ALL {
        for strategy in Strategy::ALL {
            let reader = BufReader::new(FailingRead {
                data: Cursor::new(data.clone()),
            });
            let options = RunOptions::new(5, strategy).unwrap();

            let err = match run_reader(reader, statistic, &options) {
                Ok(report) => panic!("{statistic} ({strategy}) returned rows: {:?}", report.rows),
                Err(e) => e,
            };
            let message = format!("{err:#}");
            assert!(message.contains("connection dropped"), "{message}");
            assert!(message.contains("after line 3"), "{message}");
        }
    }
}

#[test]
fn missing_input_is_an_error() {
    let options = RunOptions::new(3, Strategy::Bulk).unwrap();
    assert!(run_file("/nonexistent/tweets.jsonl", Statistic::TopEmojis, &options).is_err());
}

// ---------------------------------------------------------------------------
// Ranking tests
// ---------------------------------------------------------------------------

#[test]
fn top_n_beyond_distinct_keys_returns_all_keys_once() {
    let file = jsonl_file(&MENTION_LINES);
    for strategy in Strategy::ALL {
        let report = run(&file, Statistic::TopMentions, strategy, 50);
        assert_eq!(
            report.rows,
            [count_row("alice", 3), count_row("bob", 2), count_row("carol", 1)]
        );
    }
}

#[test]
fn running_twice_gives_the_same_result() {
    let file = jsonl_file(&EMOJI_LINES);
    for strategy in Strategy::ALL {
        let first = run(&file, Statistic::TopEmojis, strategy, 10);
        let second = run(&file, Statistic::TopEmojis, strategy, 10);
        assert_eq!(first.rows, second.rows);
    }
}

#[test]
fn run_all_covers_every_statistic_and_strategy() {
    let mut lines: Vec<&str> = DATE_LINES.to_vec();
    lines.extend(EMOJI_LINES);
    lines.extend(MENTION_LINES);
    let file = jsonl_file(&lines);

    let reports = run_all(file.path().to_str().unwrap(), 2, Default::default()).unwrap();
    assert_eq!(reports.len(), 6);

    for pair in reports.chunks(2) {
        assert_eq!(pair[0].strategy, Strategy::Streaming);
        assert_eq!(pair[1].strategy, Strategy::Bulk);
        assert!(same_results(&pair[0], &pair[1]));
    }
}

// ---------------------------------------------------------------------------
// Output tests
// ---------------------------------------------------------------------------

#[test]
fn csv_sink_writes_one_partition_per_pair() {
    let file = jsonl_file(&DATE_LINES);
    let out = TempDir::new().unwrap();
    let mut sink = CsvSink::new(out.path()).with_partition("2024-01-15");

    for strategy in Strategy::ALL {
        let report = run(&file, Statistic::TopDates, strategy, 2);
        sink.emit(&report.rows, report.statistic, report.strategy)
            .unwrap();
        // Re-emitting replaces rather than appends
        sink.emit(&report.rows, report.statistic, report.strategy)
            .unwrap();
    }

    for dir in ["q1_streaming", "q1_bulk"] {
        let content =
            std::fs::read_to_string(out.path().join(dir).join("2024-01-15.csv")).unwrap();
        assert_eq!(
            content,
            "date,username\n2021-02-01,alice\n2021-02-02,carol\n"
        );
    }
}
