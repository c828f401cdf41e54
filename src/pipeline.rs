use crate::aggregate::{aggregator_for, CountTable, FieldRules};
use crate::emit;
use crate::models::{ResultRow, Statistic, Strategy};
use crate::parser::PostReader;
use crate::rank;
use crate::source::open_input;
use crate::stats::ScanStats;
use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::BufRead;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Per-invocation settings supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub top_n: usize,
    pub strategy: Strategy,
    pub rules: FieldRules,
}

impl RunOptions {
    pub fn new(top_n: usize, strategy: Strategy) -> Result<Self> {
        if top_n == 0 {
            bail!("top_n must be a positive integer");
        }
        Ok(Self {
            top_n,
            strategy,
            rules: FieldRules::default(),
        })
    }

    pub fn with_rules(mut self, rules: FieldRules) -> Self {
        self.rules = rules;
        self
    }
}

/// Ranked rows of one statistic plus what the pass saw
#[derive(Debug, Clone)]
pub struct StatisticReport {
    pub statistic: Statistic,
    pub strategy: Strategy,
    pub rows: Vec<ResultRow>,
    pub stats: ScanStats,
    pub elapsed: Duration,
}

/// Counts, ranks and shapes one statistic from `posts`. Per-record problems
/// are absorbed; a read failure aborts with no partial result.
pub fn run_statistic(
    mut posts: PostReader<'_>,
    statistic: Statistic,
    options: &RunOptions,
) -> Result<StatisticReport> {
    let start = Instant::now();
    let aggregator = aggregator_for(options.strategy, options.rules);
    debug!(%statistic, strategy = %aggregator.strategy(), top_n = options.top_n, "Aggregating");

    let table = aggregator
        .count(statistic, &mut posts)
        .with_context(|| format!("Failed to compute {} ({})", statistic, options.strategy))?;

    let rows = match table {
        CountTable::Days(days) => emit::date_rows(&rank::top_days(days, options.top_n)),
        CountTable::Keys(keys) => emit::count_rows(&rank::top_keys(keys, options.top_n)),
    };

    let stats = posts.into_stats();
    stats.log_summary(statistic.id(), options.strategy.id());

    Ok(StatisticReport {
        statistic,
        strategy: options.strategy,
        rows,
        stats,
        elapsed: start.elapsed(),
    })
}

pub fn run_reader(
    reader: impl BufRead,
    statistic: Statistic,
    options: &RunOptions,
) -> Result<StatisticReport> {
    run_statistic(PostReader::new(reader), statistic, options)
}

fn make_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb
}

/// Opens `path` and computes one statistic from it
pub fn run_file(path: &str, statistic: Statistic, options: &RunOptions) -> Result<StatisticReport> {
    info!(input = path, %statistic, strategy = %options.strategy, "Processing");
    let reader = open_input(path)?;
    let posts = PostReader::new(reader).with_progress(make_spinner(&format!(
        "{} ({})",
        statistic, options.strategy
    )));
    run_statistic(posts, statistic, options)
}

/// Every statistic with every strategy, re-reading the input for each pass
pub fn run_all(path: &str, top_n: usize, rules: FieldRules) -> Result<Vec<StatisticReport>> {
    let mut reports = Vec::with_capacity(Statistic::ALL.len() * Strategy::ALL.len());
    for statistic in Statistic::ALL {
        for strategy in Strategy::ALL {
            let options = RunOptions::new(top_n, strategy)?.with_rules(rules);
            reports.push(run_file(path, statistic, &options)?);
        }
    }
    Ok(reports)
}

/// True when two reports hold the same rows irrespective of order
pub fn same_results(a: &StatisticReport, b: &StatisticReport) -> bool {
    if a.statistic != b.statistic || a.rows.len() != b.rows.len() {
        return false;
    }
    let key = |row: &ResultRow| row.to_string();
    let mut left: Vec<String> = a.rows.iter().map(key).collect();
    let mut right: Vec<String> = b.rows.iter().map(key).collect();
    left.sort_unstable();
    right.sort_unstable();
    left == right
}
