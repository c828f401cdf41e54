use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use poststats::aggregate::FieldRules;
use poststats::config::{FileConfig, DEFAULT_CONFIG_FILE, DEFAULT_TOP_N, EMOJI_POLICY};
use poststats::emoji::EmojiPolicy;
use poststats::models::{Statistic, Strategy};
use poststats::pipeline::{self, RunOptions, StatisticReport};
use poststats::sink::{CsvSink, ResultSink};
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "poststats")]
#[command(about = "Top-N date, emoji and mention statistics over JSONL post dumps")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute one statistic, or all of them
    Run(RunArgs),
    /// Run both strategies for every statistic and check that they agree
    Compare(CompareArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum Question {
    Q1,
    Q2,
    Q3,
    /// Every statistic with both strategies
    All,
}

impl Question {
    fn statistic(self) -> Option<Statistic> {
        match self {
            Question::Q1 => Some(Statistic::TopDates),
            Question::Q2 => Some(Statistic::TopEmojis),
            Question::Q3 => Some(Statistic::TopMentions),
            Question::All => None,
        }
    }
}

#[derive(Args)]
struct InputArgs {
    /// Path to the JSONL post dump (.json, .jsonl, or .bz2)
    #[arg(short, long)]
    input: Option<String>,

    /// Number of ranked rows per statistic
    #[arg(short = 'n', long)]
    top_n: Option<usize>,

    /// JSON settings file supplying defaults for the other options
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// How adjacent emoji are counted
    #[arg(long, value_enum)]
    emoji_policy: Option<EmojiPolicy>,
}

#[derive(Args)]
struct RunArgs {
    /// Which statistic to compute
    #[arg(short, long, value_enum, default_value = "q1")]
    question: Question,

    /// Aggregation strategy: streaming (alias memory) or bulk (alias time)
    #[arg(short, long, value_enum, default_value = "bulk")]
    method: Strategy,

    #[command(flatten)]
    input: InputArgs,

    /// Directory for CSV results, one file per statistic, strategy and day
    #[arg(short, long)]
    output: Option<String>,

    /// Compute and print results without writing them
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct CompareArgs {
    #[command(flatten)]
    input: InputArgs,
}

/// Command-line values layered over the settings file
struct Settings {
    input: String,
    top_n: usize,
    rules: FieldRules,
    output_dir: Option<String>,
}

fn resolve_settings(args: &InputArgs, output: Option<String>) -> Result<Settings> {
    let file = FileConfig::load(Path::new(&args.config))?;

    let input = match args.input.clone().or(file.input) {
        Some(input) => input,
        None => bail!(
            "No input file given (use --input or set \"input\" in {})",
            args.config
        ),
    };

    Ok(Settings {
        input,
        top_n: args.top_n.or(file.top_n).unwrap_or(DEFAULT_TOP_N),
        rules: FieldRules {
            emoji_policy: args
                .emoji_policy
                .or(file.emoji_policy)
                .unwrap_or(EMOJI_POLICY),
        },
        output_dir: output.or(file.output_dir),
    })
}

fn print_report(report: &StatisticReport) {
    println!();
    println!(
        "=== {} ({}) in {:.2}s ===",
        report.statistic,
        report.strategy,
        report.elapsed.as_secs_f64()
    );
    if report.rows.is_empty() {
        println!("  (no results)");
    }
    for (rank, row) in report.rows.iter().enumerate() {
        println!("  {:>3}. {}", rank + 1, row);
    }
    println!(
        "  lines: {}  malformed: {}  used: {}  skipped: {}",
        report.stats.lines(),
        report.stats.malformed(),
        report.stats.used(),
        report.stats.skipped()
    );
}

fn run(args: RunArgs) -> Result<()> {
    let settings = resolve_settings(&args.input, args.output)?;
    info!(
        input = %settings.input,
        top_n = settings.top_n,
        strategy = %args.method,
        "Starting run"
    );

    let start = Instant::now();
    let reports = match args.question.statistic() {
        None => pipeline::run_all(&settings.input, settings.top_n, settings.rules)?,
        Some(statistic) => {
            let options = RunOptions::new(settings.top_n, args.method)?.with_rules(settings.rules);
            vec![pipeline::run_file(&settings.input, statistic, &options)?]
        }
    };

    for report in &reports {
        info!(
            statistic = %report.statistic,
            strategy = %report.strategy,
            rows = report.rows.len(),
            "Result ready"
        );
        print_report(report);
    }

    if let Some(dir) = settings.output_dir.filter(|_| !args.dry_run) {
        let mut sink = CsvSink::new(&dir);
        for report in &reports {
            // The computed result stands even if it cannot be stored
            if let Err(e) = sink.emit(&report.rows, report.statistic, report.strategy) {
                warn!(error = %e, statistic = %report.statistic, "Failed to write results");
            }
        }
    }

    println!();
    println!("Total time: {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn compare(args: CompareArgs) -> Result<()> {
    let settings = resolve_settings(&args.input, None)?;
    let reports = pipeline::run_all(&settings.input, settings.top_n, settings.rules)?;

    let mut diverged = Vec::new();
    for statistic in Statistic::ALL {
        let pair: Vec<&StatisticReport> = reports
            .iter()
            .filter(|r| r.statistic == statistic)
            .collect();
        let [streaming, bulk] = pair.as_slice() else {
            bail!("Expected one report per strategy for {}", statistic);
        };

        let agree = pipeline::same_results(streaming, bulk);
        println!(
            "{}: {}  (streaming {:.2}s, bulk {:.2}s)",
            statistic,
            if agree { "agree" } else { "DIFFER" },
            streaming.elapsed.as_secs_f64(),
            bulk.elapsed.as_secs_f64()
        );
        if !agree {
            print_report(streaming);
            print_report(bulk);
            diverged.push(statistic.id());
        }
    }

    if !diverged.is_empty() {
        bail!("Strategies disagree on: {}", diverged.join(", "));
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
    {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Commands::Run(args) => run(args),
        Commands::Compare(args) => compare(args),
    };

    match result {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
