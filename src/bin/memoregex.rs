//! CLI driver: compiles a pattern under a chosen memoization policy, runs it
//! against an input, and prints the match (and optionally run statistics).

use std::fs;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use serde::Deserialize;

use memo_regex::stats::RunStats;
use memo_regex::{capture_pairs, Config, MemoEncoding, MemoMode};

#[derive(Parser, Debug)]
#[command(name = "memoregex", about = "A memoized backtracking regex engine")]
struct Cli {
    /// Regex pattern to compile. Mutually exclusive with --query.
    #[arg(long)]
    pattern: Option<String>,

    /// Path to a JSON array of `{"pattern": ..., "input": ...}` queries.
    #[arg(long)]
    query: Option<PathBuf>,

    /// Literal input text to search. Ignored when --query is given.
    #[arg(long, default_value = "")]
    input: String,

    /// Vertex-selection policy: NONE, FULL, INDEG_GT1, or LOOP_DEST.
    #[arg(long = "memo-mode", default_value = "INDEG_GT1")]
    memo_mode: MemoMode,

    /// Memo table physical encoding: NONE, NEGATIVE, RLE, or RLE_TUNED.
    #[arg(long = "encoding", default_value = "RLE")]
    memo_encoding: MemoEncoding,

    /// Run width for RLE_TUNED encoding.
    #[arg(long = "rle-k", default_value_t = 1)]
    rle_k: usize,

    /// Repeatable: -v for info-level logging, -vv for trace.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print run statistics as JSON after each query.
    #[arg(long)]
    stats: bool,
}

#[derive(Debug, Deserialize)]
struct Query {
    pattern: String,
    input: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();

    let rle_k = match NonZeroUsize::new(cli.rle_k) {
        Some(k) => k,
        None => {
            eprintln!("error: --rle-k must be at least 1");
            return ExitCode::FAILURE;
        }
    };
    let config = Config {
        memo_mode: cli.memo_mode.clone(),
        memo_encoding: cli.memo_encoding.clone(),
        rle_k,
        ..Config::default()
    };

    let queries = match load_queries(&cli) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut any_failed = false;
    for q in &queries {
        if let Err(e) = run_one(q, &config, cli.stats) {
            eprintln!("error compiling/running {:?}: {e}", q.pattern);
            any_failed = true;
        }
    }
    if any_failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn load_queries(cli: &Cli) -> Result<Vec<Query>, String> {
    if let Some(path) = &cli.query {
        let text = fs::read_to_string(path).map_err(|e| format!("reading {path:?}: {e}"))?;
        serde_json::from_str::<Vec<Query>>(&text).map_err(|e| format!("parsing {path:?}: {e}"))
    } else {
        let pattern = cli
            .pattern
            .clone()
            .ok_or_else(|| "one of --pattern or --query is required".to_string())?;
        Ok(vec![Query { pattern, input: cli.input.clone() }])
    }
}

fn run_one(q: &Query, config: &Config, want_stats: bool) -> memo_regex::Result<()> {
    let prog = memo_regex::build(&q.pattern, config)?;
    let result = memo_regex::search(&prog, q.input.as_bytes(), 0, config)?;

    match &result.captures {
        Some(caps) => {
            println!("match");
            for pair in capture_pairs(caps) {
                match pair {
                    Some((s, e)) => println!("  ({s}, {e})"),
                    None => println!("  ?"),
                }
            }
        }
        None => println!("no match"),
    }

    if want_stats {
        let run_stats = RunStats::build(&prog, q.input.len(), &result.stats);
        match serde_json::to_string_pretty(&run_stats) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("error serializing stats: {e}"),
        }
    }

    Ok(())
}
