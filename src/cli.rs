//! CLI definition and dispatch.
//!
//! A local driver for the strategy plugins: analyze CSV candles into signal
//! reports, inspect the presets and their parameters, and ask the trade
//! callbacks what they would answer for a hypothetical open trade.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::{parse_timestamp, CsvAdapter};
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{load_run_config, RunConfig};
use crate::domain::error::ScalptraderError;
use crate::domain::policy::{OpenTrade, TradeSide};
use crate::domain::presets;
use crate::domain::strategy::{AnalyzedFrame, Strategy};
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use crate::ports::strategy_port::StrategyPort;

#[derive(Parser, Debug)]
#[command(name = "scalptrader", about = "Scalping strategy signal generator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute indicators and signals for one or more pairs
    Signals {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory holding one `BASE_QUOTE.csv` file per pair
        #[arg(short, long)]
        data: PathBuf,
        /// Pairs to analyze; every CSV in the data directory when omitted
        #[arg(short, long)]
        pair: Vec<String>,
        /// Report path, or `-` for stdout
        #[arg(short, long, default_value = "-")]
        output: String,
    },
    /// List the built-in strategies
    Strategies,
    /// Show a strategy's tunable parameters
    Params {
        #[arg(short, long, conflicts_with = "config")]
        strategy: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print a strategy's indicator plan, rule blocks and trade policy
    Describe {
        #[arg(short, long)]
        strategy: String,
    },
    /// Validate a run configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Evaluate stoploss, leverage and timeout for an open trade
    Trade {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        pair: String,
        #[arg(long)]
        side: TradeSide,
        #[arg(long, value_parser = parse_timestamp)]
        open_time: DateTime<Utc>,
        /// Current profit ratio (0.01 = 1%)
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        profit: f64,
        /// Evaluation time; the last candle's timestamp when omitted
        #[arg(long, value_parser = parse_timestamp)]
        now: Option<DateTime<Utc>>,
        /// Current rate; the last close when omitted
        #[arg(long)]
        rate: Option<f64>,
    },
}

/// Answers of the trade callbacks for one open trade.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeDecision {
    pub stoploss: f64,
    pub leverage: f64,
    pub timed_out: bool,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Signals {
            config,
            data,
            pair,
            output,
        } => run_signals(&config, &data, &pair, &output),
        Command::Strategies => run_strategies(),
        Command::Params { strategy, config } => run_params(strategy.as_deref(), config.as_ref()),
        Command::Describe { strategy } => run_describe(&strategy),
        Command::Validate { config } => run_validate(&config),
        Command::Trade {
            config,
            data,
            pair,
            side,
            open_time,
            profit,
            now,
            rate,
        } => run_trade(
            &config, &data, &pair, side, open_time, profit, now, rate,
        ),
    }
}

fn fail(e: ScalptraderError) -> ExitCode {
    eprintln!("error: {e}");
    (&e).into()
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(fail)
}

fn load_run(path: &PathBuf) -> Result<RunConfig, ExitCode> {
    let adapter = load_config(path)?;
    load_run_config(&adapter).map_err(fail)
}

/// Pairs to analyze: the explicit list, else everything the data source has.
pub fn resolve_pairs(
    requested: &[String],
    data: &dyn DataPort,
) -> Result<Vec<String>, ScalptraderError> {
    if !requested.is_empty() {
        return Ok(requested.to_vec());
    }
    let pairs = data.list_pairs()?;
    if pairs.is_empty() {
        return Err(ScalptraderError::Data {
            reason: "no pairs found in data source".to_string(),
        });
    }
    Ok(pairs)
}

/// Analyze every pair with the same strategy. The first failing pair aborts
/// the run.
pub fn analyze_pairs(
    strategy: &Strategy,
    data: &dyn DataPort,
    pairs: &[String],
) -> Result<Vec<AnalyzedFrame>, ScalptraderError> {
    let mut frames = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let bars = data.fetch_bars(pair)?;
        if bars.is_empty() {
            warn!(pair = pair.as_str(), "no candles");
        }
        frames.push(strategy.analyze(&bars, pair)?);
    }
    Ok(frames)
}

/// Run the trade callbacks against the last row of `frame`.
pub fn evaluate_trade(
    strategy: &dyn StrategyPort,
    frame: &AnalyzedFrame,
    trade: &OpenTrade,
    now: DateTime<Utc>,
    rate: f64,
    profit: f64,
    max_leverage: f64,
) -> TradeDecision {
    let snapshot = frame.snapshot();
    TradeDecision {
        stoploss: strategy.custom_stoploss(&trade.pair, trade, now, rate, profit),
        leverage: strategy.leverage(
            &trade.pair,
            &snapshot,
            now,
            rate,
            1.0,
            max_leverage,
            trade.side,
        ),
        timed_out: strategy.check_exit_timeout(&trade.pair, trade, now, rate, profit),
    }
}

/// The one non-empty frame a trade is evaluated against.
fn single_frame(mut frames: Vec<AnalyzedFrame>, pair: &str) -> Result<AnalyzedFrame, ScalptraderError> {
    match frames.pop() {
        Some(frame) if !frame.is_empty() => Ok(frame),
        Some(_) => Err(ScalptraderError::Data {
            reason: format!("no candles for {pair}"),
        }),
        None => Err(ScalptraderError::Data {
            reason: format!("no frame for {pair}"),
        }),
    }
}

fn run_signals(config_path: &PathBuf, data_dir: &Path, pairs: &[String], output: &str) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let run = match load_run(config_path) {
        Ok(r) => r,
        Err(code) => return code,
    };

    let data = CsvAdapter::new(data_dir.to_path_buf());
    let pairs = match resolve_pairs(pairs, &data) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };
    eprintln!(
        "Analyzing {} pair(s) with strategy {}",
        pairs.len(),
        run.strategy.name
    );

    let frames = match analyze_pairs(&run.strategy, &data, &pairs) {
        Ok(f) => f,
        Err(e) => return fail(e),
    };

    if let Err(e) = CsvReportAdapter.write_all(&frames, output) {
        return fail(e);
    }
    info!(pairs = frames.len(), output, "signal report written");
    ExitCode::SUCCESS
}

fn run_strategies() -> ExitCode {
    for name in presets::NAMES {
        match presets::by_name(name) {
            Ok(s) => println!("{:<16} {:<4} {}", s.name, s.timeframe, s.description),
            Err(e) => return fail(e),
        }
    }
    ExitCode::SUCCESS
}

fn run_params(strategy: Option<&str>, config: Option<&PathBuf>) -> ExitCode {
    let strategy = match (strategy, config) {
        (Some(name), _) => presets::by_name(name).map_err(fail),
        (None, Some(path)) => load_run(path).map(|r| r.strategy),
        (None, None) => {
            eprintln!("error: either --strategy or --config is required");
            return ExitCode::from(2);
        }
    };
    let strategy = match strategy {
        Ok(s) => s,
        Err(code) => return code,
    };

    if strategy.params.is_empty() {
        println!("{} has no tunable parameters", strategy.name);
        return ExitCode::SUCCESS;
    }
    println!(
        "{:<24} {:<8} {:<8} {:>10} {:>10} {:>10}",
        "name", "type", "space", "value", "default", "range"
    );
    for p in strategy.params.iter() {
        let range = match p.kind.bounds() {
            Some((low, high)) => format!("{low}..{high}"),
            None => String::new(),
        };
        println!(
            "{:<24} {:<8} {:<8} {:>10} {:>10} {:>10}",
            p.name,
            p.kind.type_name(),
            p.space.to_string(),
            p.value.to_string(),
            p.default.to_string(),
            range
        );
    }
    ExitCode::SUCCESS
}

fn run_describe(name: &str) -> ExitCode {
    let strategy = match presets::by_name(name) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    println!("{} ({})", strategy.name, strategy.timeframe);
    println!("  {}", strategy.description);

    println!("\nIndicators:");
    for planned in &strategy.plan {
        match planned.gate {
            Some(gate) => println!("  {} [if {}]", planned.spec, gate),
            None => println!("  {}", planned.spec),
        }
    }

    println!("\nRule blocks:");
    for block in &strategy.blocks {
        println!("  {:<12} {:<20} {}", block.signal.to_string(), block.name, block.rule);
    }

    println!("\nPolicy:");
    println!("  stoploss:  {:?}", strategy.policy.stoploss);
    println!("  leverage:  {:?}", strategy.policy.leverage);
    println!("  timeout:   {:?}", strategy.policy.timeout);
    println!("  roi:       {:?}", strategy.minimal_roi.entries());
    println!("  trailing:  {:?}", strategy.trailing_stop);
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let run = match load_run(config_path) {
        Ok(r) => r,
        Err(code) => return code,
    };
    eprintln!(
        "OK: strategy {} with {} parameter(s), max leverage {}",
        run.strategy.name,
        run.strategy.params.len(),
        run.max_leverage
    );
    ExitCode::SUCCESS
}

#[allow(clippy::too_many_arguments)]
fn run_trade(
    config_path: &PathBuf,
    data_dir: &Path,
    pair: &str,
    side: TradeSide,
    open_time: DateTime<Utc>,
    profit: f64,
    now: Option<DateTime<Utc>>,
    rate: Option<f64>,
) -> ExitCode {
    let run = match load_run(config_path) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let data = CsvAdapter::new(data_dir.to_path_buf());
    let frame = match analyze_pairs(&run.strategy, &data, &[pair.to_string()])
        .and_then(|frames| single_frame(frames, pair))
    {
        Ok(f) => f,
        Err(e) => return fail(e),
    };
    let last = frame.len() - 1;
    let now = now.unwrap_or(frame.candles.timestamps[last]);
    let rate = rate.unwrap_or(frame.candles.close[last]);

    let trade = OpenTrade {
        pair: pair.to_string(),
        open_time,
        side,
    };
    let decision = evaluate_trade(
        &run.strategy,
        &frame,
        &trade,
        now,
        rate,
        profit,
        run.max_leverage,
    );

    println!("pair:      {pair} ({side})");
    println!("open:      {}", open_time.to_rfc3339());
    println!("now:       {} ({:.1} min)", now.to_rfc3339(), trade.minutes_open(now));
    println!("stoploss:  {}", decision.stoploss);
    println!("leverage:  {}", decision.leverage);
    println!("timed out: {}", decision.timed_out);
    ExitCode::SUCCESS
}
