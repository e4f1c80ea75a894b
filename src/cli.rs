//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::{CsvAdapter, CsvSignalAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::trade_log_adapter::{CsvTradeLogAdapter, write_trade_log};
use crate::domain::backtest::{self as backtest_engine, BacktestConfig};
use crate::domain::config_validation::{
    parse_optional_date, read_backtest_values, validate_backtest_config, validate_values,
};
use crate::domain::error::SigtraderError;
use crate::domain::metrics::{PerformanceSummary, summarize};
use crate::domain::ohlcv::PriceTable;
use crate::domain::pairing::calculate_pnl;
use crate::domain::signal::{Signal, SignalRow, count};
use crate::domain::strategy::Strategy;
use crate::domain::trade::Trade;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::{DataPort, SignalSource};
use crate::ports::report_port::ReportPort;

pub const NOT_ENOUGH_SIGNALS: &str = "Not enough signals to calculate performance metrics.";

#[derive(Parser, Debug)]
#[command(
    name = "sigtrader",
    about = "Rule-based strategy signals, trade pairing and performance metrics"
)]
pub struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Sizing and risk-free overrides; each wins over the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct Overrides {
    #[arg(long)]
    pub initial_balance: Option<f64>,
    #[arg(long)]
    pub trade_size: Option<f64>,
    #[arg(long)]
    pub risk_free_rate: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate signals for a strategy, pair trades and report performance
    Backtest {
        /// Price/indicator CSV (falls back to [data] path)
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Strategy name (falls back to [backtest] strategy)
        #[arg(short, long)]
        strategy: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Trade log CSV (falls back to [report] trades_path, else stdout)
        #[arg(short, long)]
        trades_out: Option<PathBuf>,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Pair a precomputed signal table into trades
    Pair {
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(long)]
        signals: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        trades_out: Option<PathBuf>,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Report which indicator columns a strategy needs and which are present
    Check {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        strategy: String,
    },
    /// List the built-in strategies
    Strategies,
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(&cli.log_level);

    let result = match cli.command {
        Command::Backtest {
            data,
            strategy,
            config,
            trades_out,
            overrides,
        } => run_backtest(
            data.as_deref(),
            strategy.as_deref(),
            config.as_deref(),
            trades_out.as_deref(),
            &overrides,
        ),
        Command::Pair {
            data,
            signals,
            config,
            trades_out,
            overrides,
        } => run_pair(
            data.as_deref(),
            &signals,
            config.as_deref(),
            trades_out.as_deref(),
            &overrides,
        ),
        Command::Check { data, strategy } => run_check(&data, &strategy),
        Command::Strategies => {
            run_strategies();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, SigtraderError> {
    match path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// File values (or defaults), then command-line overrides, then range checks.
pub fn build_backtest_config(
    config: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<BacktestConfig, SigtraderError> {
    validate_backtest_config(config)?;

    let mut values = read_backtest_values(config)?;
    if let Some(v) = overrides.initial_balance {
        values.initial_balance = v;
    }
    if let Some(v) = overrides.trade_size {
        values.trade_size_fraction = v;
    }
    if let Some(v) = overrides.risk_free_rate {
        values.risk_free_rate = v;
    }
    validate_values(&values)?;
    Ok(values)
}

/// `--strategy`, else `[backtest] strategy`, else no strategy.
pub fn resolve_strategy(cli_strategy: Option<&str>, config: &dyn ConfigPort) -> Strategy {
    match cli_strategy
        .map(str::to_string)
        .or_else(|| config.get_string("backtest", "strategy"))
    {
        Some(name) => Strategy::parse(&name),
        None => {
            warn!("no strategy given; every row will be Hold");
            Strategy::None
        }
    }
}

pub fn resolve_data_path(
    cli_path: Option<&Path>,
    config: &dyn ConfigPort,
) -> Result<PathBuf, SigtraderError> {
    cli_path
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("data", "path").map(PathBuf::from))
        .ok_or_else(|| SigtraderError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })
}

pub fn resolve_trades_path(cli_path: Option<&Path>, config: &dyn ConfigPort) -> Option<PathBuf> {
    cli_path
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("report", "trades_path").map(PathBuf::from))
}

fn load_table(data_path: &Path, config: &dyn ConfigPort) -> Result<PriceTable, SigtraderError> {
    let start = parse_optional_date(config, "start_date")?;
    let end = parse_optional_date(config, "end_date")?;

    eprintln!("Loading prices from {}", data_path.display());
    let table = CsvAdapter::new(data_path).fetch_table(start, end)?;
    eprintln!("  {} rows", table.len());
    Ok(table)
}

fn run_backtest(
    data: Option<&Path>,
    strategy: Option<&str>,
    config_path: Option<&Path>,
    trades_out: Option<&Path>,
    overrides: &Overrides,
) -> Result<(), SigtraderError> {
    let config = load_config(config_path)?;
    let bt_config = build_backtest_config(&config, overrides)?;
    let strategy = resolve_strategy(strategy, &config);
    let data_path = resolve_data_path(data, &config)?;
    let table = load_table(&data_path, &config)?;

    eprintln!("Running strategy: {}", strategy);
    let result = backtest_engine::run_backtest(&table, &strategy, &bt_config);

    eprintln!(
        "  Signals: {} buy, {} sell",
        count(&result.signals, Signal::Buy),
        count(&result.signals, Signal::Sell)
    );
    print_summary(result.summary.as_ref());
    emit_trades(&result.trades, resolve_trades_path(trades_out, &config).as_deref())
}

fn run_pair(
    data: Option<&Path>,
    signals_path: &Path,
    config_path: Option<&Path>,
    trades_out: Option<&Path>,
    overrides: &Overrides,
) -> Result<(), SigtraderError> {
    let config = load_config(config_path)?;
    let bt_config = build_backtest_config(&config, overrides)?;
    let data_path = resolve_data_path(data, &config)?;
    let table = load_table(&data_path, &config)?;

    eprintln!("Loading signals from {}", signals_path.display());
    let signals: Vec<SignalRow> = CsvSignalAdapter::new(signals_path).fetch_signals()?;

    let trades = calculate_pnl(&table, &signals, bt_config.sizing());
    info!(trades = trades.len(), "signals paired");

    print_summary(summarize(&signals, trades.clone(), &bt_config).as_ref());
    emit_trades(&trades, resolve_trades_path(trades_out, &config).as_deref())
}

fn run_check(data: &Path, strategy_name: &str) -> Result<(), SigtraderError> {
    let strategy = Strategy::parse(strategy_name);
    if let Strategy::Unknown(name) = &strategy {
        println!("Unknown strategy '{}': every row will be Hold", name);
        return Ok(());
    }

    let table = CsvAdapter::new(data).fetch_table(None, None)?;
    println!("{} ({} rows)", strategy, table.len());

    let required = strategy.required_columns();
    if required.is_empty() {
        println!("  no indicator columns required");
        return Ok(());
    }

    let mut missing = 0;
    for column in required {
        let present = table.has_column(*column);
        if !present {
            missing += 1;
        }
        println!(
            "  {:<12} {}",
            column.name(),
            if present { "present" } else { "MISSING" }
        );
    }
    if missing > 0 {
        println!("{} required column(s) missing: every row will be Hold", missing);
    }
    Ok(())
}

fn run_strategies() {
    for strategy in Strategy::ALL.iter() {
        let columns: Vec<&str> = strategy
            .required_columns()
            .iter()
            .map(|c| c.name())
            .collect();
        println!("{:<16} {}", strategy.name(), columns.join(", "));
    }
}

fn print_summary(summary: Option<&PerformanceSummary>) {
    let Some(summary) = summary else {
        eprintln!("\n{}", NOT_ENOUGH_SIGNALS);
        return;
    };

    eprintln!("\n=== Performance ===");
    for (label, value) in summary.display_rows() {
        eprintln!("{:<16}{}", format!("{}:", label), value);
    }
    eprintln!("Wins / Losses:  {} / {}", summary.wins, summary.losses);
}

/// Trade log to `path`, or to stdout when no path is configured.
fn emit_trades(trades: &[Trade], path: Option<&Path>) -> Result<(), SigtraderError> {
    match path {
        Some(path) => {
            CsvTradeLogAdapter.write_trades(trades, path)?;
            eprintln!("\nTrade log written to: {}", path.display());
            Ok(())
        }
        None => write_trade_log(trades, io::stdout().lock()),
    }
}
