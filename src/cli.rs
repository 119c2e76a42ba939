//! CLI definition and dispatch.

use chrono::{Duration, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_data_adapter::CsvDataAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report_adapter::HtmlReportAdapter;
use crate::domain::backtest::{run_backtest, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{validate_backtest_config, validate_strategy_config};
use crate::domain::error::RotatorError;
use crate::domain::metrics::Metrics;
use crate::domain::price::{PriceSeries, Rebalance};
use crate::domain::strategy::Strategy;
use crate::domain::universe::{load_universe, parse_symbols};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::{ReportContext, ReportPort};

#[derive(Parser, Debug)]
#[command(name = "rotator", about = "Momentum rotation backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// HTML report output path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also export the period return table as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Override the configured symbol list
        #[arg(long)]
        symbols: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the current holdings the strategy would select
    Signals {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show data range for symbol(s)
    Info {
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            output,
            csv,
            symbols,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest_command(&config, output.as_ref(), csv.as_ref(), symbols.as_deref())
            }
        }
        Command::Signals { config } => run_signals(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Info { symbol, config } => run_info(symbol.as_deref(), &config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = RotatorError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, RotatorError> {
    let start_str = adapter
        .get_string("backtest", "start_date")
        .ok_or_else(|| RotatorError::ConfigMissing {
            section: "backtest".into(),
            key: "start_date".into(),
        })?;
    let end_str = adapter.get_string("backtest", "end_date").ok_or_else(|| {
        RotatorError::ConfigMissing {
            section: "backtest".into(),
            key: "end_date".into(),
        }
    })?;

    let start_date = NaiveDate::parse_from_str(&start_str, "%Y-%m-%d").map_err(|_| {
        RotatorError::ConfigInvalid {
            section: "backtest".into(),
            key: "start_date".into(),
            reason: "invalid date format (expected YYYY-MM-DD)".into(),
        }
    })?;
    let end_date = NaiveDate::parse_from_str(&end_str, "%Y-%m-%d").map_err(|_| {
        RotatorError::ConfigInvalid {
            section: "backtest".into(),
            key: "end_date".into(),
            reason: "invalid date format (expected YYYY-MM-DD)".into(),
        }
    })?;

    let benchmark = adapter
        .get_string("backtest", "benchmark")
        .ok_or_else(|| RotatorError::ConfigMissing {
            section: "backtest".into(),
            key: "benchmark".into(),
        })?
        .to_uppercase();

    let rebalance = match adapter.get_string("backtest", "rebalance") {
        None => Rebalance::Monthly,
        Some(s) => s
            .parse::<Rebalance>()
            .map_err(|_| RotatorError::ConfigInvalid {
                section: "backtest".into(),
                key: "rebalance".into(),
                reason: format!("unknown rebalance '{}', expected monthly or weekly", s),
            })?,
    };

    Ok(BacktestConfig {
        start_date,
        end_date,
        benchmark,
        cash_symbol: adapter
            .get_string("backtest", "cash_symbol")
            .map(|s| s.to_uppercase()),
        rebalance,
        fee_rate: adapter.get_double("backtest", "fee_pct", 0.0) / 100.0,
        risk_free_rate: adapter.get_double("backtest", "risk_free_rate", 0.0),
    })
}

pub fn build_strategy(adapter: &dyn ConfigPort) -> Result<Strategy, RotatorError> {
    match adapter.get_string("strategy", "mode").as_deref() {
        Some("momentum") | None => {
            let sma_period = if adapter.get_bool("strategy", "use_trend_filter", false) {
                Some(adapter.get_int("strategy", "sma_period", 200) as usize)
            } else {
                None
            };
            Ok(Strategy::MomentumRotation {
                top_n: adapter.get_int("strategy", "top_n", 5) as usize,
                lookback: adapter.get_int("strategy", "lookback", 6) as usize,
                holding_period: adapter.get_int("strategy", "holding_period", 1) as usize,
                sma_period,
            })
        }
        Some("rsi") => Ok(Strategy::RsiTiming {
            rsi_period: adapter.get_int("strategy", "rsi_period", 10) as usize,
            buy_trend: adapter.get_double("strategy", "rsi_buy_trend", 50.0),
            buy_panic: adapter.get_double("strategy", "rsi_buy_panic", 32.0),
        }),
        Some(other) => Err(RotatorError::ConfigInvalid {
            section: "strategy".into(),
            key: "mode".into(),
            reason: format!("unknown mode '{}', expected momentum or rsi", other),
        }),
    }
}

pub fn resolve_symbols(
    symbols_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, RotatorError> {
    let raw = match symbols_override {
        Some(s) => s.to_string(),
        None => config
            .get_string("strategy", "symbols")
            .ok_or_else(|| RotatorError::ConfigMissing {
                section: "strategy".into(),
                key: "symbols".into(),
            })?,
    };
    parse_symbols(&raw).map_err(|e| RotatorError::ConfigInvalid {
        section: "strategy".into(),
        key: "symbols".into(),
        reason: e.to_string(),
    })
}

/// Days of extra history to load before the backtest start, so lookback
/// scores and the SMA trend filter are warm by the first simulated period.
fn history_margin_days(strategy: &Strategy, rebalance: Rebalance) -> i64 {
    let days_per_period = match rebalance {
        Rebalance::Monthly => 31,
        Rebalance::Weekly => 8,
    };
    let warmup = (strategy.warmup_periods() * days_per_period + 60) as i64;
    match strategy {
        Strategy::MomentumRotation {
            sma_period: Some(p),
            ..
        } => warmup.max((p + 150) as i64),
        _ => warmup,
    }
}

struct LoadedData {
    universe: Vec<PriceSeries>,
    benchmark: PriceSeries,
    cash: Option<PriceSeries>,
}

fn load_data(
    data_port: &dyn DataPort,
    symbols: &[String],
    strategy: &Strategy,
    config: &BacktestConfig,
) -> Result<LoadedData, RotatorError> {
    let fetch_start =
        config.start_date - Duration::days(history_margin_days(strategy, config.rebalance));

    eprintln!("Validating {} symbols...", symbols.len());
    let loaded = load_universe(data_port, symbols, fetch_start, config.end_date)?;

    let benchmark_bars =
        data_port.fetch_prices(&config.benchmark, fetch_start, config.end_date)?;
    if benchmark_bars.is_empty() {
        return Err(RotatorError::NoData {
            symbol: config.benchmark.clone(),
        });
    }
    let benchmark = PriceSeries::new(config.benchmark.clone(), benchmark_bars);

    // A missing cash proxy downgrades to 0% while parked, not a hard failure.
    let cash = match &config.cash_symbol {
        None => None,
        Some(symbol) => match data_port.fetch_prices(symbol, fetch_start, config.end_date) {
            Ok(bars) if !bars.is_empty() => Some(PriceSeries::new(symbol.clone(), bars)),
            Ok(_) => {
                eprintln!("Warning: no data for cash symbol {}, using 0% cash", symbol);
                None
            }
            Err(e) => {
                eprintln!(
                    "Warning: failed to load cash symbol {} ({}), using 0% cash",
                    symbol, e
                );
                None
            }
        },
    };

    Ok(LoadedData {
        universe: loaded.series,
        benchmark,
        cash,
    })
}

/// Shared setup for backtest and signals: config load, validation, data fetch,
/// simulation.
fn run_pipeline(
    config_path: &PathBuf,
    symbols_override: Option<&str>,
) -> Result<(Strategy, BacktestConfig, BacktestResult), ExitCode> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;

    let fail = |e: RotatorError| -> ExitCode {
        eprintln!("error: {e}");
        (&e).into()
    };

    validate_backtest_config(&adapter).map_err(fail)?;
    validate_strategy_config(&adapter).map_err(fail)?;

    let bt_config = build_backtest_config(&adapter).map_err(fail)?;
    let strategy = build_strategy(&adapter).map_err(fail)?;
    eprintln!("Strategy: {}", strategy.name());

    let symbols = resolve_symbols(symbols_override, &adapter).map_err(fail)?;

    let csv_dir = adapter
        .get_string("data", "csv_dir")
        .ok_or_else(|| RotatorError::ConfigMissing {
            section: "data".into(),
            key: "csv_dir".into(),
        })
        .map_err(fail)?;
    let data_port = CsvDataAdapter::new(PathBuf::from(csv_dir));

    let data = load_data(&data_port, &symbols, &strategy, &bt_config).map_err(fail)?;

    eprintln!(
        "Running backtest: {} symbols, {} to {}",
        data.universe.len(),
        bt_config.start_date,
        bt_config.end_date,
    );

    let result = run_backtest(
        &data.universe,
        &data.benchmark,
        data.cash.as_ref(),
        &strategy,
        &bt_config,
    )
    .map_err(fail)?;

    Ok((strategy, bt_config, result))
}

fn print_summary(
    result: &BacktestResult,
    strategy_metrics: &Metrics,
    benchmark_metrics: &Metrics,
) {
    eprintln!("\n=== Strategy ===");
    eprintln!(
        "Total Return:     {:.2}%",
        strategy_metrics.total_return * 100.0
    );
    eprintln!("CAGR:             {:.2}%", strategy_metrics.cagr * 100.0);
    eprintln!(
        "Volatility:       {:.2}%",
        strategy_metrics.volatility * 100.0
    );
    eprintln!("Sharpe Ratio:     {:.2}", strategy_metrics.sharpe_ratio);
    eprintln!(
        "Max Drawdown:     -{:.1}%",
        strategy_metrics.max_drawdown * 100.0
    );
    eprintln!("Trades:           {}", result.trade_count);

    eprintln!("\n=== Benchmark ===");
    eprintln!(
        "Total Return:     {:.2}%",
        benchmark_metrics.total_return * 100.0
    );
    eprintln!("CAGR:             {:.2}%", benchmark_metrics.cagr * 100.0);
    eprintln!("Sharpe Ratio:     {:.2}", benchmark_metrics.sharpe_ratio);
    eprintln!(
        "Max Drawdown:     -{:.1}%",
        benchmark_metrics.max_drawdown * 100.0
    );

    if !result.rotations.is_empty() {
        eprintln!("\nRecent rotations:");
        let tail = result.rotations.len().saturating_sub(5);
        for rotation in &result.rotations[tail..] {
            let book = if rotation.invested {
                rotation.holdings.join(", ")
            } else {
                "cash".to_string()
            };
            eprintln!(
                "  {}  [{}]  ({} eligible)",
                rotation.period, book, rotation.eligible
            );
        }
    }

    if !result.current_picks.is_empty() {
        eprintln!("\nCurrent picks: {}", result.current_picks.join(", "));
    }
}

fn run_backtest_command(
    config_path: &PathBuf,
    output_path: Option<&PathBuf>,
    csv_path: Option<&PathBuf>,
    symbols_override: Option<&str>,
) -> ExitCode {
    let (strategy, bt_config, result) = match run_pipeline(config_path, symbols_override) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let periods_per_year = bt_config.rebalance.periods_per_year();
    let strategy_metrics = Metrics::compute(
        &result.strategy_series(),
        periods_per_year,
        bt_config.risk_free_rate,
    );
    let benchmark_metrics = Metrics::compute(
        &result.benchmark_series(),
        periods_per_year,
        bt_config.risk_free_rate,
    );

    print_summary(&result, &strategy_metrics, &benchmark_metrics);

    let context = ReportContext {
        strategy: &strategy,
        config: &bt_config,
        result: &result,
        strategy_metrics: &strategy_metrics,
        benchmark_metrics: &benchmark_metrics,
    };

    let output = output_path
        .cloned()
        .unwrap_or_else(|| PathBuf::from("report.html"));
    if let Err(e) = HtmlReportAdapter::new().write(&context, &output.display().to_string()) {
        eprintln!("error: failed to write report: {e}");
        return (&e).into();
    }
    eprintln!("\nReport written to: {}", output.display());

    if let Some(csv) = csv_path {
        if let Err(e) = CsvReportAdapter::new().write(&context, &csv.display().to_string()) {
            eprintln!("error: failed to write CSV export: {e}");
            return (&e).into();
        }
        eprintln!("Returns exported to: {}", csv.display());
    }

    ExitCode::SUCCESS
}

fn run_signals(config_path: &PathBuf) -> ExitCode {
    let (_, _, result) = match run_pipeline(config_path, None) {
        Ok(v) => v,
        Err(code) => return code,
    };

    if result.current_picks.is_empty() {
        eprintln!("Currently in cash");
    } else {
        for symbol in &result.current_picks {
            println!("{}", symbol);
        }
    }
    if let Some(last) = result.rotations.last() {
        eprintln!(
            "As of {}: {} ({} eligible)",
            last.period,
            if last.invested { "invested" } else { "cash" },
            last.eligible
        );
    }
    ExitCode::SUCCESS
}

fn run_dry_run(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    eprintln!("Config validated successfully");

    let strategy = match build_strategy(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("\nStrategy: {}", strategy.name());

    match resolve_symbols(None, &adapter) {
        Ok(symbols) => {
            eprintln!("Universe: {}", symbols.join(", "));
        }
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    if let Ok(config) = build_backtest_config(&adapter) {
        eprintln!(
            "Period: {} to {} ({:?} rebalance)",
            config.start_date, config.end_date, config.rebalance
        );
        eprintln!("Benchmark: {}", config.benchmark);
    }

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let csv_dir = match config.get_string("data", "csv_dir") {
        Some(d) => d,
        None => {
            eprintln!("error: [data] csv_dir is required");
            return ExitCode::from(2);
        }
    };

    let adapter = CsvDataAdapter::new(PathBuf::from(csv_dir));
    let symbols = match adapter.list_symbols() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}

fn run_info(symbol: Option<&str>, config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let csv_dir = match config.get_string("data", "csv_dir") {
        Some(d) => d,
        None => {
            eprintln!("error: [data] csv_dir is required");
            return ExitCode::from(2);
        }
    };
    let adapter = CsvDataAdapter::new(PathBuf::from(csv_dir));

    let symbols = match symbol {
        Some(s) => vec![s.to_uppercase()],
        None => match resolve_symbols(None, &config) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        },
    };

    for s in &symbols {
        match adapter.data_range(s) {
            Ok(Some((min_date, max_date, count))) => {
                println!("{}: {} bars, {} to {}", s, count, min_date, max_date);
            }
            Ok(None) => {
                eprintln!("{}: no data found", s);
            }
            Err(e) => {
                eprintln!("error querying {}: {}", s, e);
            }
        }
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn build_backtest_config_reads_all_fields() {
        let adapter = make_config(
            "[backtest]\nstart_date = 2015-01-01\nend_date = 2024-12-31\nbenchmark = spy\n\
             cash_symbol = shy\nfee_pct = 0.2\nrisk_free_rate = 0.02\nrebalance = weekly\n",
        );
        let config = build_backtest_config(&adapter).unwrap();
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2015, 1, 1).unwrap());
        assert_eq!(config.benchmark, "SPY");
        assert_eq!(config.cash_symbol.as_deref(), Some("SHY"));
        assert_eq!(config.rebalance, Rebalance::Weekly);
        assert!((config.fee_rate - 0.002).abs() < 1e-12);
        assert_eq!(config.risk_free_rate, 0.02);
    }

    #[test]
    fn build_backtest_config_defaults() {
        let adapter = make_config(
            "[backtest]\nstart_date = 2015-01-01\nend_date = 2024-12-31\nbenchmark = SPY\n",
        );
        let config = build_backtest_config(&adapter).unwrap();
        assert_eq!(config.rebalance, Rebalance::Monthly);
        assert_eq!(config.cash_symbol, None);
        assert_eq!(config.fee_rate, 0.0);
        assert_eq!(config.risk_free_rate, 0.0);
    }

    #[test]
    fn build_backtest_config_missing_benchmark() {
        let adapter =
            make_config("[backtest]\nstart_date = 2015-01-01\nend_date = 2024-12-31\n");
        let err = build_backtest_config(&adapter).unwrap_err();
        assert!(matches!(err, RotatorError::ConfigMissing { key, .. } if key == "benchmark"));
    }

    #[test]
    fn build_strategy_momentum_defaults() {
        let adapter = make_config("[strategy]\nsymbols = SPY,QQQ\n");
        let strategy = build_strategy(&adapter).unwrap();
        assert_eq!(
            strategy,
            Strategy::MomentumRotation {
                top_n: 5,
                lookback: 6,
                holding_period: 1,
                sma_period: None,
            }
        );
    }

    #[test]
    fn build_strategy_momentum_with_trend_filter() {
        let adapter = make_config(
            "[strategy]\nmode = momentum\nsymbols = SPY,QQQ\ntop_n = 3\nlookback = 12\n\
             use_trend_filter = true\nsma_period = 150\n",
        );
        let strategy = build_strategy(&adapter).unwrap();
        assert_eq!(
            strategy,
            Strategy::MomentumRotation {
                top_n: 3,
                lookback: 12,
                holding_period: 1,
                sma_period: Some(150),
            }
        );
    }

    #[test]
    fn build_strategy_rsi() {
        let adapter = make_config(
            "[strategy]\nmode = rsi\nsymbols = SPY\nrsi_period = 14\nrsi_buy_trend = 55\n",
        );
        let strategy = build_strategy(&adapter).unwrap();
        assert_eq!(
            strategy,
            Strategy::RsiTiming {
                rsi_period: 14,
                buy_trend: 55.0,
                buy_panic: 32.0,
            }
        );
    }

    #[test]
    fn resolve_symbols_prefers_override() {
        let adapter = make_config("[strategy]\nsymbols = SPY,QQQ\n");
        let symbols = resolve_symbols(Some("iwm,efa"), &adapter).unwrap();
        assert_eq!(symbols, vec!["IWM", "EFA"]);
    }

    #[test]
    fn resolve_symbols_falls_back_to_config() {
        let adapter = make_config("[strategy]\nsymbols = SPY,QQQ\n");
        let symbols = resolve_symbols(None, &adapter).unwrap();
        assert_eq!(symbols, vec!["SPY", "QQQ"]);
    }

    #[test]
    fn history_margin_covers_sma_warmup() {
        let momentum = Strategy::MomentumRotation {
            top_n: 5,
            lookback: 6,
            holding_period: 1,
            sma_period: Some(200),
        };
        let margin = history_margin_days(&momentum, Rebalance::Monthly);
        assert!(margin >= 350);

        let no_filter = Strategy::MomentumRotation {
            top_n: 5,
            lookback: 6,
            holding_period: 1,
            sma_period: None,
        };
        assert_eq!(history_margin_days(&no_filter, Rebalance::Monthly), 246);
    }
}
