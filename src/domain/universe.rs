//! Universe parsing and validation for rotation backtesting.
//!
//! Parses symbol lists from configuration and checks that each symbol has
//! enough history to score. Symbols that fail validation are skipped with a
//! warning rather than aborting the run, so a universe containing delisted
//! or late-listing tickers still backtests on whatever survives.

use crate::domain::error::RotatorError;
use crate::domain::price::PriceSeries;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::HashSet;

pub const MIN_PRICE_BARS: usize = 30;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if seen.contains(&symbol) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        seen.insert(symbol.clone());
        symbols.push(symbol);
    }

    Ok(symbols)
}

#[derive(Debug, Clone)]
pub struct UniverseLoadResult {
    pub series: Vec<PriceSeries>,
    pub skipped: Vec<SkippedSymbol>,
}

#[derive(Debug, Clone)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub enum SkipReason {
    NoData,
    InsufficientBars { bars: usize },
}

/// Fetch and validate price history for every universe symbol.
///
/// Symbols with no data or fewer than [`MIN_PRICE_BARS`] bars are dropped
/// with a stderr warning. Errors only when nothing survives.
pub fn load_universe(
    data_port: &dyn DataPort,
    symbols: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<UniverseLoadResult, RotatorError> {
    let mut series = Vec::new();
    let mut skipped = Vec::new();

    for symbol in symbols {
        let bars = match data_port.fetch_prices(symbol, start_date, end_date) {
            Ok(bars) => bars,
            Err(e) => {
                eprintln!("Warning: skipping {} ({})", symbol, e);
                skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason: SkipReason::NoData,
                });
                continue;
            }
        };

        if bars.is_empty() {
            eprintln!("Warning: skipping {} (no data found)", symbol);
            skipped.push(SkippedSymbol {
                symbol: symbol.clone(),
                reason: SkipReason::NoData,
            });
            continue;
        }

        if bars.len() < MIN_PRICE_BARS {
            eprintln!(
                "Warning: skipping {} (only {} bars, minimum {} required)",
                symbol,
                bars.len(),
                MIN_PRICE_BARS
            );
            skipped.push(SkippedSymbol {
                symbol: symbol.clone(),
                reason: SkipReason::InsufficientBars { bars: bars.len() },
            });
            continue;
        }

        eprintln!("  {}: {} bars [OK]", symbol, bars.len());
        series.push(PriceSeries::new(symbol.clone(), bars));
    }

    if series.is_empty() {
        return Err(RotatorError::InsufficientData {
            symbol: "all".to_string(),
            bars: 0,
            minimum: MIN_PRICE_BARS,
        });
    }

    if !skipped.is_empty() {
        eprintln!(
            "Backtesting {} of {} symbols",
            series.len(),
            series.len() + skipped.len()
        );
    }

    Ok(UniverseLoadResult { series, skipped })
}
