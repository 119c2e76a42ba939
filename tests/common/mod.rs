#![allow(dead_code)]

use chrono::NaiveDate;
use rotator::domain::backtest::BacktestConfig;
use rotator::domain::error::RotatorError;
pub use rotator::domain::price::{PriceBar, PriceSeries, Rebalance};
use rotator::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, RotatorError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(RotatorError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>, RotatorError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, RotatorError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(RotatorError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.date).min().unwrap();
                let max = bars.iter().map(|b| b.date).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Geometric close series: `start`, `start * rate`, `start * rate^2`, ...
pub fn growth_closes(start: f64, rate: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start * rate.powi(i as i32)).collect()
}

/// Two bars per month starting at `start_year`-01: the 1st opens at the prior
/// month's close, the 28th carries the month's close.
pub fn monthly_bars(symbol: &str, start_year: i32, month_closes: &[f64]) -> Vec<PriceBar> {
    let mut bars = Vec::new();
    let mut prev = month_closes[0];
    for (m, &close) in month_closes.iter().enumerate() {
        let year = start_year + (m / 12) as i32;
        let month = (m % 12) as u32 + 1;
        bars.push(PriceBar {
            symbol: symbol.to_string(),
            date: date(year, month, 1),
            open: prev,
            close: prev,
        });
        bars.push(PriceBar {
            symbol: symbol.to_string(),
            date: date(year, month, 28),
            open: close,
            close,
        });
        prev = close;
    }
    bars
}

pub fn monthly_series(symbol: &str, start_year: i32, month_closes: &[f64]) -> PriceSeries {
    PriceSeries::new(symbol.to_string(), monthly_bars(symbol, start_year, month_closes))
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        start_date: date(2023, 6, 1),
        end_date: date(2024, 12, 31),
        benchmark: "SPY".to_string(),
        cash_symbol: None,
        rebalance: Rebalance::Monthly,
        fee_rate: 0.0,
        risk_free_rate: 0.0,
    }
}
