//! Benchmark trend filter: daily close vs its simple moving average.
//!
//! The filter is bearish whenever the benchmark close sits at or below the
//! moving average — or while the average is still warming up. Callers should
//! load an SMA-sized margin of history before the backtest start so the
//! warmup never overlaps simulated periods.

use crate::domain::indicator::calculate_sma;
use crate::domain::price::PriceSeries;
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct TrendFilter {
    dates: Vec<NaiveDate>,
    closes: Vec<f64>,
    sma: Vec<Option<f64>>,
}

impl TrendFilter {
    /// Precompute the SMA over the benchmark's daily closes.
    pub fn new(benchmark: &PriceSeries, sma_period: usize) -> Self {
        let dates: Vec<NaiveDate> = benchmark.bars().iter().map(|b| b.date).collect();
        let closes: Vec<f64> = benchmark.bars().iter().map(|b| b.close).collect();
        let sma = calculate_sma(&closes, sma_period);
        Self { dates, closes, sma }
    }

    /// Whether the market was bullish as of `date` (last quote on or before).
    pub fn is_bullish(&self, date: NaiveDate) -> bool {
        let idx = match self.dates.binary_search(&date) {
            Ok(i) => i,
            Err(0) => return false,
            Err(i) => i - 1,
        };
        match self.sma[idx] {
            Some(sma) => self.closes[idx] > sma,
            None => false,
        }
    }
}
