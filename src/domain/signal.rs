//! Per-period scores and position signals.
//!
//! A `ScoreTable` holds the trailing-return momentum score of every universe
//! symbol at every period end. Ranking and the RSI dual-threshold rule live
//! here; the rotation loop consumes both.

use crate::domain::indicator::trailing_return;
use crate::domain::price::PriceSeries;
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct ScoreTable {
    pub symbols: Vec<String>,
    /// closes[s][p]: period-end close of symbol s at period p.
    pub closes: Vec<Vec<Option<f64>>>,
    /// scores[s][p]: trailing return of symbol s at period p.
    pub scores: Vec<Vec<Option<f64>>>,
}

impl ScoreTable {
    pub fn build(universe: &[PriceSeries], ends: &[NaiveDate], lookback: usize) -> Self {
        let symbols = universe.iter().map(|s| s.symbol.clone()).collect();
        let closes: Vec<Vec<Option<f64>>> =
            universe.iter().map(|s| s.resample_closes(ends)).collect();
        let scores = closes
            .iter()
            .map(|c| trailing_return(c, lookback))
            .collect();
        Self {
            symbols,
            closes,
            scores,
        }
    }

    /// Symbols quoted and scored at period `p`, with their scores.
    pub fn eligible_at(&self, p: usize) -> Vec<(String, f64)> {
        self.symbols
            .iter()
            .enumerate()
            .filter_map(|(s, symbol)| {
                self.closes[s][p]?;
                self.scores[s][p].map(|score| (symbol.clone(), score))
            })
            .collect()
    }
}

/// Rank scored symbols descending and keep the top n. Ties break on symbol
/// name so runs are deterministic.
pub fn rank_top_n(mut scored: Vec<(String, f64)>, n: usize) -> Vec<String> {
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.into_iter().take(n).map(|(symbol, _)| symbol).collect()
}

/// The dual-threshold RSI buy rule: hold while the oscillator confirms the
/// trend (above `buy_trend`) or signals capitulation (below `buy_panic`).
pub fn rsi_buy_signal(rsi: Option<f64>, buy_trend: f64, buy_panic: f64) -> bool {
    match rsi {
        Some(v) => v > buy_trend || v < buy_panic,
        None => false,
    }
}
