//! The rebalance state machine.
//!
//! Walks period-end dates in order. At each step it settles the held symbol
//! set (top-N rotation or a binary timing signal), applies fee and
//! cash/invested transitions, then realizes the period return over the
//! following window: enter at the first open strictly after the decision
//! date, exit at the last close on or before the next period end.
//!
//! A period whose benchmark window cannot be priced is skipped and the walk
//! continues.

use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

use super::price::PriceSeries;
use super::signal::{rank_top_n, rsi_buy_signal, ScoreTable};
use super::trend::TrendFilter;
use crate::domain::indicator::calculate_rsi;

#[derive(Debug, Clone, PartialEq)]
pub struct RotationParams {
    pub top_n: usize,
    pub lookback: usize,
    pub holding_period: usize,
    pub fee_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimingParams {
    pub rsi_period: usize,
    pub buy_trend: f64,
    pub buy_panic: f64,
    pub fee_rate: f64,
}

/// One realized period of the simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodReturn {
    pub date: NaiveDate,
    pub strategy: f64,
    pub benchmark: f64,
    pub invested: bool,
    pub fee: f64,
}

/// One rebalance decision, for the holdings-history log.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationRecord {
    pub period: NaiveDate,
    pub invested: bool,
    pub holdings: Vec<String>,
    pub eligible: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RotationOutcome {
    pub returns: Vec<PeriodReturn>,
    pub rotations: Vec<RotationRecord>,
    pub trade_count: usize,
    /// Top-ranked picks at the most recent period end (next period's book).
    pub current_picks: Vec<String>,
}

/// Return over `(entry, exit_end]`: first open on or after `entry`, last
/// close on or before `exit_end`. `None` when the symbol has no trading
/// inside the window.
pub fn window_return(series: &PriceSeries, entry: NaiveDate, exit_end: NaiveDate) -> Option<f64> {
    let (open_date, open) = series.open_on_or_after(entry)?;
    if open_date > exit_end || open <= 0.0 {
        return None;
    }
    let close = series.close_on_or_before(exit_end)?;
    Some(close / open - 1.0)
}

/// Top-N momentum rotation with optional trend filter and cash proxy.
pub fn run_rotation(
    universe: &[PriceSeries],
    benchmark: &PriceSeries,
    cash: Option<&PriceSeries>,
    trend: Option<&TrendFilter>,
    ends: &[NaiveDate],
    start_date: NaiveDate,
    params: &RotationParams,
) -> RotationOutcome {
    let table = ScoreTable::build(universe, ends, params.lookback);
    let by_symbol: HashMap<&str, &PriceSeries> = universe
        .iter()
        .map(|s| (s.symbol.as_str(), s))
        .collect();

    let mut outcome = RotationOutcome::default();
    if let Some(last) = ends.len().checked_sub(1) {
        outcome.current_picks = rank_top_n(table.eligible_at(last), params.top_n);
    }

    let Some(first_period) = ends.iter().position(|&e| e >= start_date) else {
        return outcome;
    };
    let start_idx = first_period.max(params.lookback);
    if ends.len() < 2 || start_idx >= ends.len() - 1 {
        return outcome;
    }

    let mut holdings: Vec<String> = Vec::new();
    let mut is_invested = false;

    for i in start_idx..ends.len() - 1 {
        let mut fee = 0.0;
        let bullish = trend.map_or(true, |t| t.is_bullish(ends[i]));

        if (i - start_idx) % params.holding_period == 0 {
            let eligible = table.eligible_at(i);
            let eligible_count = eligible.len();

            if !eligible.is_empty() {
                let ranking = rank_top_n(eligible, params.top_n);
                if holdings.is_empty() {
                    holdings = ranking;
                } else {
                    let keep: Vec<String> = holdings
                        .iter()
                        .filter(|h| ranking.contains(h))
                        .cloned()
                        .collect();
                    let needed = params.top_n.saturating_sub(keep.len());
                    let buys: Vec<String> = ranking
                        .into_iter()
                        .filter(|r| !keep.contains(r))
                        .take(needed)
                        .collect();
                    let sells = holdings.len() - keep.len();
                    let changes = sells + buys.len();

                    // Paper rotations while in cash cost nothing.
                    if changes > 0 && is_invested {
                        fee += changes as f64 / params.top_n as f64 * params.fee_rate;
                        outcome.trade_count += changes;
                    }
                    holdings = keep;
                    holdings.extend(buys);
                }
            }

            outcome.rotations.push(RotationRecord {
                period: ends[i],
                invested: bullish,
                holdings: holdings.clone(),
                eligible: eligible_count,
            });
        }

        let was_invested = is_invested;
        is_invested = bullish && !holdings.is_empty();
        if is_invested != was_invested {
            fee += params.fee_rate;
            outcome.trade_count += holdings.len();
        }

        let entry = ends[i] + Duration::days(1);
        let exit_end = ends[i + 1];

        let Some(benchmark_ret) = window_return(benchmark, entry, exit_end) else {
            continue;
        };

        let strategy_ret = if is_invested {
            let rets: Vec<f64> = holdings
                .iter()
                .filter_map(|h| by_symbol.get(h.as_str()))
                .filter_map(|s| window_return(s, entry, exit_end))
                .collect();
            if rets.is_empty() {
                // Every holding stopped trading inside the window.
                -fee
            } else {
                rets.iter().sum::<f64>() / rets.len() as f64 - fee
            }
        } else {
            let cash_ret = cash
                .and_then(|c| window_return(c, entry, exit_end))
                .unwrap_or(0.0);
            cash_ret - fee
        };

        outcome.returns.push(PeriodReturn {
            date: exit_end,
            strategy: strategy_ret,
            benchmark: benchmark_ret,
            invested: is_invested,
            fee,
        });
    }

    outcome
}

/// Single-symbol RSI timing: binary in-or-out signal applied with a
/// one-period lag, close-to-close returns on the resampled series.
pub fn run_timing(
    subject: &PriceSeries,
    ends: &[NaiveDate],
    start_date: NaiveDate,
    params: &TimingParams,
) -> RotationOutcome {
    let resampled = subject.resample_closes(ends);
    let first = resampled.iter().position(|c| c.is_some()).unwrap_or(0);
    let closes: Vec<f64> = resampled[first..].iter().filter_map(|&c| c).collect();

    let mut outcome = RotationOutcome::default();
    if closes.len() < 2 {
        return outcome;
    }

    let rsi = calculate_rsi(&closes, params.rsi_period);
    let signal: Vec<bool> = rsi
        .iter()
        .map(|&v| rsi_buy_signal(v, params.buy_trend, params.buy_panic))
        .collect();

    if signal.last().copied().unwrap_or(false) {
        outcome.current_picks = vec![subject.symbol.clone()];
    }

    let mut prev_position = false;
    for j in 1..closes.len() {
        let period = ends[first + j];
        let position = signal[j - 1];

        let mut fee = 0.0;
        if position != prev_position {
            fee = params.fee_rate;
            outcome.trade_count += 1;
        }
        prev_position = position;

        if period < start_date {
            continue;
        }

        let market_ret = if closes[j - 1] > 0.0 {
            closes[j] / closes[j - 1] - 1.0
        } else {
            continue;
        };

        let strategy_ret = if position { market_ret } else { 0.0 } - fee;

        outcome.rotations.push(RotationRecord {
            period,
            invested: position,
            holdings: if position {
                vec![subject.symbol.clone()]
            } else {
                Vec::new()
            },
            eligible: 1,
        });
        outcome.returns.push(PeriodReturn {
            date: period,
            strategy: strategy_ret,
            benchmark: market_ret,
            invested: position,
            fee,
        });
    }

    outcome
}
