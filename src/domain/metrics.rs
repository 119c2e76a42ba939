//! Performance metrics over a period-return series.
//!
//! Annualization follows calendar time between the first and last period
//! (days / 365.25, floored at 0.1 years so one-period series stay finite);
//! volatility scales sample standard deviation by sqrt(periods per year).

use chrono::NaiveDate;

const DAYS_PER_YEAR: f64 = 365.25;
const MIN_YEARS: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub cagr: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    /// Peak-to-trough decline as a positive fraction.
    pub max_drawdown: f64,
    /// Longest run of periods spent below a prior peak.
    pub max_drawdown_duration: usize,
    pub periods: usize,
}

impl Metrics {
    /// Compute metrics over dated period returns.
    pub fn compute(
        series: &[(NaiveDate, f64)],
        periods_per_year: f64,
        risk_free_rate: f64,
    ) -> Self {
        if series.is_empty() {
            return Metrics {
                total_return: 0.0,
                cagr: 0.0,
                volatility: 0.0,
                sharpe_ratio: 0.0,
                max_drawdown: 0.0,
                max_drawdown_duration: 0,
                periods: 0,
            };
        }

        let returns: Vec<f64> = series.iter().map(|&(_, r)| r).collect();
        let total_return = returns.iter().map(|r| 1.0 + r).product::<f64>() - 1.0;

        let days = (series[series.len() - 1].0 - series[0].0).num_days();
        let years = (days as f64 / DAYS_PER_YEAR).max(MIN_YEARS);
        let cagr = if total_return > -1.0 {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            -1.0
        };

        let volatility = sample_stddev(&returns) * periods_per_year.sqrt();
        let sharpe_ratio = if volatility > 0.0 {
            (cagr - risk_free_rate) / volatility
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(&returns);

        Metrics {
            total_return,
            cagr,
            volatility,
            sharpe_ratio,
            max_drawdown,
            max_drawdown_duration,
            periods: returns.len(),
        }
    }
}

/// Compound a return series into a growth-of-1 curve.
pub fn cumulative_curve(series: &[(NaiveDate, f64)]) -> Vec<(NaiveDate, f64)> {
    let mut level = 1.0;
    series
        .iter()
        .map(|&(date, r)| {
            level *= 1.0 + r;
            (date, level)
        })
        .collect()
}

fn sample_stddev(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

fn compute_drawdown(returns: &[f64]) -> (f64, usize) {
    let mut level = 1.0;
    let mut peak = 1.0;
    let mut max_dd = 0.0_f64;
    let mut run = 0usize;
    let mut max_run = 0usize;

    for r in returns {
        level *= 1.0 + r;
        if level > peak {
            peak = level;
            run = 0;
        } else {
            let dd = (peak - level) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
            run += 1;
            if run > max_run {
                max_run = run;
            }
        }
    }

    (max_dd, max_run)
}
