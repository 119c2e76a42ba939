//! Strategy variants and their parameters.

#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Hold the top-N universe symbols by trailing return, rebalanced every
    /// `holding_period` periods, optionally parked in cash when the
    /// benchmark trades below its `sma_period`-day moving average.
    MomentumRotation {
        top_n: usize,
        lookback: usize,
        holding_period: usize,
        sma_period: Option<usize>,
    },
    /// In or out of a single symbol on the dual-threshold RSI rule.
    RsiTiming {
        rsi_period: usize,
        buy_trend: f64,
        buy_panic: f64,
    },
}

impl Strategy {
    pub fn name(&self) -> String {
        match self {
            Strategy::MomentumRotation {
                top_n, lookback, ..
            } => format!("Momentum Top {top_n} ({lookback}-period lookback)"),
            Strategy::RsiTiming { rsi_period, .. } => format!("RSI {rsi_period} Timing"),
        }
    }

    /// Periods of history consumed before the first decision.
    pub fn warmup_periods(&self) -> usize {
        match self {
            Strategy::MomentumRotation { lookback, .. } => *lookback,
            Strategy::RsiTiming { rsi_period, .. } => *rsi_period,
        }
    }

}
