//! RSI (Relative Strength Index) on rolling-mean average gain/loss.
//!
//! Cutler's formulation: both averages are simple means over the last n price
//! changes (no Wilder smoothing):
//!
//!   RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//!
//! If avg_loss == 0: RSI = 100, unless the window had no gains either (a
//! fully flat window), which stays `None`. Warmup: the first n slots are
//! `None` (n price changes are needed for the first window).

/// Compute RSI over `closes` with the given window of price changes.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; closes.len()];
    }

    let mut out = vec![None; closes.len()];
    if closes.len() <= period {
        return out;
    }

    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    for i in period..closes.len() {
        let window = &changes[i - period..i];
        let avg_gain: f64 =
            window.iter().filter(|&&c| c > 0.0).sum::<f64>() / period as f64;
        let avg_loss: f64 =
            window.iter().filter(|&&c| c < 0.0).map(|c| -c).sum::<f64>() / period as f64;

        out[i] = if avg_loss == 0.0 {
            if avg_gain == 0.0 {
                // No price movement in the window: relative strength is
                // undefined.
                None
            } else {
                Some(100.0)
            }
        } else {
            Some(100.0 - (100.0 / (1.0 + avg_gain / avg_loss)))
        };
    }

    out
}
