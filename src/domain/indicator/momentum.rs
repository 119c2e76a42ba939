//! Trailing-return momentum score.
//!
//! score[i] = close[i] / close[i-lookback] - 1, on period closes. A slot is
//! `None` when either endpoint is unquoted (symbol not yet listed) or inside
//! the warmup window.

pub fn trailing_return(closes: &[Option<f64>], lookback: usize) -> Vec<Option<f64>> {
    if lookback == 0 {
        return vec![None; closes.len()];
    }

    let mut out = vec![None; closes.len()];
    for i in lookback..closes.len() {
        if let (Some(curr), Some(prev)) = (closes[i], closes[i - lookback]) {
            if prev > 0.0 {
                out[i] = Some(curr / prev - 1.0);
            }
        }
    }
    out
}
