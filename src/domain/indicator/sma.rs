//! Simple moving average.
//!
//! Warmup: first n-1 slots are `None`.

pub fn calculate_sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    let mut out = vec![None; values.len()];
    let mut window_sum = 0.0;

    for i in 0..values.len() {
        window_sum += values[i];
        if i >= period {
            window_sum -= values[i - period];
        }
        if i + 1 >= period {
            out[i] = Some(window_sum / period as f64);
        }
    }

    out
}
