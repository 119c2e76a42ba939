//! Technical indicator implementations.
//!
//! Indicators operate on plain close slices and return one output slot per
//! input, `None` during warmup. Callers align the output with their own date
//! axis.

pub mod momentum;
pub mod rsi;
pub mod sma;

pub use momentum::trailing_return;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
