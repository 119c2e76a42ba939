//! Report generation port trait.

use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::error::RotatorError;
use crate::domain::metrics::Metrics;
use crate::domain::strategy::Strategy;

/// Everything a report needs: the run parameters, the per-period results,
/// and the already-computed summary statistics for both legs.
pub struct ReportContext<'a> {
    pub strategy: &'a Strategy,
    pub config: &'a BacktestConfig,
    pub result: &'a BacktestResult,
    pub strategy_metrics: &'a Metrics,
    pub benchmark_metrics: &'a Metrics,
}

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(&self, context: &ReportContext, output_path: &str) -> Result<(), RotatorError>;
}
