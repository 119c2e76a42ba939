//! CSV export of the per-period return table.

use std::fs;
use std::path::Path;

use crate::domain::error::RotatorError;
use crate::domain::metrics::cumulative_curve;
use crate::ports::report_port::{ReportContext, ReportPort};

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, context: &ReportContext, output_path: &str) -> Result<(), RotatorError> {
        let path = Path::new(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(RotatorError::Io)?;
        }

        let strategy_curve = cumulative_curve(&context.result.strategy_series());
        let benchmark_curve = cumulative_curve(&context.result.benchmark_series());

        let mut wtr = csv::Writer::from_path(path).map_err(|e| RotatorError::Data {
            reason: format!("failed to open {}: {}", path.display(), e),
        })?;

        wtr.write_record([
            "date",
            "strategy_return",
            "benchmark_return",
            "invested",
            "fee",
            "strategy_growth",
            "benchmark_growth",
        ])
        .map_err(|e| RotatorError::Data {
            reason: format!("CSV write error: {}", e),
        })?;

        for (i, r) in context.result.returns.iter().enumerate() {
            wtr.write_record([
                r.date.format("%Y-%m-%d").to_string(),
                format!("{:.6}", r.strategy),
                format!("{:.6}", r.benchmark),
                if r.invested { "1" } else { "0" }.to_string(),
                format!("{:.6}", r.fee),
                format!("{:.6}", strategy_curve[i].1),
                format!("{:.6}", benchmark_curve[i].1),
            ])
            .map_err(|e| RotatorError::Data {
                reason: format!("CSV write error: {}", e),
            })?;
        }

        wtr.flush().map_err(RotatorError::Io)?;
        Ok(())
    }
}
