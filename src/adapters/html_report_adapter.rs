//! HTML report adapter implementing ReportPort.
//!
//! Builds a self-contained report: summary tables for both legs, the
//! growth-of-1 chart as inline SVG, and the rotation history.

use std::fs;
use std::path::Path;

use crate::domain::error::RotatorError;
use crate::domain::metrics::{cumulative_curve, Metrics};
use crate::ports::report_port::{ReportContext, ReportPort};
use chrono::NaiveDate;

const CHART_WIDTH: f64 = 640.0;
const CHART_HEIGHT: f64 = 280.0;
const CHART_PADDING: f64 = 40.0;

/// Growth-of-1 curves for strategy and benchmark as one inline SVG.
pub fn growth_chart_svg(
    strategy: &[(NaiveDate, f64)],
    benchmark: &[(NaiveDate, f64)],
) -> String {
    if strategy.is_empty() {
        return "<p>No return data available.</p>".to_string();
    }

    let all_levels = strategy.iter().chain(benchmark.iter()).map(|&(_, v)| v);
    let min_level = all_levels.clone().fold(f64::INFINITY, f64::min).min(1.0);
    let max_level = all_levels.fold(f64::NEG_INFINITY, f64::max).max(1.0);

    let plot_width = CHART_WIDTH - 2.0 * CHART_PADDING;
    let plot_height = CHART_HEIGHT - 2.0 * CHART_PADDING;

    let range = max_level - min_level;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };

    let polyline = |curve: &[(NaiveDate, f64)]| -> String {
        let scale_x = if curve.len() > 1 {
            plot_width / (curve.len() - 1) as f64
        } else {
            0.0
        };
        curve
            .iter()
            .enumerate()
            .map(|(i, &(_, level))| {
                let x = CHART_PADDING + i as f64 * scale_x;
                let y = CHART_HEIGHT - CHART_PADDING - (level - min_level) * scale_y;
                format!("{:.1},{:.1}", x, y)
            })
            .collect::<Vec<_>>()
            .join(" ")
    };

    let mut svg = format!(
        "<svg viewBox=\"0 0 {:.0} {:.0}\" xmlns=\"http://www.w3.org/2000/svg\">",
        CHART_WIDTH, CHART_HEIGHT
    );
    svg.push_str(&format!(
        "<line x1=\"{p:.0}\" y1=\"{p:.0}\" x2=\"{p:.0}\" y2=\"{b:.0}\" stroke=\"#9ca3af\"/>",
        p = CHART_PADDING,
        b = CHART_HEIGHT - CHART_PADDING
    ));
    svg.push_str(&format!(
        "<line x1=\"{p:.0}\" y1=\"{b:.0}\" x2=\"{r:.0}\" y2=\"{b:.0}\" stroke=\"#9ca3af\"/>",
        p = CHART_PADDING,
        b = CHART_HEIGHT - CHART_PADDING,
        r = CHART_WIDTH - CHART_PADDING
    ));
    if !benchmark.is_empty() {
        svg.push_str(&format!(
            "<polyline points=\"{}\" fill=\"none\" stroke=\"#6b7280\" stroke-width=\"1.5\"/>",
            polyline(benchmark)
        ));
    }
    svg.push_str(&format!(
        "<polyline points=\"{}\" fill=\"none\" stroke=\"#2563eb\" stroke-width=\"2\"/>",
        polyline(strategy)
    ));
    svg.push_str("</svg>");
    svg
}

fn metrics_rows(label: &str, metrics: &Metrics) -> String {
    format!(
        "<tr><td>{}</td><td>{:.2}%</td><td>{:.2}%</td><td>{:.2}%</td><td>{:.2}</td><td>{:.2}%</td><td>{}</td></tr>",
        label,
        metrics.total_return * 100.0,
        metrics.cagr * 100.0,
        metrics.volatility * 100.0,
        metrics.sharpe_ratio,
        metrics.max_drawdown * 100.0,
        metrics.max_drawdown_duration
    )
}

pub struct HtmlReportAdapter;

impl HtmlReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for HtmlReportAdapter {
    fn write(&self, context: &ReportContext, output_path: &str) -> Result<(), RotatorError> {
        let strategy_curve = cumulative_curve(&context.result.strategy_series());
        let benchmark_curve = cumulative_curve(&context.result.benchmark_series());

        let mut html = String::from(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Rotation Backtest Report</title>\
             <style>body{font-family:sans-serif;max-width:720px;margin:2em auto;color:#111}\
             table{border-collapse:collapse;width:100%}td,th{border:1px solid #d1d5db;padding:4px 8px;text-align:right}\
             td:first-child,th:first-child{text-align:left}</style></head><body>",
        );

        html.push_str("<h1>Rotation Backtest Report</h1>");

        html.push_str("<h2>Strategy</h2>");
        html.push_str(&format!(
            "<p><strong>Name:</strong> {}</p>",
            context.strategy.name()
        ));
        html.push_str(&format!(
            "<p><strong>Period:</strong> {} to {} ({:?} rebalance)</p>",
            context.config.start_date, context.config.end_date, context.config.rebalance
        ));
        html.push_str(&format!(
            "<p><strong>Benchmark:</strong> {}</p>",
            context.config.benchmark
        ));
        html.push_str(&format!(
            "<p><strong>Fee:</strong> {:.3}% per turnover</p>",
            context.config.fee_rate * 100.0
        ));
        html.push_str(&format!(
            "<p><strong>Trades:</strong> {}</p>",
            context.result.trade_count
        ));
        if !context.result.current_picks.is_empty() {
            html.push_str(&format!(
                "<p><strong>Current Picks:</strong> {}</p>",
                context.result.current_picks.join(", ")
            ));
        }

        html.push_str("<h2>Metrics</h2>");
        html.push_str(
            "<table><tr><th></th><th>Total Return</th><th>CAGR</th><th>Volatility</th>\
             <th>Sharpe</th><th>Max Drawdown</th><th>DD Periods</th></tr>",
        );
        html.push_str(&metrics_rows("Strategy", context.strategy_metrics));
        html.push_str(&metrics_rows("Benchmark", context.benchmark_metrics));
        html.push_str("</table>");

        html.push_str("<h2>Growth of $1</h2>");
        html.push_str(&growth_chart_svg(&strategy_curve, &benchmark_curve));

        if !context.result.rotations.is_empty() {
            html.push_str("<h2>Rotation History</h2>");
            html.push_str("<table><tr><th>Period</th><th>Invested</th><th>Holdings</th></tr>");
            for record in &context.result.rotations {
                html.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                    record.period,
                    if record.invested { "yes" } else { "cash" },
                    record.holdings.join(", ")
                ));
            }
            html.push_str("</table>");
        }

        html.push_str("</body></html>");

        let path = Path::new(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(RotatorError::Io)?;
        }
        fs::write(path, html).map_err(RotatorError::Io)?;

        Ok(())
    }
}
