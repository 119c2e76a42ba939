//! Configuration validation.
//!
//! Validates all config fields before a backtest runs, so a typo in the INI
//! surfaces as one clear error instead of a half-finished simulation.

use crate::domain::error::RotatorError;
use crate::domain::price::Rebalance;
use crate::domain::universe::parse_symbols;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), RotatorError> {
    validate_csv_dir(config)?;
    validate_dates(config)?;
    validate_benchmark(config)?;
    validate_fee(config)?;
    validate_risk_free_rate(config)?;
    validate_rebalance(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), RotatorError> {
    validate_symbols(config)?;
    match config.get_string("strategy", "mode").as_deref() {
        Some("momentum") | None => validate_momentum(config),
        Some("rsi") => validate_rsi(config),
        Some(other) => Err(RotatorError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "mode".to_string(),
            reason: format!("unknown mode '{}', expected momentum or rsi", other),
        }),
    }
}

fn validate_csv_dir(config: &dyn ConfigPort) -> Result<(), RotatorError> {
    match config.get_string("data", "csv_dir") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(RotatorError::ConfigMissing {
            section: "data".to_string(),
            key: "csv_dir".to_string(),
        }),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), RotatorError> {
    let start_str = config.get_string("backtest", "start_date");
    let end_str = config.get_string("backtest", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date >= end_date {
        return Err(RotatorError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must be before end_date".to_string(),
        });
    }
    Ok(())
}

fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, RotatorError> {
    match value {
        None => Err(RotatorError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| RotatorError::ConfigInvalid {
                section: "backtest".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            })
        }
    }
}

fn validate_benchmark(config: &dyn ConfigPort) -> Result<(), RotatorError> {
    match config.get_string("backtest", "benchmark") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(RotatorError::ConfigMissing {
            section: "backtest".to_string(),
            key: "benchmark".to_string(),
        }),
    }
}

fn validate_fee(config: &dyn ConfigPort) -> Result<(), RotatorError> {
    let value = config.get_double("backtest", "fee_pct", 0.0);
    if !(0.0..100.0).contains(&value) {
        return Err(RotatorError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "fee_pct".to_string(),
            reason: "fee_pct must be between 0 and 100".to_string(),
        });
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), RotatorError> {
    let value = config.get_double("backtest", "risk_free_rate", 0.0);
    if value < 0.0 || value >= 1.0 {
        return Err(RotatorError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "risk_free_rate".to_string(),
            reason: "risk_free_rate must be between 0 and 1".to_string(),
        });
    }
    Ok(())
}

fn validate_rebalance(config: &dyn ConfigPort) -> Result<(), RotatorError> {
    match config.get_string("backtest", "rebalance") {
        None => Ok(()),
        Some(s) => match s.parse::<Rebalance>() {
            Ok(_) => Ok(()),
            Err(_) => Err(RotatorError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "rebalance".to_string(),
                reason: format!("unknown rebalance '{}', expected monthly or weekly", s),
            }),
        },
    }
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), RotatorError> {
    match config.get_string("strategy", "symbols") {
        Some(s) if !s.trim().is_empty() => {
            parse_symbols(&s).map_err(|e| RotatorError::ConfigInvalid {
                section: "strategy".to_string(),
                key: "symbols".to_string(),
                reason: e.to_string(),
            })?;
            Ok(())
        }
        _ => Err(RotatorError::ConfigMissing {
            section: "strategy".to_string(),
            key: "symbols".to_string(),
        }),
    }
}

fn validate_momentum(config: &dyn ConfigPort) -> Result<(), RotatorError> {
    let top_n = config.get_int("strategy", "top_n", 5);
    if top_n < 1 {
        return Err(RotatorError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "top_n".to_string(),
            reason: "top_n must be at least 1".to_string(),
        });
    }

    let lookback = config.get_int("strategy", "lookback", 6);
    if lookback < 1 {
        return Err(RotatorError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "lookback".to_string(),
            reason: "lookback must be at least 1".to_string(),
        });
    }

    let holding_period = config.get_int("strategy", "holding_period", 1);
    if holding_period < 1 {
        return Err(RotatorError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "holding_period".to_string(),
            reason: "holding_period must be at least 1".to_string(),
        });
    }

    if config.get_bool("strategy", "use_trend_filter", false) {
        let sma_period = config.get_int("strategy", "sma_period", 200);
        if sma_period < 2 {
            return Err(RotatorError::ConfigInvalid {
                section: "strategy".to_string(),
                key: "sma_period".to_string(),
                reason: "sma_period must be at least 2".to_string(),
            });
        }
    }

    Ok(())
}

fn validate_rsi(config: &dyn ConfigPort) -> Result<(), RotatorError> {
    let rsi_period = config.get_int("strategy", "rsi_period", 10);
    if rsi_period < 2 {
        return Err(RotatorError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "rsi_period".to_string(),
            reason: "rsi_period must be at least 2".to_string(),
        });
    }

    let buy_trend = config.get_double("strategy", "rsi_buy_trend", 50.0);
    if !(0.0..=100.0).contains(&buy_trend) {
        return Err(RotatorError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "rsi_buy_trend".to_string(),
            reason: "rsi_buy_trend must be between 0 and 100".to_string(),
        });
    }

    let buy_panic = config.get_double("strategy", "rsi_buy_panic", 32.0);
    if !(0.0..=100.0).contains(&buy_panic) {
        return Err(RotatorError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "rsi_buy_panic".to_string(),
            reason: "rsi_buy_panic must be between 0 and 100".to_string(),
        });
    }

    if buy_panic >= buy_trend {
        return Err(RotatorError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "rsi_buy_panic".to_string(),
            reason: "rsi_buy_panic must be below rsi_buy_trend".to_string(),
        });
    }

    Ok(())
}
