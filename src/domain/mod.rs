//! Core domain types and logic.

pub mod price;
pub mod indicator;
pub mod signal;
pub mod trend;
pub mod rotation;
pub mod backtest;
pub mod metrics;
pub mod strategy;
pub mod universe;
pub mod config_validation;
pub mod error;
