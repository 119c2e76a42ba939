//! Data access port trait.

use crate::domain::error::RotatorError;
use crate::domain::price::PriceBar;
use chrono::NaiveDate;

pub trait DataPort {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, RotatorError>;

    fn list_symbols(&self) -> Result<Vec<String>, RotatorError>;

    /// First date, last date, and bar count for a symbol, if any data exists.
    fn data_range(&self, symbol: &str) -> Result<Option<(NaiveDate, NaiveDate, usize)>, RotatorError>;
}
