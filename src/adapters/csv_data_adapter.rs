//! CSV file data adapter.
//!
//! Reads daily prices from `{SYMBOL}.csv` files with a `date,open,close`
//! header, dates formatted YYYY-MM-DD.

use crate::domain::error::RotatorError;
use crate::domain::price::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvDataAdapter {
    base_path: PathBuf,
}

impl CsvDataAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn read_bars(&self, symbol: &str) -> Result<Vec<PriceBar>, RotatorError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| RotatorError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| RotatorError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| RotatorError::Data {
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                RotatorError::Data {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            let open: f64 = record
                .get(1)
                .ok_or_else(|| RotatorError::Data {
                    reason: "missing open column".into(),
                })?
                .parse()
                .map_err(|e| RotatorError::Data {
                    reason: format!("invalid open value: {}", e),
                })?;

            let close: f64 = record
                .get(2)
                .ok_or_else(|| RotatorError::Data {
                    reason: "missing close column".into(),
                })?
                .parse()
                .map_err(|e| RotatorError::Data {
                    reason: format!("invalid close value: {}", e),
                })?;

            bars.push(PriceBar {
                symbol: symbol.to_string(),
                date,
                open,
                close,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl DataPort for CsvDataAdapter {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, RotatorError> {
        let mut bars = self.read_bars(symbol)?;
        bars.retain(|b| b.date >= start_date && b.date <= end_date);
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, RotatorError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| RotatorError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| RotatorError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, RotatorError> {
        if !self.csv_path(symbol).exists() {
            return Ok(None);
        }
        let bars = self.read_bars(symbol)?;
        Ok(bars
            .first()
            .zip(bars.last())
            .map(|(first, last)| (first.date, last.date, bars.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,close\n\
            2024-01-15,100.0,105.0\n\
            2024-01-16,105.0,110.0\n\
            2024-01-17,110.0,115.0\n";

        fs::write(path.join("SPY.csv"), csv_content).unwrap();
        fs::write(path.join("QQQ.csv"), "date,open,close\n").unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_prices_returns_correct_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);

        let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 17).unwrap();
        let bars = adapter.fetch_prices("SPY", start, end).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].symbol, "SPY");
    }

    #[test]
    fn fetch_prices_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);

        let start = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        let bars = adapter.fetch_prices("SPY", start, end).unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
    }

    #[test]
    fn fetch_prices_errors_for_missing_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);

        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert!(adapter.fetch_prices("XYZ", start, end).is_err());
    }

    #[test]
    fn list_symbols_returns_sorted_symbols() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);

        let symbols = adapter.list_symbols().unwrap();
        assert_eq!(symbols, vec!["QQQ", "SPY"]);
    }

    #[test]
    fn data_range_reports_span() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);

        let range = adapter.data_range("SPY").unwrap().unwrap();
        assert_eq!(range.0, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(range.1, NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
        assert_eq!(range.2, 3);
    }

    #[test]
    fn data_range_none_for_missing_symbol() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);
        assert!(adapter.data_range("XYZ").unwrap().is_none());
    }

    #[test]
    fn data_range_none_for_empty_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);
        assert!(adapter.data_range("QQQ").unwrap().is_none());
    }
}
