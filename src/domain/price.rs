//! Daily price bars, date-indexed series, and period-end resampling.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
}

/// Rebalance cadence. Periods end on the last quoted day of each calendar
/// month or ISO week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rebalance {
    Monthly,
    Weekly,
}

impl Rebalance {
    pub fn periods_per_year(&self) -> f64 {
        match self {
            Rebalance::Monthly => 12.0,
            Rebalance::Weekly => 52.0,
        }
    }

    fn period_key(&self, date: NaiveDate) -> (i32, u32) {
        match self {
            Rebalance::Monthly => (date.year(), date.month()),
            Rebalance::Weekly => {
                let week = date.iso_week();
                (week.year(), week.week())
            }
        }
    }
}

impl std::str::FromStr for Rebalance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" => Ok(Rebalance::Monthly),
            "weekly" => Ok(Rebalance::Weekly),
            other => Err(format!("unknown rebalance cadence: {other}")),
        }
    }
}

/// An ordered daily price history for one symbol.
///
/// Bars are strictly increasing by date. Lookups follow forward-fill
/// semantics: a close is quotable on any date at or after the bar that set it.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series from bars. Bars are sorted by date and exact-date
    /// duplicates collapse to the last occurrence.
    pub fn new(symbol: String, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by(|next, prev| {
            if next.date == prev.date {
                *prev = next.clone();
                true
            } else {
                false
            }
        });
        Self { symbol, bars }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Index of the last bar dated on or before `date`.
    pub fn index_on_or_before(&self, date: NaiveDate) -> Option<usize> {
        match self.bars.binary_search_by_key(&date, |b| b.date) {
            Ok(i) => Some(i),
            Err(0) => None,
            Err(i) => Some(i - 1),
        }
    }

    /// Index of the first bar dated on or after `date`.
    pub fn index_on_or_after(&self, date: NaiveDate) -> Option<usize> {
        match self.bars.binary_search_by_key(&date, |b| b.date) {
            Ok(i) => Some(i),
            Err(i) if i < self.bars.len() => Some(i),
            Err(_) => None,
        }
    }

    /// Last close quoted on or before `date` (forward-fill).
    pub fn close_on_or_before(&self, date: NaiveDate) -> Option<f64> {
        self.index_on_or_before(date).map(|i| self.bars[i].close)
    }

    /// First open quoted on or after `date`, with its actual trading date.
    pub fn open_on_or_after(&self, date: NaiveDate) -> Option<(NaiveDate, f64)> {
        self.index_on_or_after(date)
            .map(|i| (self.bars[i].date, self.bars[i].open))
    }

    /// Period-end closes aligned with `ends`. `None` before the symbol's
    /// first quote; forward-filled afterwards.
    pub fn resample_closes(&self, ends: &[NaiveDate]) -> Vec<Option<f64>> {
        ends.iter().map(|&e| self.close_on_or_before(e)).collect()
    }
}

/// Merge the trading calendars of several series and reduce to period-end
/// dates: the last quoted day inside each calendar period.
pub fn period_ends(series: &[&PriceSeries], cadence: Rebalance) -> Vec<NaiveDate> {
    let dates: BTreeSet<NaiveDate> = series
        .iter()
        .flat_map(|s| s.bars.iter().map(|b| b.date))
        .collect();

    let mut ends = Vec::new();
    let mut current: Option<(i32, u32)> = None;

    for date in dates {
        let key = cadence.period_key(date);
        match (current, ends.last_mut()) {
            (Some(prev_key), Some(last)) if prev_key == key => {
                *last = date;
            }
            _ => {
                ends.push(date);
                current = Some(key);
            }
        }
    }

    ends
}
