//! The normalized daily price record.

use chrono::NaiveDate;
use serde::Serialize;

/// One trading day for one symbol.
///
/// OHLC values are passed through from the source unchecked; `low <= high`
/// is not enforced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub symbol: String,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: u64,
}
