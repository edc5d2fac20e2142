//! Converts a raw `Time Series (Daily)` object into [`PriceRecord`]s.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::record::PriceRecord;
use crate::window::{parse_date, DateWindow};

pub const OPEN_FIELD: &str = "1. open";
pub const HIGH_FIELD: &str = "2. high";
pub const LOW_FIELD: &str = "3. low";
pub const CLOSE_FIELD: &str = "4. close";
pub const VOLUME_FIELD: &str = "5. volume";

#[derive(Error, Debug, PartialEq)]
pub enum NormalizeError {
    #[error("invalid date key '{0}'")]
    InvalidDate(String),
    #[error("entry {date} is not an object")]
    NotAnObject { date: String },
    #[error("entry {date} is missing field '{field}'")]
    MissingField { date: String, field: &'static str },
    #[error("entry {date} has invalid '{field}' value '{value}'")]
    InvalidNumber {
        date: String,
        field: &'static str,
        value: String,
    },
}

/// Parses every entry of `series` and keeps those dated inside `window`.
///
/// Every date key must parse, even outside the window. Numeric fields are only
/// coerced for kept entries. Output follows the series' iteration order.
pub fn parse_daily_series(
    series: &Map<String, Value>,
    symbol: &str,
    window: &DateWindow,
) -> Result<Vec<PriceRecord>, NormalizeError> {
    let mut rows = Vec::new();

    for (date_str, values) in series {
        let date =
            parse_date(date_str).map_err(|_| NormalizeError::InvalidDate(date_str.clone()))?;
        if !window.contains(date) {
            continue;
        }

        let entry = values
            .as_object()
            .ok_or_else(|| NormalizeError::NotAnObject {
                date: date_str.clone(),
            })?;

        rows.push(PriceRecord {
            date,
            symbol: symbol.to_string(),
            open: parse_price(entry, date_str, OPEN_FIELD)?,
            close: parse_price(entry, date_str, CLOSE_FIELD)?,
            high: parse_price(entry, date_str, HIGH_FIELD)?,
            low: parse_price(entry, date_str, LOW_FIELD)?,
            volume: parse_volume(entry, date_str)?,
        });
    }

    Ok(rows)
}

fn field<'a>(
    entry: &'a Map<String, Value>,
    date: &str,
    name: &'static str,
) -> Result<&'a Value, NormalizeError> {
    entry.get(name).ok_or_else(|| NormalizeError::MissingField {
        date: date.to_string(),
        field: name,
    })
}

fn invalid(date: &str, field: &'static str, value: &Value) -> NormalizeError {
    NormalizeError::InvalidNumber {
        date: date.to_string(),
        field,
        value: match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

fn parse_price(
    entry: &Map<String, Value>,
    date: &str,
    name: &'static str,
) -> Result<f64, NormalizeError> {
    let value = field(entry, date, name)?;
    let parsed = match value {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(date, name, value))
}

fn parse_volume(entry: &Map<String, Value>, date: &str) -> Result<u64, NormalizeError> {
    let value = field(entry, date, VOLUME_FIELD)?;
    let parsed = match value {
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    };
    parsed.ok_or_else(|| invalid(date, VOLUME_FIELD, value))
}
