//! Inclusive calendar-date windows used both to scope a run and to filter rows.

use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use thiserror::Error;

/// Date format used by the API and the configuration file.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug, PartialEq)]
pub enum WindowError {
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("window start {start} is after end {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },
}

/// A `[start, end]` range of calendar dates, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, WindowError> {
        if start > end {
            return Err(WindowError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Builds a window from two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, WindowError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// The incremental window: the day before yesterday through yesterday.
    pub fn trailing_days(today: NaiveDate) -> Self {
        Self {
            start: today - Duration::days(2),
            end: today - Duration::days(1),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, WindowError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| WindowError::InvalidDate(value.to_string()))
}
