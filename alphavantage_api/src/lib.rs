//! Minimal async client for the Alpha Vantage `TIME_SERIES_DAILY` endpoint.

mod client;
mod errors;
pub mod types;
pub use self::client::Client;
pub use self::errors::Error;
pub use self::types::{DailySeriesResponse, MetaData};
