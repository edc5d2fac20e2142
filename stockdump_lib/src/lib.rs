//! Daily equity price dump: Alpha Vantage in, SQL table out.
//!
//! A run collects each configured ticker's daily series with free-tier
//! pacing, keeps the rows inside the run's date window, and bulk-loads them
//! into `historical_stock_data`, either appending (daily job) or replacing
//! the table and rebuilding its indexes (historical job).

pub mod collector;
pub mod config;
pub mod fetch;
pub mod loader;
pub mod normalize;
pub mod pacing;
pub mod pipeline;
pub mod record;
pub mod table;
pub mod warehouse;
pub mod window;

#[cfg(test)]
mod testing;

pub use alphavantage_api;

pub use collector::{BatchCollector, Collection, CollectorOptions, SymbolReport};
pub use config::{AppConfig, Backend, ConfigError, DatabaseTarget};
pub use fetch::{AlphaVantageSource, FetchError, FetchOutcome, PriceSource};
pub use loader::{BulkLoader, LoadError, LoadOutcome, WriteMode};
pub use pipeline::{Job, Pipeline, RunReport};
pub use record::PriceRecord;
pub use table::PriceTable;
pub use warehouse::{Warehouse, WarehouseError, PRICE_TABLE};
pub use window::DateWindow;
