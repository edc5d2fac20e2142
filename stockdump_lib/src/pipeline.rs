//! One batch run: fetch every symbol, build the price table, then load it.

use chrono::NaiveDate;
use serde::Serialize;

use crate::collector::{BatchCollector, SymbolReport};
use crate::config::{AppConfig, ConfigError};
use crate::fetch::PriceSource;
use crate::loader::{BulkLoader, LoadError, LoadOutcome, WriteMode};
use crate::pacing::TrackerSummary;
use crate::table::PriceTable;
use crate::warehouse::Warehouse;
use crate::window::DateWindow;

/// The two batch jobs. They differ only in window and write mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Job {
    /// Yesterday's prices, appended.
    Daily,
    /// The configured date range, replacing the table.
    Historical,
}

impl Job {
    pub fn write_mode(self) -> WriteMode {
        match self {
            Self::Daily => WriteMode::Append,
            Self::Historical => WriteMode::Overwrite,
        }
    }

    pub fn window(self, config: &AppConfig, today: NaiveDate) -> Result<DateWindow, ConfigError> {
        match self {
            Self::Daily => Ok(DateWindow::trailing_days(today)),
            Self::Historical => config.historical_window(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub job: Job,
    pub window: DateWindow,
    pub mode: WriteMode,
    pub rows_collected: usize,
    pub symbols: Vec<SymbolReport>,
    pub requests: TrackerSummary,
    /// `None` when nothing was collected and the load was skipped.
    pub load: Option<LoadOutcome>,
}

/// Owns the collector and the warehouse for a single run.
pub struct Pipeline<S> {
    collector: BatchCollector<S>,
    warehouse: Box<dyn Warehouse>,
}

impl<S: PriceSource> Pipeline<S> {
    pub fn new(collector: BatchCollector<S>, warehouse: Box<dyn Warehouse>) -> Self {
        Self {
            collector,
            warehouse,
        }
    }

    /// Run `job` over `symbols` and close the warehouse, whatever the result.
    pub async fn run(
        self,
        job: Job,
        symbols: &[String],
        window: DateWindow,
    ) -> Result<RunReport, LoadError> {
        let result = self.execute(job, symbols, window).await;
        self.warehouse.close().await;
        result
    }

    async fn execute(
        &self,
        job: Job,
        symbols: &[String],
        window: DateWindow,
    ) -> Result<RunReport, LoadError> {
        let mode = job.write_mode();
        tracing::info!(
            "Starting {:?} run for {} symbols over {}",
            job,
            symbols.len(),
            window
        );

        let collection = self.collector.collect_all(symbols, &window).await;

        let load = if collection.records.is_empty() {
            tracing::warn!("No rows collected, skipping load");
            None
        } else {
            let table = PriceTable::from_records(&collection.records);
            let loader = BulkLoader::new(self.warehouse.as_ref());
            Some(loader.load(&table, mode).await?)
        };

        Ok(RunReport {
            job,
            window,
            mode,
            rows_collected: collection.records.len(),
            symbols: collection.reports,
            requests: collection.summary,
            load,
        })
    }
}
