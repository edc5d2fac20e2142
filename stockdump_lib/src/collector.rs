//! Sequential, paced retrieval over a ticker list.

use std::time::Duration;

use serde::Serialize;

use crate::fetch::{FetchOutcome, PriceSource};
use crate::pacing::{Pacer, TrackerSummary, FREE_TIER_DELAY};
use crate::record::PriceRecord;
use crate::window::DateWindow;

#[derive(Debug, Clone)]
pub struct CollectorOptions {
    /// Minimum spacing between the starts of consecutive fetches.
    pub delay: Duration,
    /// Skip the wait that otherwise follows the last symbol.
    pub skip_final_delay: bool,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            delay: FREE_TIER_DELAY,
            skip_final_delay: false,
        }
    }
}

/// How one symbol fared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolReport {
    pub symbol: String,
    pub rows: usize,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct Collection {
    /// All rows, concatenated in symbol order.
    pub records: Vec<PriceRecord>,
    pub reports: Vec<SymbolReport>,
    pub summary: TrackerSummary,
}

impl Collection {
    pub fn failed_symbols(&self) -> impl Iterator<Item = &str> {
        self.reports
            .iter()
            .filter(|r| r.error.is_some())
            .map(|r| r.symbol.as_str())
    }
}

/// Drives a [`PriceSource`] over a symbol list, one call at a time.
pub struct BatchCollector<S> {
    source: S,
    pacer: Pacer,
    skip_final_delay: bool,
}

impl<S: PriceSource> BatchCollector<S> {
    pub fn new(source: S, options: CollectorOptions) -> Self {
        Self {
            source,
            pacer: Pacer::new(options.delay),
            skip_final_delay: options.skip_final_delay,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch every symbol in order and concatenate the results.
    ///
    /// Per-symbol failures are recorded in the reports and never abort the
    /// batch; if every symbol fails the collection is simply empty.
    pub async fn collect_all(&self, symbols: &[String], window: &DateWindow) -> Collection {
        let tracker = self.pacer.tracker();
        let mut records = Vec::new();
        let mut reports = Vec::with_capacity(symbols.len());

        for symbol in symbols {
            self.pacer.acquire().await;

            match self.source.fetch(symbol, window).await {
                FetchOutcome::Fetched(rows) => {
                    tracker.record_success();
                    reports.push(SymbolReport {
                        symbol: symbol.clone(),
                        rows: rows.len(),
                        error: None,
                    });
                    records.extend(rows);
                }
                FetchOutcome::Failed(e) => {
                    tracker.record_failure();
                    reports.push(SymbolReport {
                        symbol: symbol.clone(),
                        rows: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        if !self.skip_final_delay {
            self.pacer.drain().await;
        }

        let summary = tracker.summary();
        tracing::info!(
            "Collected {} rows for {} symbols ({} failed, {:.0}s rate-limit wait)",
            records.len(),
            symbols.len(),
            summary.requests_failed,
            summary.total_wait_secs
        );

        Collection {
            records,
            reports,
            summary,
        }
    }
}
