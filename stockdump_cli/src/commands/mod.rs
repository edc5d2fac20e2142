pub mod daily;
pub mod historical;

use anyhow::{Context, Result};
use stockdump_lib::alphavantage_api::Client;
use stockdump_lib::{
    warehouse, AlphaVantageSource, AppConfig, BatchCollector, DateWindow, Job, Pipeline,
    RunReport,
};

/// Wire up client, collector and warehouse from `config` and run `job`.
pub async fn execute(job: Job, window: DateWindow, config: &AppConfig) -> Result<RunReport> {
    let client = Client::with_base_url(&config.fetch.base_url, config.api_key().to_string())
        .context("building Alpha Vantage client")?;
    let collector = BatchCollector::new(AlphaVantageSource::new(client), config.collector_options());
    let warehouse = warehouse::open(&config.database).context("opening warehouse")?;

    eprintln!(
        "Fetching {} symbols for {} (about {}s of pacing)...",
        config.companies.len(),
        window,
        config.companies.len() as u64 * config.fetch.delay_secs
    );

    let report = Pipeline::new(collector, warehouse)
        .run(job, &config.companies, window)
        .await?;
    Ok(report)
}
