use anyhow::Result;
use clap::Args;
use stockdump_lib::{AppConfig, DateWindow, Job};

use crate::output::{print_report, OutputFormat};

#[derive(Args)]
pub struct HistoricalArgs {
    /// Override date_range.start_date (YYYY-MM-DD)
    #[arg(long, requires = "end")]
    pub start: Option<String>,

    /// Override date_range.end_date (YYYY-MM-DD)
    #[arg(long, requires = "start")]
    pub end: Option<String>,
}

pub async fn run(args: &HistoricalArgs, config: &AppConfig, format: &OutputFormat) -> Result<()> {
    let window = match (&args.start, &args.end) {
        (Some(start), Some(end)) => DateWindow::parse(start, end)?,
        _ => config.historical_window()?,
    };

    let report = super::execute(Job::Historical, window, config).await?;
    print_report(&report, format);
    Ok(())
}
