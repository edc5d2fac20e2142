use anyhow::Result;
use clap::Args;
use stockdump_lib::{AppConfig, Job};

use crate::output::{print_report, OutputFormat};

#[derive(Args)]
pub struct DailyArgs {
    /// Use this date as "today" instead of the local date (YYYY-MM-DD)
    #[arg(long)]
    pub today: Option<String>,
}

pub async fn run(args: &DailyArgs, config: &AppConfig, format: &OutputFormat) -> Result<()> {
    let today = match &args.today {
        Some(s) => stockdump_lib::window::parse_date(s)?,
        None => chrono::Local::now().date_naive(),
    };
    let window = Job::Daily.window(config, today)?;

    let report = super::execute(Job::Daily, window, config).await?;
    print_report(&report, format);
    Ok(())
}
