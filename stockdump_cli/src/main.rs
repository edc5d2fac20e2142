mod commands;
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stockdump_lib::config::DEFAULT_CONFIG_PATH;
use stockdump_lib::AppConfig;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "stockdump")]
#[command(about = "Load Alpha Vantage daily prices into historical_stock_data")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    config: PathBuf,

    /// Output format: table or json
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append the last two days of prices
    Daily(commands::daily::DailyArgs),
    /// Replace the table with the configured date range and rebuild indexes
    Historical(commands::historical::HistoricalArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stockdump=info".parse()?),
        )
        .with_target(false)
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Table,
    };

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    match &cli.command {
        Commands::Daily(args) => commands::daily::run(args, &config, &format).await?,
        Commands::Historical(args) => commands::historical::run(args, &config, &format).await?,
    }

    Ok(())
}
