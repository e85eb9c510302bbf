use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use hn_archive::{info_time, Config, Result, Scheduler, Scraper, SystemClock};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hn_archive")]
#[command(about = "Archives the Hacker News front page", long_about = None)]
struct Cli {
    /// YAML config file. Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scrape a single time and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hn_archive=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let scraper = Scraper::from_config(&config)?;

    if cli.once {
        let start_time = Utc::now();
        let batch = scraper.scrape().await?;
        info_time!(start_time, "Full program time: {} records", batch.len());
        return Ok(());
    }

    let mut scheduler = Scheduler::new(Arc::new(scraper), Arc::new(SystemClock));
    scheduler.start(
        |result| match result {
            Ok(batch) => info_time!("Cycle done: {} records", batch.len()),
            Err(e) => tracing::error!(error = %e, "cycle failed"),
        },
        config.scrape_interval(),
    );

    tokio::signal::ctrl_c().await?;
    info_time!("Stopping, waiting for the running cycle");
    if let Some(handle) = scheduler.stop() {
        handle.await?;
    }
    Ok(())
}
