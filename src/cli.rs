// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::core::{ConfigManager, IngestConfig, JobStore, SqliteJobStore};
use crate::pipeline::IngestionPipeline;
use crate::scheduler::{run_schedule, ScheduleConfig};
use crate::scraping::http_fetcher::build_proxies;

const IP_ECHO_URL: &str = "https://api.ipify.org?format=json";

#[derive(Parser)]
#[command(name = "jobscout")]
#[command(about = "Scrape LinkedIn job postings into a deduplicated SQLite store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (YAML, JSON or TOML); falls back to $JOBSCOUT_CONFIG, then config.yaml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for the per-run JSON log files
    #[arg(long, global = true, default_value = "logs")]
    pub log_dir: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one ingestion pass
    Run,
    /// Run ingestion passes on a cron schedule until Ctrl-C
    Schedule {
        #[arg(long)]
        file: PathBuf,
    },
    /// Create the database tables
    Init,
    /// Show table sizes and workflow flag counts
    Stats,
    /// Compare the public IP with and without the configured proxies
    CheckProxy,
}

pub async fn handle_command(cli: Cli) -> Result<()> {
    let config_path = ConfigManager::resolve_path(cli.config);
    let manager = ConfigManager::load(&config_path)?;
    manager.ensure_directories().await?;
    let config = manager.ingest;

    match cli.command {
        Command::Run => {
            let pipeline = IngestionPipeline::from_config(config).await?;
            let summary = pipeline.run().await?;
            info!(
                "✅ Run finished in {:.2}s: {} new postings stored, {} filtered out",
                summary.elapsed.as_secs_f64(),
                summary.persisted,
                summary.persisted_filtered
            );
        }

        Command::Schedule { file } => {
            info!("Using schedule file: {}", file.display());
            let schedule = ScheduleConfig::load(&file)?;
            run_schedule(config, schedule).await?;
        }

        Command::Init => {
            let store = SqliteJobStore::from_config(&config).await?;
            store.ensure_schema().await?;
            info!("✅ Database initialized: {}", config.db_path.display());
        }

        Command::Stats => {
            let store = SqliteJobStore::from_config(&config).await?;
            let stats = store.stats().await?;
            info!("📊 Database: {}", config.db_path.display());
            info!("   {}: {} postings", config.jobs_tablename, stats.accepted);
            info!(
                "   {}: {} postings",
                config.filtered_jobs_tablename, stats.filtered
            );
            info!(
                "   applied: {}, interview: {}, rejected: {}, hidden: {}",
                stats.applied, stats.interview, stats.rejected, stats.hidden
            );
        }

        Command::CheckProxy => check_proxy(&config).await?,
    }

    Ok(())
}

async fn check_proxy(config: &IngestConfig) -> Result<()> {
    let timeout = Duration::from_secs(config.timeout_secs.max(1));

    let direct = Client::builder()
        .timeout(timeout)
        .no_proxy()
        .build()
        .context("Failed to create HTTP client")?;
    match public_ip(&direct).await {
        Ok(ip) => info!("Direct IP: {}", ip),
        Err(e) => error!("Direct request failed: {:#}", e),
    }

    if config.proxies.is_empty() {
        warn!("No proxies configured");
        return Ok(());
    }

    let mut builder = Client::builder().timeout(timeout).no_proxy();
    for proxy in build_proxies(&config.proxies)? {
        builder = builder.proxy(proxy);
    }
    let proxied = builder.build().context("Failed to create proxied HTTP client")?;

    match public_ip(&proxied).await {
        Ok(ip) => info!("✅ Proxied IP: {}", ip),
        Err(e) => error!("❌ Proxied request failed: {:#}", e),
    }
    Ok(())
}

async fn public_ip(client: &Client) -> Result<String> {
    let body: serde_json::Value = client
        .get(IP_ECHO_URL)
        .send()
        .await
        .context("Failed to reach IP echo service")?
        .error_for_status()?
        .json()
        .await
        .context("Failed to parse IP echo response")?;

    body.get("ip")
        .and_then(|ip| ip.as_str())
        .map(str::to_string)
        .context("IP echo response has no ip field")
}
