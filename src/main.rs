// src/main.rs
use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use job_ingest::cli::{handle_command, Cli};
use job_ingest::core::FsOps;
use std::fs::OpenOptions;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // One JSON log file per process, plus human-readable output on stderr
    FsOps::ensure_dir_exists_sync(&cli.log_dir)?;
    let log_path = FsOps::timestamped_log_path(&cli.log_dir, Local::now().naive_local());
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(true)
                .with_span_list(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Logging to {}", log_path.display());

    handle_command(cli).await
}
