// src/scheduler.rs
//! Cron-triggered ingestion runs.
//!
//! Runs never overlap: a trigger that fires while a run is active is
//! skipped. Ctrl-C stops the scheduler.

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::core::config_manager::string_or_number;
use crate::core::{IngestConfig, JobStore};
use crate::pipeline::{IngestionPipeline, RunSummary};
use crate::scraping::PageFetcher;

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub schedules: Vec<CronEntry>,
}

/// One weekly trigger in local time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronEntry {
    #[serde(default = "every_day", deserialize_with = "string_or_number")]
    pub day_of_week: String,
    #[serde(default = "zero", deserialize_with = "string_or_number")]
    pub hour: String,
    #[serde(default = "zero", deserialize_with = "string_or_number")]
    pub minute: String,
}

fn every_day() -> String {
    "*".to_string()
}

fn zero() -> String {
    "0".to_string()
}

impl CronEntry {
    /// Six-field cron expression (seconds first)
    pub fn expression(&self) -> String {
        format!(
            "0 {} {} * * {}",
            self.minute.trim(),
            self.hour.trim(),
            day_of_week_field(&self.day_of_week)
        )
    }
}

/// Numeric days count from Monday = 0; names and `*` pass through
fn day_of_week_field(raw: &str) -> String {
    raw.trim()
        .split(',')
        .map(|part| {
            part.split('-')
                .map(|token| match token.trim().parse::<usize>() {
                    Ok(day) if day < DAY_NAMES.len() => DAY_NAMES[day].to_string(),
                    _ => token.trim().to_string(),
                })
                .collect::<Vec<_>>()
                .join("-")
        })
        .collect::<Vec<_>>()
        .join(",")
}

impl ScheduleConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schedule file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid schedule file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let schedule: ScheduleConfig =
            serde_yaml::from_str(content).context("Failed to parse schedule")?;

        if schedule.kind != "cron" {
            anyhow::bail!("Unsupported schedule type: {}", schedule.kind);
        }
        if schedule.schedules.is_empty() {
            anyhow::bail!("Schedule has no entries");
        }
        Ok(schedule)
    }
}

/// Run once unless another run holds `gate`
pub async fn run_single_flight<F: PageFetcher, S: JobStore>(
    pipeline: &IngestionPipeline<F, S>,
    gate: &Mutex<()>,
) -> Option<RunSummary> {
    let Ok(_guard) = gate.try_lock() else {
        warn!("Previous ingestion run still active, skipping this trigger");
        return None;
    };

    info!("Starting scheduled ingestion run");
    match pipeline.run().await {
        Ok(summary) => {
            info!("Scheduled task completed");
            Some(summary)
        }
        Err(e) => {
            error!("Scheduled ingestion run failed: {:#}", e);
            None
        }
    }
}

pub async fn run_schedule(config: IngestConfig, schedule: ScheduleConfig) -> Result<()> {
    let pipeline = Arc::new(IngestionPipeline::from_config(config).await?);
    let gate = Arc::new(Mutex::new(()));

    let mut scheduler = JobScheduler::new()
        .await
        .context("Failed to create scheduler")?;

    for entry in &schedule.schedules {
        let expression = entry.expression();
        info!(
            "Scheduling task on {} at {}:{} ({})",
            entry.day_of_week, entry.hour, entry.minute, expression
        );

        let pipeline = Arc::clone(&pipeline);
        let gate = Arc::clone(&gate);
        let job = Job::new_async_tz(expression.as_str(), Local, move |_uuid, _scheduler| {
            let pipeline = Arc::clone(&pipeline);
            let gate = Arc::clone(&gate);
            Box::pin(async move {
                run_single_flight(&*pipeline, &*gate).await;
            })
        })
        .with_context(|| format!("Invalid cron expression: {}", expression))?;

        scheduler
            .add(job)
            .await
            .context("Failed to add scheduled job")?;
    }

    scheduler
        .start()
        .await
        .context("Failed to start scheduler")?;
    info!("Scheduler started...");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    info!("Shutting down scheduler");
    scheduler
        .shutdown()
        .await
        .context("Failed to stop scheduler")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Database, SqliteJobStore};
    use crate::errors::FetchError;
    use crate::pipeline::RunOutcome;
    use crate::scraping::FetchedPage;
    use async_trait::async_trait;

    struct OfflineFetcher;

    #[async_trait]
    impl PageFetcher for OfflineFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
            Err(FetchError::RetriesExhausted {
                url: url.to_string(),
                attempts: 1,
            })
        }
    }

    #[test]
    fn test_parses_json_schedule() {
        let schedule = ScheduleConfig::parse(
            r#"{"type": "cron", "schedules": [
                {"day_of_week": "mon-fri", "hour": 9, "minute": 30},
                {"day_of_week": "sat", "hour": "18"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(schedule.schedules.len(), 2);
        assert_eq!(schedule.schedules[0].expression(), "0 30 9 * * mon-fri");
        assert_eq!(schedule.schedules[1].expression(), "0 0 18 * * sat");
    }

    #[test]
    fn test_missing_fields_default_to_daily_midnight() {
        let schedule = ScheduleConfig::parse("type: cron\nschedules:\n  - {}\n").unwrap();
        assert_eq!(schedule.schedules[0].expression(), "0 0 0 * * *");
    }

    #[test]
    fn test_numeric_days_start_on_monday() {
        assert_eq!(day_of_week_field("0"), "Mon");
        assert_eq!(day_of_week_field("0-4"), "Mon-Fri");
        assert_eq!(day_of_week_field("5,6"), "Sat,Sun");
        assert_eq!(day_of_week_field("*"), "*");
    }

    #[test]
    fn test_rejects_unknown_type_and_empty_schedule() {
        assert!(ScheduleConfig::parse("type: interval\nschedules:\n  - {hour: 1}\n").is_err());
        assert!(ScheduleConfig::parse("type: cron\nschedules: []\n").is_err());
    }

    #[tokio::test]
    async fn test_overlapping_trigger_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::connect(&dir.path().join("jobs.db")).await.unwrap();
        let store = SqliteJobStore::new(&database, "jobs", "filtered_jobs");
        let pipeline =
            IngestionPipeline::new(IngestConfig::default(), OfflineFetcher, store).unwrap();
        let gate = Mutex::new(());

        let held = gate.lock().await;
        assert!(run_single_flight(&pipeline, &gate).await.is_none());
        drop(held);

        let summary = run_single_flight(&pipeline, &gate).await.unwrap();
        assert_eq!(summary.outcome, RunOutcome::EmptyScrape);
    }
}
