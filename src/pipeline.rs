// src/pipeline.rs
//! One ingestion run: scrape search pages, filter cheaply, drop postings
//! already stored, fetch details for the recent ones, filter on the
//! description and persist both outcomes.
//!
//! Every request is awaited in turn; nothing is fetched concurrently.

use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::core::{HttpSettings, IngestConfig, JobStore, SqliteJobStore};
use crate::export;
use crate::filtering::{dedupe, detect_language, find_new, RelevanceFilter};
use crate::scraping::{search::search_urls, CardParser, DetailParser, HttpFetcher, PageFetcher};
use crate::types::{FilteredJobRecord, JobPosting, MISSING_DESCRIPTION};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunOutcome {
    #[default]
    Completed,
    /// No card was scraped from any search page
    EmptyScrape,
    /// Every surviving card is already stored
    NoNewPostings,
}

/// Counters for one run, logged when the run finishes
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub pages_failed: usize,
    pub scraped: usize,
    pub deduped: usize,
    pub filtered: usize,
    pub novel: usize,
    pub stale: usize,
    pub undated: usize,
    pub detail_fetched: usize,
    pub detail_failed: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub persisted: usize,
    pub persisted_filtered: usize,
    pub outcome: RunOutcome,
    pub elapsed: Duration,
}

pub struct IngestionPipeline<F, S> {
    config: IngestConfig,
    fetcher: F,
    store: S,
    filter: RelevanceFilter,
    cards: CardParser,
    details: DetailParser,
}

impl IngestionPipeline<HttpFetcher, SqliteJobStore> {
    /// Pipeline over the live site and the configured SQLite database
    pub async fn from_config(config: IngestConfig) -> Result<Self> {
        let settings: HttpSettings = config.http_settings();
        let fetcher = HttpFetcher::new(&settings)?;
        let store = SqliteJobStore::from_config(&config).await?;
        Self::new(config, fetcher, store)
    }
}

impl<F: PageFetcher, S: JobStore> IngestionPipeline<F, S> {
    pub fn new(config: IngestConfig, fetcher: F, store: S) -> Result<Self> {
        Ok(Self {
            filter: RelevanceFilter::from_config(&config),
            cards: CardParser::new(&config.job_url_template)?,
            details: DetailParser::new()?,
            config,
            fetcher,
            store,
        })
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub async fn run(&self) -> Result<RunSummary> {
        self.run_at(Local::now().naive_local()).await
    }

    /// Run with `now` as the run's reference time. The recency cutoff is
    /// derived from it once, however long the run takes.
    pub async fn run_at(&self, now: NaiveDateTime) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        let span = info_span!("ingest_run", %run_id);
        self.execute(now).instrument(span).await
    }

    async fn execute(&self, now: NaiveDateTime) -> Result<RunSummary> {
        let started = Instant::now();
        let mut summary = RunSummary::default();
        info!("Starting ingestion run at {}", now);

        // ===== Scraping =====
        let scraped = self.scrape_cards(&mut summary).await;
        summary.scraped = scraped.len();
        info!("Total job cards scraped: {}", summary.scraped);

        if scraped.is_empty() {
            warn!("No job cards scraped, nothing to process");
            summary.outcome = RunOutcome::EmptyScrape;
            return Ok(Self::finish(summary, started));
        }

        // ===== Card Filtering =====
        let deduped = dedupe(scraped);
        summary.deduped = deduped.len();
        info!("Total job cards after removing duplicates: {}", summary.deduped);

        let candidates = self.filter.apply_cheap_filters(deduped);
        summary.filtered = candidates.len();
        info!("Total job cards after filtering: {}", summary.filtered);

        // ===== Novelty Check =====
        self.store.ensure_schema().await?;
        let accepted = self.store.load_accepted().await?;
        let filtered = self.store.load_filtered().await?;
        let novel = find_new(candidates, &accepted, &filtered);
        summary.novel = novel.len();
        info!("Total new jobs found after comparing to the database: {}", summary.novel);

        if novel.is_empty() {
            info!("No new jobs found");
            summary.outcome = RunOutcome::NoNewPostings;
            return Ok(Self::finish(summary, started));
        }

        // ===== Detail Fetch =====
        let fetched = self.fetch_details(novel, now, &mut summary).await;
        summary.detail_fetched = fetched.len();

        // ===== Final Filtering =====
        let (mut accepted_jobs, rejected_jobs) = self.filter.apply_expensive_filters(fetched);
        summary.accepted = accepted_jobs.len();
        summary.rejected = rejected_jobs.len();
        info!(
            "Total jobs to add: {}, filtered out: {}",
            summary.accepted, summary.rejected
        );

        // ===== Persisting =====
        let loaded_at = Utc::now();
        for job in accepted_jobs.iter_mut() {
            job.date_loaded = Some(loaded_at);
        }
        let rejected_records: Vec<FilteredJobRecord> = rejected_jobs
            .iter()
            .map(|job| FilteredJobRecord {
                date_loaded: Some(loaded_at),
                ..job.to_filtered_record()
            })
            .collect();

        summary.persisted = self.store.append_accepted(&accepted_jobs).await?;
        summary.persisted_filtered = self.store.append_filtered(&rejected_records).await?;
        info!(
            "Added {} new records to the jobs table and {} to the filtered table",
            summary.persisted, summary.persisted_filtered
        );

        if let Some(csv) = &self.config.csv_export {
            if let Err(e) = export::export_run(csv, &accepted_jobs, &rejected_records) {
                error!("CSV export failed: {:#}", e);
            }
        }

        Ok(Self::finish(summary, started))
    }

    async fn scrape_cards(&self, summary: &mut RunSummary) -> Vec<JobPosting> {
        let mut jobs = Vec::new();

        for url in search_urls(&self.config) {
            match self.fetcher.fetch(&url).await {
                Ok(page) => {
                    let found = self.cards.parse_search_results_page(&page.document());
                    info!("Finished scraping page {} ({} cards)", url, found.len());
                    jobs.extend(found);
                }
                Err(e) => {
                    warn!("Skipping search page: {}", e);
                    summary.pages_failed += 1;
                }
            }
        }

        jobs
    }

    /// Fetch descriptions for postings inside the recency window. Postings
    /// outside it, or without a readable date, are dropped unfetched.
    async fn fetch_details(
        &self,
        novel: Vec<JobPosting>,
        now: NaiveDateTime,
        summary: &mut RunSummary,
    ) -> Vec<JobPosting> {
        let cutoff = recency_cutoff(now, self.config.days_to_scrape);
        let mut fetched = Vec::new();

        for mut job in novel {
            match job.posted_date {
                None => {
                    debug!("Skipping {} at {}: no posted date", job.title, job.company);
                    summary.undated += 1;
                    continue;
                }
                Some(posted) if posted < cutoff => {
                    debug!(
                        "Skipping {} at {}: posted {} before {}",
                        job.title, job.company, posted, cutoff
                    );
                    summary.stale += 1;
                    continue;
                }
                Some(_) => {}
            }

            info!("Found new job: {} at {} {}", job.title, job.company, job.job_url);
            job.description = Some(match self.fetcher.fetch(&job.job_url).await {
                Ok(page) => self.details.parse_detail_page(&page.document()),
                Err(e) => {
                    warn!("Could not fetch job description: {}", e);
                    summary.detail_failed += 1;
                    MISSING_DESCRIPTION.to_string()
                }
            });

            if let Some(description) = job.usable_description() {
                let language = detect_language(description);
                if !self.config.languages.is_empty() && !self.config.languages.contains(&language)
                {
                    info!("Job description language not supported: {}", language);
                }
                job.language = Some(language);
            }

            fetched.push(job);
        }

        fetched
    }

    fn finish(mut summary: RunSummary, started: Instant) -> RunSummary {
        summary.elapsed = started.elapsed();
        info!(
            outcome = ?summary.outcome,
            pages_failed = summary.pages_failed,
            scraped = summary.scraped,
            deduped = summary.deduped,
            filtered = summary.filtered,
            novel = summary.novel,
            stale = summary.stale,
            undated = summary.undated,
            detail_fetched = summary.detail_fetched,
            detail_failed = summary.detail_failed,
            accepted = summary.accepted,
            rejected = summary.rejected,
            persisted = summary.persisted,
            persisted_filtered = summary.persisted_filtered,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Ingestion run finished"
        );
        summary
    }
}

/// Oldest retained posted date. A window reaching past the calendar's
/// range keeps every dated posting.
fn recency_cutoff(now: NaiveDateTime, days_to_scrape: i64) -> NaiveDate {
    TimeDelta::try_days(days_to_scrape)
        .and_then(|window| now.date().checked_sub_signed(window))
        .unwrap_or(NaiveDate::MIN)
}
