// src/lib.rs
//! LinkedIn job ingestion: scrape search results, drop duplicates and
//! irrelevant postings, fetch descriptions for new ones and store them in
//! SQLite.

pub mod cli;
pub mod core;
pub mod errors;
pub mod export;
pub mod filtering;
pub mod pipeline;
pub mod scheduler;
pub mod scraping;
pub mod types;
pub mod utils;

pub use crate::core::{ConfigManager, IngestConfig, JobStore, SqliteJobStore};
pub use errors::FetchError;
pub use pipeline::{IngestionPipeline, RunOutcome, RunSummary};
pub use scraping::{HttpFetcher, PageFetcher};
pub use types::{FilteredJobRecord, JobPosting};
