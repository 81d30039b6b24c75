// src/types/job.rs
//! Posting records shared by the scraper, the filters and the store

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Description stored when the detail page has no description container.
pub const MISSING_DESCRIPTION: &str = "Could not find Job Description";

// ===== Identity =====

/// Fields used to decide whether two records describe the same posting.
pub trait PostingIdentity {
    fn job_url(&self) -> &str;
    fn title(&self) -> &str;
    fn company(&self) -> &str;
    fn posted_date(&self) -> Option<NaiveDate>;
}

// ===== Accepted Postings =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobPosting {
    pub id: Option<i64>,
    pub title: String,
    pub company: String,
    pub location: String,
    pub posted_date: Option<NaiveDate>,
    pub job_url: String,
    /// `None` until the detail page has been fetched.
    pub description: Option<String>,
    pub language: Option<String>,
    pub applied: bool,
    pub hidden: bool,
    pub interview: bool,
    pub rejected: bool,
    pub resume: Option<String>,
    pub cover_letter: Option<String>,
    pub date_loaded: Option<DateTime<Utc>>,
}

impl JobPosting {
    /// Card-level posting as produced from a search results page
    pub fn from_card(
        title: String,
        company: String,
        location: String,
        posted_date: Option<NaiveDate>,
        job_url: String,
    ) -> Self {
        Self {
            id: None,
            title,
            company,
            location,
            posted_date,
            job_url,
            description: None,
            language: None,
            applied: false,
            hidden: false,
            interview: false,
            rejected: false,
            resume: None,
            cover_letter: None,
            date_loaded: None,
        }
    }

    /// Description text usable for keyword and language checks
    pub fn usable_description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .filter(|text| *text != MISSING_DESCRIPTION)
    }

    pub fn to_filtered_record(&self) -> FilteredJobRecord {
        FilteredJobRecord {
            id: None,
            title: self.title.clone(),
            company: self.company.clone(),
            posted_date: self.posted_date,
            job_url: self.job_url.clone(),
            date_loaded: self.date_loaded,
        }
    }
}

impl PostingIdentity for JobPosting {
    fn job_url(&self) -> &str {
        &self.job_url
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn company(&self) -> &str {
        &self.company
    }

    fn posted_date(&self) -> Option<NaiveDate> {
        self.posted_date
    }
}

// ===== Filtered Postings =====

/// Posting rejected by the description filters, kept so it is never
/// evaluated again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FilteredJobRecord {
    pub id: Option<i64>,
    pub title: String,
    pub company: String,
    pub posted_date: Option<NaiveDate>,
    pub job_url: String,
    pub date_loaded: Option<DateTime<Utc>>,
}

impl PostingIdentity for FilteredJobRecord {
    fn job_url(&self) -> &str {
        &self.job_url
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn company(&self) -> &str {
        &self.company
    }

    fn posted_date(&self) -> Option<NaiveDate> {
        self.posted_date
    }
}
