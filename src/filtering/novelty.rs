// src/filtering/novelty.rs
//! Novelty check against the persisted accepted and filtered postings.
//!
//! Two records describe the same posting when their `job_url` is equal, or
//! when title, company and posted date are all equal. The second tier catches
//! an identical posting re-scraped under a regenerated URL.

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::types::{FilteredJobRecord, JobPosting, PostingIdentity};

#[derive(Debug, Default)]
pub struct ExistingRecordIndex {
    urls: HashSet<String>,
    tuples: HashSet<(String, String, Option<NaiveDate>)>,
}

impl ExistingRecordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<'a, R, I>(records: I) -> Self
    where
        R: PostingIdentity + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let mut index = Self::new();
        index.extend(records);
        index
    }

    pub fn extend<'a, R, I>(&mut self, records: I)
    where
        R: PostingIdentity + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        for record in records {
            self.remember(record);
        }
    }

    pub fn remember(&mut self, record: &impl PostingIdentity) {
        self.urls.insert(record.job_url().to_string());
        self.tuples.insert(identity_tuple(record));
    }

    pub fn contains(&self, record: &impl PostingIdentity) -> bool {
        self.urls.contains(record.job_url()) || self.tuples.contains(&identity_tuple(record))
    }
}

fn identity_tuple(record: &impl PostingIdentity) -> (String, String, Option<NaiveDate>) {
    (
        record.title().to_string(),
        record.company().to_string(),
        record.posted_date(),
    )
}

/// Keep only candidates that match no record in either store.
/// An empty store (first run) matches nothing.
pub fn find_new(
    candidates: Vec<JobPosting>,
    accepted: &[JobPosting],
    filtered: &[FilteredJobRecord],
) -> Vec<JobPosting> {
    let mut index = ExistingRecordIndex::from_records(accepted.iter());
    index.extend(filtered.iter());

    candidates
        .into_iter()
        .filter(|candidate| !index.contains(candidate))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(title: &str, company: &str, date: Option<NaiveDate>, url: &str) -> JobPosting {
        JobPosting::from_card(
            title.to_string(),
            company.to_string(),
            String::new(),
            date,
            url.to_string(),
        )
    }

    fn day(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 6, d)
    }

    #[test]
    fn test_empty_stores_match_nothing() {
        let candidates = vec![posting("Rust Engineer", "Acme", day(1), "u1")];
        assert_eq!(find_new(candidates.clone(), &[], &[]), candidates);
    }

    #[test]
    fn test_reused_url_alone_is_not_novel() {
        let stored = vec![posting("Rust Engineer", "Acme", day(1), "u1")];
        let candidates = vec![posting("Chef", "Bistro", day(9), "u1")];
        assert!(find_new(candidates, &stored, &[]).is_empty());
    }

    #[test]
    fn test_same_tuple_under_new_url_is_not_novel() {
        let stored = vec![posting("Rust Engineer", "Acme", day(1), "u1")];
        let candidates = vec![posting("Rust Engineer", "Acme", day(1), "u2")];
        assert!(find_new(candidates, &stored, &[]).is_empty());
    }

    #[test]
    fn test_partial_tuple_match_is_novel() {
        let stored = vec![posting("Rust Engineer", "Acme", day(1), "u1")];
        let candidates = vec![
            posting("Rust Engineer", "Acme", day(2), "u2"),
            posting("Rust Engineer", "Initech", day(1), "u3"),
        ];
        assert_eq!(find_new(candidates, &stored, &[]).len(), 2);
    }

    #[test]
    fn test_filtered_store_also_blocks() {
        let filtered = vec![posting("Rust Engineer", "Acme", day(1), "u1").to_filtered_record()];
        let candidates = vec![
            posting("Rust Engineer", "Acme", day(1), "u1"),
            posting("Go Engineer", "Acme", day(1), "u5"),
        ];
        let novel = find_new(candidates, &[], &filtered);
        assert_eq!(novel.len(), 1);
        assert_eq!(novel[0].job_url, "u5");
    }

    #[test]
    fn test_remember_extends_index() {
        let mut index = ExistingRecordIndex::new();
        let job = posting("Rust Engineer", "Acme", None, "u1");
        assert!(!index.contains(&job));
        index.remember(&job);
        assert!(index.contains(&job));
        assert!(index.contains(&posting("Other", "Other", None, "u1")));
        assert!(index.contains(&posting("Rust Engineer", "Acme", None, "u2")));
    }
}
