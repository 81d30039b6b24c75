// src/filtering/dedup.rs
use crate::types::JobPosting;

/// Collapse postings sharing `(title, company)` within one scrape batch.
///
/// The result is sorted by that key. The sort is stable, so among equal keys
/// the posting scraped first is the one kept.
pub fn dedupe(mut postings: Vec<JobPosting>) -> Vec<JobPosting> {
    postings.sort_by(|a, b| {
        (a.title.as_str(), a.company.as_str()).cmp(&(b.title.as_str(), b.company.as_str()))
    });
    postings.dedup_by(|later, kept| later.title == kept.title && later.company == kept.company);
    postings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(title: &str, company: &str, location: &str, url: &str) -> JobPosting {
        JobPosting::from_card(
            title.to_string(),
            company.to_string(),
            location.to_string(),
            None,
            url.to_string(),
        )
    }

    #[test]
    fn test_first_scraped_duplicate_survives() {
        let jobs = vec![
            posting("Rust Engineer", "Acme", "Zurich", "u3"),
            posting("Backend Engineer", "Initech", "Remote", "u1"),
            posting("Rust Engineer", "Acme", "Berlin", "u2"),
        ];

        let deduped = dedupe(jobs);

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].title, "Backend Engineer");
        assert_eq!(deduped[1].job_url, "u3");
        assert_eq!(deduped[1].location, "Zurich");
    }

    #[test]
    fn test_same_title_different_company_kept() {
        let jobs = vec![
            posting("Rust Engineer", "Initech", "", "u1"),
            posting("Rust Engineer", "Acme", "", "u2"),
        ];
        let deduped = dedupe(jobs);
        let companies: Vec<&str> = deduped.iter().map(|j| j.company.as_str()).collect();
        assert_eq!(companies, vec!["Acme", "Initech"]);
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let jobs = vec![
            posting("b", "x", "", "1"),
            posting("a", "y", "", "2"),
            posting("b", "x", "", "3"),
            posting("a", "y", "", "4"),
            posting("a", "x", "", "5"),
        ];
        let once = dedupe(jobs);
        let twice = dedupe(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn test_empty_input() {
        assert!(dedupe(Vec::new()).is_empty());
    }
}
