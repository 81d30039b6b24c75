// src/scraping/search.rs
//! Search-results URLs for every configured round × query × page

use crate::core::{IngestConfig, SearchQuery};

/// Build the paginated search URL for one query. `page` is zero-based.
pub fn search_url(config: &IngestConfig, query: &SearchQuery, page: u32) -> String {
    format!(
        "{}?keywords={}&location={}&f_TPR=&f_SB2={}&f_WT={}&geoId=&f_TPR={}&start={}",
        config.search_url,
        urlencoding::encode(&query.keywords),
        urlencoding::encode(&query.location),
        urlencoding::encode(&config.salary),
        urlencoding::encode(&query.work_type),
        urlencoding::encode(&config.timespan),
        u64::from(config.page_size) * u64::from(page)
    )
}

/// All search URLs in scrape order: rounds outermost, then queries, then pages.
/// Rounds repeat the same URLs; the listing reshuffles between requests.
pub fn search_urls(config: &IngestConfig) -> Vec<String> {
    let mut urls = Vec::new();
    for _round in 0..config.rounds {
        for query in &config.search_queries {
            for page in 0..config.pages_to_scrape {
                urls.push(search_url(config, query, page));
            }
        }
    }
    urls
}

/// Canonical detail URL for a site posting id
pub fn expand_job_url(template: &str, posting_id: &str) -> String {
    template.replace("{id}", posting_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(keywords: &str, location: &str, work_type: &str) -> SearchQuery {
        SearchQuery {
            keywords: keywords.to_string(),
            location: location.to_string(),
            work_type: work_type.to_string(),
        }
    }

    #[test]
    fn test_search_url_encodes_parameters() {
        let config = IngestConfig {
            timespan: "r604800".to_string(),
            salary: "3".to_string(),
            ..IngestConfig::default()
        };
        let url = search_url(&config, &query("Rust Developer", "São Paulo", "2"), 2);
        assert_eq!(
            url,
            "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search\
             ?keywords=Rust%20Developer&location=S%C3%A3o%20Paulo&f_TPR=&f_SB2=3&f_WT=2\
             &geoId=&f_TPR=r604800&start=50"
        );
    }

    #[test]
    fn test_search_urls_order_and_count() {
        let config = IngestConfig {
            search_queries: vec![query("rust", "Berlin", ""), query("go", "Paris", "")],
            rounds: 2,
            pages_to_scrape: 3,
            ..IngestConfig::default()
        };
        let urls = search_urls(&config);
        assert_eq!(urls.len(), 12);
        assert!(urls[0].contains("keywords=rust") && urls[0].ends_with("start=0"));
        assert!(urls[2].ends_with("start=50"));
        assert!(urls[3].contains("keywords=go"));
        assert_eq!(urls[0], urls[6]);
    }

    #[test]
    fn test_large_offsets_do_not_wrap() {
        let config = IngestConfig {
            page_size: u32::MAX,
            ..IngestConfig::default()
        };
        let url = search_url(&config, &query("rust", "Berlin", ""), 3);
        assert!(url.ends_with("start=12884901885"));
    }

    #[test]
    fn test_zero_rounds_scrapes_nothing() {
        let config = IngestConfig {
            search_queries: vec![query("rust", "Berlin", "")],
            rounds: 0,
            ..IngestConfig::default()
        };
        assert!(search_urls(&config).is_empty());
    }

    #[test]
    fn test_job_url_from_template() {
        let config = IngestConfig::default();
        assert_eq!(
            expand_job_url(&config.job_url_template, "3912345678"),
            "https://www.linkedin.com/jobs/view/3912345678/"
        );
    }
}
