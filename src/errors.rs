// src/errors.rs
use thiserror::Error;

/// Failure to retrieve a page. Callers treat both variants as "no data".
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Timed out fetching {url} after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: u32 },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::RetriesExhausted { url, .. } | FetchError::Request { url, .. } => url,
        }
    }
}
