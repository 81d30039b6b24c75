// src/scraping/mod.rs
use anyhow::Result;
use scraper::Selector;

pub mod card_parser;
pub mod detail_parser;
pub mod http_fetcher;
pub mod search;

pub use card_parser::CardParser;
pub use detail_parser::DetailParser;
pub use http_fetcher::{FetchedPage, HttpFetcher, PageFetcher};

pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| anyhow::anyhow!("Invalid CSS selector {:?}: {:?}", selector, e))
}
