// src/scraping/card_parser.rs
use anyhow::Result;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use super::{parse_selector, search::expand_job_url};
use crate::types::JobPosting;

/// Extracts job cards from a search results page.
pub struct CardParser {
    card: Selector,
    title: Selector,
    company: Selector,
    location: Selector,
    date_new: Selector,
    date_legacy: Selector,
    job_url_template: String,
}

impl CardParser {
    pub fn new(job_url_template: &str) -> Result<Self> {
        Ok(Self {
            card: parse_selector("div.base-search-card__info")?,
            title: parse_selector("h3")?,
            company: parse_selector("a.hidden-nested-link")?,
            location: parse_selector("span.job-search-card__location")?,
            date_new: parse_selector("time.job-search-card__listdate--new")?,
            date_legacy: parse_selector("time.job-search-card__listdate")?,
            job_url_template: job_url_template.to_string(),
        })
    }

    /// Card-level postings in page order. Cards without a title or posting id
    /// are skipped; a page without cards yields an empty list.
    pub fn parse_search_results_page(&self, document: &Html) -> Vec<JobPosting> {
        let jobs: Vec<JobPosting> = document
            .select(&self.card)
            .filter_map(|card| self.parse_card(card))
            .collect();

        if jobs.is_empty() {
            info!("Empty page, no jobs found");
        }
        jobs
    }

    fn parse_card(&self, card: ElementRef) -> Option<JobPosting> {
        let title = card
            .select(&self.title)
            .next()
            .map(|h3| clean_text(&h3.text().collect::<String>()))
            .filter(|title| !title.is_empty())?;

        // The posting id lives on the card container wrapping the info block
        let Some(posting_id) = card
            .parent()
            .and_then(ElementRef::wrap)
            .and_then(|parent| parent.value().attr("data-entity-urn"))
            .and_then(|urn| urn.rsplit(':').next())
            .filter(|id| !id.is_empty())
        else {
            debug!("Skipping card without posting id: {}", title);
            return None;
        };

        let company = self.first_text(card, &self.company).unwrap_or_default();
        let location = self.first_text(card, &self.location).unwrap_or_default();

        Some(JobPosting::from_card(
            title,
            company,
            location,
            self.posted_date(card),
            expand_job_url(&self.job_url_template, posting_id),
        ))
    }

    fn first_text(&self, card: ElementRef, selector: &Selector) -> Option<String> {
        card.select(selector)
            .next()
            .map(|element| clean_text(&element.text().collect::<String>()))
    }

    /// Prefers the new-style date element, then the legacy one
    fn posted_date(&self, card: ElementRef) -> Option<NaiveDate> {
        let raw = card
            .select(&self.date_new)
            .next()
            .or_else(|| card.select(&self.date_legacy).next())
            .and_then(|time| time.value().attr("datetime"))
            .unwrap_or("");

        match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                debug!("Unparsable posted date: {:?}", raw);
                None
            }
        }
    }
}

fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
