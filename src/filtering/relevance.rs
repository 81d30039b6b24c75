// src/filtering/relevance.rs
//! Keyword and language rules.
//!
//! The cheap stage only needs card data and runs before any detail page is
//! fetched. The expensive stage needs the description. Every configured rule
//! must pass; an empty rule list places no constraint.

use tracing::debug;

use crate::core::IngestConfig;
use crate::filtering::language::detect_language;
use crate::types::JobPosting;
use crate::utils::{contains_any_keyword, lowercase_keywords};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    TitleExcluded,
    TitleNotIncluded,
    CompanyExcluded,
    DescriptionExcluded,
    Language(String),
}

#[derive(Debug, Clone, Default)]
pub struct RelevanceFilter {
    title_exclude: Vec<String>,
    title_include: Vec<String>,
    company_exclude: Vec<String>,
    desc_exclude: Vec<String>,
    languages: Vec<String>,
}

impl RelevanceFilter {
    pub fn from_config(config: &IngestConfig) -> Self {
        Self {
            title_exclude: lowercase_keywords(&config.title_exclude),
            title_include: lowercase_keywords(&config.title_include),
            company_exclude: lowercase_keywords(&config.company_exclude),
            desc_exclude: lowercase_keywords(&config.desc_words),
            languages: config
                .languages
                .iter()
                .map(|lang| lang.to_lowercase())
                .collect(),
        }
    }

    // ===== Cheap Stage =====

    pub fn check_cheap(&self, job: &JobPosting) -> Result<(), Rejection> {
        if contains_any_keyword(&job.title, &self.title_exclude) {
            return Err(Rejection::TitleExcluded);
        }
        if !self.title_include.is_empty() && !contains_any_keyword(&job.title, &self.title_include)
        {
            return Err(Rejection::TitleNotIncluded);
        }
        if contains_any_keyword(&job.company, &self.company_exclude) {
            return Err(Rejection::CompanyExcluded);
        }
        Ok(())
    }

    pub fn apply_cheap_filters(&self, postings: Vec<JobPosting>) -> Vec<JobPosting> {
        postings
            .into_iter()
            .filter(|job| match self.check_cheap(job) {
                Ok(()) => true,
                Err(reason) => {
                    debug!("Dropping {} at {}: {:?}", job.title, job.company, reason);
                    false
                }
            })
            .collect()
    }

    // ===== Expensive Stage =====

    /// Postings without a usable description skip the description rules
    pub fn check_expensive(&self, job: &JobPosting) -> Result<(), Rejection> {
        let Some(description) = job.usable_description() else {
            return Ok(());
        };

        if contains_any_keyword(description, &self.desc_exclude) {
            return Err(Rejection::DescriptionExcluded);
        }

        if !self.languages.is_empty() {
            let language = job
                .language
                .clone()
                .unwrap_or_else(|| detect_language(description));
            if !self.languages.contains(&language) {
                return Err(Rejection::Language(language));
            }
        }

        Ok(())
    }

    /// Split detail-fetched postings into (accepted, rejected)
    pub fn apply_expensive_filters(
        &self,
        postings: Vec<JobPosting>,
    ) -> (Vec<JobPosting>, Vec<JobPosting>) {
        postings
            .into_iter()
            .partition(|job| match self.check_expensive(job) {
                Ok(()) => true,
                Err(reason) => {
                    debug!("Filtering out {} at {}: {:?}", job.title, job.company, reason);
                    false
                }
            })
    }
}
