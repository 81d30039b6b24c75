// src/filtering/mod.rs
//! Batch dedup, relevance rules and novelty against the store

pub mod dedup;
pub mod language;
pub mod novelty;
pub mod relevance;

pub use dedup::dedupe;
pub use language::detect_language;
pub use novelty::{find_new, ExistingRecordIndex};
pub use relevance::{Rejection, RelevanceFilter};
