pub mod job;

pub use job::{FilteredJobRecord, JobPosting, PostingIdentity, MISSING_DESCRIPTION};
