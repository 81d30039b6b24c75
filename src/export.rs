// src/export.rs
//! CSV snapshot of one run's accepted and filtered postings

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::core::CsvExportConfig;
use crate::types::{FilteredJobRecord, JobPosting};

pub fn save_to_csv<T: Serialize>(rows: &[T], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write CSV row to {}", path.display()))?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush CSV file: {}", path.display()))?;
    Ok(())
}

/// Overwrites both export files with this run's postings
pub fn export_run(
    export: &CsvExportConfig,
    accepted: &[JobPosting],
    filtered: &[FilteredJobRecord],
) -> Result<()> {
    save_to_csv(accepted, &export.accepted)?;
    save_to_csv(filtered, &export.filtered)?;
    info!(
        "Exported {} accepted and {} filtered postings to {} and {}",
        accepted.len(),
        filtered.len(),
        export.accepted.display(),
        export.filtered.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_export_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let export = CsvExportConfig {
            accepted: dir.path().join("jobs.csv"),
            filtered: dir.path().join("jobs_filtered.csv"),
        };

        let mut job = JobPosting::from_card(
            "Rust Engineer".to_string(),
            "Acme, Inc.".to_string(),
            "Berlin".to_string(),
            NaiveDate::from_ymd_opt(2024, 6, 8),
            "https://www.linkedin.com/jobs/view/1/".to_string(),
        );
        job.description = Some("line one\nline two".to_string());
        let filtered = vec![job.to_filtered_record()];

        export_run(&export, &[job], &filtered).unwrap();

        let mut reader = csv::Reader::from_path(&export.accepted).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[1], "title");
        assert_eq!(&headers[4], "posted_date");
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][2], "Acme, Inc.");
        assert_eq!(&records[0][4], "2024-06-08");
        assert_eq!(&records[0][6], "line one\nline two");

        let filtered_rows = std::fs::read_to_string(&export.filtered).unwrap();
        assert!(filtered_rows.starts_with("id,title,company,posted_date,job_url,date_loaded"));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let rows: Vec<FilteredJobRecord> = Vec::new();
        assert!(save_to_csv(&rows, &dir.path().join("missing/out.csv")).is_err());
    }
}
