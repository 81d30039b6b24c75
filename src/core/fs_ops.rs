// src/core/fs_ops.rs
//! File system helpers shared by config loading, logging and export

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

pub struct FsOps;

impl FsOps {
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            info!("Created directory: {}", path.display());
        }
        Ok(())
    }

    /// Blocking variant for startup code that runs before the runtime is busy
    pub fn ensure_dir_exists_sync(path: &Path) -> Result<()> {
        if !path.as_os_str().is_empty() && !path.exists() {
            std::fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    pub fn normalize_path(base: &Path, relative: &Path) -> PathBuf {
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            base.join(relative)
        }
    }

    pub fn get_extension(path: &Path) -> Option<String> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// One log file per process start, named after the start time
    pub fn timestamped_log_path(log_dir: &Path, started_at: NaiveDateTime) -> PathBuf {
        log_dir.join(format!("{}.log", started_at.format("%Y-%m-%d_%H-%M-%S")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_get_extension() {
        assert_eq!(FsOps::get_extension(Path::new("config.TOML")), Some("toml".to_string()));
        assert_eq!(FsOps::get_extension(Path::new("config.json")), Some("json".to_string()));
        assert_eq!(FsOps::get_extension(Path::new("config")), None);
    }

    #[test]
    fn test_normalize_path() {
        let base = Path::new("/srv/jobscout");
        assert_eq!(
            FsOps::normalize_path(base, Path::new("data/jobs.db")),
            PathBuf::from("/srv/jobscout/data/jobs.db")
        );
        assert_eq!(
            FsOps::normalize_path(base, Path::new("/var/jobs.db")),
            PathBuf::from("/var/jobs.db")
        );
    }

    #[test]
    fn test_timestamped_log_path() {
        let started = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9, 7, 1)
            .unwrap();
        assert_eq!(
            FsOps::timestamped_log_path(Path::new("logs"), started),
            PathBuf::from("logs/2024-03-05_09-07-01.log")
        );
    }

    #[tokio::test]
    async fn test_ensure_dir_exists_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        FsOps::ensure_dir_exists(&nested).await.unwrap();
        assert!(nested.is_dir());
        // second call is a no-op
        FsOps::ensure_dir_exists(&nested).await.unwrap();
    }
}
