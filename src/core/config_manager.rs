// src/core/config_manager.rs
//! Ingestion configuration: loaded once at startup, immutable afterwards

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::core::FsOps;
use crate::utils::normalize_language;

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
pub const CONFIG_ENV_VAR: &str = "JOBSCOUT_CONFIG";

const DEFAULT_SEARCH_URL: &str =
    "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search";
const DEFAULT_JOB_URL_TEMPLATE: &str = "https://www.linkedin.com/jobs/view/{id}/";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub path: PathBuf,
    pub ingest: IngestConfig,
}

// ===== Ingestion Settings =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub keywords: String,
    #[serde(default)]
    pub location: String,
    /// LinkedIn `f_WT` work-type filter (1 on-site, 2 remote, 3 hybrid)
    #[serde(
        default,
        rename = "f_WT",
        alias = "work_type",
        alias = "workType",
        deserialize_with = "string_or_number"
    )]
    pub work_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvExportConfig {
    pub accepted: PathBuf,
    pub filtered: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub search_queries: Vec<SearchQuery>,
    pub rounds: u32,
    pub pages_to_scrape: u32,
    #[serde(deserialize_with = "string_or_number")]
    pub timespan: String,
    #[serde(deserialize_with = "string_or_number")]
    pub salary: String,
    pub headers: HashMap<String, String>,
    pub proxies: HashMap<String, String>,
    pub desc_words: Vec<String>,
    pub title_exclude: Vec<String>,
    pub title_include: Vec<String>,
    pub company_exclude: Vec<String>,
    pub languages: Vec<String>,
    pub days_to_scrape: i64,
    pub jobs_tablename: String,
    pub filtered_jobs_tablename: String,
    pub db_path: PathBuf,
    pub retries: u32,
    pub retry_delay_secs: u64,
    pub timeout_secs: u64,
    pub request_delay_ms: u64,
    pub search_url: String,
    pub job_url_template: String,
    pub page_size: u32,
    pub csv_export: Option<CsvExportConfig>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            search_queries: Vec::new(),
            rounds: 1,
            pages_to_scrape: 1,
            timespan: String::new(),
            salary: String::new(),
            headers: HashMap::new(),
            proxies: HashMap::new(),
            desc_words: Vec::new(),
            title_exclude: Vec::new(),
            title_include: Vec::new(),
            company_exclude: Vec::new(),
            languages: Vec::new(),
            days_to_scrape: 7,
            jobs_tablename: "jobs".to_string(),
            filtered_jobs_tablename: "filtered_jobs".to_string(),
            db_path: PathBuf::from("data/jobs.db"),
            retries: 3,
            retry_delay_secs: 1,
            timeout_secs: 5,
            request_delay_ms: 0,
            search_url: DEFAULT_SEARCH_URL.to_string(),
            job_url_template: DEFAULT_JOB_URL_TEMPLATE.to_string(),
            page_size: 25,
            csv_export: None,
        }
    }
}

/// HTTP client settings derived from [`IngestConfig`]
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub headers: HashMap<String, String>,
    pub proxies: HashMap<String, String>,
    pub retries: u32,
    pub retry_delay: Duration,
    pub timeout: Duration,
    pub request_delay: Duration,
}

impl IngestConfig {
    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            headers: self.headers.clone(),
            proxies: self.proxies.clone(),
            retries: self.retries,
            retry_delay: Duration::from_secs(self.retry_delay_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            request_delay: Duration::from_millis(self.request_delay_ms),
        }
    }

    /// Check invariants and normalize values in place
    pub fn validate(&mut self) -> Result<()> {
        for table in [&self.jobs_tablename, &self.filtered_jobs_tablename] {
            if !is_sql_identifier(table) {
                anyhow::bail!("Invalid table name: {:?}. Use letters, digits and underscores", table);
            }
        }
        if self.jobs_tablename == self.filtered_jobs_tablename {
            anyhow::bail!(
                "jobs_tablename and filtered_jobs_tablename must differ (both are {:?})",
                self.jobs_tablename
            );
        }
        if self.retries == 0 {
            anyhow::bail!("retries must be at least 1");
        }
        if self.days_to_scrape < 0 {
            anyhow::bail!("days_to_scrape must not be negative");
        }
        if !self.job_url_template.contains("{id}") {
            anyhow::bail!("job_url_template must contain an {{id}} placeholder");
        }

        self.languages = self
            .languages
            .iter()
            .map(|lang| normalize_language(lang))
            .collect();

        Ok(())
    }
}

fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Int(i64),
    Float(f64),
}

/// Config files mix `"2"` and `2` for URL parameters
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Str(value) => value,
        StringOrNumber::Int(value) => value.to_string(),
        StringOrNumber::Float(value) => value.to_string(),
    })
}

// ===== Loading =====

impl ConfigManager {
    /// Resolve the config path: CLI flag, then environment, then default
    pub fn resolve_path(cli_path: Option<PathBuf>) -> PathBuf {
        cli_path
            .or_else(|| std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading ingestion configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut ingest = Self::parse(&content, path)?;
        ingest.db_path = Self::resolve_relative(&ingest.db_path)?;
        if let Some(export) = ingest.csv_export.as_mut() {
            export.accepted = Self::resolve_relative(&export.accepted)?;
            export.filtered = Self::resolve_relative(&export.filtered)?;
        }

        info!(
            "Loaded {} search queries, database: {}",
            ingest.search_queries.len(),
            ingest.db_path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            ingest,
        })
    }

    /// Parse and validate config content; the format follows the file extension
    pub fn parse(content: &str, path: &Path) -> Result<IngestConfig> {
        let is_toml = FsOps::get_extension(path).as_deref() == Some("toml");

        let mut config: IngestConfig = if is_toml {
            toml::from_str(content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?
        } else {
            serde_yaml::from_str(content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    fn resolve_relative(path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            let current_dir = std::env::current_dir().context("Failed to get current directory")?;
            Ok(FsOps::normalize_path(&current_dir, path))
        }
    }

    /// Ensure the database and export directories exist
    pub async fn ensure_directories(&self) -> Result<()> {
        if let Some(db_parent) = self.ingest.db_path.parent() {
            FsOps::ensure_dir_exists(db_parent).await?;
        }

        if let Some(export) = &self.ingest.csv_export {
            for file in [&export.accepted, &export.filtered] {
                if let Some(parent) = file.parent() {
                    FsOps::ensure_dir_exists(parent).await?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON_CONFIG: &str = r#"{
        "proxies": {},
        "headers": {"User-Agent": "Mozilla/5.0"},
        "search_queries": [
            {"keywords": "Rust Developer", "location": "Berlin", "f_WT": 2},
            {"keywords": "Backend Engineer", "location": "Remote", "f_WT": ""}
        ],
        "desc_words": ["clearance"],
        "title_include": ["engineer"],
        "title_exclude": ["senior"],
        "company_exclude": ["ACME"],
        "languages": ["EN", "German"],
        "timespan": "r604800",
        "salary": 3,
        "rounds": 2,
        "pages_to_scrape": 4,
        "days_to_scrape": 10,
        "jobs_tablename": "jobs",
        "filtered_jobs_tablename": "jobs_filtered",
        "db_path": "data/my_database.db"
    }"#;

    #[test]
    fn test_parse_json_config() {
        let config = ConfigManager::parse(JSON_CONFIG, Path::new("config.json")).unwrap();

        assert_eq!(config.search_queries.len(), 2);
        assert_eq!(config.search_queries[0].work_type, "2");
        assert_eq!(config.search_queries[1].work_type, "");
        assert_eq!(config.salary, "3");
        assert_eq!(config.rounds, 2);
        assert_eq!(config.pages_to_scrape, 4);
        assert_eq!(config.days_to_scrape, 10);
        assert_eq!(config.languages, vec!["en", "de"]);
        assert_eq!(config.filtered_jobs_tablename, "jobs_filtered");
        assert_eq!(config.headers.get("User-Agent").unwrap(), "Mozilla/5.0");
        assert!(config.proxies.is_empty());
        // untouched keys keep their defaults
        assert_eq!(config.retries, 3);
        assert_eq!(config.page_size, 25);
    }

    #[test]
    fn test_parse_toml_config() {
        let content = r#"
            days_to_scrape = 3
            title_exclude = ["intern"]

            [[search_queries]]
            keywords = "rust"
            location = "Zurich"
            work_type = "1"
        "#;
        let config = ConfigManager::parse(content, Path::new("config.toml")).unwrap();
        assert_eq!(config.days_to_scrape, 3);
        assert_eq!(config.search_queries[0].work_type, "1");
        assert_eq!(config.title_exclude, vec!["intern"]);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ConfigManager::parse("{}", Path::new("config.yaml")).unwrap();
        assert_eq!(config.days_to_scrape, 7);
        assert_eq!(config.jobs_tablename, "jobs");
        assert_eq!(config.timeout_secs, 5);
        assert!(config.csv_export.is_none());
    }

    #[test]
    fn test_rejects_unsafe_table_name() {
        let content = r#"jobs_tablename: "jobs; DROP TABLE jobs""#;
        assert!(ConfigManager::parse(content, Path::new("config.yaml")).is_err());
    }

    #[test]
    fn test_rejects_identical_table_names() {
        let content = "jobs_tablename: jobs\nfiltered_jobs_tablename: jobs\n";
        assert!(ConfigManager::parse(content, Path::new("config.yaml")).is_err());
    }

    #[test]
    fn test_rejects_template_without_placeholder() {
        let content = "job_url_template: https://example.com/jobs/\n";
        assert!(ConfigManager::parse(content, Path::new("config.yaml")).is_err());
    }

    #[test]
    fn test_http_settings_durations() {
        let config = IngestConfig {
            retry_delay_secs: 2,
            request_delay_ms: 250,
            ..IngestConfig::default()
        };
        let http = config.http_settings();
        assert_eq!(http.retry_delay, Duration::from_secs(2));
        assert_eq!(http.request_delay, Duration::from_millis(250));
        assert_eq!(http.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_sql_identifier() {
        assert!(is_sql_identifier("jobs"));
        assert!(is_sql_identifier("_filtered_2"));
        assert!(!is_sql_identifier("2jobs"));
        assert!(!is_sql_identifier("jobs-filtered"));
        assert!(!is_sql_identifier(""));
    }
}
