// src/core/database.rs
//! SQLite persistence for accepted and filtered postings

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};
use std::path::Path;
use tracing::{debug, info};

use crate::core::{FsOps, IngestConfig};
use crate::filtering::novelty::ExistingRecordIndex;
use crate::types::{FilteredJobRecord, JobPosting};

// ===== Core Database Connection Management =====

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the SQLite file at `database_path`
    pub async fn connect(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            FsOps::ensure_dir_exists(parent).await?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!(
            "Database connection established: {}",
            database_path.display()
        );

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

// ===== Store Interface =====

/// Table-like persistence for the two posting tables.
///
/// Appends re-check every row against the rows already stored, so a batch
/// prepared long after the novelty check never inserts a duplicate.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn ensure_schema(&self) -> Result<()>;

    async fn load_accepted(&self) -> Result<Vec<JobPosting>>;

    async fn load_filtered(&self) -> Result<Vec<FilteredJobRecord>>;

    /// Returns the number of rows actually inserted
    async fn append_accepted(&self, postings: &[JobPosting]) -> Result<usize>;

    /// Returns the number of rows actually inserted
    async fn append_filtered(&self, records: &[FilteredJobRecord]) -> Result<usize>;
}

// ===== SQLite Store =====

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub accepted: i64,
    pub filtered: i64,
    pub applied: i64,
    pub hidden: i64,
    pub interview: i64,
    pub rejected: i64,
}

pub struct SqliteJobStore {
    pool: SqlitePool,
    jobs_table: String,
    filtered_table: String,
}

impl SqliteJobStore {
    /// Table names must already be validated identifiers (see `IngestConfig::validate`)
    pub fn new(database: &Database, jobs_table: &str, filtered_table: &str) -> Self {
        Self {
            pool: database.pool().clone(),
            jobs_table: jobs_table.to_string(),
            filtered_table: filtered_table.to_string(),
        }
    }

    pub async fn from_config(config: &IngestConfig) -> Result<Self> {
        let database = Database::connect(&config.db_path).await?;
        database.health_check().await?;
        Ok(Self::new(
            &database,
            &config.jobs_tablename,
            &config.filtered_jobs_tablename,
        ))
    }

    async fn table_exists(conn: &mut SqliteConnection, table: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(name) FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(table)
                .fetch_one(&mut *conn)
                .await?;
        Ok(count == 1)
    }

    async fn fetch_jobs(conn: &mut SqliteConnection, table: &str) -> Result<Vec<JobPosting>> {
        if !Self::table_exists(conn, table).await? {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT id, title, company, location, posted_date, job_url, description, language,
                   applied, hidden, interview, rejected, resume, cover_letter, date_loaded
            FROM "{}"
            ORDER BY id
            "#,
            table
        );

        let jobs = sqlx::query_as::<_, JobPosting>(&sql)
            .fetch_all(&mut *conn)
            .await
            .with_context(|| format!("Failed to read table {}", table))?;
        Ok(jobs)
    }

    async fn fetch_filtered(
        conn: &mut SqliteConnection,
        table: &str,
    ) -> Result<Vec<FilteredJobRecord>> {
        if !Self::table_exists(conn, table).await? {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"SELECT id, title, company, posted_date, job_url, date_loaded FROM "{}" ORDER BY id"#,
            table
        );

        let records = sqlx::query_as::<_, FilteredJobRecord>(&sql)
            .fetch_all(&mut *conn)
            .await
            .with_context(|| format!("Failed to read table {}", table))?;
        Ok(records)
    }

    /// Row counts and workflow-flag tallies; missing tables count as empty
    pub async fn stats(&self) -> Result<StoreStats> {
        let mut conn = self.pool.acquire().await?;
        let mut stats = StoreStats::default();

        if Self::table_exists(&mut conn, &self.jobs_table).await? {
            let sql = format!(
                r#"
                SELECT COUNT(*),
                       COALESCE(SUM(applied), 0),
                       COALESCE(SUM(hidden), 0),
                       COALESCE(SUM(interview), 0),
                       COALESCE(SUM(rejected), 0)
                FROM "{}"
                "#,
                self.jobs_table
            );
            let (accepted, applied, hidden, interview, rejected): (i64, i64, i64, i64, i64) =
                sqlx::query_as(&sql)
                    .fetch_one(&mut *conn)
                    .await
                    .with_context(|| format!("Failed to count rows in {}", self.jobs_table))?;
            stats.accepted = accepted;
            stats.applied = applied;
            stats.hidden = hidden;
            stats.interview = interview;
            stats.rejected = rejected;
        }

        if Self::table_exists(&mut conn, &self.filtered_table).await? {
            stats.filtered = sqlx::query_scalar(&format!(
                r#"SELECT COUNT(*) FROM "{}""#,
                self.filtered_table
            ))
            .fetch_one(&mut *conn)
            .await
            .with_context(|| format!("Failed to count rows in {}", self.filtered_table))?;
        }

        Ok(stats)
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS "{}" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                company TEXT NOT NULL DEFAULT '',
                location TEXT NOT NULL DEFAULT '',
                posted_date TEXT,
                job_url TEXT NOT NULL,
                description TEXT,
                language TEXT,
                applied BOOLEAN NOT NULL DEFAULT FALSE,
                hidden BOOLEAN NOT NULL DEFAULT FALSE,
                interview BOOLEAN NOT NULL DEFAULT FALSE,
                rejected BOOLEAN NOT NULL DEFAULT FALSE,
                resume TEXT,
                cover_letter TEXT,
                date_loaded TEXT
            );
            "#,
            self.jobs_table
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS "{}" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                company TEXT NOT NULL DEFAULT '',
                posted_date TEXT,
                job_url TEXT NOT NULL,
                date_loaded TEXT
            );
            "#,
            self.filtered_table
        ))
        .execute(&self.pool)
        .await?;

        // job_url is not UNIQUE: the site occasionally reissues ids
        for table in [&self.jobs_table, &self.filtered_table] {
            sqlx::query(&format!(
                r#"CREATE INDEX IF NOT EXISTS "idx_{0}_job_url" ON "{0}"(job_url);"#,
                table
            ))
            .execute(&self.pool)
            .await?;
        }

        info!(
            "Schema ready: {} and {}",
            self.jobs_table, self.filtered_table
        );
        Ok(())
    }

    async fn load_accepted(&self) -> Result<Vec<JobPosting>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_jobs(&mut conn, &self.jobs_table).await
    }

    async fn load_filtered(&self) -> Result<Vec<FilteredJobRecord>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_filtered(&mut conn, &self.filtered_table).await
    }

    async fn append_accepted(&self, postings: &[JobPosting]) -> Result<usize> {
        if postings.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let existing = Self::fetch_jobs(&mut tx, &self.jobs_table).await?;
        let mut index = ExistingRecordIndex::from_records(existing.iter());

        let sql = format!(
            r#"
            INSERT INTO "{}" (title, company, location, posted_date, job_url, description, language,
                              applied, hidden, interview, rejected, resume, cover_letter, date_loaded)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            self.jobs_table
        );

        let mut inserted = 0;
        for posting in postings {
            if index.contains(posting) {
                debug!("Skipping already stored job: {}", posting.job_url);
                continue;
            }

            sqlx::query(&sql)
                .bind(&posting.title)
                .bind(&posting.company)
                .bind(&posting.location)
                .bind(posting.posted_date)
                .bind(&posting.job_url)
                .bind(&posting.description)
                .bind(&posting.language)
                .bind(posting.applied)
                .bind(posting.hidden)
                .bind(posting.interview)
                .bind(posting.rejected)
                .bind(&posting.resume)
                .bind(&posting.cover_letter)
                .bind(posting.date_loaded)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to insert job {}", posting.job_url))?;

            index.remember(posting);
            inserted += 1;
        }

        tx.commit().await?;

        if inserted > 0 {
            info!("Added {} new records to the {} table", inserted, self.jobs_table);
        } else {
            info!("No new records to add to the {} table", self.jobs_table);
        }
        Ok(inserted)
    }

    async fn append_filtered(&self, records: &[FilteredJobRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let existing = Self::fetch_filtered(&mut tx, &self.filtered_table).await?;
        let mut index = ExistingRecordIndex::from_records(existing.iter());

        let sql = format!(
            r#"INSERT INTO "{}" (title, company, posted_date, job_url, date_loaded) VALUES (?, ?, ?, ?, ?)"#,
            self.filtered_table
        );

        let mut inserted = 0;
        for record in records {
            if index.contains(record) {
                debug!("Skipping already filtered job: {}", record.job_url);
                continue;
            }

            sqlx::query(&sql)
                .bind(&record.title)
                .bind(&record.company)
                .bind(record.posted_date)
                .bind(&record.job_url)
                .bind(record.date_loaded)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to insert filtered job {}", record.job_url))?;

            index.remember(record);
            inserted += 1;
        }

        tx.commit().await?;

        if inserted > 0 {
            info!("Added {} new records to the {} table", inserted, self.filtered_table);
        } else {
            info!("No new records to add to the {} table", self.filtered_table);
        }
        Ok(inserted)
    }
}
