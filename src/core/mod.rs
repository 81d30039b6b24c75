// src/core/mod.rs
//! Configuration, storage and filesystem services shared by every command

pub mod config_manager;
pub mod database;
pub mod fs_ops;

pub use config_manager::{ConfigManager, CsvExportConfig, HttpSettings, IngestConfig, SearchQuery};
pub use database::{Database, JobStore, SqliteJobStore, StoreStats};
pub use fs_ops::FsOps;
