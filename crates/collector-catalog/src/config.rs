//! Catalog configuration loaded from the environment.

use std::path::PathBuf;

use collector_core::{defaults, Error, Result};

/// Runtime configuration for a [`crate::Catalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Root directory of the per-owner category and settings documents.
    pub data_dir: PathBuf,
    pub database_url: String,
    /// Record updates or deletes in flight during migration and cascade.
    pub migration_concurrency: usize,
    pub db_max_connections: u32,
}

impl CatalogConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            database_url: defaults::DATABASE_URL.to_string(),
            migration_concurrency: defaults::MIGRATION_CONCURRENCY,
            db_max_connections: collector_db::pool::DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `COLLECTOR_DATA_DIR` | platform config dir | Category and settings documents |
    /// | `DATABASE_URL` | `postgres://localhost/collector` | Record store |
    /// | `COLLECTOR_MIGRATION_CONCURRENCY` | `8` | Batch limit (min 1) |
    /// | `COLLECTOR_DB_MAX_CONNECTIONS` | `10` | Pool size |
    pub fn from_env() -> Result<Self> {
        let data_dir = match std::env::var("COLLECTOR_DATA_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_data_dir()?,
        };

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| defaults::DATABASE_URL.to_string());

        let migration_concurrency = std::env::var("COLLECTOR_MIGRATION_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults::MIGRATION_CONCURRENCY)
            .max(1);

        let db_max_connections = std::env::var("COLLECTOR_DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(collector_db::pool::DEFAULT_MAX_CONNECTIONS)
            .max(1);

        Ok(Self {
            data_dir,
            database_url,
            migration_concurrency,
            db_max_connections,
        })
    }

    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = url.into();
        self
    }

    pub fn with_migration_concurrency(mut self, limit: usize) -> Self {
        self.migration_concurrency = limit.max(1);
        self
    }
}

/// Platform application-data directory.
///
/// `%LOCALAPPDATA%\CollectorsDream` on Windows,
/// `~/Library/Application Support/CollectorsDream` on macOS,
/// `~/.config/collectors-dream` elsewhere.
pub fn default_data_dir() -> Result<PathBuf> {
    let missing = |var: &str| Error::Config(format!("{var} is not set and COLLECTOR_DATA_DIR is empty"));

    if cfg!(target_os = "windows") {
        let base = std::env::var("LOCALAPPDATA").map_err(|_| missing("LOCALAPPDATA"))?;
        return Ok(PathBuf::from(base).join(defaults::APP_DIR_NAME));
    }

    let home = PathBuf::from(std::env::var("HOME").map_err(|_| missing("HOME"))?);
    if cfg!(target_os = "macos") {
        Ok(home
            .join("Library")
            .join("Application Support")
            .join(defaults::APP_DIR_NAME))
    } else {
        Ok(home.join(".config").join(defaults::APP_DIR_NAME_UNIX))
    }
}
