//! # collector-db
//!
//! Storage layer for the collector catalog.
//!
//! This crate provides:
//! - Per-owner category and settings documents on the local filesystem,
//!   written atomically
//! - PostgreSQL record store with JSONB field maps
//! - In-process record store for tests and embedded use
//!
//! ## Example
//!
//! ```rust,ignore
//! use collector_db::{Database, FileCategoryRepository, CategoryRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/collector").await?;
//!     let categories = FileCategoryRepository::on_disk("/var/lib/collector");
//!
//!     let owner = collector_db::OwnerId::new(collector_db::new_v7());
//!     println!("{} categories", categories.load(owner).await?.len());
//!     Ok(())
//! }
//! ```
pub mod categories;
pub mod file_storage;
pub mod memory;
pub mod pool;
pub mod records;
pub mod settings;

// Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use collector_core::*;

pub use categories::FileCategoryRepository;
pub use file_storage::{owner_document_path, FilesystemBackend, StorageBackend};
pub use memory::MemoryRecordRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use records::PgRecordRepository;
pub use settings::FileSettingsRepository;

/// Postgres-backed database context.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Collection records.
    pub records: PgRecordRepository,
}

impl Database {
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            records: PgRecordRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}
