//! # collector-catalog
//!
//! Service layer of the collector catalog: the category registry, the schema
//! migration engine, record and settings services, account export/import and
//! the token seam. Every operation takes the [`OwnerId`] it is scoped to.
//!
//! ```rust,ignore
//! let catalog = Catalog::open(&CatalogConfig::from_env()?).await?;
//! let owner = catalog.authenticate(token).await?;
//! let saved = catalog.registry.save(owner, request).await?;
//! ```

pub mod auth;
pub mod batch;
pub mod config;
pub mod export;
pub mod migration;
pub mod records;
pub mod registry;
pub mod settings;
pub mod telemetry;

use std::sync::Arc;

use collector_core::{
    CategoryRepository, OwnerId, RecordRepository, Result, SettingsRepository, TokenValidator,
};
use collector_db::{
    log_pool_metrics, Database, FileCategoryRepository, FileSettingsRepository,
    FilesystemBackend, PoolConfig, StorageBackend,
};
use tracing::info;

pub use auth::{bearer_token, StaticTokenValidator};
pub use batch::{BatchOutcome, BatchRunner};
pub use config::CatalogConfig;
pub use export::{ExportBundle, ImportBundle, ImportItem, ImportSummary};
pub use migration::MigrationEngine;
pub use records::{FormInput, RecordService};
pub use registry::{CategoryRegistry, SavedCategory};
pub use settings::SettingsService;

/// Entry point bundling every service over one set of stores.
#[derive(Clone)]
pub struct Catalog {
    pub registry: CategoryRegistry,
    pub records: RecordService,
    pub settings: SettingsService,
    record_store: Arc<dyn RecordRepository>,
    auth: Arc<dyn TokenValidator>,
}

impl Catalog {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        settings: Arc<dyn SettingsRepository>,
        records: Arc<dyn RecordRepository>,
        auth: Arc<dyn TokenValidator>,
        migration_concurrency: usize,
    ) -> Self {
        let runner = BatchRunner::new(migration_concurrency);
        Self {
            registry: CategoryRegistry::new(categories.clone(), records.clone(), runner),
            records: RecordService::new(categories, records.clone()),
            settings: SettingsService::new(settings),
            record_store: records,
            auth,
        }
    }

    /// Open the configured stores: documents under `data_dir`, records in
    /// Postgres. The data directory is checked for write access first.
    pub async fn open(config: &CatalogConfig) -> Result<Self> {
        Self::open_with_auth(config, Arc::new(StaticTokenValidator::new())).await
    }

    pub async fn open_with_auth(
        config: &CatalogConfig,
        auth: Arc<dyn TokenValidator>,
    ) -> Result<Self> {
        let backend = FilesystemBackend::new(config.data_dir.clone());
        backend.validate().await?;
        let backend: Arc<dyn StorageBackend> = Arc::new(backend);

        let db = Database::connect_with_config(
            &config.database_url,
            PoolConfig::new().max_connections(config.db_max_connections),
        )
        .await?;
        #[cfg(feature = "migrations")]
        db.migrate().await?;
        log_pool_metrics(&db.pool);

        info!(
            subsystem = "catalog",
            component = "catalog",
            op = "open",
            data_dir = %config.data_dir.display(),
            migration_concurrency = config.migration_concurrency,
            "Catalog ready"
        );

        Ok(Self::new(
            Arc::new(FileCategoryRepository::new(backend.clone())),
            Arc::new(FileSettingsRepository::new(backend)),
            Arc::new(db.records),
            auth,
            config.migration_concurrency,
        ))
    }

    /// Resolve a bearer token to the owner every later call is scoped to.
    pub async fn authenticate(&self, token: &str) -> Result<OwnerId> {
        self.auth.validate(token).await
    }
}
