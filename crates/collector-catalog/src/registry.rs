//! Category registry.
//!
//! Owns each owner's named schemas. Saves are full replacements of one entry
//! followed by an atomic rewrite of the whole category document; a save may
//! migrate existing records, a delete may cascade to them.

use std::sync::Arc;
use std::time::Instant;

use collector_core::{
    derive_key, Category, CategoryRepository, CategorySet, DeleteCategoryRequest,
    DeleteCategoryResponse, Error, MigrationReport, OwnerId, RecordRepository, Result,
    SaveCategoryRequest, SaveCategoryResponse,
};
use tracing::{debug, error, info};

use crate::batch::BatchRunner;
use crate::migration::MigrationEngine;

/// Result of [`CategoryRegistry::create_or_replace`].
#[derive(Debug, Clone)]
pub struct SavedCategory {
    pub category: Category,
    /// True when an existing entry was replaced.
    pub replaced: bool,
    /// Present when a migration ran.
    pub migration: Option<MigrationReport>,
}

#[derive(Clone)]
pub struct CategoryRegistry {
    categories: Arc<dyn CategoryRepository>,
    records: Arc<dyn RecordRepository>,
    migration: MigrationEngine,
    runner: BatchRunner,
}

impl CategoryRegistry {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        records: Arc<dyn RecordRepository>,
        runner: BatchRunner,
    ) -> Self {
        Self {
            migration: MigrationEngine::new(records.clone(), runner),
            categories,
            records,
            runner,
        }
    }

    /// All categories of the owner, keyed by category key.
    pub async fn read_all(&self, owner: OwnerId) -> Result<CategorySet> {
        self.categories.load(owner).await
    }

    /// Categories sorted by display name.
    pub async fn list(&self, owner: OwnerId) -> Result<Vec<Category>> {
        Ok(self.categories.load(owner).await?.sorted_by_name())
    }

    pub async fn get(&self, owner: OwnerId, key: &str) -> Result<Category> {
        self.categories
            .load(owner)
            .await?
            .get(key)
            .cloned()
            .ok_or_else(|| Error::CategoryNotFound(key.to_string()))
    }

    /// Handle a save request from a caller.
    ///
    /// Without a key the key is derived from the category name; deriving a
    /// key that is already taken is rejected rather than overwriting.
    pub async fn save(
        &self,
        owner: OwnerId,
        request: SaveCategoryRequest,
    ) -> Result<SaveCategoryResponse> {
        let category: Category = request.category.into();

        let key = match request.key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => {
                if category.name.trim().is_empty() {
                    return Err(Error::Validation("category name is required".to_string()));
                }
                let key = derive_key(&category.name);
                if self.categories.load(owner).await?.contains(&key) {
                    debug!(
                        subsystem = "catalog",
                        component = "registry",
                        owner_id = %owner,
                        category = %key,
                        "Derived key collides with an existing category"
                    );
                    return Err(Error::Validation(format!(
                        "a category with key '{}' already exists",
                        key
                    )));
                }
                key
            }
        };

        let saved = self
            .create_or_replace(owner, &key, category, request.migrate)
            .await?;

        let mut message = if saved.replaced {
            format!("Category '{}' updated", saved.category.name)
        } else {
            format!("Category '{}' created", saved.category.name)
        };
        if let Some(report) = &saved.migration {
            message.push_str(&format!(
                "; {} of {} records migrated",
                report.updated, report.matched
            ));
            if report.failed > 0 {
                message.push_str(&format!(", {} failed", report.failed));
            }
        }

        Ok(SaveCategoryResponse {
            key,
            message,
            migration: saved.migration,
        })
    }

    /// Validate, store and optionally migrate.
    ///
    /// The previous entry is read before the replacement. The document is
    /// persisted before any record is touched; a failed write returns the
    /// storage error with the previous document intact and no migration run.
    pub async fn create_or_replace(
        &self,
        owner: OwnerId,
        key: &str,
        mut category: Category,
        migrate: bool,
    ) -> Result<SavedCategory> {
        let start = Instant::now();
        category.validate()?;

        let mut set = self.categories.load(owner).await?;
        let previous = set.insert(key, category.clone());
        category.key = key.to_string();

        if let Err(e) = self.categories.save(owner, &set).await {
            error!(
                subsystem = "catalog",
                component = "registry",
                op = "save_category",
                owner_id = %owner,
                category = key,
                error = %e,
                "Category document write failed"
            );
            return Err(e);
        }

        info!(
            subsystem = "catalog",
            component = "registry",
            op = "save_category",
            owner_id = %owner,
            category = key,
            fields = category.fields.len(),
            replaced = previous.is_some(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Category saved"
        );

        let migration = match (&previous, migrate) {
            (Some(old), true) => Some(
                self.migration
                    .migrate(owner, key, &old.fields, &category.fields)
                    .await?,
            ),
            _ => None,
        };

        Ok(SavedCategory {
            category,
            replaced: previous.is_some(),
            migration,
        })
    }

    /// Remove a category, optionally deleting its records.
    ///
    /// Records are selected by exact category key before the entry is removed.
    /// Per-record delete failures are counted, not returned.
    pub async fn delete(
        &self,
        owner: OwnerId,
        request: DeleteCategoryRequest,
    ) -> Result<DeleteCategoryResponse> {
        let key = request.key.as_str();
        let mut set = self.categories.load(owner).await?;
        if !set.contains(key) {
            return Err(Error::CategoryNotFound(key.to_string()));
        }

        let doomed = if request.cascade_delete_records {
            self.records.list(owner, Some(key)).await?
        } else {
            Vec::new()
        };

        let removed = set.remove(key);
        self.categories.save(owner, &set).await?;
        let name = removed.map(|c| c.name).unwrap_or_else(|| key.to_string());

        let outcome = self
            .runner
            .run("cascade_delete", doomed, |record| {
                let repo = self.records.clone();
                async move {
                    repo.delete(owner, record.id).await?;
                    Ok::<_, Error>(true)
                }
            })
            .await;

        info!(
            subsystem = "catalog",
            component = "registry",
            op = "delete_category",
            owner_id = %owner,
            category = key,
            cascade = request.cascade_delete_records,
            deleted = outcome.changed,
            failed = outcome.failed,
            "Category deleted"
        );

        let message = if request.cascade_delete_records {
            format!(
                "Category '{}' deleted along with {} records",
                name, outcome.changed
            )
        } else {
            format!("Category '{}' deleted", name)
        };

        Ok(DeleteCategoryResponse {
            message,
            deleted_records: outcome.changed,
            failed_records: outcome.failed,
        })
    }
}
