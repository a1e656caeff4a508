//! File-backed category repository.
//!
//! One JSON document per owner holds every category. The document is loaded
//! for each operation; nothing is cached between calls.

use std::sync::Arc;

use async_trait::async_trait;
use collector_core::{defaults, CategoryRepository, CategorySet, OwnerId, Result};
use tracing::debug;

use crate::file_storage::{owner_document_path, FilesystemBackend, StorageBackend};

pub struct FileCategoryRepository {
    backend: Arc<dyn StorageBackend>,
}

impl FileCategoryRepository {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Repository over a filesystem data directory.
    pub fn on_disk(data_dir: impl Into<std::path::PathBuf>) -> Self {
        Self::new(Arc::new(FilesystemBackend::new(data_dir)))
    }

    fn path(owner: OwnerId) -> String {
        owner_document_path(owner, defaults::CATEGORIES_FILE)
    }
}

#[async_trait]
impl CategoryRepository for FileCategoryRepository {
    async fn load(&self, owner: OwnerId) -> Result<CategorySet> {
        let path = Self::path(owner);
        if !self.backend.exists(&path).await? {
            debug!(owner_id = %owner, "No category document yet");
            return Ok(CategorySet::new());
        }

        let bytes = self.backend.read(&path).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(CategorySet::new());
        }
        CategorySet::from_json(&bytes)
    }

    async fn save(&self, owner: OwnerId, categories: &CategorySet) -> Result<()> {
        let bytes = categories.to_json_pretty()?;
        self.backend.write(&Self::path(owner), &bytes).await?;
        debug!(owner_id = %owner, count = categories.len(), "Category document written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collector_core::{Category, FieldDefinition, FieldType};
    use uuid::Uuid;

    fn owner() -> OwnerId {
        OwnerId(Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_load_missing_document_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileCategoryRepository::on_disk(dir.path());
        assert!(repo.load(owner()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_seeded_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path());
        let owner = owner();
        backend
            .write(&owner_document_path(owner, "categories.json"), b"{}")
            .await
            .unwrap();

        let repo = FileCategoryRepository::new(Arc::new(backend));
        assert!(repo.load(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileCategoryRepository::on_disk(dir.path());
        let owner = owner();

        let mut set = CategorySet::new();
        set.insert(
            "comics",
            Category::new(
                "comics",
                "Comics",
                vec![FieldDefinition::from_label("Title", FieldType::Text)],
            ),
        );
        repo.save(owner, &set).await.unwrap();

        let loaded = repo.load(owner).await.unwrap();
        assert_eq!(loaded, set);
        assert_eq!(loaded.get("comics").unwrap().key, "comics");
    }

    #[tokio::test]
    async fn test_owners_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileCategoryRepository::on_disk(dir.path());
        let (a, b) = (owner(), owner());

        let mut set = CategorySet::new();
        set.insert("coins", Category::new("coins", "Coins", vec![]));
        repo.save(a, &set).await.unwrap();

        assert!(repo.load(b).await.unwrap().is_empty());
        assert_eq!(repo.load(a).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_document_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path());
        let owner = owner();
        backend
            .write(&owner_document_path(owner, "categories.json"), b"{not json")
            .await
            .unwrap();

        let repo = FileCategoryRepository::new(Arc::new(backend));
        let err = repo.load(owner).await.unwrap_err();
        assert_eq!(err.kind(), collector_core::ErrorKind::Storage);
    }
}
