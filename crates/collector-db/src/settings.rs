//! File-backed settings repository.

use std::sync::Arc;

use async_trait::async_trait;
use collector_core::{defaults, OwnerId, Result, Settings, SettingsRepository};

use crate::file_storage::{owner_document_path, FilesystemBackend, StorageBackend};

pub struct FileSettingsRepository {
    backend: Arc<dyn StorageBackend>,
}

impl FileSettingsRepository {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn on_disk(data_dir: impl Into<std::path::PathBuf>) -> Self {
        Self::new(Arc::new(FilesystemBackend::new(data_dir)))
    }
}

#[async_trait]
impl SettingsRepository for FileSettingsRepository {
    async fn load(&self, owner: OwnerId) -> Result<Settings> {
        let path = owner_document_path(owner, defaults::SETTINGS_FILE);
        if !self.backend.exists(&path).await? {
            return Ok(Settings::default());
        }
        let bytes = self.backend.read(&path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save(&self, owner: OwnerId, settings: &Settings) -> Result<()> {
        let mut bytes = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(defaults::DOCUMENT_INDENT);
        let mut ser = serde_json::Serializer::with_formatter(&mut bytes, formatter);
        serde::Serialize::serialize(settings, &mut ser)?;

        self.backend
            .write(&owner_document_path(owner, defaults::SETTINGS_FILE), &bytes)
            .await
    }
}
