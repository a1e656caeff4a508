//! Document storage backends for per-owner config files.
//!
//! Category and settings documents are small JSON files that are always read
//! and written whole. Writes go through a temp file that is synced and then
//! renamed over the target, so a failed write never leaves a half-written
//! document behind.
//!
//! ## Layout
//!
//! ```text
//! {data_dir}/users/{owner_id}/categories.json
//! {data_dir}/users/{owner_id}/settings.json
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use collector_core::{defaults, Error, OwnerId, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Storage backend for whole-document reads and writes.
///
/// Allows swapping the local filesystem for another provider (or a failing
/// backend in tests).
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Atomically replace the document at `path`.
    async fn write(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Read the document at `path`.
    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Delete the document at `path` if present.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Check if a document exists at `path`.
    async fn exists(&self, path: &str) -> Result<bool>;
}

/// Relative path of an owner's document.
pub fn owner_document_path(owner: OwnerId, file_name: &str) -> String {
    format!("{}/{}/{}", defaults::OWNERS_DIR, owner, file_name)
}

/// Local filesystem backend rooted at the application data directory.
#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    base_path: PathBuf,
}

impl FilesystemBackend {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }

    /// Check that the data directory accepts writes, reads and deletes.
    ///
    /// Run once at startup so permission problems surface before the first
    /// category save.
    pub async fn validate(&self) -> Result<()> {
        let check_path = ".health-check/check.json";
        let data = b"{}";

        self.write(check_path, data).await?;
        let read_back = self.read(check_path).await?;
        if read_back != data {
            return Err(Error::Storage(format!(
                "read-back mismatch in {}",
                self.base_path.display()
            )));
        }
        self.delete(check_path).await?;
        let _ = fs::remove_dir(self.full_path(".health-check")).await;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path);
        debug!(storage_path = %path, size = data.len(), "file_storage: write");

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                warn!(parent = %parent.display(), error = %e, "file_storage: create_dir_all failed");
                e
            })?;
        }

        // Atomic write: temp file + rename
        let temp_path = full_path.with_extension("tmp");
        let result = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(data).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp_path, &full_path).await
        }
        .await;

        if let Err(e) = result {
            warn!(
                target_path = %full_path.display(),
                error = %e,
                "file_storage: atomic write failed, previous document kept"
            );
            let _ = fs::remove_file(&temp_path).await;
            return Err(Error::Io(e));
        }

        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.full_path(path)).await?)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let full_path = self.full_path(path);
        if fs::try_exists(&full_path).await? {
            fs::remove_file(full_path).await?;
        }
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(fs::try_exists(self.full_path(path)).await?)
    }
}
