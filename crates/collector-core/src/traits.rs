//! Core traits for the catalog's external collaborators.
//!
//! Concrete implementations live in `collector-db` (file documents, Postgres,
//! in-memory) so the registry and migration engine can be exercised against
//! any backend.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// CONFIG DOCUMENTS
// =============================================================================

/// Per-owner category document, read fully and written fully.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Load the owner's categories. A missing document is an empty set.
    async fn load(&self, owner: OwnerId) -> Result<CategorySet>;

    /// Replace the owner's whole category document.
    ///
    /// Must be atomic: on failure the previous document stays intact.
    async fn save(&self, owner: OwnerId, categories: &CategorySet) -> Result<()>;
}

/// Per-owner settings document.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Load settings, falling back to defaults when none were saved.
    async fn load(&self, owner: OwnerId) -> Result<Settings>;

    async fn save(&self, owner: OwnerId, settings: &Settings) -> Result<()>;
}

// =============================================================================
// RECORD STORE
// =============================================================================

/// Request for inserting a record.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub category: String,
    pub fields: FieldMap,
}

/// Owner-scoped document store for records.
///
/// Every method filters by owner; a record owned by someone else is reported
/// as not found.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    async fn insert(&self, owner: OwnerId, record: NewRecord) -> Result<Record>;

    /// Fetch a record by id.
    async fn fetch(&self, owner: OwnerId, id: Uuid) -> Result<Record>;

    /// List records, optionally only those whose category equals `category`.
    async fn list(&self, owner: OwnerId, category: Option<&str>) -> Result<Vec<Record>>;

    /// Apply a set/unset patch to one record in a single write.
    async fn update_fields(&self, owner: OwnerId, id: Uuid, patch: &FieldPatch) -> Result<Record>;

    /// Delete a record by id.
    async fn delete(&self, owner: OwnerId, id: Uuid) -> Result<()>;

    /// Count records, optionally restricted to one category.
    async fn count(&self, owner: OwnerId, category: Option<&str>) -> Result<i64>;
}

// =============================================================================
// AUTH
// =============================================================================

/// Resolves a bearer token to the owner it was issued for.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Fails with `AccessDenied` for unknown or expired tokens.
    async fn validate(&self, token: &str) -> Result<OwnerId>;
}
