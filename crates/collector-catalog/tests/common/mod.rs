//! Shared harness: file-backed documents in a temp dir, in-memory records.

#![allow(dead_code)]

use std::sync::Arc;

use collector_catalog::{Catalog, FormInput, StaticTokenValidator};
use collector_core::{
    CategoryDraft, CategoryRepository, FieldDefinition, FieldInput, FieldType, OwnerId,
    RecordRepository, SaveCategoryRequest,
};
use collector_db::{FileCategoryRepository, FileSettingsRepository, MemoryRecordRepository};
use tempfile::TempDir;
use uuid::Uuid;

pub const TOKEN: &str = "test-token";

pub struct Harness {
    pub catalog: Catalog,
    pub records: Arc<MemoryRecordRepository>,
    pub owner: OwnerId,
    pub dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let records = Arc::new(MemoryRecordRepository::new());
        Self::with_records(records.clone(), records)
    }

    /// Harness whose catalog talks to `store`; `records` stays available
    /// for direct inspection.
    pub fn with_records(
        store: Arc<dyn RecordRepository>,
        records: Arc<MemoryRecordRepository>,
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let categories: Arc<dyn CategoryRepository> =
            Arc::new(FileCategoryRepository::on_disk(dir.path()));
        Self::build(categories, store, records, dir)
    }

    pub fn build(
        categories: Arc<dyn CategoryRepository>,
        store: Arc<dyn RecordRepository>,
        records: Arc<MemoryRecordRepository>,
        dir: TempDir,
    ) -> Self {
        let owner = OwnerId(Uuid::new_v4());
        let catalog = Catalog::new(
            categories,
            Arc::new(FileSettingsRepository::on_disk(dir.path())),
            store,
            Arc::new(StaticTokenValidator::new().with_token(TOKEN, owner)),
            4,
        );
        Self {
            catalog,
            records,
            owner,
            dir,
        }
    }
}

pub fn field(label: &str, field_type: FieldType) -> FieldDefinition {
    FieldDefinition::from_label(label, field_type)
}

pub fn save_request(
    key: Option<&str>,
    name: &str,
    fields: Vec<FieldDefinition>,
    migrate: bool,
) -> SaveCategoryRequest {
    SaveCategoryRequest {
        key: key.map(str::to_string),
        category: CategoryDraft {
            name: name.to_string(),
            fields,
        },
        migrate,
    }
}

pub fn form(pairs: &[(&str, FieldInput)]) -> FormInput {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

pub fn text(s: &str) -> FieldInput {
    FieldInput::Text(s.to_string())
}
