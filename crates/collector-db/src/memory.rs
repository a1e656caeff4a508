//! In-process record repository.
//!
//! Backs tests and embedded single-user setups that run without Postgres.
//! Same owner-scoping rules as the Postgres store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use collector_core::{
    new_v7, Error, FieldPatch, NewRecord, OwnerId, Record, RecordRepository, Result,
};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryRecordRepository {
    records: RwLock<HashMap<Uuid, Record>>,
}

impl MemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records across all owners.
    pub async fn total(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl RecordRepository for MemoryRecordRepository {
    async fn insert(&self, owner: OwnerId, record: NewRecord) -> Result<Record> {
        let now = Utc::now();
        let stored = Record {
            id: new_v7(),
            owner_id: owner,
            category: record.category,
            fields: record.fields,
            created_at: now,
            updated_at: now,
        };
        self.records.write().await.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn fetch(&self, owner: OwnerId, id: Uuid) -> Result<Record> {
        self.records
            .read()
            .await
            .get(&id)
            .filter(|r| r.owner_id == owner)
            .cloned()
            .ok_or(Error::RecordNotFound(id))
    }

    async fn list(&self, owner: OwnerId, category: Option<&str>) -> Result<Vec<Record>> {
        let records = self.records.read().await;
        let mut matching: Vec<Record> = records
            .values()
            .filter(|r| r.owner_id == owner)
            .filter(|r| category.map_or(true, |c| r.category == c))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(matching)
    }

    async fn update_fields(&self, owner: OwnerId, id: Uuid, patch: &FieldPatch) -> Result<Record> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .filter(|r| r.owner_id == owner)
            .ok_or(Error::RecordNotFound(id))?;

        patch.apply_to(&mut record.fields);
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete(&self, owner: OwnerId, id: Uuid) -> Result<()> {
        let mut records = self.records.write().await;
        match records.get(&id) {
            Some(r) if r.owner_id == owner => {
                records.remove(&id);
                Ok(())
            }
            _ => Err(Error::RecordNotFound(id)),
        }
    }

    async fn count(&self, owner: OwnerId, category: Option<&str>) -> Result<i64> {
        Ok(self.list(owner, category).await?.len() as i64)
    }
}
