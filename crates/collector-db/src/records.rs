//! PostgreSQL implementation of RecordRepository.
//!
//! Records live in one table with the schema-less field map in a JSONB
//! column. Every statement is filtered by `owner_id`.

use async_trait::async_trait;
use chrono::Utc;
use collector_core::{
    new_v7, Error, FieldMap, FieldPatch, NewRecord, OwnerId, Record, RecordRepository, Result,
};
use serde_json::Value as JsonValue;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

const RECORD_COLUMNS: &str = "id, owner_id, category, fields, created_at, updated_at";

pub struct PgRecordRepository {
    pool: Pool<Postgres>,
}

impl PgRecordRepository {
    /// Create a new PgRecordRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &PgRow) -> Result<Record> {
    let fields: JsonValue = row.try_get("fields").map_err(Error::Database)?;
    let fields: FieldMap = match fields {
        JsonValue::Object(map) => map,
        JsonValue::Null => FieldMap::new(),
        other => {
            return Err(Error::Serialization(format!(
                "record fields must be an object, got {}",
                other
            )))
        }
    };

    Ok(Record {
        id: row.try_get("id").map_err(Error::Database)?,
        owner_id: OwnerId(row.try_get("owner_id").map_err(Error::Database)?),
        category: row.try_get("category").map_err(Error::Database)?,
        fields,
        created_at: row.try_get("created_at").map_err(Error::Database)?,
        updated_at: row.try_get("updated_at").map_err(Error::Database)?,
    })
}

#[async_trait]
impl RecordRepository for PgRecordRepository {
    async fn insert(&self, owner: OwnerId, record: NewRecord) -> Result<Record> {
        let id = new_v7();
        let now = Utc::now();

        let row = sqlx::query(&format!(
            "INSERT INTO collection_record (id, owner_id, category, fields, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $5)
             RETURNING {RECORD_COLUMNS}"
        ))
        .bind(id)
        .bind(owner.as_uuid())
        .bind(&record.category)
        .bind(JsonValue::Object(record.fields))
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        record_from_row(&row)
    }

    async fn fetch(&self, owner: OwnerId, id: Uuid) -> Result<Record> {
        let row = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM collection_record WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(row) => record_from_row(&row),
            None => Err(Error::RecordNotFound(id)),
        }
    }

    async fn list(&self, owner: OwnerId, category: Option<&str>) -> Result<Vec<Record>> {
        let rows = if let Some(category) = category {
            sqlx::query(&format!(
                "SELECT {RECORD_COLUMNS} FROM collection_record
                 WHERE owner_id = $1 AND category = $2
                 ORDER BY created_at, id"
            ))
            .bind(owner.as_uuid())
            .bind(category)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?
        } else {
            sqlx::query(&format!(
                "SELECT {RECORD_COLUMNS} FROM collection_record
                 WHERE owner_id = $1
                 ORDER BY created_at, id"
            ))
            .bind(owner.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?
        };

        rows.iter().map(record_from_row).collect()
    }

    async fn update_fields(&self, owner: OwnerId, id: Uuid, patch: &FieldPatch) -> Result<Record> {
        // unset first, then merge the set map, in one statement
        let row = sqlx::query(&format!(
            "UPDATE collection_record
             SET fields = (fields - $3::text[]) || $4::jsonb,
                 updated_at = $5
             WHERE id = $1 AND owner_id = $2
             RETURNING {RECORD_COLUMNS}"
        ))
        .bind(id)
        .bind(owner.as_uuid())
        .bind(&patch.unset)
        .bind(JsonValue::Object(patch.set.clone()))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(row) => {
                debug!(
                    record_id = %id,
                    set = patch.set.len(),
                    unset = patch.unset.len(),
                    "Record fields updated"
                );
                record_from_row(&row)
            }
            None => Err(Error::RecordNotFound(id)),
        }
    }

    async fn delete(&self, owner: OwnerId, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM collection_record WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound(id));
        }
        Ok(())
    }

    async fn count(&self, owner: OwnerId, category: Option<&str>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM collection_record
             WHERE owner_id = $1 AND ($2::text IS NULL OR category = $2)",
        )
        .bind(owner.as_uuid())
        .bind(category)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(count)
    }
}
