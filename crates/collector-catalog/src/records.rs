//! Record operations against the owner's category schemas.

use std::collections::BTreeMap;
use std::sync::Arc;

use collector_core::{
    coerce_input, CategoryRepository, Error, FieldDefinition, FieldInput, FieldMap, FieldPatch,
    FieldValue, NewRecord, OwnerId, Record, RecordRepository, Result, TableView,
};
use tracing::{debug, info};
use uuid::Uuid;

/// Submitted form values keyed by field name.
pub type FormInput = BTreeMap<String, FieldInput>;

#[derive(Clone)]
pub struct RecordService {
    categories: Arc<dyn CategoryRepository>,
    records: Arc<dyn RecordRepository>,
}

impl RecordService {
    pub fn new(categories: Arc<dyn CategoryRepository>, records: Arc<dyn RecordRepository>) -> Self {
        Self {
            categories,
            records,
        }
    }

    /// Create a record in `category`.
    ///
    /// Every submitted value is coerced against its definition before anything
    /// is written. Declared fields missing from the form get their type default,
    /// so an unchecked checkbox that was never sent is stored as `false`.
    pub async fn create(&self, owner: OwnerId, category: &str, input: FormInput) -> Result<Record> {
        let schema = self
            .categories
            .load(owner)
            .await?
            .get(category)
            .cloned()
            .ok_or_else(|| Error::CategoryNotFound(category.to_string()))?;

        if let Some(unknown) = input.keys().find(|name| schema.field(name).is_none()) {
            return Err(Error::invalid_field(
                unknown.as_str(),
                format!("not a field of category '{}'", category),
            ));
        }

        let mut fields = FieldMap::new();
        for def in &schema.fields {
            let value = match input.get(&def.name) {
                Some(raw) => coerce_input(def, raw)?,
                None => def.field_type.default_value(),
            };
            fields.insert(def.name.clone(), value);
        }

        let record = self
            .records
            .insert(
                owner,
                NewRecord {
                    category: category.to_string(),
                    fields,
                },
            )
            .await?;

        info!(
            subsystem = "catalog",
            component = "records",
            op = "create",
            owner_id = %owner,
            category,
            record_id = %record.id,
            "Record created"
        );
        Ok(record)
    }

    pub async fn fetch(&self, owner: OwnerId, id: Uuid) -> Result<Record> {
        self.records.fetch(owner, id).await
    }

    /// Update some fields of a record.
    ///
    /// Values are coerced against the category's current definitions. A field
    /// the schema no longer declares but the record still holds is coerced to
    /// the shape of its stored value. Anything else is rejected.
    pub async fn update(&self, owner: OwnerId, id: Uuid, input: FormInput) -> Result<Record> {
        let record = self.records.fetch(owner, id).await?;
        let schema = self.categories.load(owner).await?.get(&record.category).cloned();

        let mut patch = FieldPatch::default();
        for (name, raw) in &input {
            let def = match schema.as_ref().and_then(|c| c.field(name)) {
                Some(def) => def.clone(),
                None => stored_shape(name, record.fields.get(name)).ok_or_else(|| {
                    Error::invalid_field(
                        name.as_str(),
                        format!("not a field of category '{}'", record.category),
                    )
                })?,
            };
            patch.set.insert(name.clone(), coerce_input(&def, raw)?);
        }

        if patch.is_empty() {
            return Ok(record);
        }

        debug!(
            subsystem = "catalog",
            component = "records",
            record_id = %id,
            fields = patch.set.len(),
            "Updating record"
        );
        self.records.update_fields(owner, id, &patch).await
    }

    pub async fn delete(&self, owner: OwnerId, id: Uuid) -> Result<()> {
        self.records.delete(owner, id).await?;
        info!(
            subsystem = "catalog",
            component = "records",
            op = "delete",
            owner_id = %owner,
            record_id = %id,
            "Record deleted"
        );
        Ok(())
    }

    /// All records, or only those whose category equals `category`.
    pub async fn list(&self, owner: OwnerId, category: Option<&str>) -> Result<Vec<Record>> {
        self.records.list(owner, category).await
    }

    /// Number of records, or of those whose category equals `category`.
    pub async fn count(&self, owner: OwnerId, category: Option<&str>) -> Result<i64> {
        self.records.count(owner, category).await
    }

    /// Table view of a listing, rendered against the category schema when one
    /// is selected and known.
    pub async fn table(&self, owner: OwnerId, category: Option<&str>) -> Result<TableView> {
        let records = self.records.list(owner, category).await?;
        let schema = match category {
            Some(key) => self.categories.load(owner).await?.get(key).cloned(),
            None => None,
        };
        Ok(TableView::build(schema.as_ref(), &records))
    }
}

/// Definition matching the shape of a value a record already holds.
fn stored_shape(name: &str, stored: Option<&serde_json::Value>) -> Option<FieldDefinition> {
    let value = FieldValue::infer(stored?)?;
    Some(FieldDefinition {
        name: name.to_string(),
        label: String::new(),
        field_type: value.field_type(),
    })
}
