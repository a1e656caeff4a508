//! Whole-account export and import.
//!
//! An export bundles categories, records and settings of one owner. Import
//! replays a bundle into another (or the same) account: categories first,
//! then records under fresh ids, then settings.
//!
//! Imported items may be in the exported shape (`fields` nested under the
//! record) or the older flat shape where field values sit next to
//! `category` together with document metadata such as `_id` and `userId`.

use chrono::{DateTime, Utc};
use collector_core::{CategorySet, FieldMap, NewRecord, OwnerId, Record, Result, Settings};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{info, warn};

use crate::Catalog;

/// Item keys that describe the stored document rather than the collected
/// object; they never become fields.
const ITEM_METADATA: &[&str] = &[
    "_id",
    "__v",
    "id",
    "userId",
    "ownerId",
    "owner_id",
    "createdAt",
    "created_at",
    "updatedAt",
    "updated_at",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    #[serde(default)]
    pub categories: CategorySet,
    #[serde(default)]
    pub items: Vec<Record>,
    #[serde(default)]
    pub settings: Settings,
    pub export_date: DateTime<Utc>,
}

/// Bundle accepted by [`Catalog::import`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBundle {
    #[serde(default)]
    pub categories: CategorySet,
    #[serde(default)]
    pub items: Vec<ImportItem>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub export_date: Option<DateTime<Utc>>,
}

impl ImportBundle {
    /// Parse a bundle, restoring category keys.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let mut bundle: ImportBundle = serde_json::from_slice(bytes)?;
        bundle.categories.restore_keys();
        Ok(bundle)
    }
}

impl From<ExportBundle> for ImportBundle {
    fn from(bundle: ExportBundle) -> Self {
        Self {
            categories: bundle.categories,
            items: bundle.items.into_iter().map(ImportItem::from).collect(),
            settings: bundle.settings,
            export_date: Some(bundle.export_date),
        }
    }
}

/// One record of an import bundle, in either item shape.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportItem {
    #[serde(default)]
    pub category: String,
    #[serde(flatten)]
    pub rest: FieldMap,
}

impl ImportItem {
    /// Id the item carried in its source account, for logging.
    pub fn source_id(&self) -> Option<String> {
        self.rest
            .get("_id")
            .or_else(|| self.rest.get("id"))
            .map(|id| match id {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            })
    }

    /// Field values of the item with document metadata removed.
    ///
    /// A nested `fields` object wins; otherwise the remaining top-level keys
    /// are the fields.
    pub fn into_fields(self) -> FieldMap {
        let mut rest = self.rest;
        match rest.remove("fields") {
            Some(JsonValue::Object(nested)) => nested,
            Some(other) => {
                rest.insert("fields".to_string(), other);
                strip_metadata(rest)
            }
            None => strip_metadata(rest),
        }
    }
}

impl From<Record> for ImportItem {
    fn from(record: Record) -> Self {
        let mut rest = FieldMap::new();
        rest.insert("id".to_string(), JsonValue::String(record.id.to_string()));
        rest.insert("fields".to_string(), JsonValue::Object(record.fields));
        Self {
            category: record.category,
            rest,
        }
    }
}

fn strip_metadata(mut fields: FieldMap) -> FieldMap {
    for key in ITEM_METADATA {
        fields.remove(*key);
    }
    fields
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub categories: usize,
    pub skipped_categories: usize,
    pub items: usize,
    pub failed_items: usize,
    pub settings: bool,
}

impl Catalog {
    pub async fn export(&self, owner: OwnerId) -> Result<ExportBundle> {
        let bundle = ExportBundle {
            categories: self.registry.read_all(owner).await?,
            items: self.records.list(owner, None).await?,
            settings: self.settings.get(owner).await?,
            export_date: Utc::now(),
        };
        info!(
            subsystem = "catalog",
            component = "export",
            op = "export",
            owner_id = %owner,
            categories = bundle.categories.len(),
            items = bundle.items.len(),
            "Account exported"
        );
        Ok(bundle)
    }

    /// Import a bundle into `owner`'s account.
    ///
    /// Categories replace same-key entries without migrating records. Invalid
    /// categories and records that fail to insert are logged and skipped.
    /// Record ids and owners from the bundle are discarded.
    pub async fn import(&self, owner: OwnerId, bundle: ImportBundle) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();

        for category in bundle.categories.iter() {
            match self
                .registry
                .create_or_replace(owner, &category.key, category.clone(), false)
                .await
            {
                Ok(_) => summary.categories += 1,
                Err(e) if e.is_validation() => {
                    warn!(
                        subsystem = "catalog",
                        component = "import",
                        category = %category.key,
                        error = %e,
                        "Skipping invalid category"
                    );
                    summary.skipped_categories += 1;
                }
                Err(e) => return Err(e),
            }
        }

        for item in bundle.items {
            let source_id = item.source_id().unwrap_or_default();
            if item.category.trim().is_empty() {
                warn!(
                    subsystem = "catalog",
                    component = "import",
                    source_record_id = %source_id,
                    "Skipping record without a category"
                );
                summary.failed_items += 1;
                continue;
            }
            let new = NewRecord {
                category: item.category.clone(),
                fields: item.into_fields(),
            };
            match self.record_store.insert(owner, new).await {
                Ok(_) => summary.items += 1,
                Err(e) => {
                    warn!(
                        subsystem = "catalog",
                        component = "import",
                        source_record_id = %source_id,
                        error = %e,
                        "Skipping record"
                    );
                    summary.failed_items += 1;
                }
            }
        }

        self.settings.save(owner, &bundle.settings).await?;
        summary.settings = true;

        info!(
            subsystem = "catalog",
            component = "import",
            op = "import",
            owner_id = %owner,
            categories = summary.categories,
            items = summary.items,
            failed = summary.failed_items,
            "Account imported"
        );
        Ok(summary)
    }
}
