//! Core data models for the collector catalog.
//!
//! These types are shared across all collector crates and represent the
//! categories, field definitions, records and settings of one owner.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use crate::defaults;
use crate::error::{Error, Result};
use crate::slug::derive_key;

/// Field name → stored value, the schema-less part of a record.
pub type FieldMap = Map<String, JsonValue>;

// =============================================================================
// OWNER
// =============================================================================

/// Identity every category and record is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub Uuid);

impl OwnerId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for OwnerId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

// =============================================================================
// FIELD DEFINITIONS
// =============================================================================

/// Declared type of a category field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Boolean,
}

impl FieldType {
    /// Value written into records that gain this field during migration.
    pub fn default_value(&self) -> JsonValue {
        match self {
            FieldType::Text => JsonValue::String(String::new()),
            FieldType::Number => JsonValue::from(0),
            FieldType::Boolean => JsonValue::Bool(false),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Text => write!(f, "text"),
            FieldType::Number => write!(f, "number"),
            FieldType::Boolean => write!(f, "boolean"),
        }
    }
}

impl std::str::FromStr for FieldType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(FieldType::Text),
            "number" => Ok(FieldType::Number),
            "boolean" => Ok(FieldType::Boolean),
            other => Err(Error::Validation(format!("unknown field type '{}'", other))),
        }
    }
}

/// One named, typed slot within a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Slug identifier, unique within the category.
    #[serde(default)]
    pub name: String,
    /// Text shown to the user.
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldDefinition {
    /// Build a definition whose name is derived from the label.
    pub fn from_label(label: impl Into<String>, field_type: FieldType) -> Self {
        let label = label.into();
        Self {
            name: derive_key(&label),
            label,
            field_type,
        }
    }

    /// Label for display, falling back to the humanized name.
    pub fn display_label(&self) -> String {
        if self.label.trim().is_empty() {
            crate::slug::humanize_label(&self.name)
        } else {
            self.label.clone()
        }
    }
}

// =============================================================================
// CATEGORIES
// =============================================================================

/// A user-defined schema: display name plus ordered field definitions.
///
/// `key` is the entry's position in the owner's [`CategorySet`] and is not
/// written inside the stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(skip)]
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl Category {
    pub fn new(key: impl Into<String>, name: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            fields,
        }
    }

    /// Look up a field definition by name.
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Declared field names in schema order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Check the category is saveable and normalize its field names.
    ///
    /// Blank field names are derived from their labels. Fails on a blank
    /// category name, an empty field list, a field without label, or two
    /// fields whose names collide.
    pub fn validate(&mut self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("category name is required".to_string()));
        }
        if self.fields.is_empty() {
            return Err(Error::Validation(format!(
                "category '{}' needs at least one field",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for field in &mut self.fields {
            if field.label.trim().is_empty() && field.name.trim().is_empty() {
                return Err(Error::Validation(format!(
                    "category '{}' has a field without a label",
                    self.name
                )));
            }
            if field.label.trim().is_empty() {
                return Err(Error::invalid_field(&field.name, "label is required"));
            }
            if field.name.trim().is_empty() {
                field.name = derive_key(&field.label);
            }
            if !seen.insert(field.name.clone()) {
                return Err(Error::invalid_field(
                    &field.name,
                    format!("duplicate field name in category '{}'", self.name),
                ));
            }
        }
        Ok(())
    }
}

/// All categories of one owner, keyed by category key.
///
/// Serialized as `{ "<key>": { "name": ..., "fields": [...] } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySet {
    entries: BTreeMap<String, Category>,
}

impl CategorySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a stored document, restoring each category's key.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let mut set: CategorySet = serde_json::from_slice(bytes)?;
        set.restore_keys();
        Ok(set)
    }

    /// Copy each map key into its category after plain deserialization.
    pub fn restore_keys(&mut self) {
        for (key, category) in self.entries.iter_mut() {
            category.key = key.clone();
        }
    }

    /// Render the document with four-space indentation.
    pub fn to_json_pretty(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(defaults::DOCUMENT_INDENT);
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(buf)
    }

    pub fn get(&self, key: &str) -> Option<&Category> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or fully replace the category stored under `key`.
    pub fn insert(&mut self, key: &str, mut category: Category) -> Option<Category> {
        category.key = key.to_string();
        self.entries.insert(key.to_string(), category)
    }

    pub fn remove(&mut self, key: &str) -> Option<Category> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.entries.values()
    }

    /// Categories ordered by display name (case-insensitive), then key.
    pub fn sorted_by_name(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self.entries.values().cloned().collect();
        categories.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.key.cmp(&b.key))
        });
        categories
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// A stored collection item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub owner_id: OwnerId,
    /// Category key this record belongs to (not enforced as a foreign key).
    pub category: String,
    #[serde(default)]
    pub fields: FieldMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Single-write change to a record's field map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldPatch {
    /// Fields to set (insert or overwrite).
    #[serde(default)]
    pub set: FieldMap,
    /// Fields to remove entirely.
    #[serde(default)]
    pub unset: Vec<String>,
}

impl FieldPatch {
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.unset.is_empty()
    }

    /// Apply the patch to an in-memory field map.
    pub fn apply_to(&self, fields: &mut FieldMap) {
        for name in &self.unset {
            fields.remove(name);
        }
        for (name, value) in &self.set {
            fields.insert(name.clone(), value.clone());
        }
    }
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Per-owner UI settings. Keys the catalog does not know are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonValue>,
}

fn default_theme() -> String {
    defaults::THEME.to_string()
}

fn default_language() -> String {
    defaults::LANGUAGE.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            theme: default_theme(),
            language: default_language(),
            extra: BTreeMap::new(),
        }
    }
}

// =============================================================================
// REQUESTS / RESPONSES
// =============================================================================

/// Category body as submitted by a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl From<CategoryDraft> for Category {
    fn from(draft: CategoryDraft) -> Self {
        Category {
            key: String::new(),
            name: draft.name,
            fields: draft.fields,
        }
    }
}

/// Save (create or fully replace) a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveCategoryRequest {
    /// Existing key to replace; derived from the name when absent.
    #[serde(default)]
    pub key: Option<String>,
    pub category: CategoryDraft,
    /// Reconcile existing records with the new field list.
    #[serde(default)]
    pub migrate: bool,
}

/// Outcome of a migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Records selected for the category.
    pub matched: usize,
    /// Records written.
    pub updated: usize,
    /// Records whose update failed.
    pub failed: usize,
}

impl MigrationReport {
    /// True when every needed update was applied.
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveCategoryResponse {
    pub key: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migration: Option<MigrationReport>,
}

/// Delete a category, optionally with its records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteCategoryRequest {
    pub key: String,
    #[serde(default)]
    pub cascade_delete_records: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteCategoryResponse {
    pub message: String,
    pub deleted_records: usize,
    pub failed_records: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn comics() -> Category {
        Category::new(
            "comics",
            "Comics",
            vec![
                FieldDefinition::from_label("Title", FieldType::Text),
                FieldDefinition::from_label("Signed", FieldType::Boolean),
            ],
        )
    }

    #[test]
    fn test_field_type_serialization() {
        let types = vec![
            (FieldType::Text, "text"),
            (FieldType::Number, "number"),
            (FieldType::Boolean, "boolean"),
        ];
        for (ty, expected) in types {
            let json = serde_json::to_string(&ty).unwrap();
            assert_eq!(json, format!("\"{}\"", expected));
            assert_eq!(expected.parse::<FieldType>().unwrap(), ty);
        }
        assert!("date".parse::<FieldType>().is_err());
    }

    #[test]
    fn test_field_type_defaults() {
        assert_eq!(FieldType::Text.default_value(), json!(""));
        assert_eq!(FieldType::Number.default_value(), json!(0));
        assert_eq!(FieldType::Boolean.default_value(), json!(false));
    }

    #[test]
    fn test_field_from_label_derives_name() {
        let field = FieldDefinition::from_label("Purchase Price", FieldType::Number);
        assert_eq!(field.name, "purchase_price");
        assert_eq!(field.label, "Purchase Price");
    }

    #[test]
    fn test_field_definition_wire_format() {
        let field: FieldDefinition =
            serde_json::from_value(json!({"name": "signed", "type": "boolean"})).unwrap();
        assert_eq!(field.field_type, FieldType::Boolean);
        assert_eq!(field.label, "");
        assert_eq!(field.display_label(), "Signed");

        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["type"], "boolean");
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let mut category = comics();
        category.name = "   ".to_string();
        assert!(category.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let mut category = Category::new("empty", "Empty", vec![]);
        let err = category.validate().unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("Empty"));
    }

    #[test]
    fn test_validate_rejects_duplicate_field_names() {
        let mut category = comics();
        category
            .fields
            .push(FieldDefinition::from_label("title", FieldType::Text));
        let err = category.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidField { ref field, .. } if field == "title"));
    }

    #[test]
    fn test_validate_derives_missing_field_names() {
        let mut category = comics();
        category.fields.push(FieldDefinition {
            name: String::new(),
            label: "Cover Artist".to_string(),
            field_type: FieldType::Text,
        });
        category.validate().unwrap();
        assert_eq!(category.fields[2].name, "cover_artist");
    }

    #[test]
    fn test_validate_rejects_field_without_label() {
        let mut category = comics();
        category.fields.push(FieldDefinition {
            name: "grade".to_string(),
            label: " ".to_string(),
            field_type: FieldType::Number,
        });
        assert!(category.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_category_set_document_layout() {
        let mut set = CategorySet::new();
        set.insert("comics", comics());

        let bytes = set.to_json_pretty().unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("\n    \"comics\": {"));
        assert!(!text.contains("\"key\""));

        let parsed = CategorySet::from_json(&bytes).unwrap();
        assert_eq!(parsed.get("comics").unwrap().key, "comics");
        assert_eq!(parsed, set);
    }

    #[test]
    fn test_category_set_sorted_by_name() {
        let mut set = CategorySet::new();
        set.insert("zines", Category::new("", "zines", vec![]));
        set.insert("b", Category::new("", "Books", vec![]));
        set.insert("a", Category::new("", "books", vec![]));
        let names: Vec<String> = set.sorted_by_name().into_iter().map(|c| c.key).collect();
        assert_eq!(names, vec!["a", "b", "zines"]);
    }

    #[test]
    fn test_field_patch_apply() {
        let mut fields = FieldMap::new();
        fields.insert("title".into(), json!("Batman #1"));
        fields.insert("signed".into(), json!(true));

        let mut patch = FieldPatch::default();
        patch.set.insert("grade".into(), json!(0));
        patch.unset.push("signed".into());
        patch.apply_to(&mut fields);

        assert_eq!(fields.get("grade"), Some(&json!(0)));
        assert!(!fields.contains_key("signed"));
        assert_eq!(fields.get("title"), Some(&json!("Batman #1")));
    }

    #[test]
    fn test_settings_defaults_and_extra_keys() {
        let settings: Settings = serde_json::from_value(json!({"darkMode": true, "accent": "red"})).unwrap();
        assert!(settings.dark_mode);
        assert_eq!(settings.theme, "default");
        assert_eq!(settings.language, "en");
        assert_eq!(settings.extra.get("accent"), Some(&json!("red")));

        let value = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(value, json!({"darkMode": false, "theme": "default", "language": "en"}));
    }

    #[test]
    fn test_save_request_defaults() {
        let req: SaveCategoryRequest = serde_json::from_value(json!({
            "category": {"name": "Comics", "fields": [{"name": "title", "label": "Title", "type": "text"}]}
        }))
        .unwrap();
        assert!(req.key.is_none());
        assert!(!req.migrate);
    }
}
