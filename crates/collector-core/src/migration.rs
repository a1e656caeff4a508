//! Per-record migration planning.
//!
//! Given a record's current field map and a category's new field list, compute
//! the single [`FieldPatch`] that reconciles them. Execution (selecting
//! records, applying patches with bounded concurrency) lives in the catalog
//! crate.

use std::collections::HashSet;

use tracing::trace;

use crate::models::{FieldDefinition, FieldMap, FieldPatch};

/// Compute additions and removals for one record.
///
/// Additions: declared names absent from the map, set to the type default.
/// A key that exists is never overwritten, whatever its value.
/// Removals: keys in the map that are not declared.
pub fn plan_record_migration(fields: &FieldMap, new_fields: &[FieldDefinition]) -> FieldPatch {
    let declared: HashSet<&str> = new_fields.iter().map(|f| f.name.as_str()).collect();
    let mut patch = FieldPatch::default();

    for def in new_fields {
        if !fields.contains_key(&def.name) {
            patch
                .set
                .insert(def.name.clone(), def.field_type.default_value());
        }
    }

    for key in fields.keys() {
        if !declared.contains(key.as_str()) {
            patch.unset.push(key.clone());
        }
    }

    trace!(
        added = patch.set.len(),
        removed = patch.unset.len(),
        "Planned record migration"
    );
    patch
}

/// True when a schema change cannot require any record change.
///
/// An empty old list means the category is brand new; identical lists mean
/// nothing changed.
pub fn is_noop_change(old_fields: &[FieldDefinition], new_fields: &[FieldDefinition]) -> bool {
    old_fields.is_empty() || old_fields == new_fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldType;
    use serde_json::json;

    fn fields(pairs: &[(&str, serde_json::Value)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn def(name: &str, ty: FieldType) -> FieldDefinition {
        FieldDefinition {
            name: name.to_string(),
            label: name.to_string(),
            field_type: ty,
        }
    }

    #[test]
    fn test_adds_missing_fields_with_defaults() {
        let record = fields(&[("title", json!("Batman #1")), ("signed", json!(true))]);
        let schema = vec![
            def("title", FieldType::Text),
            def("signed", FieldType::Boolean),
            def("grade", FieldType::Number),
            def("notes", FieldType::Text),
            def("slabbed", FieldType::Boolean),
        ];
        let patch = plan_record_migration(&record, &schema);
        assert_eq!(patch.set.get("grade"), Some(&json!(0)));
        assert_eq!(patch.set.get("notes"), Some(&json!("")));
        assert_eq!(patch.set.get("slabbed"), Some(&json!(false)));
        assert_eq!(patch.set.len(), 3);
        assert!(patch.unset.is_empty());
    }

    #[test]
    fn test_removes_undeclared_fields() {
        let record = fields(&[("title", json!("Batman #1")), ("signed", json!(true))]);
        let schema = vec![def("title", FieldType::Text)];
        let patch = plan_record_migration(&record, &schema);
        assert!(patch.set.is_empty());
        assert_eq!(patch.unset, vec!["signed".to_string()]);
    }

    #[test]
    fn test_never_overwrites_existing_falsy_values() {
        let record = fields(&[
            ("grade", json!(0)),
            ("signed", json!(false)),
            ("notes", json!("")),
            ("price", serde_json::Value::Null),
        ]);
        let schema = vec![
            def("grade", FieldType::Number),
            def("signed", FieldType::Boolean),
            def("notes", FieldType::Text),
            def("price", FieldType::Number),
        ];
        assert!(plan_record_migration(&record, &schema).is_empty());
    }

    #[test]
    fn test_applying_twice_is_idempotent() {
        let mut record = fields(&[("title", json!("Batman #1")), ("stale", json!(1))]);
        let schema = vec![def("title", FieldType::Text), def("grade", FieldType::Number)];

        plan_record_migration(&record, &schema).apply_to(&mut record);
        // user edits the new field between runs
        record.insert("grade".into(), json!(9.4));
        plan_record_migration(&record, &schema).apply_to(&mut record);

        assert_eq!(record.get("grade"), Some(&json!(9.4)));
        assert!(plan_record_migration(&record, &schema).is_empty());
    }

    #[test]
    fn test_result_keys_match_schema() {
        let mut record = fields(&[("a", json!(1)), ("b", json!(2)), ("c", json!(3))]);
        let schema = vec![
            def("b", FieldType::Number),
            def("d", FieldType::Text),
        ];
        plan_record_migration(&record, &schema).apply_to(&mut record);
        let mut keys: Vec<&String> = record.keys().collect();
        keys.sort();
        assert_eq!(keys, vec!["b", "d"]);
        assert_eq!(record.get("b"), Some(&json!(2)));
    }

    #[test]
    fn test_noop_detection() {
        let schema = vec![def("title", FieldType::Text)];
        assert!(is_noop_change(&[], &schema));
        assert!(is_noop_change(&schema, &schema.clone()));
        assert!(!is_noop_change(&schema, &[def("name", FieldType::Text)]));
        // type-only change still counts as a change at the schema level
        assert!(!is_noop_change(&schema, &[def("title", FieldType::Number)]));
    }
}
