//! Table view model for record listings.
//!
//! The presentation layer only draws what this produces: column titles and
//! already-rendered cell strings.

use std::collections::BTreeSet;

use serde::Serialize;
use uuid::Uuid;

use crate::fields::{display_typed, display_value};
use crate::models::{Category, Record};
use crate::slug::humanize_label;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Field name the column reads.
    pub key: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub id: Uuid,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    pub columns: Vec<Column>,
    pub rows: Vec<TableRow>,
}

impl TableView {
    /// Build a table for `records`.
    ///
    /// With a category, columns follow its field order and values are read
    /// against the declared types. Without one (mixed listing), columns are the
    /// sorted union of all record field names.
    pub fn build(category: Option<&Category>, records: &[Record]) -> Self {
        let columns: Vec<Column> = match category {
            Some(cat) => cat
                .fields
                .iter()
                .map(|f| Column {
                    key: f.name.clone(),
                    title: f.display_label(),
                })
                .collect(),
            None => records
                .iter()
                .flat_map(|r| r.fields.keys().cloned())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(|key| Column {
                    title: humanize_label(&key),
                    key,
                })
                .collect(),
        };

        let rows = records
            .iter()
            .map(|record| TableRow {
                id: record.id,
                cells: columns
                    .iter()
                    .map(|col| {
                        let stored = record.fields.get(&col.key);
                        match category.and_then(|c| c.field(&col.key)) {
                            Some(def) => display_typed(def.field_type, stored),
                            None => display_value(stored),
                        }
                    })
                    .collect(),
            })
            .collect();

        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
