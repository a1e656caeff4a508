//! # collector-core
//!
//! Core types, traits, and schema logic for the collector catalog.
//!
//! This crate holds the category/field/record model, key derivation, value
//! coercion and rendering, per-record migration planning, and the repository
//! traits that the storage crate implements.

pub mod defaults;
pub mod error;
pub mod fields;
pub mod logging;
pub mod migration;
pub mod models;
pub mod slug;
pub mod table;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, ErrorKind, Result};
pub use fields::{coerce_input, display_typed, display_value, FieldInput, FieldValue};
pub use migration::{is_noop_change, plan_record_migration};
pub use models::*;
pub use slug::{derive_key, humanize_label};
pub use table::{Column, TableRow, TableView};
pub use traits::*;

/// Generate a new time-ordered UUIDv7 identifier.
#[inline]
pub fn new_v7() -> uuid::Uuid {
    uuid::Uuid::now_v7()
}
