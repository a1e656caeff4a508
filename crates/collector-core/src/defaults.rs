//! Centralized default constants for the collector catalog.
//!
//! Crates reference these constants instead of defining their own values.

// =============================================================================
// CONFIG FILES
// =============================================================================

/// File name of the per-owner category document.
pub const CATEGORIES_FILE: &str = "categories.json";

/// File name of the per-owner settings document.
pub const SETTINGS_FILE: &str = "settings.json";

/// Directory (under the data dir) holding one sub-directory per owner.
pub const OWNERS_DIR: &str = "users";

/// Application directory name on Windows and macOS.
pub const APP_DIR_NAME: &str = "CollectorsDream";

/// Application directory name on Linux and other unix platforms.
pub const APP_DIR_NAME_UNIX: &str = "collectors-dream";

/// Indentation used when writing config documents.
pub const DOCUMENT_INDENT: &[u8] = b"    ";

// =============================================================================
// SETTINGS
// =============================================================================

/// Default UI theme.
pub const THEME: &str = "default";

/// Default UI language.
pub const LANGUAGE: &str = "en";

// =============================================================================
// MIGRATION / BATCHING
// =============================================================================

/// Maximum record updates (or deletes) in flight during migration and cascade.
pub const MIGRATION_CONCURRENCY: usize = 8;

// =============================================================================
// DISPLAY
// =============================================================================

/// Display string for missing, null or empty values.
pub const NOT_SET: &str = "N/A";

/// Display string for `true`.
pub const YES: &str = "Yes";

/// Display string for `false`.
pub const NO: &str = "No";

// =============================================================================
// DATABASE
// =============================================================================

/// Database URL used when `DATABASE_URL` is unset.
pub const DATABASE_URL: &str = "postgres://localhost/collector";
