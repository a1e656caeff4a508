//! Structured logging field name constants for the collector catalog.
//!
//! Every crate uses these names for structured `tracing` fields so that log
//! queries work the same way across the registry, migration engine and stores.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Operation failed and the caller gets an error |
//! | WARN  | Best-effort step failed, processing continued |
//! | INFO  | Category saves/deletes, migration and import completions |
//! | DEBUG | Decision points (migration skipped, collision rejected) |
//! | TRACE | Per-record iteration inside migration and cascade loops |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "catalog", "db", "storage"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "registry", "migration", "records", "file_storage"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "save_category", "delete_category", "migrate", "import"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Owner (user) UUID the operation is scoped to.
pub const OWNER_ID: &str = "owner_id";

/// Category key being operated on.
pub const CATEGORY: &str = "category";

/// Record UUID being operated on.
pub const RECORD_ID: &str = "record_id";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of records matched by a selection.
pub const MATCHED: &str = "matched";

/// Number of records written.
pub const UPDATED: &str = "updated";

/// Number of records deleted.
pub const DELETED: &str = "deleted";

/// Number of per-record failures in a best-effort loop.
pub const FAILED: &str = "failed";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
