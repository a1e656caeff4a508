//! Schema migration engine.
//!
//! Reconciles every record of one category with a new field list: declared
//! fields a record lacks are added with their type default, fields no longer
//! declared are stripped. Each record is patched with a single write.

use std::sync::Arc;
use std::time::Instant;

use collector_core::{
    is_noop_change, plan_record_migration, Error, FieldDefinition, MigrationReport, OwnerId,
    RecordRepository, Result,
};
use tracing::{debug, info, trace, warn};

use crate::batch::BatchRunner;

#[derive(Clone)]
pub struct MigrationEngine {
    records: Arc<dyn RecordRepository>,
    runner: BatchRunner,
}

impl MigrationEngine {
    pub fn new(records: Arc<dyn RecordRepository>, runner: BatchRunner) -> Self {
        Self { records, runner }
    }

    /// Migrate the owner's records of category `key` from `old_fields` to
    /// `new_fields`.
    ///
    /// Selection errors are returned. Once records are being patched, a failed
    /// update is logged and counted in the report instead.
    pub async fn migrate(
        &self,
        owner: OwnerId,
        key: &str,
        old_fields: &[FieldDefinition],
        new_fields: &[FieldDefinition],
    ) -> Result<MigrationReport> {
        if is_noop_change(old_fields, new_fields) {
            debug!(
                subsystem = "catalog",
                component = "migration",
                owner_id = %owner,
                category = key,
                "Field list unchanged or new category, migration skipped"
            );
            return Ok(MigrationReport::default());
        }

        let start = Instant::now();
        let records = self.records.list(owner, Some(key)).await?;
        let matched = records.len();
        let new_fields: Arc<[FieldDefinition]> = new_fields.into();

        let outcome = self
            .runner
            .run("migrate", records, |record| {
                let repo = self.records.clone();
                let new_fields = new_fields.clone();
                async move {
                    let patch = plan_record_migration(&record.fields, &new_fields);
                    if patch.is_empty() {
                        return Ok(false);
                    }
                    trace!(
                        record_id = %record.id,
                        added = patch.set.len(),
                        removed = patch.unset.len(),
                        "Patching record"
                    );
                    repo.update_fields(owner, record.id, &patch).await?;
                    Ok::<_, Error>(true)
                }
            })
            .await;

        let report = MigrationReport {
            matched,
            updated: outcome.changed,
            failed: outcome.failed,
        };

        if report.is_complete() {
            info!(
                subsystem = "catalog",
                component = "migration",
                op = "migrate",
                owner_id = %owner,
                category = key,
                matched = report.matched,
                updated = report.updated,
                duration_ms = start.elapsed().as_millis() as u64,
                "Category records migrated"
            );
        } else {
            warn!(
                subsystem = "catalog",
                component = "migration",
                op = "migrate",
                owner_id = %owner,
                category = key,
                matched = report.matched,
                updated = report.updated,
                failed = report.failed,
                duration_ms = start.elapsed().as_millis() as u64,
                "Category migration partially applied"
            );
        }
        Ok(report)
    }
}
