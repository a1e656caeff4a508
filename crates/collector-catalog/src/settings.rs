//! Per-owner settings.

use std::sync::Arc;

use collector_core::{OwnerId, Result, Settings, SettingsRepository};
use serde_json::{Map, Value as JsonValue};
use tracing::info;

#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Saved settings, or the defaults when none were saved.
    pub async fn get(&self, owner: OwnerId) -> Result<Settings> {
        self.repo.load(owner).await
    }

    pub async fn save(&self, owner: OwnerId, settings: &Settings) -> Result<()> {
        self.repo.save(owner, settings).await?;
        info!(
            subsystem = "catalog",
            component = "settings",
            op = "save",
            owner_id = %owner,
            "Settings saved"
        );
        Ok(())
    }

    /// Merge `changes` into the saved settings and store the result.
    ///
    /// Keys not mentioned in `changes` keep their value.
    pub async fn update(&self, owner: OwnerId, changes: Map<String, JsonValue>) -> Result<Settings> {
        let current = self.repo.load(owner).await?;
        let mut merged = match serde_json::to_value(current)? {
            JsonValue::Object(map) => map,
            _ => Map::new(),
        };
        merged.extend(changes);

        let settings: Settings = serde_json::from_value(JsonValue::Object(merged))
            .map_err(|e| collector_core::Error::Validation(format!("invalid settings: {e}")))?;
        self.save(owner, &settings).await?;
        Ok(settings)
    }
}
