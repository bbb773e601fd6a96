//! Typed wrappers for the user-space endpoints: preferences, the
//! dashboard, the activity feed, and the account-data operations.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::models::user::{ActivityEntry, Preferences};

/// User operation failures.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct PreferencesEnvelope {
    #[serde(default)]
    preferences: Value,
}

#[derive(Deserialize)]
struct ActivityEnvelope {
    activities: Vec<ActivityEntry>,
}

/// User API surface bound to a client.
#[derive(Clone)]
pub struct UserApi {
    api: ApiClient,
}

impl UserApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Stored preferences. A user who never saved any gets the defaults,
    /// matching the server's empty-document answer.
    pub async fn preferences(&self) -> Result<Preferences, UserError> {
        let value = self.api.get("/user/preferences").await?;
        unwrap_preferences(value)
    }

    /// Save (or overwrite) preferences; only set fields are sent. Returns
    /// the server's echo of what was stored.
    pub async fn save_preferences(&self, preferences: &Preferences) -> Result<Preferences, UserError> {
        let body = serde_json::to_value(preferences)?;
        let value = self.api.post("/user/preferences", &body).await?;
        debug!("preferences saved");
        unwrap_preferences(value)
    }

    /// Aggregated dashboard document: profile, statistics, recent
    /// travels, preferences.
    pub async fn dashboard(&self) -> ApiResult<Value> {
        self.api.get("/user/dashboard").await
    }

    /// Account activity feed, most recent first (server-ordered).
    pub async fn activity(&self) -> Result<Vec<ActivityEntry>, UserError> {
        let value = self.api.get("/user/activity").await?;
        Ok(serde_json::from_value::<ActivityEnvelope>(value)?.activities)
    }

    /// Begin account deletion. Removal is scheduled server-side; the
    /// returned document carries the user-facing message.
    pub async fn delete_account(&self) -> ApiResult<Value> {
        let value = self.api.delete("/user/delete-account").await?;
        debug!("account deletion requested");
        Ok(value)
    }

    /// Full data export of the account.
    pub async fn export_data(&self) -> ApiResult<Value> {
        self.api.get("/user/export-data").await
    }
}

/// Both preferences endpoints answer `{"preferences": {...}}`; an absent
/// or null document means nothing saved yet.
fn unwrap_preferences(value: Value) -> Result<Preferences, UserError> {
    let envelope: PreferencesEnvelope = serde_json::from_value(value)?;
    match envelope.preferences {
        Value::Null => Ok(Preferences::default()),
        prefs => Ok(serde_json::from_value(prefs)?),
    }
}
