//! User-space domain models: preferences and the activity feed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stored trip preferences. Every field is optional server-side; only
/// set fields are sent on save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_range: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accommodation_preferences: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub activity_preferences: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dietary_restrictions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility_needs: Option<String>,
}

/// One entry in the account activity feed.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub travel_id: String,
    pub status: String,
    pub date: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Entry-type-specific payload, passed through untyped.
    #[serde(default)]
    pub details: Value,
}
