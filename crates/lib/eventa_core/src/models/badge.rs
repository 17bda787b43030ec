//! Badge catalogue and per-user awards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBadge {
    pub user_id: String,
    pub badge_id: String,
    #[serde(default)]
    pub awarded_at: Option<DateTime<Utc>>,
}

/// Result of an award/remove call. Both operations are idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeChange {
    Applied,
    Unchanged,
}
