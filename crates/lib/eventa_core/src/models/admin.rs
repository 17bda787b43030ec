//! Admin report view models.
//!
//! The backend adds fields to these payloads freely; anything not named here
//! is kept in `extra` so it can still be displayed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

type Extra = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAnalytics {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_events: u64,
    #[serde(default)]
    pub total_organizers: u64,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminNotification {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    #[serde(default)]
    pub id: String,
    pub action: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Window accepted by `/admin/financial`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeRange {
    Today,
    SevenDays,
    ThirtyDays,
    #[default]
    AllTime,
}

impl TimeRange {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::Today => "today",
            TimeRange::SevenDays => "7days",
            TimeRange::ThirtyDays => "30days",
            TimeRange::AllTime => "alltime",
        }
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(TimeRange::Today),
            "7days" => Ok(TimeRange::SevenDays),
            "30days" => Ok(TimeRange::ThirtyDays),
            "alltime" => Ok(TimeRange::AllTime),
            other => Err(format!("unknown time range: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub platform_fees: f64,
    #[serde(default)]
    pub pending_payouts: f64,
    #[serde(default)]
    pub completed_payouts: f64,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    #[serde(default)]
    pub id: String,
    pub action: String,
    /// Acting admin, usually an email address.
    pub user: String,
    #[serde(default)]
    pub resource: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub ip: Option<String>,
}
