//! Server-side filters and client-side search/sort for safety alerts.

use std::str::FromStr;

use crate::models::SafetyAlert;

/// Filter sent to `/safety/admin/alerts`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlertFilter {
    #[default]
    All,
    Emergency,
    Location,
    CheckIn,
    Safe,
}

impl AlertFilter {
    pub fn query_params(self) -> Vec<(&'static str, &'static str)> {
        match self {
            AlertFilter::All => Vec::new(),
            AlertFilter::Emergency => vec![("status", "emergency"), ("isEmergency", "true")],
            AlertFilter::Location => vec![("status", "location-shared")],
            AlertFilter::CheckIn => vec![("status", "check-in")],
            AlertFilter::Safe => vec![("status", "safe")],
        }
    }
}

impl FromStr for AlertFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(AlertFilter::All),
            "emergency" => Ok(AlertFilter::Emergency),
            "location" => Ok(AlertFilter::Location),
            "check-in" => Ok(AlertFilter::CheckIn),
            "safe" => Ok(AlertFilter::Safe),
            other => Err(format!("unknown alert filter: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlertSort {
    #[default]
    Recent,
    Oldest,
    /// Emergency > high alert > normal, newest first within a tier.
    Priority,
}

impl FromStr for AlertSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recent" => Ok(AlertSort::Recent),
            "oldest" => Ok(AlertSort::Oldest),
            "priority" => Ok(AlertSort::Priority),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AlertQuery {
    pub search: Option<String>,
    pub sort: AlertSort,
}

impl AlertQuery {
    pub fn apply(&self, alerts: &[SafetyAlert]) -> Vec<SafetyAlert> {
        let mut out: Vec<SafetyAlert> = alerts
            .iter()
            .filter(|a| match self.search.as_deref() {
                Some(q) if !q.is_empty() => a.matches(q),
                _ => true,
            })
            .cloned()
            .collect();

        match self.sort {
            AlertSort::Recent => out.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            AlertSort::Oldest => out.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            AlertSort::Priority => out.sort_by(|a, b| {
                b.priority()
                    .cmp(&a.priority())
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
        }
        out
    }
}

/// Unacknowledged emergency or high alerts in `alerts`.
pub fn attention_count(alerts: &[SafetyAlert]) -> usize {
    alerts.iter().filter(|a| a.needs_attention()).count()
}

/// Alerts that carry coordinates, for the location monitor.
pub fn with_coordinates(alerts: Vec<SafetyAlert>) -> Vec<SafetyAlert> {
    alerts
        .into_iter()
        .filter(|a| a.coordinates().is_some())
        .collect()
}
