//! Safety alerts raised by mobile check-ins and SOS broadcasts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertStatus {
    Safe,
    CheckIn,
    Emergency,
    LocationShared,
    SosBroadcast,
    #[serde(other)]
    Other,
}

impl AlertStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertStatus::Safe => "safe",
            AlertStatus::CheckIn => "check-in",
            AlertStatus::Emergency => "emergency",
            AlertStatus::LocationShared => "location-shared",
            AlertStatus::SosBroadcast => "sos-broadcast",
            AlertStatus::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    Safe,
    Alert,
    Emergency,
    HighAlert,
    Sos,
    #[serde(other)]
    Other,
}

impl AlertType {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertType::Safe => "SAFE",
            AlertType::Alert => "ALERT",
            AlertType::Emergency => "EMERGENCY",
            AlertType::HighAlert => "HIGH_ALERT",
            AlertType::Sos => "SOS",
            AlertType::Other => "OTHER",
        }
    }
}

/// Ordering used by the priority sort: emergencies first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlertPriority {
    Normal = 1,
    HighAlert = 2,
    Emergency = 3,
}

impl AlertPriority {
    pub fn label(self) -> &'static str {
        match self {
            AlertPriority::Normal => "NORMAL",
            AlertPriority::HighAlert => "HIGH_ALERT",
            AlertPriority::Emergency => "EMERGENCY",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyAlert {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub user_phone: Option<String>,
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub event_name: Option<String>,
    pub status: AlertStatus,
    #[serde(default)]
    pub alert_type: Option<AlertType>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub is_emergency: bool,
    #[serde(default)]
    pub is_high_alert: bool,
    #[serde(default)]
    pub acknowledged_by_admin: bool,
    #[serde(default)]
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SafetyAlert {
    /// Mark as acknowledged. One-way: returns `false` if it already was.
    pub fn acknowledge(&mut self, at: DateTime<Utc>) -> bool {
        if self.acknowledged_by_admin {
            return false;
        }
        self.acknowledged_by_admin = true;
        self.acknowledged_at = Some(at);
        true
    }

    pub fn priority(&self) -> AlertPriority {
        if self.is_emergency {
            AlertPriority::Emergency
        } else if self.is_high_alert {
            AlertPriority::HighAlert
        } else {
            AlertPriority::Normal
        }
    }

    /// Unacknowledged emergency or high alert.
    pub fn needs_attention(&self) -> bool {
        !self.acknowledged_by_admin && self.priority() > AlertPriority::Normal
    }

    /// Type label, falling back to the status when no type was sent.
    pub fn type_label(&self) -> &'static str {
        match self.alert_type {
            Some(t) => t.as_str(),
            None => self.status.as_str(),
        }
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    pub fn google_maps_url(&self) -> Option<String> {
        self.coordinates()
            .map(|(lat, lng)| format!("https://www.google.com/maps?q={lat},{lng}"))
    }

    /// Case-insensitive search over user, event, address and status.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        let hit = |s: &str| s.to_lowercase().contains(&query);
        hit(&self.user_name)
            || hit(&self.user_email)
            || self.event_name.as_deref().is_some_and(hit)
            || self.address.as_deref().is_some_and(hit)
            || hit(self.status.as_str())
    }
}

/// Aggregate counters from `/safety/admin/statistics`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyStatistics {
    #[serde(default)]
    pub total_alerts: u64,
    #[serde(default)]
    pub emergencies: u64,
    #[serde(default)]
    pub unacknowledged: u64,
    #[serde(default)]
    pub active_users: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn alert(id: &str, minutes_ago: i64) -> SafetyAlert {
        SafetyAlert {
            id: id.to_string(),
            user_id: format!("user-{id}"),
            user_name: format!("User {id}"),
            user_email: format!("{id}@example.com"),
            user_phone: None,
            event_id: None,
            event_name: None,
            status: AlertStatus::CheckIn,
            alert_type: None,
            latitude: None,
            longitude: None,
            address: None,
            message: None,
            is_emergency: false,
            is_high_alert: false,
            acknowledged_by_admin: false,
            acknowledged_at: None,
            created_at: Utc::now() - chrono::Duration::minutes(minutes_ago),
        }
    }

    pub fn emergency(id: &str, minutes_ago: i64) -> SafetyAlert {
        SafetyAlert {
            status: AlertStatus::Emergency,
            alert_type: Some(AlertType::Emergency),
            is_emergency: true,
            ..alert(id, minutes_ago)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn parses_backend_payload() {
        let a: SafetyAlert = serde_json::from_str(
            r#"{"id":"a1","userId":"u1","userName":"Kofi","userEmail":"k@x.com",
                "userPhone":null,"eventId":null,"eventName":null,
                "status":"sos-broadcast","alertType":"SOS","latitude":5.6,"longitude":-0.19,
                "address":null,"message":"help","isEmergency":true,
                "acknowledgedByAdmin":false,"acknowledgedAt":null,
                "createdAt":"2025-06-01T10:00:00Z"}"#,
        )
        .expect("parse");
        assert_eq!(a.status, AlertStatus::SosBroadcast);
        assert_eq!(a.alert_type, Some(AlertType::Sos));
        assert!(a.needs_attention());
        assert_eq!(
            a.google_maps_url().as_deref(),
            Some("https://www.google.com/maps?q=5.6,-0.19")
        );
    }

    #[test]
    fn unknown_status_does_not_fail() {
        let a: SafetyAlert = serde_json::from_str(
            r#"{"id":"a2","status":"teleported","createdAt":"2025-06-01T10:00:00Z"}"#,
        )
        .expect("parse");
        assert_eq!(a.status, AlertStatus::Other);
    }

    #[test]
    fn acknowledge_is_one_way() {
        let mut a = emergency("a1", 5);
        let first = Utc::now();
        assert!(a.acknowledge(first));
        assert!(!a.acknowledge(Utc::now()));
        assert!(a.acknowledged_by_admin);
        assert_eq!(a.acknowledged_at, Some(first));
        assert!(!a.needs_attention());
    }

    #[test]
    fn priority_ranks_flags() {
        let mut high = alert("h", 1);
        high.is_high_alert = true;
        assert_eq!(emergency("e", 1).priority(), AlertPriority::Emergency);
        assert_eq!(high.priority(), AlertPriority::HighAlert);
        assert_eq!(alert("n", 1).priority(), AlertPriority::Normal);
        assert!(AlertPriority::Emergency > AlertPriority::HighAlert);
    }

    #[test]
    fn type_label_falls_back_to_status() {
        assert_eq!(alert("a", 1).type_label(), "check-in");
        assert_eq!(emergency("b", 1).type_label(), "EMERGENCY");
    }
}
