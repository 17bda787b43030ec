//! Event and attendee view models.

use serde::{Deserialize, Serialize};

/// A purchasable ticket tier.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TicketOption {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
}

/// Event as served by `/events`. Older rows use snake_case for a few fields,
/// hence the aliases.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default, alias = "end_date", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, alias = "end_time", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(default, alias = "ticket_price")]
    pub ticket_price: f64,
    #[serde(default, alias = "is_free")]
    pub is_free: bool,
    #[serde(default, alias = "is_featured")]
    pub is_featured: bool,
    #[serde(default, alias = "is_trending")]
    pub is_trending: bool,
    #[serde(default, alias = "promo_code", skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
    #[serde(default, alias = "promo_discount", skip_serializing_if = "Option::is_none")]
    pub promo_discount: Option<f64>,
    #[serde(default, alias = "organizer_id")]
    pub organizer_id: String,
    #[serde(default, alias = "organizer_name", skip_serializing_if = "Option::is_none")]
    pub organizer_name: Option<String>,
    #[serde(default, alias = "ticket_options")]
    pub ticket_options: Vec<TicketOption>,
    #[serde(default)]
    pub gallery: Vec<String>,
    #[serde(default, alias = "ticket_link", skip_serializing_if = "Option::is_none")]
    pub ticket_link: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub rsvps: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub saves: u64,
}

/// Body of `PUT /events/:id`. Unset fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
}

impl EventUpdate {
    pub fn featured(on: bool) -> Self {
        Self {
            is_featured: Some(on),
            ..Default::default()
        }
    }
}

/// RSVP state of an attendee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    Going,
    Interested,
    #[serde(other)]
    Other,
}

impl RsvpStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RsvpStatus::Going => "going",
            RsvpStatus::Interested => "interested",
            RsvpStatus::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub rsvp_status: RsvpStatus,
    #[serde(default)]
    pub ticket_count: u32,
}

impl Attendee {
    /// Case-insensitive match on name or email.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query) || self.email.to_lowercase().contains(&query)
    }
}
