// @awa-component: API-BackendSeam
//
//! Backend seam: async traits implemented by the REST client.
//!
//! Core logic (session, safety feed, admin overview) is written against
//! these traits so it can run against the real HTTP client or a test fake.
//! Every call returns `Result<_, ApiError>`, so callers can always tell
//! "empty" apart from "failed to load".

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    ActivityEntry, AdminAnalytics, AdminNotification, Attendee, AuditLogEntry, Badge, CurrentUser,
    Event, EventUpdate, FinancialReport, LoginResponse, ManagedUser, NewUser, SafetyAlert,
    SafetyStatistics, TimeRange, UserBadge, UserQuery, UserUpdate,
};
use crate::safety::AlertFilter;

/// Failure of a single backend call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("Cannot reach the Eventa backend at {base_url}: {message}")]
    Unreachable { base_url: String, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Map a non-success HTTP status and its error message.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            _ => ApiError::Status { status, message },
        }
    }
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;
    async fn current_user(&self) -> Result<CurrentUser, ApiError>;
}

#[async_trait]
pub trait EventsBackend: Send + Sync {
    async fn list_events(&self) -> Result<Vec<Event>, ApiError>;
    async fn get_event(&self, id: &str) -> Result<Event, ApiError>;
    async fn create_event(&self, event: &Event) -> Result<Event, ApiError>;
    async fn update_event(&self, id: &str, changes: &EventUpdate) -> Result<(), ApiError>;
    async fn delete_event(&self, id: &str) -> Result<(), ApiError>;
    async fn list_attendees(&self, event_id: &str) -> Result<Vec<Attendee>, ApiError>;
}

#[async_trait]
pub trait SafetyBackend: Send + Sync {
    async fn list_alerts(&self, filter: AlertFilter) -> Result<Vec<SafetyAlert>, ApiError>;
    async fn live_feed(&self, limit: u32) -> Result<Vec<SafetyAlert>, ApiError>;
    async fn unacknowledged_emergencies(&self) -> Result<Vec<SafetyAlert>, ApiError>;
    async fn acknowledge_alert(&self, id: &str) -> Result<(), ApiError>;
    async fn statistics(&self) -> Result<SafetyStatistics, ApiError>;
}

#[async_trait]
pub trait AdminBackend: Send + Sync {
    async fn list_users(&self, query: &UserQuery) -> Result<Vec<ManagedUser>, ApiError>;
    async fn create_user(&self, user: &NewUser) -> Result<(), ApiError>;
    async fn update_user(&self, id: &str, changes: &UserUpdate) -> Result<(), ApiError>;
    async fn delete_user(&self, id: &str) -> Result<(), ApiError>;

    async fn analytics(&self) -> Result<AdminAnalytics, ApiError>;
    async fn notifications(&self) -> Result<Vec<AdminNotification>, ApiError>;
    async fn activity(&self) -> Result<Vec<ActivityEntry>, ApiError>;
    async fn financial(&self, range: TimeRange) -> Result<FinancialReport, ApiError>;
    async fn audit_logs(&self) -> Result<Vec<AuditLogEntry>, ApiError>;

    async fn list_badges(&self) -> Result<Vec<Badge>, ApiError>;
    async fn user_badges(&self, user_id: &str) -> Result<Vec<UserBadge>, ApiError>;
    async fn award_badge(&self, user_id: &str, badge_id: &str) -> Result<(), ApiError>;
    async fn remove_badge(&self, user_id: &str, badge_id: &str) -> Result<(), ApiError>;
}
