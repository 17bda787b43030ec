//! Client-side view models hydrated from API responses.
//!
//! None of these are owned by the client beyond a session; the backend is
//! the source of truth.

pub mod admin;
pub mod badge;
pub mod event;
pub mod safety;
pub mod user;

pub use admin::{
    ActivityEntry, AdminAnalytics, AdminNotification, AuditLogEntry, FinancialReport, TimeRange,
};
pub use badge::{Badge, BadgeChange, UserBadge};
pub use event::{Attendee, Event, EventUpdate, RsvpStatus, TicketOption};
pub use safety::{AlertPriority, AlertStatus, AlertType, SafetyAlert, SafetyStatistics};
pub use user::{
    CurrentUser, LoginRequest, LoginResponse, ManagedUser, NewUser, RoleFilter, RoleSet,
    UserQuery, UserUpdate,
};
