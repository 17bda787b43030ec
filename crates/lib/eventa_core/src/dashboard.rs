//! Admin overview: the panels of the admin index screen, fetched together.
//!
//! Each panel loads independently. One failing endpoint marks that panel as
//! failed and leaves the rest of the overview intact.

use log::warn;

use crate::backend::{AdminBackend, ApiError, SafetyBackend};
use crate::models::{
    ActivityEntry, AdminAnalytics, AdminNotification, FinancialReport, SafetyStatistics,
    TimeRange,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    Ready(T),
    Failed(String),
}

impl<T> Section<T> {
    fn from_result(name: &str, result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => Section::Ready(value),
            Err(e) => {
                warn!("admin overview: {name} unavailable: {e}");
                Section::Failed(e.to_string())
            }
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(value) => Some(value),
            Section::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Section::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminOverview {
    pub analytics: Section<AdminAnalytics>,
    pub notifications: Section<Vec<AdminNotification>>,
    pub activity: Section<Vec<ActivityEntry>>,
    pub financial: Section<FinancialReport>,
    pub safety: Section<SafetyStatistics>,
}

impl AdminOverview {
    pub async fn load<B>(backend: &B, range: TimeRange) -> Self
    where
        B: AdminBackend + SafetyBackend,
    {
        let (analytics, notifications, activity, financial, safety) = tokio::join!(
            backend.analytics(),
            backend.notifications(),
            backend.activity(),
            backend.financial(range),
            backend.statistics(),
        );

        Self {
            analytics: Section::from_result("analytics", analytics),
            notifications: Section::from_result("notifications", notifications),
            activity: Section::from_result("activity", activity),
            financial: Section::from_result("financial", financial),
            safety: Section::from_result("safety statistics", safety),
        }
    }

    pub fn unread_notifications(&self) -> usize {
        self.notifications
            .ready()
            .map(|n| n.iter().filter(|n| !n.read).count())
            .unwrap_or(0)
    }

    pub fn failed_sections(&self) -> usize {
        [
            self.analytics.is_failed(),
            self.notifications.is_failed(),
            self.activity.is_failed(),
            self.financial.is_failed(),
            self.safety.is_failed(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }
}
