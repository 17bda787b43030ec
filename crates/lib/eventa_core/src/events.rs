// @awa-component: EVT-Scope
//
//! Event scoping and the derived figures shown on the dashboard, analytics
//! and ticket-sales screens.
//!
//! The backend returns every event. Admins see all of them; organizers only
//! see rows whose `organizer_id` is their own user id.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{CurrentUser, Event};

const NAME_LIMIT: usize = 15;

/// Events visible to `user`.
pub fn scope_events(user: &CurrentUser, events: Vec<Event>) -> Vec<Event> {
    if user.is_admin {
        return events;
    }
    events
        .into_iter()
        .filter(|e| e.organizer_id == user.id)
        .collect()
}

/// Weighted engagement score. RSVPs count double.
pub fn engagement(event: &Event) -> u64 {
    event.views + event.rsvps * 2 + event.likes + event.saves
}

/// Tickets are not tracked separately; half of the RSVPs are assumed to buy.
pub fn estimated_tickets(event: &Event) -> u64 {
    event.rsvps / 2
}

pub fn estimated_revenue(event: &Event) -> f64 {
    event.ticket_price * estimated_tickets(event) as f64
}

/// RSVP-per-view ratio as a percentage.
pub fn conversion_rate(event: &Event) -> f64 {
    event.rsvps as f64 / event.views.max(1) as f64 * 100.0
}

/// The `n` events with the highest engagement, best first.
pub fn trending(events: &[Event], n: usize) -> Vec<&Event> {
    let mut ranked: Vec<&Event> = events.iter().collect();
    ranked.sort_by(|a, b| engagement(b).cmp(&engagement(a)));
    ranked.truncate(n);
    ranked
}

/// Chart label: at most 15 characters, then an ellipsis.
pub fn short_name(name: &str) -> String {
    if name.chars().count() > NAME_LIMIT {
        let head: String = name.chars().take(NAME_LIMIT).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

/// Headline numbers on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_events: usize,
    pub total_views: u64,
    pub total_rsvps: u64,
}

impl DashboardStats {
    pub fn from_events(events: &[Event]) -> Self {
        Self {
            total_events: events.len(),
            total_views: events.iter().map(|e| e.views).sum(),
            total_rsvps: events.iter().map(|e| e.rsvps).sum(),
        }
    }
}

/// One row of the per-event performance table.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPerformance {
    pub id: String,
    pub label: String,
    pub views: u64,
    pub rsvps: u64,
    pub engagement: u64,
    pub tickets: u64,
    pub revenue: f64,
    pub conversion: f64,
}

impl From<&Event> for EventPerformance {
    fn from(e: &Event) -> Self {
        Self {
            id: e.id.clone(),
            label: short_name(&e.name),
            views: e.views,
            rsvps: e.rsvps,
            engagement: engagement(e),
            tickets: estimated_tickets(e),
            revenue: estimated_revenue(e),
            conversion: conversion_rate(e),
        }
    }
}

pub fn performance(events: &[Event]) -> Vec<EventPerformance> {
    events.iter().map(EventPerformance::from).collect()
}

/// Aggregates for the analytics screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventKpis {
    pub total_events: usize,
    pub total_views: u64,
    pub total_rsvps: u64,
    pub total_tickets: u64,
    pub total_revenue: f64,
    /// Only computed for admins; organizers only ever see themselves.
    pub organizers: Option<usize>,
    /// Events per category. Blank categories count as "Other".
    pub categories: BTreeMap<String, usize>,
}

impl EventKpis {
    pub fn compute(user: &CurrentUser, events: &[Event]) -> Self {
        let mut categories = BTreeMap::new();
        for e in events {
            let key = if e.category.trim().is_empty() {
                "Other".to_string()
            } else {
                e.category.clone()
            };
            *categories.entry(key).or_insert(0) += 1;
        }

        let organizers = user.is_admin.then(|| {
            events
                .iter()
                .filter(|e| !e.organizer_id.is_empty())
                .map(|e| e.organizer_id.as_str())
                .collect::<BTreeSet<_>>()
                .len()
        });

        Self {
            total_events: events.len(),
            total_views: events.iter().map(|e| e.views).sum(),
            total_rsvps: events.iter().map(|e| e.rsvps).sum(),
            total_tickets: events.iter().map(estimated_tickets).sum(),
            total_revenue: events.iter().map(estimated_revenue).sum(),
            organizers,
            categories,
        }
    }

    pub fn average_conversion(&self) -> f64 {
        self.total_rsvps as f64 / self.total_views.max(1) as f64 * 100.0
    }
}
