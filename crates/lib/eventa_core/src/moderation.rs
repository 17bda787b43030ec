//! Event moderation and bulk operations.
//!
//! An event is approved by featuring it; until then it sits in the
//! moderation queue. Rejecting deletes it. Bulk operations fan out one call
//! per selected event and report partial failure without rolling back.

use std::collections::HashSet;
use std::str::FromStr;

use futures::future::join_all;
use log::{info, warn};

use crate::backend::{ApiError, EventsBackend};
use crate::models::{Event, EventUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Feature,
    Unfeature,
    Delete,
}

impl BulkAction {
    pub fn as_str(self) -> &'static str {
        match self {
            BulkAction::Feature => "feature",
            BulkAction::Unfeature => "unfeature",
            BulkAction::Delete => "delete",
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            BulkAction::Feature => "featured",
            BulkAction::Unfeature => "unfeatured",
            BulkAction::Delete => "deleted",
        }
    }
}

impl FromStr for BulkAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "feature" => Ok(BulkAction::Feature),
            "unfeature" => Ok(BulkAction::Unfeature),
            "delete" => Ok(BulkAction::Delete),
            other => Err(format!("unknown bulk action: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkReport {
    pub applied: Vec<String>,
    /// `(event id, reason)` for each failed call.
    pub failed: Vec<(String, String)>,
}

impl BulkReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

async fn apply_one<B: EventsBackend + ?Sized>(
    backend: &B,
    action: BulkAction,
    id: &str,
) -> Result<(), ApiError> {
    match action {
        BulkAction::Feature => backend.update_event(id, &EventUpdate::featured(true)).await,
        BulkAction::Unfeature => backend.update_event(id, &EventUpdate::featured(false)).await,
        // Already gone counts as deleted.
        BulkAction::Delete => match backend.delete_event(id).await {
            Err(ApiError::NotFound(_)) => Ok(()),
            other => other,
        },
    }
}

/// Apply `action` to every id in `ids`. Duplicate ids are sent once.
pub async fn bulk_apply<B: EventsBackend + ?Sized>(
    backend: &B,
    action: BulkAction,
    ids: &[String],
) -> BulkReport {
    let mut seen = HashSet::new();
    let selected: Vec<&str> = ids
        .iter()
        .map(String::as_str)
        .filter(|id| seen.insert(*id))
        .collect();

    let results = join_all(
        selected
            .iter()
            .map(|id| async move { (*id, apply_one(backend, action, id).await) }),
    )
    .await;

    let mut report = BulkReport::default();
    for (id, result) in results {
        match result {
            Ok(()) => report.applied.push(id.to_string()),
            Err(e) => report.failed.push((id.to_string(), e.to_string())),
        }
    }

    if report.is_complete() {
        info!("bulk {}: {} events", action.past_tense(), report.applied.len());
    } else {
        warn!(
            "bulk {}: {} of {} failed",
            action.past_tense(),
            report.failed.len(),
            selected.len()
        );
    }
    report
}

/// Events split by moderation state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModerationQueue {
    /// Not yet featured.
    pub pending: Vec<Event>,
    pub approved: usize,
}

impl ModerationQueue {
    pub fn from_events(events: Vec<Event>) -> Self {
        let total = events.len();
        let pending: Vec<Event> = events.into_iter().filter(|e| !e.is_featured).collect();
        Self {
            approved: total - pending.len(),
            pending,
        }
    }

    pub fn total(&self) -> usize {
        self.pending.len() + self.approved
    }
}

pub async fn approve<B: EventsBackend + ?Sized>(backend: &B, id: &str) -> Result<(), ApiError> {
    backend.update_event(id, &EventUpdate::featured(true)).await?;
    info!("approved event {id}");
    Ok(())
}

pub async fn reject<B: EventsBackend + ?Sized>(backend: &B, id: &str) -> Result<(), ApiError> {
    backend.delete_event(id).await?;
    info!("rejected event {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::Attendee;

    /// Fails every call for ids starting with `bad`; `gone` answers 404.
    #[derive(Default)]
    struct Catalogue {
        updates: Mutex<Vec<(String, EventUpdate)>>,
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EventsBackend for Catalogue {
        async fn list_events(&self) -> Result<Vec<Event>, ApiError> {
            Ok(Vec::new())
        }
        async fn get_event(&self, id: &str) -> Result<Event, ApiError> {
            Err(ApiError::NotFound(id.to_string()))
        }
        async fn create_event(&self, event: &Event) -> Result<Event, ApiError> {
            Ok(event.clone())
        }
        async fn update_event(&self, id: &str, changes: &EventUpdate) -> Result<(), ApiError> {
            if id.starts_with("bad") {
                return Err(ApiError::Status {
                    status: 500,
                    message: "update failed".into(),
                });
            }
            self.updates
                .lock()
                .unwrap()
                .push((id.to_string(), changes.clone()));
            Ok(())
        }
        async fn delete_event(&self, id: &str) -> Result<(), ApiError> {
            if id == "gone" {
                return Err(ApiError::NotFound("Event not found".into()));
            }
            if id.starts_with("bad") {
                return Err(ApiError::Forbidden("not yours".into()));
            }
            self.deleted.lock().unwrap().push(id.to_string());
            Ok(())
        }
        async fn list_attendees(&self, _event_id: &str) -> Result<Vec<Attendee>, ApiError> {
            Ok(Vec::new())
        }
    }

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn event(id: &str, is_featured: bool) -> Event {
        Event {
            id: id.into(),
            name: id.into(),
            is_featured,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn feature_sends_one_update_per_distinct_id() {
        let backend = Catalogue::default();
        let report = bulk_apply(&backend, BulkAction::Feature, &ids(&["e1", "e2", "e1"])).await;

        assert!(report.is_complete());
        assert_eq!(report.applied, ids(&["e1", "e2"]));
        let updates = backend.updates.lock().unwrap();
        assert_eq!(updates.len(), 2);
        assert!(updates.iter().all(|(_, u)| *u == EventUpdate::featured(true)));
    }

    #[tokio::test]
    async fn partial_failure_keeps_the_successes() {
        let backend = Catalogue::default();
        let report =
            bulk_apply(&backend, BulkAction::Unfeature, &ids(&["e1", "bad-1", "e3"])).await;

        assert!(!report.is_complete());
        assert_eq!(report.applied, ids(&["e1", "e3"]));
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "bad-1");
        assert!(report.failed[0].1.contains("update failed"));
        assert_eq!(backend.updates.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn deleting_a_missing_event_is_not_a_failure() {
        let backend = Catalogue::default();
        let report = bulk_apply(&backend, BulkAction::Delete, &ids(&["e1", "gone", "bad-2"])).await;

        assert_eq!(report.applied, ids(&["e1", "gone"]));
        assert_eq!(report.failed.len(), 1);
        assert_eq!(*backend.deleted.lock().unwrap(), ids(&["e1"]));
    }

    #[tokio::test]
    async fn approve_features_and_reject_deletes() {
        let backend = Catalogue::default();
        approve(&backend, "e7").await.expect("approve");
        reject(&backend, "e8").await.expect("reject");

        assert_eq!(
            *backend.updates.lock().unwrap(),
            vec![("e7".to_string(), EventUpdate::featured(true))]
        );
        assert_eq!(*backend.deleted.lock().unwrap(), ids(&["e8"]));

        let err = reject(&backend, "gone").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn queue_splits_on_featured() {
        let queue = ModerationQueue::from_events(vec![
            event("a", false),
            event("b", true),
            event("c", false),
        ]);
        assert_eq!(queue.pending.len(), 2);
        assert_eq!(queue.approved, 1);
        assert_eq!(queue.total(), 3);
    }

    #[test]
    fn parses_actions() {
        assert_eq!("Feature".parse::<BulkAction>(), Ok(BulkAction::Feature));
        assert!("archive".parse::<BulkAction>().is_err());
    }
}
