// @awa-component: SAFE-AlertFeed
//
//! Safety-alert feed: polls unacknowledged emergencies and acknowledges them.
//!
//! There is no push channel; the feed polls on a fixed timer. The published
//! count only ever comes from a successful poll: a failed poll records the
//! error but leaves the previous count alone, so an outage never looks like
//! an all-clear.

pub mod query;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::backend::{ApiError, SafetyBackend};
use crate::models::{SafetyAlert, SafetyStatistics};

pub use query::{AlertFilter, AlertQuery, AlertSort, attention_count, with_coordinates};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSnapshot {
    /// `None` until the first successful poll.
    pub count: Option<usize>,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl FeedSnapshot {
    pub fn is_pulsing(&self) -> bool {
        self.count.is_some_and(|n| n > 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    Acknowledged,
    AlreadyAcknowledged,
}

/// Outcome of acknowledging a batch. Successful acknowledgements are never
/// rolled back when others fail.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkAckReport {
    pub acknowledged: Vec<String>,
    /// Alerts that were already acknowledged (locally or by the backend).
    pub skipped: usize,
    /// `(alert id, reason)` for every failed call.
    pub failed: Vec<(String, String)>,
}

impl BulkAckReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct SafetyFeed<B> {
    backend: B,
    snapshot: watch::Sender<FeedSnapshot>,
}

impl<B: SafetyBackend> SafetyFeed<B> {
    pub fn new(backend: B) -> Self {
        let (snapshot, _) = watch::channel(FeedSnapshot::default());
        Self { backend, snapshot }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn count(&self) -> Option<usize> {
        self.snapshot.borrow().count
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshot.subscribe()
    }

    /// Fetch the unacknowledged-emergency count.
    pub async fn poll(&self) -> Result<usize, ApiError> {
        match self.backend.unacknowledged_emergencies().await {
            Ok(alerts) => {
                let count = alerts.iter().filter(|a| !a.acknowledged_by_admin).count();
                debug!("safety poll: {count} unacknowledged emergencies");
                self.snapshot.send_modify(|s| {
                    s.count = Some(count);
                    s.last_updated = Some(Utc::now());
                    s.last_error = None;
                });
                Ok(count)
            }
            Err(e) => {
                warn!("safety poll failed, keeping last count: {e}");
                self.snapshot.send_modify(|s| s.last_error = Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Acknowledge one alert. Acknowledging twice is not an error.
    pub async fn acknowledge(&self, id: &str) -> Result<AckOutcome, ApiError> {
        match self.backend.acknowledge_alert(id).await {
            Ok(()) => {
                info!("acknowledged safety alert {id}");
                Ok(AckOutcome::Acknowledged)
            }
            Err(ApiError::Conflict(_)) => {
                debug!("safety alert {id} was already acknowledged");
                Ok(AckOutcome::AlreadyAcknowledged)
            }
            Err(e) => Err(e),
        }
    }

    /// Acknowledge every unacknowledged alert in `alerts`, one call each.
    pub async fn acknowledge_all(&self, alerts: &[SafetyAlert]) -> BulkAckReport {
        let pending: Vec<&str> = alerts
            .iter()
            .filter(|a| !a.acknowledged_by_admin)
            .map(|a| a.id.as_str())
            .collect();

        let mut report = BulkAckReport {
            skipped: alerts.len() - pending.len(),
            ..Default::default()
        };

        let results = join_all(
            pending
                .iter()
                .map(|id| async move { (*id, self.acknowledge(id).await) }),
        )
        .await;

        for (id, result) in results {
            match result {
                Ok(AckOutcome::Acknowledged) => report.acknowledged.push(id.to_string()),
                Ok(AckOutcome::AlreadyAcknowledged) => report.skipped += 1,
                Err(e) => report.failed.push((id.to_string(), e.to_string())),
            }
        }

        if !report.is_complete() {
            warn!(
                "bulk acknowledge: {} of {} failed",
                report.failed.len(),
                pending.len()
            );
        }
        report
    }

    pub async fn alerts(&self, filter: AlertFilter) -> Result<Vec<SafetyAlert>, ApiError> {
        self.backend.list_alerts(filter).await
    }

    pub async fn live_feed(&self, limit: u32) -> Result<Vec<SafetyAlert>, ApiError> {
        self.backend.live_feed(limit).await
    }

    pub async fn statistics(&self) -> Result<SafetyStatistics, ApiError> {
        self.backend.statistics().await
    }

    /// Users currently sharing a location.
    pub async fn shared_locations(&self) -> Result<Vec<SafetyAlert>, ApiError> {
        let alerts = self.backend.list_alerts(AlertFilter::Location).await?;
        Ok(with_coordinates(alerts))
    }
}

impl<B: SafetyBackend + 'static> SafetyFeed<B> {
    /// Poll immediately, then every `every`, until `cancel` fires.
    pub fn spawn(self: &Arc<Self>, every: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let feed = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            _ = feed.poll() => {}
                        }
                    }
                }
            }
            debug!("safety feed polling stopped");
        })
    }
}
