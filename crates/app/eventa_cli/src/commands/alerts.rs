use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use eventa_core::export::{ExportKind, alerts_csv};
use eventa_core::models::SafetyAlert;
use eventa_core::routes::Route;
use eventa_core::safety::{
    AckOutcome, AlertFilter, AlertQuery, AlertSort, FeedSnapshot, attention_count,
};
use eventa_core::session::wait_signed_out;

use crate::context::{Context, confirm, csv_target};
use crate::{Error, Result};

fn print_alert(a: &SafetyAlert) {
    let age = (Utc::now() - a.created_at).num_minutes();
    println!(
        "{:<10} {:<26} {:<20} {:<16} {:<14} {} {}m ago",
        a.priority().label(),
        a.id,
        a.user_name,
        a.type_label(),
        a.event_name.as_deref().unwrap_or("N/A"),
        if a.acknowledged_by_admin { "ack" } else { "NEW" },
        age
    );
}

pub async fn list(
    ctx: &Context,
    filter: AlertFilter,
    search: Option<String>,
    sort: AlertSort,
    csv: Option<&Path>,
) -> Result<()> {
    ctx.authorize(Route::SafetyAlerts).await?;
    let alerts = ctx.feed().alerts(filter).await?;
    let shown = AlertQuery { search, sort }.apply(&alerts);

    for a in &shown {
        print_alert(a);
    }
    println!(
        "{} alerts, {} need attention",
        shown.len(),
        attention_count(&shown)
    );

    if let Some(path) = csv {
        alerts_csv(&shown).write_to(&csv_target(path, ExportKind::SafetyAlerts))?;
    }
    Ok(())
}

fn print_snapshot(s: &FeedSnapshot) {
    let count = s
        .count
        .map_or_else(|| "?".to_string(), |n| n.to_string());
    match &s.last_error {
        Some(e) => println!("unacknowledged emergencies: {count} (last poll failed: {e})"),
        None => println!("unacknowledged emergencies: {count}"),
    }
}

/// Poll the emergency count until `ticks` updates, Ctrl-C, or the session
/// is revoked. The session is re-validated alongside the feed.
pub async fn watch(ctx: &Context, ticks: Option<u32>) -> Result<()> {
    let session = Arc::new(ctx.session());
    ctx.authorize_session(&session, Route::SafetyAlerts).await?;
    let mut session_rx = session.subscribe();

    let feed = Arc::new(ctx.feed());
    let mut rx = feed.subscribe();
    let cancel = CancellationToken::new();
    let poller = feed.spawn(ctx.config.safety_interval, cancel.clone());
    let revalidation = session.spawn_revalidation(ctx.config.session_interval, cancel.clone());

    let mut seen = 0u32;
    let mut ended = None;
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                print_snapshot(&rx.borrow_and_update());
                seen += 1;
                if ticks.is_some_and(|t| seen >= t) {
                    break;
                }
            }
            reason = wait_signed_out(&mut session_rx) => {
                ended = Some(reason);
                break;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    cancel.cancel();
    let (polled, revalidated) = tokio::join!(poller, revalidation);
    polled.map_err(|e| Error::Custom(format!("safety polling task failed: {e}")))?;
    revalidated.map_err(|e| Error::Custom(format!("session task failed: {e}")))?;

    match ended {
        Some(reason) => Err(Error::Custom(format!(
            "Session ended: {reason}. Run `eventa login`."
        ))),
        None => Ok(()),
    }
}

pub async fn ack(ctx: &Context, id: &str) -> Result<()> {
    ctx.authorize(Route::SafetyAlerts).await?;
    match ctx.feed().acknowledge(id).await? {
        AckOutcome::Acknowledged => println!("Acknowledged {id}"),
        AckOutcome::AlreadyAcknowledged => println!("{id} was already acknowledged"),
    }
    Ok(())
}

pub async fn ack_all(ctx: &Context, yes: bool) -> Result<()> {
    confirm(yes, "acknowledge every alert")?;
    ctx.authorize(Route::SafetyAlerts).await?;

    let feed = ctx.feed();
    let alerts = feed.alerts(AlertFilter::All).await?;
    let report = feed.acknowledge_all(&alerts).await;

    println!(
        "Acknowledged {}, skipped {}, failed {}",
        report.acknowledged.len(),
        report.skipped,
        report.failed.len()
    );
    for (id, reason) in &report.failed {
        eprintln!("  {id}: {reason}");
    }
    if report.is_complete() {
        Ok(())
    } else {
        Err(Error::Custom(format!(
            "{} alerts could not be acknowledged",
            report.failed.len()
        )))
    }
}

pub async fn feed(ctx: &Context, limit: u32) -> Result<()> {
    ctx.authorize(Route::SafetyAlerts).await?;
    let feed = ctx.feed();
    let (recent, stats) = tokio::join!(feed.live_feed(limit), feed.statistics());

    let (recent, stats) = (recent?, stats?);
    for a in &recent {
        print_alert(a);
    }
    println!(
        "{} alerts, {} emergencies, {} unacknowledged, {} active users",
        stats.total_alerts, stats.emergencies, stats.unacknowledged, stats.active_users
    );
    Ok(())
}

pub async fn locations(ctx: &Context) -> Result<()> {
    ctx.authorize(Route::LocationMonitoring).await?;
    let shared = ctx.feed().shared_locations().await?;
    for a in &shared {
        println!(
            "{:<20} {:<28} {}",
            a.user_name,
            a.address.as_deref().unwrap_or("N/A"),
            a.google_maps_url().unwrap_or_default()
        );
    }
    println!("{} users sharing their location", shared.len());
    Ok(())
}
