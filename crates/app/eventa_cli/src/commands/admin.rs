use std::path::Path;

use eventa_core::backend::AdminBackend;
use eventa_core::badges::{annotate, award as award_badge, remove as remove_badge};
use eventa_core::dashboard::{AdminOverview, Section};
use eventa_core::export::{ExportKind, audit_logs_csv};
use eventa_core::models::{BadgeChange, TimeRange};
use eventa_core::routes::Route;

use crate::Result;
use crate::context::{Context, confirm, csv_target};

fn section<T>(name: &str, s: &Section<T>, show: impl FnOnce(&T)) {
    match s {
        Section::Ready(value) => show(value),
        Section::Failed(reason) => println!("{name}: unavailable ({reason})"),
    }
}

pub async fn overview(ctx: &Context, range: TimeRange) -> Result<()> {
    ctx.authorize(Route::Index).await?;
    let overview = AdminOverview::load(&ctx.client, range).await;

    section("analytics", &overview.analytics, |a| {
        println!(
            "users: {}  events: {}  organizers: {}  revenue: {:.2}",
            a.total_users, a.total_events, a.total_organizers, a.total_revenue
        );
    });
    section("financial", &overview.financial, |f| {
        println!(
            "financial ({}): revenue {:.2}, fees {:.2}, pending payouts {:.2}",
            range.as_str(),
            f.total_revenue,
            f.platform_fees,
            f.pending_payouts
        );
    });
    section("safety", &overview.safety, |s| {
        println!(
            "safety: {} alerts, {} emergencies, {} unacknowledged",
            s.total_alerts, s.emergencies, s.unacknowledged
        );
    });
    section("notifications", &overview.notifications, |n| {
        println!(
            "notifications: {} ({} unread)",
            n.len(),
            overview.unread_notifications()
        );
    });
    section("activity", &overview.activity, |entries| {
        println!("recent activity:");
        for e in entries.iter().take(10) {
            println!(
                "  {} {}",
                e.user_name.as_deref().unwrap_or("someone"),
                e.action
            );
        }
    });
    Ok(())
}

pub async fn audit_logs(ctx: &Context, csv: Option<&Path>) -> Result<()> {
    ctx.authorize(Route::AuditLogs).await?;
    let entries = ctx.client.audit_logs().await?;
    for e in &entries {
        println!(
            "{} {:<28} {:<20} {}",
            e.timestamp.format("%Y-%m-%d %H:%M:%S"),
            e.user,
            e.action,
            e.resource
        );
    }
    if let Some(path) = csv {
        audit_logs_csv(&entries).write_to(&csv_target(path, ExportKind::AuditLogs))?;
    }
    Ok(())
}

pub async fn badges(ctx: &Context, user: Option<&str>) -> Result<()> {
    ctx.authorize(Route::Admin).await?;
    let catalogue = ctx.client.list_badges().await?;
    let held = match user {
        Some(id) => ctx.client.user_badges(id).await?,
        None => Vec::new(),
    };
    for (badge, has) in annotate(&catalogue, &held) {
        let mark = if has { "*" } else { " " };
        println!("{mark} {:<16} {}", badge.id, badge.name);
    }
    Ok(())
}

pub async fn award(ctx: &Context, user: &str, badge: &str, yes: bool) -> Result<()> {
    confirm(yes, &format!("award {badge} to {user}"))?;
    ctx.authorize(Route::Admin).await?;
    match award_badge(&ctx.client, user, badge).await? {
        BadgeChange::Applied => println!("Awarded {badge} to {user}"),
        BadgeChange::Unchanged => println!("{user} already holds {badge}"),
    }
    Ok(())
}

pub async fn remove(ctx: &Context, user: &str, badge: &str, yes: bool) -> Result<()> {
    confirm(yes, &format!("remove {badge} from {user}"))?;
    ctx.authorize(Route::Admin).await?;
    match remove_badge(&ctx.client, user, badge).await? {
        BadgeChange::Applied => println!("Removed {badge} from {user}"),
        BadgeChange::Unchanged => println!("{user} does not hold {badge}"),
    }
    Ok(())
}
