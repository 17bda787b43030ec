use std::path::Path;

use eventa_core::backend::EventsBackend;
use eventa_core::events::{DashboardStats, EventKpis, performance, scope_events, trending};
use eventa_core::export::{ExportKind, attendees_csv, events_csv};
use eventa_core::routes::Route;

use crate::context::{Context, confirm, csv_target};
use crate::{Error, Result};

pub async fn list(ctx: &Context, csv: Option<&Path>) -> Result<()> {
    let user = ctx.authorize(Route::Events).await?;
    let events = scope_events(&user, ctx.client.list_events().await?);

    for e in &events {
        println!(
            "{:<26} {:<32} {:<12} views={:<6} rsvps={}",
            e.id, e.name, e.date, e.views, e.rsvps
        );
    }
    let stats = DashboardStats::from_events(&events);
    println!(
        "{} events, {} views, {} RSVPs",
        stats.total_events, stats.total_views, stats.total_rsvps
    );

    if let Some(path) = csv {
        events_csv(&events).write_to(&csv_target(path, ExportKind::Events))?;
    }
    Ok(())
}

pub async fn stats(ctx: &Context, top: usize) -> Result<()> {
    let user = ctx.authorize(Route::Analytics).await?;
    let events = scope_events(&user, ctx.client.list_events().await?);
    let kpis = EventKpis::compute(&user, &events);

    println!("events:      {}", kpis.total_events);
    println!("views:       {}", kpis.total_views);
    println!("rsvps:       {}", kpis.total_rsvps);
    println!("tickets:     {} (estimated)", kpis.total_tickets);
    println!("revenue:     {:.2} (estimated)", kpis.total_revenue);
    println!("conversion:  {:.1}%", kpis.average_conversion());
    if let Some(n) = kpis.organizers {
        println!("organizers:  {n}");
    }

    println!("categories:");
    for (category, count) in &kpis.categories {
        println!("  {category:<20} {count}");
    }

    println!("trending:");
    for e in trending(&events, top) {
        println!("  {}", e.name);
    }

    println!("performance:");
    for row in performance(&events) {
        println!(
            "  {:<18} engagement={:<6} tickets={:<5} revenue={:<10.2} conversion={:.1}%",
            row.label, row.engagement, row.tickets, row.revenue, row.conversion
        );
    }
    Ok(())
}

pub async fn delete(ctx: &Context, id: &str, yes: bool) -> Result<()> {
    confirm(yes, &format!("delete event {id}"))?;
    let user = ctx.authorize(Route::Events).await?;

    let event = ctx.client.get_event(id).await?;
    if scope_events(&user, vec![event]).is_empty() {
        return Err(Error::Custom(format!(
            "Event {id} belongs to another organizer"
        )));
    }

    ctx.client.delete_event(id).await?;
    println!("Deleted event {id}");
    Ok(())
}

pub async fn attendees(
    ctx: &Context,
    event_id: &str,
    search: Option<&str>,
    csv: Option<&Path>,
) -> Result<()> {
    ctx.authorize(Route::Attendees(event_id.to_string())).await?;
    let event = ctx.client.get_event(event_id).await?;
    let attendees: Vec<_> = ctx
        .client
        .list_attendees(event_id)
        .await?
        .into_iter()
        .filter(|a| search.is_none_or(|q| a.matches(q)))
        .collect();

    println!("{} ({} attendees)", event.name, attendees.len());
    for a in &attendees {
        println!(
            "  {:<24} {:<30} {:<16} {:<10} {}",
            a.name,
            a.email,
            a.phone.as_deref().unwrap_or("-"),
            a.rsvp_status.as_str(),
            a.ticket_count
        );
    }

    if let Some(path) = csv {
        let target = csv_target(path, ExportKind::Attendees { event: &event.name });
        attendees_csv(&attendees).write_to(&target)?;
    }
    Ok(())
}
