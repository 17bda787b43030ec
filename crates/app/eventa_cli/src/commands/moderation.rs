use eventa_core::backend::EventsBackend;
use eventa_core::moderation::{self, BulkAction, ModerationQueue, bulk_apply};
use eventa_core::routes::Route;

use crate::context::{Context, confirm};
use crate::{Error, Result};

pub async fn queue(ctx: &Context) -> Result<()> {
    ctx.authorize(Route::Moderation).await?;
    let queue = ModerationQueue::from_events(ctx.client.list_events().await?);

    println!(
        "pending: {}  approved: {}  total: {}",
        queue.pending.len(),
        queue.approved,
        queue.total()
    );
    for e in &queue.pending {
        println!("  {:<26} {:<32} {:<24} {}", e.id, e.name, e.location, e.date);
    }
    Ok(())
}

pub async fn approve(ctx: &Context, id: &str) -> Result<()> {
    ctx.authorize(Route::Moderation).await?;
    moderation::approve(&ctx.client, id).await?;
    println!("Approved {id}");
    Ok(())
}

pub async fn reject(ctx: &Context, id: &str, yes: bool) -> Result<()> {
    confirm(yes, &format!("reject and delete event {id}"))?;
    ctx.authorize(Route::Moderation).await?;
    moderation::reject(&ctx.client, id).await?;
    println!("Rejected {id}");
    Ok(())
}

pub fn bulk_action(feature: bool, unfeature: bool) -> BulkAction {
    if feature {
        BulkAction::Feature
    } else if unfeature {
        BulkAction::Unfeature
    } else {
        BulkAction::Delete
    }
}

pub async fn bulk(ctx: &Context, action: BulkAction, ids: &[String], yes: bool) -> Result<()> {
    confirm(yes, &format!("{} {} events", action.as_str(), ids.len()))?;
    ctx.authorize(Route::BulkOperations).await?;

    let report = bulk_apply(&ctx.client, action, ids).await;
    println!(
        "{} {}, failed {}",
        action.past_tense(),
        report.applied.len(),
        report.failed.len()
    );
    for (id, reason) in &report.failed {
        eprintln!("  {id}: {reason}");
    }
    if report.is_complete() {
        Ok(())
    } else {
        Err(Error::Custom(format!(
            "{} events could not be {}",
            report.failed.len(),
            action.past_tense()
        )))
    }
}
