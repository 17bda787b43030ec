use eventa_core::routes::{Decision, GateState, navigation, resolve_path};
use eventa_core::session::SessionState;

use crate::context::Context;
use crate::{Error, Result};

pub async fn login(ctx: &Context, email: &str, password: &str) -> Result<()> {
    let outcome = ctx.session().login(email, password).await?;
    if let Some(warning) = &outcome.storage_warning {
        eprintln!("warning: {warning}");
    }
    println!(
        "Signed in as {} <{}> ({})",
        outcome.user.name,
        outcome.user.email,
        outcome.user.roles().label()
    );
    Ok(())
}

pub fn logout(ctx: &Context) -> Result<()> {
    ctx.session().logout();
    println!("Signed out");
    Ok(())
}

pub async fn whoami(ctx: &Context) -> Result<()> {
    let state = ctx.session().resolve().await;
    let user = match &state {
        SessionState::Authenticated { user } => user,
        SessionState::Unauthenticated { reason: Some(reason) } => {
            return Err(Error::Custom(format!("Not signed in: {reason}")));
        }
        _ => return Err(Error::Custom("Not signed in".into())),
    };

    println!("{} <{}>", user.name, user.email);
    println!("role: {}", user.roles().label());

    let gate = GateState::from(&state);
    let badge = if matches!(gate, GateState::Admin(_)) {
        ctx.feed().poll().await.ok()
    } else {
        None
    };
    println!("home: {}", gate.home());
    for item in navigation(gate, badge) {
        match item.badge {
            Some(n) if item.pulse => println!("  {:<20} {} [{n}]", item.label, item.path),
            _ => println!("  {:<20} {}", item.label, item.path),
        }
    }
    Ok(())
}

pub async fn route(ctx: &Context, path: &str) -> Result<()> {
    let state = ctx.session().resolve().await;
    match resolve_path(GateState::from(&state), path) {
        Decision::Render(route) => println!("render {} ({})", route.path(), route.title()),
        Decision::Redirect(to) => println!("redirect {to}"),
        Decision::Loading => println!("loading"),
    }
    Ok(())
}

pub fn storage(ctx: &Context) -> Result<()> {
    let backend = ctx.store.describe();
    if ctx.store.is_available() {
        println!("storage: {backend} (available)");
    } else {
        println!("storage: {backend} (blocked, values are kept in memory for this run)");
    }
    Ok(())
}
