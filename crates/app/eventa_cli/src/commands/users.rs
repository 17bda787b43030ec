use eventa_core::models::{NewUser, RoleFilter, UserQuery};
use eventa_core::routes::Route;
use eventa_core::users;

use crate::Result;
use crate::context::{Context, confirm};

pub async fn list(ctx: &Context, search: Option<String>, role: RoleFilter) -> Result<()> {
    ctx.authorize(Route::Admin).await?;
    let rows = users::list(&ctx.client, &UserQuery { search, role }).await?;
    for u in &rows {
        println!(
            "{:<26} {:<24} {:<32} {}",
            u.id,
            u.name,
            u.email,
            u.roles().label()
        );
    }
    println!("{} users", rows.len());
    Ok(())
}

pub async fn create(ctx: &Context, account: NewUser) -> Result<()> {
    users::validate(&account)?;
    ctx.authorize(Route::Admin).await?;
    users::create(&ctx.client, &account).await?;
    println!("Created {} <{}>", account.name, account.email);
    Ok(())
}

pub async fn promote(ctx: &Context, id: &str, yes: bool) -> Result<()> {
    confirm(yes, &format!("promote user {id} to admin"))?;
    ctx.authorize(Route::Admin).await?;
    users::promote(&ctx.client, id).await?;
    println!("Promoted {id}");
    Ok(())
}

pub async fn demote(ctx: &Context, id: &str, yes: bool) -> Result<()> {
    confirm(yes, &format!("revoke admin rights of {id}"))?;
    ctx.authorize(Route::Admin).await?;
    users::demote(&ctx.client, id).await?;
    println!("Demoted {id}");
    Ok(())
}

pub async fn delete(ctx: &Context, id: &str, yes: bool) -> Result<()> {
    confirm(yes, &format!("delete user {id}"))?;
    ctx.authorize(Route::Admin).await?;
    users::delete(&ctx.client, id).await?;
    println!("Deleted user {id}");
    Ok(())
}
