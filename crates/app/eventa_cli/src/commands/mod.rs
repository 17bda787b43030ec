mod admin;
mod alerts;
mod events;
mod moderation;
mod session;
mod users;

use eventa_core::models::NewUser;

use crate::Result;
use crate::cli::{
    AlertsCommand, BadgesCommand, Cli, Commands, EventsCommand, ModerationCommand, UsersCommand,
};
use crate::context::Context;

pub async fn dispatch(args: Cli) -> Result<()> {
    if let Commands::Version = args.command {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let ctx = Context::load(&args)?;

    match args.command {
        Commands::Version => Ok(()),
        Commands::Login { email, password } => session::login(&ctx, &email, &password).await,
        Commands::Logout => session::logout(&ctx),
        Commands::Whoami => session::whoami(&ctx).await,
        Commands::Route { path } => session::route(&ctx, &path).await,
        Commands::Storage => session::storage(&ctx),

        Commands::Events(EventsCommand::List { csv }) => events::list(&ctx, csv.as_deref()).await,
        Commands::Events(EventsCommand::Stats { top }) => events::stats(&ctx, top).await,
        Commands::Events(EventsCommand::Delete { id, yes }) => events::delete(&ctx, &id, yes).await,
        Commands::Events(EventsCommand::Bulk {
            feature,
            unfeature,
            delete: _,
            ids,
            yes,
        }) => {
            let action = moderation::bulk_action(feature, unfeature);
            moderation::bulk(&ctx, action, &ids, yes).await
        }
        Commands::Attendees {
            event_id,
            search,
            csv,
        } => events::attendees(&ctx, &event_id, search.as_deref(), csv.as_deref()).await,

        Commands::Alerts(AlertsCommand::List {
            filter,
            search,
            sort,
            csv,
        }) => alerts::list(&ctx, filter, search, sort, csv.as_deref()).await,
        Commands::Alerts(AlertsCommand::Watch { ticks }) => alerts::watch(&ctx, ticks).await,
        Commands::Alerts(AlertsCommand::Ack { id }) => alerts::ack(&ctx, &id).await,
        Commands::Alerts(AlertsCommand::AckAll { yes }) => alerts::ack_all(&ctx, yes).await,
        Commands::Alerts(AlertsCommand::Locations) => alerts::locations(&ctx).await,
        Commands::Alerts(AlertsCommand::Feed { limit }) => alerts::feed(&ctx, limit).await,

        Commands::Overview { range } => admin::overview(&ctx, range).await,
        Commands::AuditLogs { csv } => admin::audit_logs(&ctx, csv.as_deref()).await,
        Commands::Badges(BadgesCommand::List { user }) => {
            admin::badges(&ctx, user.as_deref()).await
        }
        Commands::Badges(BadgesCommand::Award { user, badge, yes }) => {
            admin::award(&ctx, &user, &badge, yes).await
        }
        Commands::Badges(BadgesCommand::Remove { user, badge, yes }) => {
            admin::remove(&ctx, &user, &badge, yes).await
        }

        Commands::Users(UsersCommand::List { search, role }) => {
            users::list(&ctx, search, role).await
        }
        Commands::Users(UsersCommand::Create {
            name,
            email,
            password,
            phone,
            admin,
            organizer,
        }) => {
            let account = NewUser {
                name,
                email,
                password,
                phone,
                is_admin: admin,
                is_organizer: organizer,
            };
            users::create(&ctx, account).await
        }
        Commands::Users(UsersCommand::Promote { id, yes }) => users::promote(&ctx, &id, yes).await,
        Commands::Users(UsersCommand::Demote { id, yes }) => users::demote(&ctx, &id, yes).await,
        Commands::Users(UsersCommand::Delete { id, yes }) => users::delete(&ctx, &id, yes).await,

        Commands::Moderation(ModerationCommand::Queue) => moderation::queue(&ctx).await,
        Commands::Moderation(ModerationCommand::Approve { id }) => {
            moderation::approve(&ctx, &id).await
        }
        Commands::Moderation(ModerationCommand::Reject { id, yes }) => {
            moderation::reject(&ctx, &id, yes).await
        }
    }
}
