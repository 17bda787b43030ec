use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};

use eventa_core::models::{RoleFilter, TimeRange};
use eventa_core::safety::{AlertFilter, AlertSort};

#[derive(Parser, Debug)]
#[command(name = "eventa", version, about = "Eventa admin console")]
pub struct Cli {
    /// Backend base URL.
    #[arg(long, global = true, env = "EVENTA_API_URL")]
    pub api_url: Option<String>,

    /// Path of the local key-value store.
    #[arg(long = "store", global = true, env = "EVENTA_STORE_PATH")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in as an admin or organizer.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "EVENTA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored credential.
    Logout,
    /// Show the signed-in user, role and navigation.
    Whoami,
    /// Show what the console does when `path` is opened.
    Route { path: String },
    #[command(subcommand)]
    Events(EventsCommand),
    /// List the attendees of an event.
    Attendees {
        event_id: String,
        #[arg(long)]
        search: Option<String>,
        /// Write a CSV export (a directory gets a default file name).
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },
    #[command(subcommand)]
    Alerts(AlertsCommand),
    /// Admin overview panels.
    Overview {
        #[arg(long, default_value = "alltime")]
        range: TimeRange,
    },
    /// Admin audit trail.
    AuditLogs {
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },
    #[command(subcommand)]
    Badges(BadgesCommand),
    #[command(subcommand)]
    Users(UsersCommand),
    #[command(subcommand)]
    Moderation(ModerationCommand),
    /// Report whether persistent storage is usable.
    Storage,
    Version,
}

#[derive(Subcommand, Debug)]
pub enum EventsCommand {
    /// Events visible to the signed-in user.
    List {
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },
    /// Totals, trending events and per-event performance.
    Stats {
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Feature, unfeature or delete several events at once.
    #[command(group(
        ArgGroup::new("action")
            .required(true)
            .args(["feature", "unfeature", "delete"])
    ))]
    Bulk {
        #[arg(long)]
        feature: bool,
        #[arg(long)]
        unfeature: bool,
        #[arg(long)]
        delete: bool,
        #[arg(required = true, value_name = "ID")]
        ids: Vec<String>,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum AlertsCommand {
    List {
        #[arg(long, default_value = "all")]
        filter: AlertFilter,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "recent")]
        sort: AlertSort,
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },
    /// Poll unacknowledged emergencies until interrupted.
    Watch {
        /// Stop after this many updates.
        #[arg(long)]
        ticks: Option<u32>,
    },
    Ack { id: String },
    /// Acknowledge every unacknowledged alert.
    AckAll {
        #[arg(long)]
        yes: bool,
    },
    /// Users currently sharing their location.
    Locations,
    /// Most recent alerts and platform-wide safety counters.
    Feed {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

#[derive(Subcommand, Debug)]
pub enum BadgesCommand {
    /// The badge catalogue, marking the ones `--user` holds.
    List {
        #[arg(long)]
        user: Option<String>,
    },
    Award {
        user: String,
        badge: String,
        #[arg(long)]
        yes: bool,
    },
    Remove {
        user: String,
        badge: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    List {
        #[arg(long)]
        search: Option<String>,
        /// all, admin, organizer or user.
        #[arg(long, default_value = "all")]
        role: RoleFilter,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "EVENTA_NEW_USER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        admin: bool,
        #[arg(long)]
        organizer: bool,
    },
    /// Grant admin and organizer rights.
    Promote {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Revoke admin rights.
    Demote {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ModerationCommand {
    /// Events waiting for approval.
    Queue,
    /// Approve an event by featuring it.
    Approve { id: String },
    /// Reject an event. This deletes it.
    Reject {
        id: String,
        #[arg(long)]
        yes: bool,
    },
}
