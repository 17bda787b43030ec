// @awa-component: AUTH-RouteGate
//
//! Route authorization gate.
//!
//! Maps the session's role flags to the set of reachable screens. An
//! unauthorized path is never an error: it resolves to a redirect.
//!
//! | Gate state        | Reachable                        | Everything else     |
//! |-------------------|----------------------------------|---------------------|
//! | `Loading`         | nothing (neutral loading view)   | n/a                 |
//! | `Unauthenticated` | `/login`                         | → `/login`          |
//! | `Admin`           | every known screen               | → `/`               |
//! | `Organizer`       | organizer screens                | → `/organizer`      |

use crate::models::RoleSet;
use crate::session::SessionState;

pub const LOGIN_PATH: &str = "/login";
pub const ADMIN_HOME: &str = "/";
pub const ORGANIZER_HOME: &str = "/organizer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    /// `/`, the admin dashboard.
    Index,
    Events,
    CreateEvent,
    EditEvent(String),
    Attendees(String),
    Analytics,
    TicketSales,
    Profile,
    OrganizerDashboard,
    // Admin-only
    Admin,
    Moderation,
    Financial,
    Settings,
    AuditLogs,
    BulkOperations,
    SystemHealth,
    SafetyAlerts,
    LocationMonitoring,
    Unknown(String),
}

impl Route {
    /// Parse a client path. Query strings, fragments and trailing slashes
    /// are ignored.
    pub fn parse(path: &str) -> Route {
        let bare = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = bare.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Index,
            ["login"] => Route::Login,
            ["events"] => Route::Events,
            ["events", "create"] => Route::CreateEvent,
            // "create" is a screen, never an event id.
            ["events", "create", ..] => Route::Unknown(bare.to_string()),
            ["events", id, "edit"] => Route::EditEvent((*id).to_string()),
            ["events", id, "attendees"] => Route::Attendees((*id).to_string()),
            ["analytics"] => Route::Analytics,
            ["ticket-sales"] => Route::TicketSales,
            ["profile"] => Route::Profile,
            ["organizer"] => Route::OrganizerDashboard,
            ["admin"] => Route::Admin,
            ["moderation"] => Route::Moderation,
            ["financial"] => Route::Financial,
            ["settings"] => Route::Settings,
            ["audit-logs"] => Route::AuditLogs,
            ["bulk-operations"] => Route::BulkOperations,
            ["system-health"] => Route::SystemHealth,
            ["safety-alerts"] => Route::SafetyAlerts,
            ["location-monitoring"] => Route::LocationMonitoring,
            _ => Route::Unknown(bare.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => LOGIN_PATH.to_string(),
            Route::Index => ADMIN_HOME.to_string(),
            Route::Events => "/events".to_string(),
            Route::CreateEvent => "/events/create".to_string(),
            Route::EditEvent(id) => format!("/events/{id}/edit"),
            Route::Attendees(id) => format!("/events/{id}/attendees"),
            Route::Analytics => "/analytics".to_string(),
            Route::TicketSales => "/ticket-sales".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::OrganizerDashboard => ORGANIZER_HOME.to_string(),
            Route::Admin => "/admin".to_string(),
            Route::Moderation => "/moderation".to_string(),
            Route::Financial => "/financial".to_string(),
            Route::Settings => "/settings".to_string(),
            Route::AuditLogs => "/audit-logs".to_string(),
            Route::BulkOperations => "/bulk-operations".to_string(),
            Route::SystemHealth => "/system-health".to_string(),
            Route::SafetyAlerts => "/safety-alerts".to_string(),
            Route::LocationMonitoring => "/location-monitoring".to_string(),
            Route::Unknown(path) => path.clone(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Sign in",
            Route::Index => "Admin Dashboard",
            Route::Events => "Events",
            Route::CreateEvent => "Create Event",
            Route::EditEvent(_) => "Edit Event",
            Route::Attendees(_) => "Attendees",
            Route::Analytics => "Analytics",
            Route::TicketSales => "Ticket Sales",
            Route::Profile => "Profile",
            Route::OrganizerDashboard => "Organizer Dashboard",
            Route::Admin => "User Management",
            Route::Moderation => "Content Moderation",
            Route::Financial => "Financial Control",
            Route::Settings => "Platform Settings",
            Route::AuditLogs => "Audit Logs",
            Route::BulkOperations => "Bulk Operations",
            Route::SystemHealth => "System Health",
            Route::SafetyAlerts => "Safety Alerts",
            Route::LocationMonitoring => "Location Monitoring",
            Route::Unknown(_) => "Not Found",
        }
    }

    /// Screens an organizer without admin rights may open.
    pub fn is_organizer_screen(&self) -> bool {
        matches!(
            self,
            Route::OrganizerDashboard
                | Route::Events
                | Route::CreateEvent
                | Route::EditEvent(_)
                | Route::Attendees(_)
                | Route::Analytics
                | Route::TicketSales
                | Route::Profile
        )
    }

    pub fn is_admin_only(&self) -> bool {
        matches!(
            self,
            Route::Index
                | Route::Admin
                | Route::Moderation
                | Route::Financial
                | Route::Settings
                | Route::AuditLogs
                | Route::BulkOperations
                | Route::SystemHealth
                | Route::SafetyAlerts
                | Route::LocationMonitoring
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Loading,
    Unauthenticated,
    /// Admin; may also hold the organizer flag.
    Admin(RoleSet),
    Organizer,
}

impl GateState {
    /// Admin wins when both flags are set. A session with neither flag is
    /// treated as signed out.
    pub fn from_roles(roles: RoleSet) -> Self {
        if roles.is_admin {
            GateState::Admin(roles)
        } else if roles.is_organizer {
            GateState::Organizer
        } else {
            GateState::Unauthenticated
        }
    }

    /// Landing path for this state.
    pub fn home(self) -> &'static str {
        match self {
            GateState::Loading | GateState::Unauthenticated => LOGIN_PATH,
            GateState::Admin(_) => ADMIN_HOME,
            GateState::Organizer => ORGANIZER_HOME,
        }
    }
}

impl From<&SessionState> for GateState {
    fn from(state: &SessionState) -> Self {
        match state {
            SessionState::Loading => GateState::Loading,
            SessionState::Unauthenticated { .. } => GateState::Unauthenticated,
            SessionState::Authenticated { user } => GateState::from_roles(user.roles()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Render(Route),
    Redirect(String),
    Loading,
}

pub fn authorize(gate: GateState, route: &Route) -> Decision {
    match gate {
        GateState::Loading => Decision::Loading,
        GateState::Unauthenticated => match route {
            Route::Login => Decision::Render(Route::Login),
            _ => Decision::Redirect(LOGIN_PATH.to_string()),
        },
        GateState::Admin(_) => match route {
            Route::Login | Route::Unknown(_) => Decision::Redirect(ADMIN_HOME.to_string()),
            other => Decision::Render(other.clone()),
        },
        GateState::Organizer => {
            if route.is_organizer_screen() {
                Decision::Render(route.clone())
            } else {
                Decision::Redirect(ORGANIZER_HOME.to_string())
            }
        }
    }
}

/// Convenience wrapper: parse `path` and authorize it.
pub fn resolve_path(gate: GateState, path: &str) -> Decision {
    authorize(gate, &Route::parse(path))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub path: String,
    pub badge: Option<usize>,
    /// Attention styling when there is something unacknowledged.
    pub pulse: bool,
}

impl NavItem {
    fn new(label: &'static str, route: Route) -> Self {
        Self {
            label,
            path: route.path(),
            badge: None,
            pulse: false,
        }
    }
}

/// Navigation entries for `gate`. `safety_badge` is the latest known count
/// of unacknowledged emergencies, if any poll has succeeded.
pub fn navigation(gate: GateState, safety_badge: Option<usize>) -> Vec<NavItem> {
    match gate {
        GateState::Loading | GateState::Unauthenticated => Vec::new(),
        GateState::Organizer => vec![
            NavItem::new("Dashboard", Route::OrganizerDashboard),
            NavItem::new("Events", Route::Events),
            NavItem::new("Sales", Route::TicketSales),
            NavItem::new("Analytics", Route::Analytics),
            NavItem::new("Profile", Route::Profile),
        ],
        GateState::Admin(roles) => {
            let mut items = vec![
                NavItem::new("Dashboard", Route::Index),
                NavItem::new("Events", Route::Events),
                NavItem::new("Sales", Route::TicketSales),
                NavItem::new("Analytics", Route::Analytics),
                NavItem::new("Users", Route::Admin),
                NavItem::new("Moderation", Route::Moderation),
                NavItem::new("Financial", Route::Financial),
                NavItem {
                    badge: safety_badge,
                    pulse: safety_badge.is_some_and(|n| n > 0),
                    ..NavItem::new("Safety", Route::SafetyAlerts)
                },
                NavItem::new("Locations", Route::LocationMonitoring),
                NavItem::new("Audit Logs", Route::AuditLogs),
                NavItem::new("Bulk Ops", Route::BulkOperations),
                NavItem::new("System Health", Route::SystemHealth),
                NavItem::new("Settings", Route::Settings),
            ];
            if roles.is_organizer {
                items.insert(1, NavItem::new("My Events", Route::OrganizerDashboard));
            }
            items
        }
    }
}
