//! Current user, role flags and user-management payloads.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User returned by the `/users/profile` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default, alias = "isAdmin")]
    pub is_admin: bool,
    #[serde(default, alias = "isOrganizer")]
    pub is_organizer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl CurrentUser {
    pub fn roles(&self) -> RoleSet {
        RoleSet {
            is_admin: self.is_admin,
            is_organizer: self.is_organizer,
        }
    }
}

/// Role flags. Not mutually exclusive: a user may hold both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleSet {
    pub is_admin: bool,
    pub is_organizer: bool,
}

impl RoleSet {
    /// Plain end-users (neither flag) may not use the admin console.
    pub fn is_permitted(self) -> bool {
        self.is_admin || self.is_organizer
    }

    pub fn label(self) -> &'static str {
        match (self.is_admin, self.is_organizer) {
            (true, true) => "admin, organizer",
            (true, false) => "admin",
            (false, true) => "organizer",
            (false, false) => "user",
        }
    }
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Row of the admin user-management table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default, alias = "isAdmin")]
    pub is_admin: bool,
    #[serde(default, alias = "isOrganizer")]
    pub is_organizer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ManagedUser {
    pub fn roles(&self) -> RoleSet {
        RoleSet {
            is_admin: self.is_admin,
            is_organizer: self.is_organizer,
        }
    }
}

/// Role filter of the user-management listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoleFilter {
    #[default]
    Any,
    Admin,
    Organizer,
    /// Neither flag set.
    User,
}

impl RoleFilter {
    /// Value of the `role` query parameter; `None` for no filter.
    pub fn as_param(self) -> Option<&'static str> {
        match self {
            RoleFilter::Any => None,
            RoleFilter::Admin => Some("admin"),
            RoleFilter::Organizer => Some("organizer"),
            RoleFilter::User => Some("user"),
        }
    }

    pub fn matches(self, user: &ManagedUser) -> bool {
        match self {
            RoleFilter::Any => true,
            RoleFilter::Admin => user.is_admin,
            RoleFilter::Organizer => user.is_organizer,
            RoleFilter::User => !user.roles().is_permitted(),
        }
    }
}

impl FromStr for RoleFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "all" | "any" => Ok(RoleFilter::Any),
            "admin" => Ok(RoleFilter::Admin),
            "organizer" => Ok(RoleFilter::Organizer),
            "user" => Ok(RoleFilter::User),
            other => Err(format!("unknown role filter: {other}")),
        }
    }
}

/// Query of `GET /admin/users`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserQuery {
    pub search: Option<String>,
    pub role: RoleFilter,
}

impl UserQuery {
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            params.push(("search", term.to_string()));
        }
        if let Some(role) = self.role.as_param() {
            params.push(("role", role.to_string()));
        }
        params
    }
}

/// Body of `POST /admin/users`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub is_admin: bool,
    pub is_organizer: bool,
}

/// Body of `PUT /admin/users/:id`. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_organizer: Option<bool>,
}

impl UserUpdate {
    /// Grant both console roles.
    pub fn promote() -> Self {
        Self {
            is_admin: Some(true),
            is_organizer: Some(true),
            ..Default::default()
        }
    }

    /// Revoke the admin role; the organizer flag is kept.
    pub fn demote() -> Self {
        Self {
            is_admin: Some(false),
            ..Default::default()
        }
    }
}
